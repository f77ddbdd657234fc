//! Shared test infrastructure
//!
//! Builds a full engine over the in-memory gateway with a scripted lookup
//! provider, so every scenario runs without a database or network.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use uuid::Uuid;

use PlanBuddy::config::Settings;
use PlanBuddy::database::{MemStore, Store};
use PlanBuddy::models::{Candidate, CandidateExtra, Group, Message, PollKind};
use PlanBuddy::planbot::{CommandContext, CommandInterpreter};
use PlanBuddy::realtime::RealtimeChannel;
use PlanBuddy::services::{LookupProvider, NoopRanker, ServiceFactory};
use PlanBuddy::utils::errors::{LookupError, LookupResult};

/// Lookup provider double returning preconfigured candidates
#[derive(Default)]
pub struct ScriptedLookup {
    places: Mutex<Vec<Candidate>>,
    movies: Mutex<Vec<Candidate>>,
    fail: AtomicBool,
}

impl ScriptedLookup {
    pub fn set_places(&self, candidates: Vec<Candidate>) {
        *self.places.lock().unwrap() = candidates;
    }

    pub fn set_movies(&self, candidates: Vec<Candidate>) {
        *self.movies.lock().unwrap() = candidates;
    }

    pub fn fail_next(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl LookupProvider for ScriptedLookup {
    async fn search_places(&self, _query: &str) -> LookupResult<Vec<Candidate>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LookupError::ServiceUnavailable);
        }
        Ok(self.places.lock().unwrap().clone())
    }

    async fn search_movies_by_genres(&self, _genres: &[String]) -> LookupResult<Vec<Candidate>> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LookupError::ServiceUnavailable);
        }
        Ok(self.movies.lock().unwrap().clone())
    }
}

/// A fully wired engine over in-memory storage
pub struct TestEnv {
    pub store: Arc<MemStore>,
    pub realtime: Arc<RealtimeChannel>,
    pub services: ServiceFactory,
    pub interpreter: CommandInterpreter,
    pub lookup: Arc<ScriptedLookup>,
}

pub fn test_env() -> TestEnv {
    let settings = Settings::default();
    let store = Arc::new(MemStore::new());
    let realtime = Arc::new(RealtimeChannel::new());
    let services = ServiceFactory::new(
        store.clone() as Arc<dyn Store>,
        Arc::clone(&realtime),
        &settings,
    );
    let lookup = Arc::new(ScriptedLookup::default());
    let interpreter = CommandInterpreter::new(
        services.clone(),
        store.clone() as Arc<dyn Store>,
        lookup.clone() as Arc<dyn LookupProvider>,
        Arc::new(NoopRanker),
        settings.planbot.clone(),
    );

    TestEnv {
        store,
        realtime,
        services,
        interpreter,
        lookup,
    }
}

/// Create a group with `extra_members` members beyond the creator.
/// Returns the group and all member ids, creator first.
pub async fn seed_group(env: &TestEnv, extra_members: usize) -> (Group, Vec<Uuid>) {
    let creator = Uuid::new_v4();
    let group = env
        .services
        .group_service
        .create_group(creator, "test group")
        .await
        .expect("group creation failed");

    let mut members = vec![creator];
    for _ in 0..extra_members {
        let member = Uuid::new_v4();
        env.services
            .group_service
            .add_member(group.id, creator, member)
            .await
            .expect("adding member failed");
        members.push(member);
    }

    let group = env
        .services
        .group_service
        .group(group.id)
        .await
        .expect("group reload failed");
    (group, members)
}

pub fn ctx(group: &Group, user_id: Uuid, user_name: &str) -> CommandContext {
    CommandContext {
        group_id: group.id,
        user_id,
        user_name: user_name.to_string(),
    }
}

pub fn place(title: &str, description: &str) -> Candidate {
    Candidate {
        id: title.to_lowercase().replace(' ', "-"),
        title: title.to_string(),
        description: description.to_string(),
        image: None,
        rating: None,
        extra: CandidateExtra::empty(PollKind::Place),
    }
}

pub fn movie(title: &str) -> Candidate {
    Candidate {
        id: title.to_lowercase().replace(' ', "-"),
        title: title.to_string(),
        description: String::new(),
        image: None,
        rating: None,
        extra: CandidateExtra::empty(PollKind::Movie),
    }
}

/// All system messages posted to a group, in creation order
pub async fn system_messages(env: &TestEnv, group_id: Uuid) -> Vec<Message> {
    env.services
        .message_service
        .messages(group_id, None)
        .await
        .expect("listing messages failed")
        .into_iter()
        .filter(|m| m.is_system)
        .collect()
}

/// The most recent system message posted to a group
pub async fn last_system_message(env: &TestEnv, group_id: Uuid) -> Message {
    system_messages(env, group_id)
        .await
        .pop()
        .expect("no system message was posted")
}
