//! PlanBot command interpreter
//!
//! Turns chat-originated command strings into plan-state transitions:
//! search, select, schedule, RSVP summary, lock. Errors never cross this
//! boundary — the caller is the chat stream, so every failure becomes a
//! system message instead.

use std::sync::Arc;

use tracing::{error, warn};
use uuid::Uuid;

use crate::config::PlanbotConfig;
use crate::database::Store;
use crate::models::{Candidate, Choice, NotificationKind, NotificationMeta, PollDraft};
use crate::services::{LookupProvider, Ranker, ServiceFactory};
use crate::utils::errors::Result;
use crate::utils::logging::log_command;

use super::grammar;
use super::session::{PlanbotSession, SessionStore};
use super::texts;

/// Who issued a command, and where
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub group_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
}

/// Whether the interpreter consumed the input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Yes,
    No,
}

impl Handled {
    pub fn handled(self) -> bool {
        matches!(self, Handled::Yes)
    }
}

/// The PlanBot command interpreter.
///
/// Owns the per-group session store; instantiate one per engine (tests can
/// instantiate independent interpreters with their own state).
pub struct CommandInterpreter {
    services: ServiceFactory,
    store: Arc<dyn Store>,
    lookup: Arc<dyn LookupProvider>,
    ranker: Arc<dyn Ranker>,
    sessions: SessionStore,
    config: PlanbotConfig,
}

impl CommandInterpreter {
    pub fn new(
        services: ServiceFactory,
        store: Arc<dyn Store>,
        lookup: Arc<dyn LookupProvider>,
        ranker: Arc<dyn Ranker>,
        config: PlanbotConfig,
    ) -> Self {
        let sessions = SessionStore::new(config.session_ttl_seconds);
        Self {
            services,
            store,
            lookup,
            ranker,
            sessions,
            config,
        }
    }

    /// Handle one chat input.
    ///
    /// Input not starting with `/` or `!` is not consumed: the caller
    /// persists it as an ordinary chat message. Anything else is consumed,
    /// including unrecognized commands.
    pub async fn handle_command(&self, text: &str, ctx: &CommandContext) -> Handled {
        let trimmed = text.trim();
        let rest = if let Some(rest) = trimmed.strip_prefix('/') {
            rest
        } else if let Some(rest) = trimmed.strip_prefix('!') {
            rest
        } else {
            return Handled::No;
        };

        let mut parts = rest.split_whitespace();
        let command = match parts.next() {
            Some(command) => command.to_lowercase(),
            None => {
                self.post_system(ctx, &texts::unknown_command("")).await;
                return Handled::Yes;
            }
        };
        let args: Vec<&str> = parts.collect();

        log_command(ctx.group_id, ctx.user_id, &command);

        let outcome = match command.as_str() {
            "help" => self.cmd_help(ctx).await,
            "plan" => self.cmd_plan(ctx, &args).await,
            "planmovies" => self.cmd_planmovies(ctx).await,
            "select" => self.cmd_select(ctx, &args).await,
            "when" => self.cmd_when(ctx, &args).await,
            "rsvp" => self.cmd_rsvp(ctx).await,
            "lock" => self.cmd_lock(ctx).await,
            _ => {
                self.post_system(ctx, &texts::unknown_command(&command)).await;
                Ok(())
            }
        };

        if let Err(e) = outcome {
            warn!(
                group_id = %ctx.group_id,
                command = %command,
                error = %e,
                "Command failed"
            );
            self.post_system(ctx, &texts::command_failed()).await;
        }

        Handled::Yes
    }

    async fn cmd_help(&self, ctx: &CommandContext) -> Result<()> {
        self.post_system(ctx, &texts::help_text()).await;
        Ok(())
    }

    async fn cmd_plan(&self, ctx: &CommandContext, args: &[&str]) -> Result<()> {
        let query = args.join(" ");
        if query.trim().is_empty() {
            self.post_system(ctx, &texts::plan_usage()).await;
            return Ok(());
        }

        let candidates = match self.lookup.search_places(&query).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(group_id = %ctx.group_id, error = %e, "Place lookup failed");
                self.post_system(ctx, &texts::lookup_failed()).await;
                return Ok(());
            }
        };

        self.present_results(ctx, &query, candidates, &texts::place_results_header())
            .await
    }

    async fn cmd_planmovies(&self, ctx: &CommandContext) -> Result<()> {
        let genres = self.store.movie_genres(ctx.user_id).await?;

        let candidates = match self.lookup.search_movies_by_genres(&genres).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(group_id = %ctx.group_id, error = %e, "Movie lookup failed");
                self.post_system(ctx, &texts::lookup_failed()).await;
                return Ok(());
            }
        };

        let query = if genres.is_empty() {
            "movies".to_string()
        } else {
            genres.join(", ")
        };
        self.present_results(ctx, &query, candidates, &texts::movie_results_header())
            .await
    }

    async fn present_results(
        &self,
        ctx: &CommandContext,
        query: &str,
        candidates: Vec<Candidate>,
        header: &str,
    ) -> Result<()> {
        let ranked = self.ranker.rank(query, candidates).await;
        let top: Vec<Candidate> = ranked.into_iter().take(self.config.max_results).collect();

        if top.is_empty() {
            self.sessions.clear(ctx.group_id);
            self.post_system(ctx, &texts::no_results(query)).await;
            return Ok(());
        }

        self.post_system(ctx, &texts::candidate_list(header, &top))
            .await;

        let mut session = PlanbotSession::default();
        session.results = top;
        self.sessions.put(ctx.group_id, session);
        Ok(())
    }

    async fn cmd_select(&self, ctx: &CommandContext, args: &[&str]) -> Result<()> {
        let fragment = args.join(" ");
        if fragment.trim().is_empty() {
            self.post_system(ctx, &texts::select_usage()).await;
            return Ok(());
        }

        let mut session = self.sessions.snapshot(ctx.group_id);
        if session.results.is_empty() {
            self.post_system(ctx, &texts::select_no_results()).await;
            return Ok(());
        }

        let matched = session
            .results
            .iter()
            .find(|candidate| candidate.matches(&fragment))
            .cloned();

        match matched {
            Some(candidate) => {
                session.selected = Some(candidate.clone());
                self.sessions.put(ctx.group_id, session);
                self.post_system(ctx, &texts::selected(&candidate)).await;
            }
            None => {
                self.post_system(ctx, &texts::select_no_match(&fragment, &session.results))
                    .await;
            }
        }

        Ok(())
    }

    async fn cmd_when(&self, ctx: &CommandContext, args: &[&str]) -> Result<()> {
        let schedule = grammar::parse_schedule(args);
        let (date, time) = match (schedule.date, schedule.time) {
            (Some(date), Some(time)) => (date, time),
            _ => {
                self.post_system(ctx, &texts::when_usage()).await;
                return Ok(());
            }
        };

        let session = self.sessions.snapshot(ctx.group_id);
        let candidate = match session.selection() {
            Some(candidate) => candidate.clone(),
            None => {
                self.post_system(ctx, &texts::nothing_selected()).await;
                return Ok(());
            }
        };

        let draft = PollDraft::from_candidate(&candidate, date, time);
        let poll = self
            .services
            .poll_service
            .create_poll(ctx.group_id, ctx.user_id, &ctx.user_name, draft)
            .await?;

        self.services
            .message_service
            .post_user_message(
                ctx.group_id,
                ctx.user_id,
                &ctx.user_name,
                &texts::schedule_announcement(&candidate.title, date, time),
                Some(poll.id),
            )
            .await?;
        self.post_system(ctx, &texts::scheduled_confirmation(&candidate.title, date, time))
            .await;

        self.sessions.clear(ctx.group_id);
        Ok(())
    }

    async fn cmd_rsvp(&self, ctx: &CommandContext) -> Result<()> {
        let poll = match self
            .services
            .poll_service
            .get_active_poll(ctx.group_id)
            .await?
        {
            Some(poll) => poll,
            None => {
                self.post_system(ctx, &texts::no_active_poll()).await;
                return Ok(());
            }
        };

        let tally = self.services.vote_service.tally(poll.id).await?;
        self.post_system(ctx, &texts::rsvp_summary(&poll, &tally))
            .await;
        Ok(())
    }

    async fn cmd_lock(&self, ctx: &CommandContext) -> Result<()> {
        let poll = match self
            .services
            .poll_service
            .get_active_poll(ctx.group_id)
            .await?
        {
            Some(poll) => poll,
            None => {
                self.post_system(ctx, &texts::no_active_poll()).await;
                return Ok(());
            }
        };

        let tally = self.services.vote_service.tally(poll.id).await?;
        let joiners = self
            .services
            .vote_service
            .voters_with_choice(poll.id, Choice::Join)
            .await?;

        let poll = self.services.poll_service.finalize_poll(poll.id).await?;
        self.post_system(ctx, &texts::lock_summary(&poll, &tally))
            .await;

        let group = self.services.group_service.group(ctx.group_id).await?;
        let meta = NotificationMeta {
            group_id: Some(group.id),
            group_name: Some(group.name.clone()),
            poll_id: Some(poll.id),
            place: Some(poll.title.clone()),
            date: poll.metadata.date,
            time: poll.metadata.time,
            attendee_count: Some(tally.join),
        };
        let text = texts::lock_notification(
            &group.name,
            &poll.title,
            poll.metadata.date,
            poll.metadata.time,
            tally.join,
        );

        self.services
            .notification_service
            .notify_each(&joiners, &text, &meta, NotificationKind::PlanLocked)
            .await;

        Ok(())
    }

    /// Post a system message, swallowing persistence failures: the chat
    /// stream is the interpreter's only output channel, so there is nowhere
    /// left to report them.
    async fn post_system(&self, ctx: &CommandContext, body: &str) {
        if let Err(e) = self
            .services
            .message_service
            .post_system_message(ctx.group_id, body, None)
            .await
        {
            error!(
                group_id = %ctx.group_id,
                error = %e,
                "Failed to post system message"
            );
        }
    }
}
