//! Vote ledger
//!
//! One vote per (poll, voter): casting again overwrites the choice, which
//! makes rapid double-submits naturally idempotent.

use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::models::{Choice, Tally, Vote};
use crate::realtime::{ChangeEvent, EventBody, RealtimeChannel};
use crate::utils::errors::{PlanBuddyError, Result};

/// Vote ledger operations
#[derive(Clone)]
pub struct VoteService {
    store: Arc<dyn Store>,
    realtime: Arc<RealtimeChannel>,
}

impl VoteService {
    pub fn new(store: Arc<dyn Store>, realtime: Arc<RealtimeChannel>) -> Self {
        Self { store, realtime }
    }

    /// Cast or change a vote. The choice must be one of the three fixed
    /// literals (`join`, `maybe`, `no`).
    pub async fn cast_vote(&self, poll_id: Uuid, voter_id: Uuid, choice: &str) -> Result<Vote> {
        let choice = Choice::parse(choice).ok_or_else(|| {
            PlanBuddyError::InvalidInput(format!("invalid vote choice: {}", choice))
        })?;

        let poll = self.store.poll(poll_id).await?;
        let existing = self.store.vote_for(poll_id, voter_id).await?;
        let vote = self
            .store
            .upsert_vote(&Vote::new(poll_id, voter_id, choice))
            .await?;

        let event = match existing {
            Some(_) => ChangeEvent::updated(poll.group_id, EventBody::Vote(vote.clone())),
            None => ChangeEvent::created(poll.group_id, EventBody::Vote(vote.clone())),
        };
        self.realtime.publish(event);

        Ok(vote)
    }

    /// Per-choice counts over all votes for a poll
    pub async fn tally(&self, poll_id: Uuid) -> Result<Tally> {
        let votes = self.store.votes_for_poll(poll_id).await?;

        let mut tally = Tally::default();
        for vote in votes {
            tally.count(vote.choice);
        }
        Ok(tally)
    }

    /// All votes for a poll in a deterministic order
    pub async fn votes_of(&self, poll_id: Uuid) -> Result<Vec<Vote>> {
        self.store.votes_for_poll(poll_id).await
    }

    /// Voter ids that picked the given choice
    pub async fn voters_with_choice(&self, poll_id: Uuid, choice: Choice) -> Result<Vec<Uuid>> {
        let votes = self.store.votes_for_poll(poll_id).await?;
        Ok(votes
            .into_iter()
            .filter(|v| v.choice == choice)
            .map(|v| v.voter_id)
            .collect())
    }
}
