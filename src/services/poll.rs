//! Poll lifecycle manager
//!
//! Enforces the single-active-poll-per-group invariant: creation and
//! activation displace every other active poll in the group within one
//! logically-atomic gateway step, and reads self-heal any violation left
//! behind by racing writers.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::Store;
use crate::models::{Poll, PollDraft};
use crate::realtime::{ChangeEvent, EventBody, RealtimeChannel};
use crate::utils::errors::{PlanBuddyError, Result};
use crate::utils::logging::{log_active_poll_anomaly, log_poll_transition};

/// Poll lifecycle operations
#[derive(Clone)]
pub struct PollService {
    store: Arc<dyn Store>,
    realtime: Arc<RealtimeChannel>,
}

impl PollService {
    pub fn new(store: Arc<dyn Store>, realtime: Arc<RealtimeChannel>) -> Self {
        Self { store, realtime }
    }

    /// Create a new poll as the group's sole active poll.
    ///
    /// Every previously-active poll in the group is deactivated in the same
    /// gateway step. Announcing the poll in chat is the caller's
    /// responsibility and should always be paired with this call.
    pub async fn create_poll(
        &self,
        group_id: Uuid,
        creator_id: Uuid,
        creator_name: &str,
        draft: PollDraft,
    ) -> Result<Poll> {
        if draft.title.trim().is_empty() {
            return Err(PlanBuddyError::InvalidInput(
                "poll title must not be empty".to_string(),
            ));
        }

        // Group existence check keeps orphan polls out of the gateway.
        self.store.group(group_id).await?;

        let poll = Poll {
            id: Uuid::new_v4(),
            group_id,
            creator_id,
            creator_name: creator_name.to_string(),
            kind: draft.kind,
            provider_id: draft.provider_id,
            title: draft.title,
            description: draft.description,
            image_url: draft.image_url,
            active: true,
            metadata: draft.metadata,
            created_at: Utc::now(),
        };

        let displaced = self.store.insert_poll_active(&poll).await?;
        self.publish_displaced(&displaced);
        self.realtime
            .publish(ChangeEvent::created(group_id, EventBody::Poll(poll.clone())));

        log_poll_transition(poll.id, group_id, "created");
        Ok(poll)
    }

    /// Re-activate a poll, displacing any other active poll in its group.
    ///
    /// Creator-only. Safe to call when the poll is already active: the poll
    /// stays active and siblings are still deactivated.
    pub async fn activate_poll(&self, poll_id: Uuid, requester_id: Uuid) -> Result<Poll> {
        let mut poll = self.store.poll(poll_id).await?;
        self.ensure_creator(&poll, requester_id, "activate")?;

        let displaced = self
            .store
            .activate_poll_exclusive(poll.group_id, poll_id)
            .await?;
        self.publish_displaced(&displaced);

        poll.active = true;
        self.realtime.publish(ChangeEvent::updated(
            poll.group_id,
            EventBody::Poll(poll.clone()),
        ));

        log_poll_transition(poll_id, poll.group_id, "activated");
        Ok(poll)
    }

    /// Deactivate a poll. Creator-only; siblings are untouched.
    pub async fn deactivate_poll(&self, poll_id: Uuid, requester_id: Uuid) -> Result<Poll> {
        let poll = self.store.poll(poll_id).await?;
        self.ensure_creator(&poll, requester_id, "deactivate")?;

        self.deactivate(poll).await
    }

    /// Deactivate a poll as part of the lock/finalize transition.
    ///
    /// Locking is a group action carried out by the assistant, so no
    /// creator check applies here.
    pub async fn finalize_poll(&self, poll_id: Uuid) -> Result<Poll> {
        let poll = self.store.poll(poll_id).await?;
        self.deactivate(poll).await
    }

    /// Delete a poll and all its votes. Creator-only.
    pub async fn delete_poll(&self, poll_id: Uuid, requester_id: Uuid) -> Result<()> {
        let poll = self.store.poll(poll_id).await?;
        self.ensure_creator(&poll, requester_id, "delete")?;

        self.store.delete_poll_with_votes(poll_id).await?;
        log_poll_transition(poll_id, poll.group_id, "deleted");
        Ok(())
    }

    /// The group's unique active poll, or `None`.
    ///
    /// If racing writers left multiple active polls behind, the most
    /// recently created one is authoritative: the rest are deactivated here
    /// and the anomaly is logged rather than surfaced as an error.
    pub async fn get_active_poll(&self, group_id: Uuid) -> Result<Option<Poll>> {
        let mut active = self.store.active_polls(group_id).await?;

        if active.is_empty() {
            return Ok(None);
        }

        if active.len() > 1 {
            log_active_poll_anomaly(group_id, active.len());
            let newest = active.remove(0);
            let displaced = self
                .store
                .deactivate_other_polls(group_id, newest.id)
                .await?;
            self.publish_displaced(&displaced);
            return Ok(Some(newest));
        }

        Ok(active.pop())
    }

    async fn deactivate(&self, mut poll: Poll) -> Result<Poll> {
        self.store.set_poll_active(poll.id, false).await?;
        poll.active = false;

        self.realtime.publish(ChangeEvent::updated(
            poll.group_id,
            EventBody::Poll(poll.clone()),
        ));

        log_poll_transition(poll.id, poll.group_id, "deactivated");
        Ok(poll)
    }

    fn ensure_creator(&self, poll: &Poll, requester_id: Uuid, action: &str) -> Result<()> {
        if poll.creator_id != requester_id {
            return Err(PlanBuddyError::PermissionDenied(format!(
                "only the poll creator can {} it",
                action
            )));
        }
        Ok(())
    }

    fn publish_displaced(&self, displaced: &[Poll]) {
        for poll in displaced {
            self.realtime.publish(ChangeEvent::updated(
                poll.group_id,
                EventBody::Poll(poll.clone()),
            ));
        }
    }
}
