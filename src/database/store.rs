//! Persistence gateway trait
//!
//! These methods define the storage interface consumed by every service,
//! allowing for different implementations (Postgres, in-memory, future
//! hosted backends). Equality and array-contains filters from the hosted
//! API surface become typed finder methods here.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Group, Message, Notification, Poll, Reaction, Vote};
use crate::utils::errors::Result;

/// Storage operations over the engine's record kinds.
///
/// Implementations must keep the multi-step operations
/// (`insert_poll_active`, `activate_poll_exclusive`, `delete_poll_with_votes`)
/// logically atomic: no interleaved reader may observe a second active poll
/// introduced by them, and a failed delete must not leave votes without a
/// poll.
#[async_trait]
pub trait Store: Send + Sync {
    // Groups

    async fn create_group(&self, group: &Group) -> Result<()>;

    /// Fetch a group by id, failing with `GroupNotFound`
    async fn group(&self, id: Uuid) -> Result<Group>;

    /// Replace the mutable fields of a group (name, members, invite code,
    /// last-message snapshot)
    async fn update_group(&self, group: &Group) -> Result<()>;

    async fn delete_group(&self, id: Uuid) -> Result<()>;

    /// All groups whose member set contains the user
    async fn groups_for_member(&self, user_id: Uuid) -> Result<Vec<Group>>;

    async fn group_by_invite_code(&self, code: &str) -> Result<Option<Group>>;

    // Messages

    async fn create_message(&self, message: &Message) -> Result<()>;

    async fn message(&self, id: Uuid) -> Result<Message>;

    /// Messages of a group in creation order. With a limit, the most recent
    /// `limit` messages are returned, still oldest-first.
    async fn list_messages(&self, group_id: Uuid, limit: Option<i64>) -> Result<Vec<Message>>;

    /// Replace the reaction set of a message (its only mutable field)
    async fn set_reactions(&self, message_id: Uuid, reactions: &[Reaction]) -> Result<()>;

    // Polls

    /// Atomically deactivate every active poll in the new poll's group and
    /// insert the poll as active. Returns the displaced polls.
    async fn insert_poll_active(&self, poll: &Poll) -> Result<Vec<Poll>>;

    async fn poll(&self, id: Uuid) -> Result<Poll>;

    async fn set_poll_active(&self, id: Uuid, active: bool) -> Result<()>;

    /// Atomically deactivate every other active poll in the group and mark
    /// the given poll active. Returns the displaced polls.
    async fn activate_poll_exclusive(&self, group_id: Uuid, poll_id: Uuid) -> Result<Vec<Poll>>;

    /// Deactivate all active polls in the group except `keep_id`, returning
    /// the deactivated polls. Used by the self-healing active-poll read.
    async fn deactivate_other_polls(&self, group_id: Uuid, keep_id: Uuid) -> Result<Vec<Poll>>;

    async fn active_polls(&self, group_id: Uuid) -> Result<Vec<Poll>>;

    async fn polls_for_group(&self, group_id: Uuid) -> Result<Vec<Poll>>;

    /// Delete a poll and its votes, votes first
    async fn delete_poll_with_votes(&self, id: Uuid) -> Result<()>;

    // Votes

    async fn vote_for(&self, poll_id: Uuid, voter_id: Uuid) -> Result<Option<Vote>>;

    /// Insert the vote, or overwrite the choice of the existing vote by the
    /// same voter on the same poll. Returns the resulting vote.
    async fn upsert_vote(&self, vote: &Vote) -> Result<Vote>;

    async fn votes_for_poll(&self, poll_id: Uuid) -> Result<Vec<Vote>>;

    // Notifications

    async fn create_notification(&self, notification: &Notification) -> Result<()>;

    async fn notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;

    async fn set_notification_read(&self, id: Uuid, read: bool) -> Result<()>;

    // User profile data consumed by movie discovery

    async fn movie_genres(&self, user_id: Uuid) -> Result<Vec<String>>;

    async fn set_movie_genres(&self, user_id: Uuid, genres: &[String]) -> Result<()>;
}
