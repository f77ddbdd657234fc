//! Group model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A planning group: an ordered set of members sharing a chat and polls.
///
/// Invariant: `creator_id` is always contained in `member_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub name: String,
    /// Member user ids in join order. The creator is always present.
    pub member_ids: Vec<Uuid>,
    pub creator_id: Uuid,
    pub invite_code: Option<String>,
    /// Cached snapshot of the latest chat message, for group-list previews.
    pub last_message: Option<LastMessage>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of the most recent message in a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastMessage {
    pub sender_name: String,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

impl Group {
    /// Create a new group with the creator as its sole member
    pub fn new(name: impl Into<String>, creator_id: Uuid, invite_code: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            member_ids: vec![creator_id],
            creator_id,
            invite_code,
            last_message: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }

    pub fn is_creator(&self, user_id: Uuid) -> bool {
        self.creator_id == user_id
    }
}
