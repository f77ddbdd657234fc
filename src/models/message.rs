//! Message model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Display name used for messages emitted by the assistant itself
pub const SYSTEM_SENDER_NAME: &str = "PlanBot";

/// A chat message within a group.
///
/// Messages are immutable after creation except for reaction membership.
/// Creation-time ordering within a group is monotonic and preserved by
/// every reader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub group_id: Uuid,
    /// `None` marks the reserved PlanBot system sender.
    pub sender_id: Option<Uuid>,
    pub sender_name: String,
    pub body: String,
    /// Poll attached to this message, if it announces one.
    pub poll_id: Option<Uuid>,
    pub is_system: bool,
    pub reactions: Vec<Reaction>,
    pub created_at: DateTime<Utc>,
}

/// A single emoji reaction by a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub user_id: Uuid,
}

impl Message {
    /// Create an ordinary chat message from a group member
    pub fn from_user(
        group_id: Uuid,
        sender_id: Uuid,
        sender_name: impl Into<String>,
        body: impl Into<String>,
        poll_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            sender_id: Some(sender_id),
            sender_name: sender_name.into(),
            body: body.into(),
            poll_id,
            is_system: false,
            reactions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Create a system message attributed to the assistant
    pub fn system(group_id: Uuid, body: impl Into<String>, poll_id: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            group_id,
            sender_id: None,
            sender_name: SYSTEM_SENDER_NAME.to_string(),
            body: body.into(),
            poll_id,
            is_system: true,
            reactions: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Check whether a user has already reacted with the given emoji
    pub fn has_reaction(&self, user_id: Uuid, emoji: &str) -> bool {
        self.reactions
            .iter()
            .any(|r| r.user_id == user_id && r.emoji == emoji)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_message_sender() {
        let msg = Message::system(Uuid::new_v4(), "plan locked", None);
        assert!(msg.is_system);
        assert!(msg.sender_id.is_none());
        assert_eq!(msg.sender_name, SYSTEM_SENDER_NAME);
    }

    #[test]
    fn test_has_reaction() {
        let user = Uuid::new_v4();
        let mut msg = Message::from_user(Uuid::new_v4(), user, "alice", "hi", None);
        assert!(!msg.has_reaction(user, "👍"));
        msg.reactions.push(Reaction { emoji: "👍".to_string(), user_id: user });
        assert!(msg.has_reaction(user, "👍"));
        assert!(!msg.has_reaction(user, "🎉"));
    }
}
