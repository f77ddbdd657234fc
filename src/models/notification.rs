//! Notification model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// Category tag for a personal notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    PlanLocked,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::PlanLocked => "plan_locked",
        }
    }

    pub fn parse(s: &str) -> Option<NotificationKind> {
        match s {
            "plan_locked" => Some(NotificationKind::PlanLocked),
            _ => None,
        }
    }
}

/// Structured plan details attached to a notification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationMeta {
    pub group_id: Option<Uuid>,
    pub group_name: Option<String>,
    pub poll_id: Option<Uuid>,
    pub place: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub attendee_count: Option<usize>,
}

/// A personal notification for a single user.
///
/// Created only by the plan lock/finalize transition; mutated only by
/// read-state toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub text: String,
    pub meta: NotificationMeta,
    pub read: bool,
    pub kind: NotificationKind,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        recipient_id: Uuid,
        text: impl Into<String>,
        meta: NotificationMeta,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient_id,
            text: text.into(),
            meta,
            read: false,
            kind,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_notification_is_unread() {
        let n = Notification::new(
            Uuid::new_v4(),
            "Plan locked",
            NotificationMeta::default(),
            NotificationKind::PlanLocked,
        );
        assert!(!n.read);
        assert_eq!(n.kind.as_str(), "plan_locked");
    }
}
