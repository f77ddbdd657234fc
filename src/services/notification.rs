//! Notification dispatcher
//!
//! Persists personal notifications for users when a plan is finalized.
//! Dispatch is best-effort, at most one attempt per recipient per lock
//! event: a failure for one recipient is logged and the loop continues.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::database::Store;
use crate::models::{Notification, NotificationKind, NotificationMeta};
use crate::utils::errors::Result;

/// Personal notification operations
#[derive(Clone)]
pub struct NotificationService {
    store: Arc<dyn Store>,
}

impl NotificationService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Persist one unread notification for a user
    pub async fn notify(
        &self,
        recipient_id: Uuid,
        text: &str,
        meta: NotificationMeta,
        kind: NotificationKind,
    ) -> Result<Notification> {
        let notification = Notification::new(recipient_id, text, meta, kind);
        self.store.create_notification(&notification).await?;

        debug!(recipient_id = %recipient_id, kind = kind.as_str(), "Notification persisted");
        Ok(notification)
    }

    /// Notify each recipient once, continuing past individual failures.
    /// Returns the number of notifications actually persisted.
    pub async fn notify_each(
        &self,
        recipients: &[Uuid],
        text: &str,
        meta: &NotificationMeta,
        kind: NotificationKind,
    ) -> usize {
        let mut delivered = 0;

        for &recipient_id in recipients {
            match self.notify(recipient_id, text, meta.clone(), kind).await {
                Ok(_) => delivered += 1,
                Err(e) => {
                    warn!(recipient_id = %recipient_id, error = %e, "Failed to persist notification");
                }
            }
        }

        delivered
    }

    pub async fn notifications_for(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        self.store.notifications_for_user(user_id).await
    }

    pub async fn mark_read(&self, notification_id: Uuid) -> Result<()> {
        self.store.set_notification_read(notification_id, true).await
    }

    pub async fn mark_all_read(&self, user_id: Uuid) -> Result<()> {
        let notifications = self.store.notifications_for_user(user_id).await?;
        for notification in notifications.iter().filter(|n| !n.read) {
            self.store.set_notification_read(notification.id, true).await?;
        }
        Ok(())
    }
}
