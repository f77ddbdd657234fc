//! Message service
//!
//! Posts chat and system messages, keeps the group's last-message snapshot
//! current, toggles reactions (the one mutation messages allow) and mirrors
//! everything to the realtime channel.

use std::sync::Arc;

use uuid::Uuid;

use crate::database::Store;
use crate::models::{Group, LastMessage, Message, Reaction};
use crate::realtime::{ChangeEvent, EventBody, RealtimeChannel, ReactionChange};
use crate::utils::errors::{PlanBuddyError, Result};

/// Chat message operations
#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn Store>,
    realtime: Arc<RealtimeChannel>,
    bot_name: String,
}

impl MessageService {
    pub fn new(store: Arc<dyn Store>, realtime: Arc<RealtimeChannel>, bot_name: String) -> Self {
        Self {
            store,
            realtime,
            bot_name,
        }
    }

    /// Post an ordinary chat message from a group member
    pub async fn post_user_message(
        &self,
        group_id: Uuid,
        sender_id: Uuid,
        sender_name: &str,
        body: &str,
        poll_id: Option<Uuid>,
    ) -> Result<Message> {
        let group = self.store.group(group_id).await?;
        if !group.is_member(sender_id) {
            return Err(PlanBuddyError::PermissionDenied(
                "only group members can post messages".to_string(),
            ));
        }

        let message = Message::from_user(group_id, sender_id, sender_name, body, poll_id);
        self.persist_and_publish(group, message).await
    }

    /// Post a system message attributed to the assistant
    pub async fn post_system_message(
        &self,
        group_id: Uuid,
        body: &str,
        poll_id: Option<Uuid>,
    ) -> Result<Message> {
        let group = self.store.group(group_id).await?;

        let mut message = Message::system(group_id, body, poll_id);
        message.sender_name = self.bot_name.clone();
        self.persist_and_publish(group, message).await
    }

    /// Add the reaction if the user hasn't reacted with this emoji yet,
    /// remove it otherwise
    pub async fn toggle_reaction(
        &self,
        message_id: Uuid,
        user_id: Uuid,
        emoji: &str,
    ) -> Result<Message> {
        let mut message = self.store.message(message_id).await?;

        if message.has_reaction(user_id, emoji) {
            message
                .reactions
                .retain(|r| !(r.user_id == user_id && r.emoji == emoji));
        } else {
            message.reactions.push(Reaction {
                emoji: emoji.to_string(),
                user_id,
            });
        }

        self.store
            .set_reactions(message_id, &message.reactions)
            .await?;

        self.realtime.publish(ChangeEvent::updated(
            message.group_id,
            EventBody::Reaction(ReactionChange {
                message_id,
                reactions: message.reactions.clone(),
            }),
        ));

        Ok(message)
    }

    /// Messages of a group in creation order
    pub async fn messages(&self, group_id: Uuid, limit: Option<i64>) -> Result<Vec<Message>> {
        self.store.list_messages(group_id, limit).await
    }

    async fn persist_and_publish(&self, mut group: Group, message: Message) -> Result<Message> {
        self.store.create_message(&message).await?;

        group.last_message = Some(LastMessage {
            sender_name: message.sender_name.clone(),
            body: message.body.clone(),
            sent_at: message.created_at,
        });
        self.store.update_group(&group).await?;

        self.realtime.publish(ChangeEvent::created(
            message.group_id,
            EventBody::Message(message.clone()),
        ));

        Ok(message)
    }
}
