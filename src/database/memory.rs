//! In-memory persistence gateway
//!
//! A `Store` implementation over plain maps, with the same semantics as the
//! Postgres gateway. Used by the test suite and by hosts that embed the
//! engine without a database.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::store::Store;
use crate::models::{Group, Message, Notification, Poll, Reaction, Vote};
use crate::utils::errors::{PlanBuddyError, Result};

#[derive(Default)]
struct Tables {
    groups: HashMap<Uuid, Group>,
    /// Insertion-ordered so creation order is preserved exactly.
    messages: Vec<Message>,
    polls: HashMap<Uuid, Poll>,
    votes: Vec<Vote>,
    notifications: Vec<Notification>,
    movie_genres: HashMap<Uuid, Vec<String>>,
}

/// `Store` implementation over in-memory tables
#[derive(Default)]
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_polls(mut polls: Vec<Poll>) -> Vec<Poll> {
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        polls
    }
}

#[async_trait]
impl Store for MemStore {
    async fn create_group(&self, group: &Group) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.groups.insert(group.id, group.clone());
        Ok(())
    }

    async fn group(&self, id: Uuid) -> Result<Group> {
        let tables = self.tables.read().await;
        tables
            .groups
            .get(&id)
            .cloned()
            .ok_or(PlanBuddyError::GroupNotFound { group_id: id })
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.groups.get_mut(&group.id) {
            Some(existing) => {
                *existing = group.clone();
                Ok(())
            }
            None => Err(PlanBuddyError::GroupNotFound { group_id: group.id }),
        }
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.groups.remove(&id).is_none() {
            return Err(PlanBuddyError::GroupNotFound { group_id: id });
        }

        // Mirror the Postgres cascade: messages, polls and their votes.
        tables.messages.retain(|m| m.group_id != id);
        let poll_ids: Vec<Uuid> = tables
            .polls
            .values()
            .filter(|p| p.group_id == id)
            .map(|p| p.id)
            .collect();
        tables.polls.retain(|_, p| p.group_id != id);
        tables.votes.retain(|v| !poll_ids.contains(&v.poll_id));

        Ok(())
    }

    async fn groups_for_member(&self, user_id: Uuid) -> Result<Vec<Group>> {
        let tables = self.tables.read().await;
        let mut groups: Vec<Group> = tables
            .groups
            .values()
            .filter(|g| g.member_ids.contains(&user_id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(groups)
    }

    async fn group_by_invite_code(&self, code: &str) -> Result<Option<Group>> {
        let tables = self.tables.read().await;
        Ok(tables
            .groups
            .values()
            .find(|g| g.invite_code.as_deref() == Some(code))
            .cloned())
    }

    async fn create_message(&self, message: &Message) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.messages.push(message.clone());
        Ok(())
    }

    async fn message(&self, id: Uuid) -> Result<Message> {
        let tables = self.tables.read().await;
        tables
            .messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(PlanBuddyError::MessageNotFound { message_id: id })
    }

    async fn list_messages(&self, group_id: Uuid, limit: Option<i64>) -> Result<Vec<Message>> {
        let tables = self.tables.read().await;
        let messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.group_id == group_id)
            .cloned()
            .collect();

        match limit {
            Some(limit) if (messages.len() as i64) > limit => {
                let skip = messages.len() - limit as usize;
                Ok(messages.into_iter().skip(skip).collect())
            }
            _ => Ok(messages),
        }
    }

    async fn set_reactions(&self, message_id: Uuid, reactions: &[Reaction]) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.messages.iter_mut().find(|m| m.id == message_id) {
            Some(message) => {
                message.reactions = reactions.to_vec();
                Ok(())
            }
            None => Err(PlanBuddyError::MessageNotFound { message_id }),
        }
    }

    async fn insert_poll_active(&self, poll: &Poll) -> Result<Vec<Poll>> {
        let mut tables = self.tables.write().await;

        let mut displaced = Vec::new();
        for existing in tables.polls.values_mut() {
            if existing.group_id == poll.group_id && existing.active {
                existing.active = false;
                displaced.push(existing.clone());
            }
        }

        tables.polls.insert(poll.id, poll.clone());
        Ok(displaced)
    }

    async fn poll(&self, id: Uuid) -> Result<Poll> {
        let tables = self.tables.read().await;
        tables
            .polls
            .get(&id)
            .cloned()
            .ok_or(PlanBuddyError::PollNotFound { poll_id: id })
    }

    async fn set_poll_active(&self, id: Uuid, active: bool) -> Result<()> {
        let mut tables = self.tables.write().await;
        match tables.polls.get_mut(&id) {
            Some(poll) => {
                poll.active = active;
                Ok(())
            }
            None => Err(PlanBuddyError::PollNotFound { poll_id: id }),
        }
    }

    async fn activate_poll_exclusive(&self, group_id: Uuid, poll_id: Uuid) -> Result<Vec<Poll>> {
        let mut tables = self.tables.write().await;

        if !tables.polls.contains_key(&poll_id) {
            return Err(PlanBuddyError::PollNotFound { poll_id });
        }

        let mut displaced = Vec::new();
        for existing in tables.polls.values_mut() {
            if existing.group_id == group_id && existing.active && existing.id != poll_id {
                existing.active = false;
                displaced.push(existing.clone());
            }
        }

        if let Some(poll) = tables.polls.get_mut(&poll_id) {
            poll.active = true;
        }

        Ok(displaced)
    }

    async fn deactivate_other_polls(&self, group_id: Uuid, keep_id: Uuid) -> Result<Vec<Poll>> {
        let mut tables = self.tables.write().await;

        let mut displaced = Vec::new();
        for existing in tables.polls.values_mut() {
            if existing.group_id == group_id && existing.active && existing.id != keep_id {
                existing.active = false;
                displaced.push(existing.clone());
            }
        }

        Ok(displaced)
    }

    async fn active_polls(&self, group_id: Uuid) -> Result<Vec<Poll>> {
        let tables = self.tables.read().await;
        let polls: Vec<Poll> = tables
            .polls
            .values()
            .filter(|p| p.group_id == group_id && p.active)
            .cloned()
            .collect();
        Ok(Self::sorted_polls(polls))
    }

    async fn polls_for_group(&self, group_id: Uuid) -> Result<Vec<Poll>> {
        let tables = self.tables.read().await;
        let polls: Vec<Poll> = tables
            .polls
            .values()
            .filter(|p| p.group_id == group_id)
            .cloned()
            .collect();
        Ok(Self::sorted_polls(polls))
    }

    async fn delete_poll_with_votes(&self, id: Uuid) -> Result<()> {
        let mut tables = self.tables.write().await;

        if !tables.polls.contains_key(&id) {
            return Err(PlanBuddyError::PollNotFound { poll_id: id });
        }

        tables.votes.retain(|v| v.poll_id != id);
        tables.polls.remove(&id);
        Ok(())
    }

    async fn vote_for(&self, poll_id: Uuid, voter_id: Uuid) -> Result<Option<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .find(|v| v.poll_id == poll_id && v.voter_id == voter_id)
            .cloned())
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<Vote> {
        let mut tables = self.tables.write().await;

        match tables
            .votes
            .iter_mut()
            .find(|v| v.poll_id == vote.poll_id && v.voter_id == vote.voter_id)
        {
            Some(existing) => {
                existing.choice = vote.choice;
                Ok(existing.clone())
            }
            None => {
                tables.votes.push(vote.clone());
                Ok(vote.clone())
            }
        }
    }

    async fn votes_for_poll(&self, poll_id: Uuid) -> Result<Vec<Vote>> {
        let tables = self.tables.read().await;
        Ok(tables
            .votes
            .iter()
            .filter(|v| v.poll_id == poll_id)
            .cloned()
            .collect())
    }

    async fn create_notification(&self, notification: &Notification) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.notifications.push(notification.clone());
        Ok(())
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .iter()
            .filter(|n| n.recipient_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }

    async fn set_notification_read(&self, id: Uuid, read: bool) -> Result<()> {
        let mut tables = self.tables.write().await;
        if let Some(notification) = tables.notifications.iter_mut().find(|n| n.id == id) {
            notification.read = read;
        }
        Ok(())
    }

    async fn movie_genres(&self, user_id: Uuid) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        Ok(tables.movie_genres.get(&user_id).cloned().unwrap_or_default())
    }

    async fn set_movie_genres(&self, user_id: Uuid, genres: &[String]) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.movie_genres.insert(user_id, genres.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Choice, Metadata, PollKind};
    use assert_matches::assert_matches;

    fn poll(group_id: Uuid, active: bool) -> Poll {
        Poll {
            id: Uuid::new_v4(),
            group_id,
            creator_id: Uuid::new_v4(),
            creator_name: "alice".to_string(),
            kind: PollKind::Place,
            provider_id: "p1".to_string(),
            title: "Cafe A".to_string(),
            description: String::new(),
            image_url: None,
            active,
            metadata: Metadata::empty(PollKind::Place),
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_upsert_vote_overwrites_choice() {
        let store = MemStore::new();
        let poll_id = Uuid::new_v4();
        let voter = Uuid::new_v4();

        store
            .upsert_vote(&Vote::new(poll_id, voter, Choice::Join))
            .await
            .unwrap();
        store
            .upsert_vote(&Vote::new(poll_id, voter, Choice::No))
            .await
            .unwrap();

        let votes = store.votes_for_poll(poll_id).await.unwrap();
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].choice, Choice::No);
    }

    #[tokio::test]
    async fn test_insert_poll_active_displaces_siblings() {
        let store = MemStore::new();
        let group_id = Uuid::new_v4();

        let first = poll(group_id, true);
        store.insert_poll_active(&first).await.unwrap();

        let second = poll(group_id, true);
        let displaced = store.insert_poll_active(&second).await.unwrap();

        assert_eq!(displaced.len(), 1);
        assert_eq!(displaced[0].id, first.id);
        assert!(!displaced[0].active);

        let active = store.active_polls(group_id).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, second.id);
    }

    #[tokio::test]
    async fn test_delete_poll_removes_votes() {
        let store = MemStore::new();
        let group_id = Uuid::new_v4();
        let p = poll(group_id, true);
        store.insert_poll_active(&p).await.unwrap();
        store
            .upsert_vote(&Vote::new(p.id, Uuid::new_v4(), Choice::Join))
            .await
            .unwrap();

        store.delete_poll_with_votes(p.id).await.unwrap();

        assert_matches!(
            store.poll(p.id).await,
            Err(PlanBuddyError::PollNotFound { .. })
        );
        assert!(store.votes_for_poll(p.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_messages_limit_keeps_most_recent() {
        let store = MemStore::new();
        let group_id = Uuid::new_v4();
        for i in 0..5 {
            let msg = Message::system(group_id, format!("m{}", i), None);
            store.create_message(&msg).await.unwrap();
        }

        let recent = store.list_messages(group_id, Some(2)).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].body, "m3");
        assert_eq!(recent[1].body, "m4");
    }
}
