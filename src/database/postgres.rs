//! Postgres persistence gateway

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use tracing::warn;
use uuid::Uuid;

use crate::database::connection::DatabasePool;
use crate::database::store::Store;
use crate::models::{
    Choice, Group, LastMessage, Message, Metadata, Notification, NotificationKind,
    NotificationMeta, Poll, PollKind, Reaction, Vote,
};
use crate::utils::errors::{PlanBuddyError, Result};

/// `Store` implementation backed by a Postgres pool
#[derive(Clone)]
pub struct PgStore {
    pool: DatabasePool,
}

impl PgStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const GROUP_COLUMNS: &str =
    "id, name, member_ids, creator_id, invite_code, last_message, created_at";
const MESSAGE_COLUMNS: &str =
    "id, group_id, sender_id, sender_name, body, poll_id, is_system, reactions, created_at";
const POLL_COLUMNS: &str = "id, group_id, creator_id, creator_name, kind, provider_id, title, \
                            description, image_url, active, metadata, created_at";
const VOTE_COLUMNS: &str = "id, poll_id, voter_id, choice, created_at";
const NOTIFICATION_COLUMNS: &str = "id, recipient_id, text, meta, read, kind, created_at";

#[derive(sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    member_ids: Vec<Uuid>,
    creator_id: Uuid,
    invite_code: Option<String>,
    last_message: Option<Json<LastMessage>>,
    created_at: DateTime<Utc>,
}

impl From<GroupRow> for Group {
    fn from(row: GroupRow) -> Self {
        Group {
            id: row.id,
            name: row.name,
            member_ids: row.member_ids,
            creator_id: row.creator_id,
            invite_code: row.invite_code,
            last_message: row.last_message.map(|j| j.0),
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: Uuid,
    group_id: Uuid,
    sender_id: Option<Uuid>,
    sender_name: String,
    body: String,
    poll_id: Option<Uuid>,
    is_system: bool,
    reactions: Json<Vec<Reaction>>,
    created_at: DateTime<Utc>,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            group_id: row.group_id,
            sender_id: row.sender_id,
            sender_name: row.sender_name,
            body: row.body,
            poll_id: row.poll_id,
            is_system: row.is_system,
            reactions: row.reactions.0,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PollRow {
    id: Uuid,
    group_id: Uuid,
    creator_id: Uuid,
    creator_name: String,
    kind: String,
    provider_id: String,
    title: String,
    description: String,
    image_url: Option<String>,
    active: bool,
    metadata: Json<Metadata>,
    created_at: DateTime<Utc>,
}

fn poll_from_row(row: PollRow) -> Result<Poll> {
    let kind = PollKind::parse(&row.kind)
        .ok_or_else(|| PlanBuddyError::InvalidInput(format!("invalid poll kind: {}", row.kind)))?;

    Ok(Poll {
        id: row.id,
        group_id: row.group_id,
        creator_id: row.creator_id,
        creator_name: row.creator_name,
        kind,
        provider_id: row.provider_id,
        title: row.title,
        description: row.description,
        image_url: row.image_url,
        active: row.active,
        metadata: row.metadata.0,
        created_at: row.created_at,
    })
}

fn polls_from_rows(rows: Vec<PollRow>) -> Result<Vec<Poll>> {
    rows.into_iter().map(poll_from_row).collect()
}

#[derive(sqlx::FromRow)]
struct VoteRow {
    id: Uuid,
    poll_id: Uuid,
    voter_id: Uuid,
    choice: String,
    created_at: DateTime<Utc>,
}

impl VoteRow {
    /// Convert a stored row, returning `None` for unrecognized choice
    /// values so readers skip rather than crash on them.
    fn into_vote(self) -> Option<Vote> {
        match Choice::parse(&self.choice) {
            Some(choice) => Some(Vote {
                id: self.id,
                poll_id: self.poll_id,
                voter_id: self.voter_id,
                choice,
                created_at: self.created_at,
            }),
            None => {
                warn!(vote_id = %self.id, choice = %self.choice, "Skipping vote with unknown choice");
                None
            }
        }
    }
}

#[derive(sqlx::FromRow)]
struct NotificationRow {
    id: Uuid,
    recipient_id: Uuid,
    text: String,
    meta: Json<NotificationMeta>,
    read: bool,
    kind: String,
    created_at: DateTime<Utc>,
}

fn notification_from_row(row: NotificationRow) -> Result<Notification> {
    let kind = NotificationKind::parse(&row.kind).ok_or_else(|| {
        PlanBuddyError::InvalidInput(format!("invalid notification kind: {}", row.kind))
    })?;

    Ok(Notification {
        id: row.id,
        recipient_id: row.recipient_id,
        text: row.text,
        meta: row.meta.0,
        read: row.read,
        kind,
        created_at: row.created_at,
    })
}

#[async_trait]
impl Store for PgStore {
    async fn create_group(&self, group: &Group) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO groups (id, name, member_ids, creator_id, invite_code, last_message, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.member_ids)
        .bind(group.creator_id)
        .bind(&group.invite_code)
        .bind(group.last_message.as_ref().map(Json))
        .bind(group.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn group(&self, id: Uuid) -> Result<Group> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {} FROM groups WHERE id = $1",
            GROUP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Group::from)
            .ok_or(PlanBuddyError::GroupNotFound { group_id: id })
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE groups
            SET name = $2, member_ids = $3, invite_code = $4, last_message = $5
            WHERE id = $1
            "#,
        )
        .bind(group.id)
        .bind(&group.name)
        .bind(&group.member_ids)
        .bind(&group.invite_code)
        .bind(group.last_message.as_ref().map(Json))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(PlanBuddyError::GroupNotFound { group_id: group.id });
        }

        Ok(())
    }

    async fn delete_group(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM groups WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlanBuddyError::GroupNotFound { group_id: id });
        }

        Ok(())
    }

    async fn groups_for_member(&self, user_id: Uuid) -> Result<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {} FROM groups WHERE $1 = ANY(member_ids) ORDER BY created_at ASC",
            GROUP_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    async fn group_by_invite_code(&self, code: &str) -> Result<Option<Group>> {
        let row = sqlx::query_as::<_, GroupRow>(&format!(
            "SELECT {} FROM groups WHERE invite_code = $1",
            GROUP_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Group::from))
    }

    async fn create_message(&self, message: &Message) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, group_id, sender_id, sender_name, body, poll_id, is_system, reactions, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id)
        .bind(message.group_id)
        .bind(message.sender_id)
        .bind(&message.sender_name)
        .bind(&message.body)
        .bind(message.poll_id)
        .bind(message.is_system)
        .bind(Json(&message.reactions))
        .bind(message.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn message(&self, id: Uuid) -> Result<Message> {
        let row = sqlx::query_as::<_, MessageRow>(&format!(
            "SELECT {} FROM messages WHERE id = $1",
            MESSAGE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Message::from)
            .ok_or(PlanBuddyError::MessageNotFound { message_id: id })
    }

    async fn list_messages(&self, group_id: Uuid, limit: Option<i64>) -> Result<Vec<Message>> {
        let rows = match limit {
            Some(limit) => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    r#"
                    SELECT {} FROM (
                        SELECT {} FROM messages WHERE group_id = $1
                        ORDER BY created_at DESC, id DESC LIMIT $2
                    ) recent
                    ORDER BY created_at ASC, id ASC
                    "#,
                    MESSAGE_COLUMNS, MESSAGE_COLUMNS
                ))
                .bind(group_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MessageRow>(&format!(
                    "SELECT {} FROM messages WHERE group_id = $1 ORDER BY created_at ASC, id ASC",
                    MESSAGE_COLUMNS
                ))
                .bind(group_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.into_iter().map(Message::from).collect())
    }

    async fn set_reactions(&self, message_id: Uuid, reactions: &[Reaction]) -> Result<()> {
        let result = sqlx::query("UPDATE messages SET reactions = $2 WHERE id = $1")
            .bind(message_id)
            .bind(Json(reactions))
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlanBuddyError::MessageNotFound { message_id });
        }

        Ok(())
    }

    async fn insert_poll_active(&self, poll: &Poll) -> Result<Vec<Poll>> {
        let mut tx = self.pool.begin().await?;

        let displaced = sqlx::query_as::<_, PollRow>(&format!(
            "UPDATE polls SET active = FALSE WHERE group_id = $1 AND active = TRUE RETURNING {}",
            POLL_COLUMNS
        ))
        .bind(poll.group_id)
        .fetch_all(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO polls (id, group_id, creator_id, creator_name, kind, provider_id, title, description, image_url, active, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(poll.id)
        .bind(poll.group_id)
        .bind(poll.creator_id)
        .bind(&poll.creator_name)
        .bind(poll.kind.as_str())
        .bind(&poll.provider_id)
        .bind(&poll.title)
        .bind(&poll.description)
        .bind(&poll.image_url)
        .bind(poll.active)
        .bind(Json(&poll.metadata))
        .bind(poll.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        polls_from_rows(displaced)
    }

    async fn poll(&self, id: Uuid) -> Result<Poll> {
        let row = sqlx::query_as::<_, PollRow>(&format!(
            "SELECT {} FROM polls WHERE id = $1",
            POLL_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => poll_from_row(row),
            None => Err(PlanBuddyError::PollNotFound { poll_id: id }),
        }
    }

    async fn set_poll_active(&self, id: Uuid, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE polls SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlanBuddyError::PollNotFound { poll_id: id });
        }

        Ok(())
    }

    async fn activate_poll_exclusive(&self, group_id: Uuid, poll_id: Uuid) -> Result<Vec<Poll>> {
        let mut tx = self.pool.begin().await?;

        let displaced = sqlx::query_as::<_, PollRow>(&format!(
            "UPDATE polls SET active = FALSE WHERE group_id = $1 AND active = TRUE AND id <> $2 RETURNING {}",
            POLL_COLUMNS
        ))
        .bind(group_id)
        .bind(poll_id)
        .fetch_all(&mut *tx)
        .await?;

        let result = sqlx::query("UPDATE polls SET active = TRUE WHERE id = $1")
            .bind(poll_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlanBuddyError::PollNotFound { poll_id });
        }

        tx.commit().await?;

        polls_from_rows(displaced)
    }

    async fn deactivate_other_polls(&self, group_id: Uuid, keep_id: Uuid) -> Result<Vec<Poll>> {
        let rows = sqlx::query_as::<_, PollRow>(&format!(
            "UPDATE polls SET active = FALSE WHERE group_id = $1 AND active = TRUE AND id <> $2 RETURNING {}",
            POLL_COLUMNS
        ))
        .bind(group_id)
        .bind(keep_id)
        .fetch_all(&self.pool)
        .await?;

        polls_from_rows(rows)
    }

    async fn active_polls(&self, group_id: Uuid) -> Result<Vec<Poll>> {
        let rows = sqlx::query_as::<_, PollRow>(&format!(
            "SELECT {} FROM polls WHERE group_id = $1 AND active = TRUE ORDER BY created_at DESC",
            POLL_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        polls_from_rows(rows)
    }

    async fn polls_for_group(&self, group_id: Uuid) -> Result<Vec<Poll>> {
        let rows = sqlx::query_as::<_, PollRow>(&format!(
            "SELECT {} FROM polls WHERE group_id = $1 ORDER BY created_at DESC",
            POLL_COLUMNS
        ))
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        polls_from_rows(rows)
    }

    async fn delete_poll_with_votes(&self, id: Uuid) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        // Votes first, so a partial failure leaves a vote-less poll rather
        // than votes pointing at nothing.
        sqlx::query("DELETE FROM votes WHERE poll_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM polls WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(PlanBuddyError::PollNotFound { poll_id: id });
        }

        tx.commit().await?;

        Ok(())
    }

    async fn vote_for(&self, poll_id: Uuid, voter_id: Uuid) -> Result<Option<Vote>> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {} FROM votes WHERE poll_id = $1 AND voter_id = $2",
            VOTE_COLUMNS
        ))
        .bind(poll_id)
        .bind(voter_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.and_then(VoteRow::into_vote))
    }

    async fn upsert_vote(&self, vote: &Vote) -> Result<Vote> {
        let row = sqlx::query_as::<_, VoteRow>(&format!(
            r#"
            INSERT INTO votes (id, poll_id, voter_id, choice, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (poll_id, voter_id)
            DO UPDATE SET choice = EXCLUDED.choice
            RETURNING {}
            "#,
            VOTE_COLUMNS
        ))
        .bind(vote.id)
        .bind(vote.poll_id)
        .bind(vote.voter_id)
        .bind(vote.choice.as_str())
        .bind(vote.created_at)
        .fetch_one(&self.pool)
        .await?;

        row.into_vote().ok_or_else(|| {
            PlanBuddyError::InvalidInput("vote upsert returned unknown choice".to_string())
        })
    }

    async fn votes_for_poll(&self, poll_id: Uuid) -> Result<Vec<Vote>> {
        let rows = sqlx::query_as::<_, VoteRow>(&format!(
            "SELECT {} FROM votes WHERE poll_id = $1 ORDER BY created_at ASC, id ASC",
            VOTE_COLUMNS
        ))
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().filter_map(VoteRow::into_vote).collect())
    }

    async fn create_notification(&self, notification: &Notification) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (id, recipient_id, text, meta, read, kind, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(notification.id)
        .bind(notification.recipient_id)
        .bind(&notification.text)
        .bind(Json(&notification.meta))
        .bind(notification.read)
        .bind(notification.kind.as_str())
        .bind(notification.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn notifications_for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT {} FROM notifications WHERE recipient_id = $1 ORDER BY created_at DESC",
            NOTIFICATION_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(notification_from_row).collect()
    }

    async fn set_notification_read(&self, id: Uuid, read: bool) -> Result<()> {
        sqlx::query("UPDATE notifications SET read = $2 WHERE id = $1")
            .bind(id)
            .bind(read)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn movie_genres(&self, user_id: Uuid) -> Result<Vec<String>> {
        let row: Option<(Vec<String>,)> =
            sqlx::query_as("SELECT movie_genres FROM user_profiles WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(genres,)| genres).unwrap_or_default())
    }

    async fn set_movie_genres(&self, user_id: Uuid, genres: &[String]) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO user_profiles (user_id, movie_genres)
            VALUES ($1, $2)
            ON CONFLICT (user_id)
            DO UPDATE SET movie_genres = EXCLUDED.movie_genres
            "#,
        )
        .bind(user_id)
        .bind(genres)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
