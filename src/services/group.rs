//! Group service
//!
//! Group lifecycle and membership: created by a user who becomes sole
//! member and creator, joined via invite code, deleted only by its creator.

use std::sync::Arc;

use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;
use uuid::Uuid;

use crate::database::Store;
use crate::models::Group;
use crate::utils::errors::{PlanBuddyError, Result};

const INVITE_CODE_LEN: usize = 8;

/// Group lifecycle operations
#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn Store>,
}

impl GroupService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create a group with the creator as its sole member
    pub async fn create_group(&self, creator_id: Uuid, name: &str) -> Result<Group> {
        if name.trim().is_empty() {
            return Err(PlanBuddyError::InvalidInput(
                "group name must not be empty".to_string(),
            ));
        }

        let group = Group::new(name.trim(), creator_id, Some(generate_invite_code()));
        self.store.create_group(&group).await?;

        info!(group_id = %group.id, creator_id = %creator_id, "Group created");
        Ok(group)
    }

    pub async fn group(&self, group_id: Uuid) -> Result<Group> {
        self.store.group(group_id).await
    }

    pub async fn groups_for_member(&self, user_id: Uuid) -> Result<Vec<Group>> {
        self.store.groups_for_member(user_id).await
    }

    /// Join a group through its invite code. Joining twice is a no-op.
    pub async fn join_by_invite(&self, code: &str, user_id: Uuid) -> Result<Group> {
        let mut group = self
            .store
            .group_by_invite_code(code)
            .await?
            .ok_or_else(|| {
                PlanBuddyError::InvalidInput(format!("unknown invite code: {}", code))
            })?;

        if group.is_member(user_id) {
            return Ok(group);
        }

        group.member_ids.push(user_id);
        self.store.update_group(&group).await?;
        Ok(group)
    }

    /// Add a member. Any existing member may add others.
    pub async fn add_member(
        &self,
        group_id: Uuid,
        requester_id: Uuid,
        new_member_id: Uuid,
    ) -> Result<Group> {
        let mut group = self.store.group(group_id).await?;

        if !group.is_member(requester_id) {
            return Err(PlanBuddyError::PermissionDenied(
                "only group members can add members".to_string(),
            ));
        }

        if !group.is_member(new_member_id) {
            group.member_ids.push(new_member_id);
            self.store.update_group(&group).await?;
        }

        Ok(group)
    }

    /// Remove a member: members may leave, the creator may remove anyone.
    /// The creator cannot be removed (delete the group instead).
    pub async fn remove_member(
        &self,
        group_id: Uuid,
        requester_id: Uuid,
        member_id: Uuid,
    ) -> Result<Group> {
        let mut group = self.store.group(group_id).await?;

        if group.is_creator(member_id) {
            return Err(PlanBuddyError::InvalidInput(
                "the group creator cannot be removed".to_string(),
            ));
        }

        if requester_id != member_id && !group.is_creator(requester_id) {
            return Err(PlanBuddyError::PermissionDenied(
                "only the creator can remove other members".to_string(),
            ));
        }

        group.member_ids.retain(|&id| id != member_id);
        self.store.update_group(&group).await?;
        Ok(group)
    }

    /// Delete a group. Creator-only.
    pub async fn delete_group(&self, group_id: Uuid, requester_id: Uuid) -> Result<()> {
        let group = self.store.group(group_id).await?;

        if !group.is_creator(requester_id) {
            return Err(PlanBuddyError::PermissionDenied(
                "only the group creator can delete it".to_string(),
            ));
        }

        self.store.delete_group(group_id).await?;
        info!(group_id = %group_id, "Group deleted");
        Ok(())
    }

    /// Replace the invite code. Creator-only.
    pub async fn regenerate_invite_code(
        &self,
        group_id: Uuid,
        requester_id: Uuid,
    ) -> Result<Group> {
        let mut group = self.store.group(group_id).await?;

        if !group.is_creator(requester_id) {
            return Err(PlanBuddyError::PermissionDenied(
                "only the group creator can regenerate the invite code".to_string(),
            ));
        }

        group.invite_code = Some(generate_invite_code());
        self.store.update_group(&group).await?;
        Ok(group)
    }
}

fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(char::from)
        .collect()
}
