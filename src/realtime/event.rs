//! Structured change events
//!
//! Every mutation of a group's messages, polls, votes or reactions is
//! mirrored to connected clients as one tagged event. Events serialize as
//! `{"kind": ..., "op": ..., "groupId": ..., "payload": ...}`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Message, Poll, Reaction, Vote};

/// Whether the event mirrors a record creation or an update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Create,
    Update,
}

/// The record kind an event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Message,
    Poll,
    Vote,
    Reaction,
}

/// Reaction-set change on a message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionChange {
    pub message_id: Uuid,
    pub reactions: Vec<Reaction>,
}

/// Typed event payload, tagged by record kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "lowercase")]
pub enum EventBody {
    Message(Message),
    Poll(Poll),
    Vote(Vote),
    Reaction(ReactionChange),
}

impl EventBody {
    pub fn kind(&self) -> EntityKind {
        match self {
            EventBody::Message(_) => EntityKind::Message,
            EventBody::Poll(_) => EntityKind::Poll,
            EventBody::Vote(_) => EntityKind::Vote,
            EventBody::Reaction(_) => EntityKind::Reaction,
        }
    }
}

/// A change event delivered to subscribers of a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    #[serde(rename = "groupId")]
    pub group_id: Uuid,
    pub op: ChangeOp,
    #[serde(flatten)]
    pub body: EventBody,
}

impl ChangeEvent {
    pub fn created(group_id: Uuid, body: EventBody) -> Self {
        Self {
            group_id,
            op: ChangeOp::Create,
            body,
        }
    }

    pub fn updated(group_id: Uuid, body: EventBody) -> Self {
        Self {
            group_id,
            op: ChangeOp::Update,
            body,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.body.kind()
    }
}
