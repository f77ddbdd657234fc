//! Data models module
//!
//! This module contains all data structures used throughout the engine.

pub mod candidate;
pub mod group;
pub mod message;
pub mod notification;
pub mod poll;
pub mod vote;

// Re-export commonly used models
pub use candidate::{Candidate, CandidateExtra};
pub use group::{Group, LastMessage};
pub use message::{Message, Reaction, SYSTEM_SENDER_NAME};
pub use notification::{Notification, NotificationKind, NotificationMeta};
pub use poll::{Choice, Metadata, Poll, PollDraft, PollKind};
pub use vote::{Tally, Vote};
