//! Realtime fan-out module
//!
//! Mirrors every persisted mutation to connected group members through a
//! typed, per-group subscription channel.

pub mod channel;
pub mod event;

pub use channel::{RealtimeChannel, Subscription};
pub use event::{ChangeEvent, ChangeOp, EntityKind, EventBody, ReactionChange};
