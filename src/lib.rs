//! PlanBuddy coordination engine
//!
//! The engine behind a group-planning chat app: poll lifecycle with a
//! single-active-poll guarantee, an idempotent vote ledger, realtime fan-out
//! of mutations to connected group members, and the PlanBot command
//! interpreter that turns chat commands into plan-state transitions.
//! Transport and authentication are supplied by the embedding host.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod models;
pub mod planbot;
pub mod realtime;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{PlanBuddyError, Result};

// Re-export main components for easy access
pub use database::{MemStore, PgStore, Store};
pub use planbot::{CommandContext, CommandInterpreter, Handled};
pub use realtime::{ChangeEvent, RealtimeChannel};
pub use services::ServiceFactory;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
