//! Error handling for PlanBuddy
//!
//! This module defines the main error types used throughout the engine
//! and provides a unified error handling strategy.

use thiserror::Error;
use uuid::Uuid;

/// Main error type for the PlanBuddy engine
#[derive(Error, Debug)]
pub enum PlanBuddyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Lookup provider error: {0}")]
    Lookup(#[from] LookupError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Group not found: {group_id}")]
    GroupNotFound { group_id: Uuid },

    #[error("Poll not found: {poll_id}")]
    PollNotFound { poll_id: Uuid },

    #[error("Message not found: {message_id}")]
    MessageNotFound { message_id: Uuid },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: Uuid },

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Lookup provider specific errors
#[derive(Error, Debug)]
pub enum LookupError {
    #[error("Lookup request failed: {0}")]
    RequestFailed(String),

    #[error("Lookup request timed out")]
    Timeout,

    #[error("Invalid lookup response: {0}")]
    InvalidResponse(String),

    #[error("Lookup provider unavailable")]
    ServiceUnavailable,
}

/// Result type alias for PlanBuddy operations
pub type Result<T> = std::result::Result<T, PlanBuddyError>;

/// Result type alias for lookup operations
pub type LookupResult<T> = std::result::Result<T, LookupError>;

impl PlanBuddyError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlanBuddyError::Database(_) => false,
            PlanBuddyError::Migration(_) => false,
            PlanBuddyError::Lookup(_) => true,
            PlanBuddyError::Config(_) => false,
            PlanBuddyError::PermissionDenied(_) => false,
            PlanBuddyError::GroupNotFound { .. } => false,
            PlanBuddyError::PollNotFound { .. } => false,
            PlanBuddyError::MessageNotFound { .. } => false,
            PlanBuddyError::UserNotFound { .. } => false,
            PlanBuddyError::Http(_) => true,
            PlanBuddyError::Serialization(_) => false,
            PlanBuddyError::Io(_) => true,
            PlanBuddyError::InvalidInput(_) => false,
            PlanBuddyError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlanBuddyError::Database(_) => ErrorSeverity::Critical,
            PlanBuddyError::Migration(_) => ErrorSeverity::Critical,
            PlanBuddyError::Config(_) => ErrorSeverity::Critical,
            PlanBuddyError::PermissionDenied(_) => ErrorSeverity::Warning,
            PlanBuddyError::Lookup(_) => ErrorSeverity::Warning,
            PlanBuddyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
