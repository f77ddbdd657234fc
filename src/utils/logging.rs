//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging
//! utilities for the PlanBuddy engine.

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "planbuddy.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(())
}

/// Log handled PlanBot commands with structured data
pub fn log_command(group_id: uuid::Uuid, user_id: uuid::Uuid, command: &str) {
    info!(
        group_id = %group_id,
        user_id = %user_id,
        command = command,
        "PlanBot command handled"
    );
}

/// Log poll lifecycle transitions
pub fn log_poll_transition(poll_id: uuid::Uuid, group_id: uuid::Uuid, action: &str) {
    info!(
        poll_id = %poll_id,
        group_id = %group_id,
        action = action,
        "Poll lifecycle transition"
    );
}

/// Log a violated single-active-poll invariant before self-healing
pub fn log_active_poll_anomaly(group_id: uuid::Uuid, active_count: usize) {
    warn!(
        group_id = %group_id,
        active_count = active_count,
        "Multiple active polls found in group, keeping most recent"
    );
}
