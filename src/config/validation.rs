//! Configuration validation module
//!
//! This module provides validation functions for engine configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{PlanBuddyError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_lookup_config(&settings.lookup)?;
    validate_ranking_config(settings)?;
    validate_planbot_config(&settings.planbot)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PlanBuddyError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(PlanBuddyError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(PlanBuddyError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

/// Validate lookup provider configuration
fn validate_lookup_config(config: &super::LookupConfig) -> Result<()> {
    if config.place_api_url.is_empty() {
        return Err(PlanBuddyError::Config(
            "Place lookup API URL is required".to_string()
        ));
    }

    if config.movie_api_url.is_empty() {
        return Err(PlanBuddyError::Config(
            "Movie lookup API URL is required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(PlanBuddyError::Config(
            "Lookup timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate ranking configuration against the feature flag
fn validate_ranking_config(settings: &Settings) -> Result<()> {
    if settings.features.llm_ranking && settings.ranking.api_url.is_none() {
        return Err(PlanBuddyError::Config(
            "Ranking API URL is required when llm_ranking is enabled".to_string()
        ));
    }

    if settings.ranking.timeout_seconds == 0 {
        return Err(PlanBuddyError::Config(
            "Ranking timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate PlanBot configuration
fn validate_planbot_config(config: &super::PlanbotConfig) -> Result<()> {
    if config.display_name.is_empty() {
        return Err(PlanBuddyError::Config(
            "PlanBot display name is required".to_string()
        ));
    }

    if config.max_results == 0 {
        return Err(PlanBuddyError::Config(
            "PlanBot max results must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PlanBuddyError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PlanBuddyError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
