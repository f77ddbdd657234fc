//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main engine configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub lookup: LookupConfig,
    pub ranking: RankingConfig,
    pub planbot: PlanbotConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// External lookup provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LookupConfig {
    pub place_api_url: String,
    pub movie_api_url: String,
    pub timeout_seconds: u64,
}

/// Optional candidate re-ranking endpoint configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    pub api_url: Option<String>,
    pub timeout_seconds: u64,
}

/// PlanBot command interpreter configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlanbotConfig {
    /// Display name attached to system messages.
    pub display_name: String,
    /// Maximum number of search candidates kept per session.
    pub max_results: usize,
    /// Idle seconds after which a command session reads as empty.
    pub session_ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: String,
}

/// Feature flags configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub llm_ranking: bool,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::with_prefix("PLANBUDDY"))
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::PlanBuddyError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "postgresql://localhost/planbuddy".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            lookup: LookupConfig {
                place_api_url: "https://places.example.com/api".to_string(),
                movie_api_url: "https://movies.example.com/api".to_string(),
                timeout_seconds: 5,
            },
            ranking: RankingConfig {
                api_url: None,
                timeout_seconds: 5,
            },
            planbot: PlanbotConfig {
                display_name: "PlanBot".to_string(),
                max_results: 5,
                session_ttl_seconds: 1800,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: "/var/log/planbuddy".to_string(),
            },
            features: FeaturesConfig {
                llm_ranking: false,
            },
        }
    }
}
