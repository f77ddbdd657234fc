//! Configuration management module
//!
//! This module handles loading and validation of engine configuration
//! from TOML files and environment variables.

pub mod settings;
pub mod validation;

pub use settings::{
    DatabaseConfig, FeaturesConfig, LoggingConfig, LookupConfig, PlanbotConfig, RankingConfig,
    Settings,
};
