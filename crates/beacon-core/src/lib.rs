//! Shared domain types and configuration for the Beacon lost-and-found client.

mod app_config;
mod config;
mod types;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{Coordinate, MatchResult, UploadMetadata, UploadOutcome};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
