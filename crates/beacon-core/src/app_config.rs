use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Runtime settings for the Beacon client, resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base for `/upload`, `/match` and relative image paths. Never ends in `/`.
    pub api_base_url: String,
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
    pub user_agent: String,
    pub location_timeout_secs: u64,
    pub image_concurrency: usize,
    pub default_location_label: String,
}

impl AppConfig {
    #[must_use]
    pub fn location_timeout(&self) -> Duration {
        Duration::from_secs(self.location_timeout_secs)
    }
}
