use url::Url;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load client configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load client configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let api_base_url = parse_base_url(&or_default("BEACON_API_BASE_URL", "http://localhost:8000"))?;
    let env = parse_environment(&or_default("BEACON_ENV", "development"))?;
    let log_level = or_default("BEACON_LOG_LEVEL", "info");

    let request_timeout_secs = parse_u64("BEACON_REQUEST_TIMEOUT_SECS", "30")?;
    let connect_timeout_secs = parse_u64("BEACON_CONNECT_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("BEACON_USER_AGENT", "beacon/0.1 (lost-and-found)");
    let location_timeout_secs = parse_u64("BEACON_LOCATION_TIMEOUT_SECS", "10")?;

    let image_concurrency = parse_usize("BEACON_IMAGE_CONCURRENCY", "4")?;
    if image_concurrency == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "BEACON_IMAGE_CONCURRENCY".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }

    let default_location_label = or_default("BEACON_DEFAULT_LOCATION_LABEL", "Unknown");
    if default_location_label.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "BEACON_DEFAULT_LOCATION_LABEL".to_string(),
            reason: "must not be blank".to_string(),
        });
    }

    Ok(AppConfig {
        api_base_url,
        env,
        log_level,
        request_timeout_secs,
        connect_timeout_secs,
        user_agent,
        location_timeout_secs,
        image_concurrency,
        default_location_label,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "BEACON_ENV".to_string(),
            reason: format!("unknown environment '{other}'"),
        }),
    }
}

/// Accept only absolute `http`/`https` bases with a host, stripped of any
/// trailing slash so endpoint paths can be appended directly.
fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidEnvVar {
        var: "BEACON_API_BASE_URL".to_string(),
        reason: format!("{reason}: '{raw}'"),
    };

    let url = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("expected an http or https URL"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid("query and fragment are not allowed"));
    }

    Ok(url.as_str().trim_end_matches('/').to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
