use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn parse_environment_development() {
    assert_eq!(
        parse_environment("development").unwrap(),
        Environment::Development
    );
}

#[test]
fn parse_environment_test() {
    assert_eq!(parse_environment("test").unwrap(), Environment::Test);
}

#[test]
fn parse_environment_production() {
    assert_eq!(
        parse_environment("production").unwrap(),
        Environment::Production
    );
}

#[test]
fn parse_environment_unknown_fails() {
    let err = parse_environment("staging").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidEnvVar { ref var, .. } if var == "BEACON_ENV"));
}

#[test]
fn build_app_config_uses_defaults_when_env_is_empty() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_app_config(lookup_from_map(&map));
    assert!(result.is_ok(), "expected Ok, got: {result:?}");
    let cfg = result.unwrap();
    assert_eq!(cfg.api_base_url, "http://localhost:8000");
    assert_eq!(cfg.env, Environment::Development);
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.connect_timeout_secs, 10);
    assert_eq!(cfg.user_agent, "beacon/0.1 (lost-and-found)");
    assert_eq!(cfg.location_timeout_secs, 10);
    assert_eq!(cfg.location_timeout(), std::time::Duration::from_secs(10));
    assert_eq!(cfg.image_concurrency, 4);
    assert_eq!(cfg.default_location_label, "Unknown");
}

#[test]
fn base_url_trailing_slash_is_stripped() {
    let mut map = HashMap::new();
    map.insert("BEACON_API_BASE_URL", "https://beacon.example.dev/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "https://beacon.example.dev");
}

#[test]
fn base_url_keeps_path_prefix() {
    let mut map = HashMap::new();
    map.insert("BEACON_API_BASE_URL", "https://beacon.example.dev/api/v1/");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "https://beacon.example.dev/api/v1");
}

#[test]
fn base_url_without_scheme_fails() {
    let mut map = HashMap::new();
    map.insert("BEACON_API_BASE_URL", "beacon.example.dev");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_API_BASE_URL"),
        "expected InvalidEnvVar(BEACON_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn base_url_without_host_fails() {
    let mut map = HashMap::new();
    map.insert("BEACON_API_BASE_URL", "https://");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_API_BASE_URL"),
        "expected InvalidEnvVar(BEACON_API_BASE_URL), got: {result:?}"
    );
}

fn assert_invalid_base_url(raw: &str) {
    let mut map = HashMap::new();
    map.insert("BEACON_API_BASE_URL", raw);
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_API_BASE_URL"),
        "expected InvalidEnvVar(BEACON_API_BASE_URL) for {raw:?}, got: {result:?}"
    );
}

#[test]
fn unparsable_base_url_fails() {
    assert_invalid_base_url("http://exa mple.com:notaport");
    assert_invalid_base_url("http://beacon.example.dev:99999");
}

#[test]
fn base_url_with_other_scheme_fails() {
    assert_invalid_base_url("ftp://beacon.example.dev");
}

#[test]
fn base_url_with_query_fails() {
    assert_invalid_base_url("https://beacon.example.dev/?token=abc");
}

#[test]
fn base_url_host_is_normalised() {
    let mut map = HashMap::new();
    map.insert("BEACON_API_BASE_URL", "  HTTPS://Beacon.Example.dev:8443/api/ ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "https://beacon.example.dev:8443/api");
}

#[test]
fn location_timeout_override() {
    let mut map = HashMap::new();
    map.insert("BEACON_LOCATION_TIMEOUT_SECS", "3");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.location_timeout_secs, 3);
}

#[test]
fn location_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("BEACON_LOCATION_TIMEOUT_SECS", "ten");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_LOCATION_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BEACON_LOCATION_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn request_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("BEACON_REQUEST_TIMEOUT_SECS", "-1");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(BEACON_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn user_agent_override() {
    let mut map = HashMap::new();
    map.insert("BEACON_USER_AGENT", "custom-agent/2.0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.user_agent, "custom-agent/2.0");
}

#[test]
fn image_concurrency_zero_fails() {
    let mut map = HashMap::new();
    map.insert("BEACON_IMAGE_CONCURRENCY", "0");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_IMAGE_CONCURRENCY"),
        "expected InvalidEnvVar(BEACON_IMAGE_CONCURRENCY), got: {result:?}"
    );
}

#[test]
fn blank_default_location_label_fails() {
    let mut map = HashMap::new();
    map.insert("BEACON_DEFAULT_LOCATION_LABEL", "   ");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "BEACON_DEFAULT_LOCATION_LABEL"),
        "expected InvalidEnvVar(BEACON_DEFAULT_LOCATION_LABEL), got: {result:?}"
    );
}
