//! Configuration loading: optional TOML file, then environment overrides.

use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};
use va_02_assistant_gateway::GatewayConfig;

/// Expected skill application identifier.
pub const ENV_SKILL_ID: &str = "VA_SKILL_ID";
/// Blog feed URL.
pub const ENV_FEED_URL: &str = "VA_FEED_URL";
/// HTTP bind address.
pub const ENV_HTTP_HOST: &str = "VA_HTTP_HOST";
/// HTTP port.
pub const ENV_HTTP_PORT: &str = "VA_HTTP_PORT";
/// Timestamp tolerance in whole seconds.
pub const ENV_TIMESTAMP_TOLERANCE_SECS: &str = "VA_TIMESTAMP_TOLERANCE_SECS";

/// Load configuration from an optional file and the process environment.
pub fn load_config(path: Option<&Path>) -> Result<GatewayConfig> {
    let config = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            let config = parse_config(&text)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?;
            info!(path = %path.display(), "Loaded configuration file");
            config
        }
        None => GatewayConfig::default(),
    };

    Ok(apply_overrides(config, |key| std::env::var(key).ok()))
}

/// Parse a TOML document; absent sections keep their defaults.
pub fn parse_config(text: &str) -> Result<GatewayConfig> {
    Ok(toml::from_str(text)?)
}

/// Apply environment overrides. Unparseable values are logged and ignored.
pub fn apply_overrides<F>(mut config: GatewayConfig, lookup: F) -> GatewayConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(id) = lookup(ENV_SKILL_ID) {
        config.verification.expected_application_id = id;
    }

    if let Some(url) = lookup(ENV_FEED_URL) {
        config.feed.url = url;
    }

    if let Some(host) = lookup(ENV_HTTP_HOST) {
        match host.parse() {
            Ok(host) => config.http.host = host,
            Err(_) => warn!(value = %host, "{ENV_HTTP_HOST} is not an IP address"),
        }
    }

    if let Some(port) = lookup(ENV_HTTP_PORT) {
        match port.parse() {
            Ok(port) => config.http.port = port,
            Err(_) => warn!(value = %port, "{ENV_HTTP_PORT} is not a port number"),
        }
    }

    if let Some(secs) = lookup(ENV_TIMESTAMP_TOLERANCE_SECS) {
        match secs.parse() {
            Ok(secs) => config.verification.timestamp_tolerance = Duration::from_secs(secs),
            Err(_) => warn!(value = %secs, "{ENV_TIMESTAMP_TOLERANCE_SECS} is not a whole number"),
        }
    }

    config
}
