//! Gateway settings: listener, limits, optional routes, feed and the
//! embedded verification policy.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;
use va_01_request_verification::domain::config::humantime_serde;
use va_01_request_verification::VerificationConfig;

/// Everything the gateway needs to start.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener address
    pub http: HttpConfig,
    /// Request limits
    pub limits: LimitsConfig,
    /// Deadlines
    pub timeouts: TimeoutConfig,
    /// Optional routes
    pub routes: RoutesConfig,
    /// Blog feed read out by the feed intent
    pub feed: FeedConfig,
    /// Request authenticity policy
    pub verification: VerificationConfig,
}

impl GatewayConfig {
    /// Reject settings the gateway cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.verification.validate()?;

        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "limits.max_request_size must be positive".into(),
            ));
        }

        if self.timeouts.request.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "timeouts.request must be positive".into(),
            ));
        }

        if self.feed.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "feed.timeout must be positive".into(),
            ));
        }

        if self.feed.post_count == 0 {
            return Err(ConfigError::InvalidLimit("feed.post_count must be positive".into()));
        }

        if !(self.feed.url.starts_with("https://") || self.feed.url.starts_with("http://")) {
            return Err(ConfigError::Invalid(format!(
                "feed url must be http(s): {}",
                self.feed.url
            )));
        }

        Ok(())
    }

    /// Socket address to bind.
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// Listener address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Interface to bind (default: all)
    pub host: IpAddr,
    /// Port (default: 5000)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
        }
    }
}

/// Request limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest accepted webhook body in bytes (default: 1 MiB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 1024 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Whole-request deadline, verification included
    #[serde(with = "humantime_serde")]
    pub request: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            request: Duration::from_secs(10),
        }
    }
}

/// Optional routes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Mount `/api/assistant/alexa/unsigned`, which skips verification.
    /// Local testing only.
    pub expose_unsigned_endpoint: bool,
}

/// Blog feed configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Atom feed URL
    pub url: String,
    /// Number of titles read out
    pub post_count: usize,
    /// Feed download timeout
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            url: "https://alexdunn.org/feed/atom/".to_string(),
            post_count: 4,
            timeout: Duration::from_secs(5),
        }
    }
}

/// Why a gateway configuration was refused
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Invalid verification policy
    #[error(transparent)]
    Verification(#[from] va_01_request_verification::ConfigError),
    /// A size or count is zero
    #[error("limit out of range: {0}")]
    InvalidLimit(String),
    /// A deadline is zero
    #[error("timeout out of range: {0}")]
    InvalidTimeout(String),
    /// Any other unusable value
    #[error("gateway configuration rejected: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> GatewayConfig {
        GatewayConfig {
            verification: VerificationConfig::for_application("amzn1.ask.skill.1"),
            ..GatewayConfig::default()
        }
    }

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.http_addr().port(), 5000);
        assert_eq!(config.limits.max_request_size, 1024 * 1024);
        assert_eq!(config.feed.post_count, 4);
        assert!(!config.routes.expose_unsigned_endpoint);
    }

    #[test]
    fn test_default_requires_application_id() {
        assert!(matches!(
            GatewayConfig::default().validate(),
            Err(ConfigError::Verification(_))
        ));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn test_zero_limits_rejected() {
        let mut config = valid();
        config.limits.max_request_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));

        let mut config = valid();
        config.feed.post_count = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidLimit(_))));
    }

    #[test]
    fn test_feed_url_scheme() {
        let mut config = valid();
        config.feed.url = "ftp://alexdunn.org/feed".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_nested_sections_deserialize() {
        let config: GatewayConfig = serde_json::from_str(
            r#"{
                "http": {"port": 8080},
                "timeouts": {"request": "2500ms"},
                "routes": {"expose_unsigned_endpoint": true},
                "verification": {"expected_application_id": "amzn1.ask.skill.2"}
            }"#,
        )
        .unwrap();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.timeouts.request, Duration::from_millis(2500));
        assert!(config.routes.expose_unsigned_endpoint);
        assert_eq!(config.verification.trusted_host, "s3.amazonaws.com");
        assert!(config.validate().is_ok());
    }
}
