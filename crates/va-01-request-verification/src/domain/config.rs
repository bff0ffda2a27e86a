//! Verification configuration with validation.

use super::chain::{RevocationMode, TrustMode};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Pinned trust policy for request verification.
///
/// Read-only after startup and shared between requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Skill identifier every request must claim. Required.
    pub expected_application_id: String,
    /// Only host the signing certificate may be fetched from
    pub trusted_host: String,
    /// Path prefix the certificate URL must start with
    pub trusted_path_prefix: String,
    /// Common name of the signing certificate
    pub expected_subject: String,
    /// Maximum clock skew between request timestamp and now
    #[serde(with = "humantime_serde")]
    pub timestamp_tolerance: Duration,
    /// Timeout for the certificate download
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Duration,
    /// Largest certificate response accepted (bytes)
    pub max_certificate_bytes: usize,
    /// Where trust anchors come from
    pub trust_mode: TrustMode,
    /// PEM files holding the roots when `trust_mode = "custom_roots"`
    pub trusted_root_files: Vec<PathBuf>,
    /// Revocation policy (only `no_check` is supported)
    pub revocation_mode: RevocationMode,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            expected_application_id: String::new(),
            trusted_host: "s3.amazonaws.com".to_string(),
            trusted_path_prefix: "/echo.api/".to_string(),
            expected_subject: "echo-api.amazon.com".to_string(),
            timestamp_tolerance: Duration::from_secs(150),
            fetch_timeout: Duration::from_secs(5),
            max_certificate_bytes: 64 * 1024,
            trust_mode: TrustMode::System,
            trusted_root_files: Vec::new(),
            revocation_mode: RevocationMode::NoCheck,
        }
    }
}

impl VerificationConfig {
    /// Production defaults for the given skill.
    pub fn for_application(application_id: impl Into<String>) -> Self {
        Self {
            expected_application_id: application_id.into(),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.expected_application_id.trim().is_empty() {
            return Err(ConfigError::MissingApplicationId);
        }

        if self.trusted_host.trim().is_empty() {
            return Err(ConfigError::Invalid("trusted_host cannot be empty".into()));
        }

        if !self.trusted_path_prefix.starts_with('/') {
            return Err(ConfigError::Invalid(
                "trusted_path_prefix must start with '/'".into(),
            ));
        }

        if self.expected_subject.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "expected_subject cannot be empty".into(),
            ));
        }

        if self.timestamp_tolerance.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "timestamp_tolerance cannot be 0".into(),
            ));
        }

        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "fetch_timeout cannot be 0".into(),
            ));
        }

        if self.max_certificate_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_certificate_bytes cannot be 0".into(),
            ));
        }

        if self.trust_mode == TrustMode::CustomRoots && self.trusted_root_files.is_empty() {
            return Err(ConfigError::Invalid(
                "custom_roots trust mode requires at least one trusted root file".into(),
            ));
        }

        if self.revocation_mode != RevocationMode::NoCheck {
            return Err(ConfigError::UnsupportedRevocation(self.revocation_mode));
        }

        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// No expected application identifier configured
    #[error("expected_application_id is required")]
    MissingApplicationId,
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// Revocation mode other than `no_check`
    #[error("revocation mode {0:?} is not supported")]
    UnsupportedRevocation(RevocationMode),
    /// Trust anchors could not be loaded
    #[error("trust anchors: {0}")]
    TrustAnchors(String),
    /// General configuration error
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Durations as short strings: `"500ms"`, `"5s"`, `"2m"`, or a bare number of seconds.
pub mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let text = match duration.subsec_millis() {
            0 => format!("{}s", duration.as_secs()),
            _ => format!("{}ms", duration.as_millis()),
        };
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_duration(&text).map_err(serde::de::Error::custom)
    }

    pub fn parse_duration(text: &str) -> Result<Duration, String> {
        let text = text.trim();
        let split = text
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);

        let value: u64 = digits
            .parse()
            .map_err(|_| format!("duration {text:?} does not start with a number"))?;

        match unit.trim() {
            "ms" => Ok(Duration::from_millis(value)),
            "" | "s" => Ok(Duration::from_secs(value)),
            "m" => value
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| format!("duration {text:?} overflows")),
            other => Err(format!("unknown duration unit {other:?}")),
        }
    }
}
