//! # Verification Errors
//!
//! Rejection reasons and the lower-level errors that collapse into them.

use thiserror::Error;

/// Why a request was rejected.
///
/// Reasons are for internal diagnostics only. The HTTP layer answers every
/// rejection with the same bare 400 so a forger learns nothing from it.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    /// `SignatureCertChainUrl` or `Signature` header absent or blank
    #[error("Required signature header missing")]
    MissingHeader,

    /// Certificate chain URL is not an absolute URL
    #[error("Certificate chain URL is malformed")]
    MalformedUrl,

    /// Certificate chain URL is outside the pinned scheme/host/path/port
    #[error("Certificate chain URL violates the trusted origin policy")]
    UrlPolicyViolation,

    /// Certificate could not be downloaded or decoded
    #[error("Signing certificate could not be fetched")]
    FetchFailure,

    /// Current time is outside the certificate's validity window
    #[error("Signing certificate is expired or not yet valid")]
    CertificateExpiredOrNotYetValid,

    /// Certificate common name is not the expected signer identity
    #[error("Signing certificate subject does not match the expected signer")]
    CertificateWrongSubject,

    /// Certificate does not chain to a trusted root
    #[error("Signing certificate chain could not be built to a trusted root")]
    ChainBuildFailure,

    /// `Signature` header is not valid base64
    #[error("Signature header is not valid base64")]
    SignatureDecodeFailure,

    /// Signature does not verify over the request body
    #[error("Signature does not match the request body")]
    SignatureMismatch,

    /// Request timestamp is outside the freshness window
    #[error("Request timestamp is outside the allowed tolerance")]
    StaleTimestamp,

    /// Body empty, not JSON, or missing its timestamp
    #[error("Request body is empty or malformed")]
    EmptyOrMalformedBody,

    /// Claimed application id absent or not the configured one
    #[error("Application identifier does not match")]
    ApplicationIdentifierMismatch,
}

impl RejectionReason {
    /// Stable snake_case code used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingHeader => "missing_header",
            Self::MalformedUrl => "malformed_url",
            Self::UrlPolicyViolation => "url_policy_violation",
            Self::FetchFailure => "fetch_failure",
            Self::CertificateExpiredOrNotYetValid => "certificate_invalid_time",
            Self::CertificateWrongSubject => "certificate_wrong_subject",
            Self::ChainBuildFailure => "chain_build_failure",
            Self::SignatureDecodeFailure => "signature_decode_failure",
            Self::SignatureMismatch => "signature_mismatch",
            Self::StaleTimestamp => "stale_timestamp",
            Self::EmptyOrMalformedBody => "malformed_body",
            Self::ApplicationIdentifierMismatch => "application_id_mismatch",
        }
    }
}

/// Error from the certificate fetch port.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS or timeout failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-2xx status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// Response body exceeds the configured maximum
    #[error("Certificate response of {size} bytes exceeds limit {limit}")]
    TooLarge { size: usize, limit: usize },
}

impl From<FetchError> for RejectionReason {
    fn from(_: FetchError) -> Self {
        RejectionReason::FetchFailure
    }
}

/// Error decoding a fetched certificate bundle.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CertificateError {
    /// Response contained no certificate at all
    #[error("No certificate found in response")]
    Empty,

    /// PEM armour could not be decoded
    #[error("Invalid PEM encoding: {0}")]
    InvalidPem(String),

    /// DER structure is not an X.509 certificate
    #[error("Invalid certificate DER: {0}")]
    InvalidDer(String),
}

impl From<CertificateError> for RejectionReason {
    fn from(_: CertificateError) -> Self {
        RejectionReason::FetchFailure
    }
}
