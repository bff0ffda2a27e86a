//! # Request Verification Subsystem (VA-01)
//!
//! Decides whether an inbound webhook request really came from the voice
//! platform, was not replayed, and was not modified in transit.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure verification logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Adapters Layer** (`adapters/`): HTTP certificate fetcher
//! - **Service Layer** (`service.rs`): `SignatureVerifier` and `RequestAuthenticator`
//!
//! ## Verification Pipeline
//!
//! ```text
//! InboundRequest
//!   │ application id ─ headers ─ url syntax ─ body ─ timestamp freshness
//!   ▼
//! SignatureVerifier
//!   │ url policy ─ fetch ─ validity window ─ subject ─ chain ─ RSA/SHA-1
//!   ▼
//! VerificationOutcome::{Accepted, Rejected(reason)}
//! ```
//!
//! ## Security Notes
//!
//! - **SSRF Guard**: the certificate URL is checked against the pinned
//!   host/path before any network access; redirects are never followed
//! - **Replay Window**: requests older or newer than the configured tolerance
//!   (150 s by default) are rejected even when correctly signed
//! - **No Caching**: the signing certificate is fetched fresh for every request
//! - **Revocation**: not checked; `RevocationMode::NoCheck` is the only mode
//!   accepted by configuration validation

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Test utilities (FixedClock, StaticCertificateFetcher, SigningFixture)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export public API
pub use adapters::HttpCertificateFetcher;
pub use domain::certificate::{parse_certificate_bundle, SigningCertificate};
pub use domain::chain::{RevocationMode, TrustAnchorStore, TrustMode};
pub use domain::config::{ConfigError, VerificationConfig};
pub use domain::entities::{
    CertificateChainUrl, InboundRequest, VerificationOutcome, SIGNATURE_CERT_CHAIN_URL_HEADER,
    SIGNATURE_HEADER,
};
pub use domain::errors::{CertificateError, FetchError, RejectionReason};
pub use ports::inbound::RequestAuthenticationApi;
pub use ports::outbound::{CertificateFetcher, Clock, SystemClock};
pub use service::{RequestAuthenticator, SignatureVerifier};
