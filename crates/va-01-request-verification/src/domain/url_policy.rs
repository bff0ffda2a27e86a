//! # Certificate URL Policy
//!
//! The certificate URL arrives in an attacker-controlled header, so it is
//! checked against the pinned origin before any network access.
//!
//! Accepted only when all hold:
//! - scheme is exactly `https` (as sent, not case-folded)
//! - host is exactly the pinned host (as sent, not case-folded)
//! - no userinfo
//! - port is absent or the https default
//! - normalised path starts with the pinned prefix

use super::entities::CertificateChainUrl;
use super::errors::RejectionReason;

/// Check a certificate-chain URL against the pinned host and path prefix.
pub fn verify_certificate_url(
    url: &CertificateChainUrl,
    trusted_host: &str,
    trusted_path_prefix: &str,
) -> Result<(), RejectionReason> {
    let parsed = url.url();

    if parsed.scheme() != "https" {
        return Err(RejectionReason::UrlPolicyViolation);
    }

    if !parsed.username().is_empty() || parsed.password().is_some() {
        return Err(RejectionReason::UrlPolicyViolation);
    }

    if parsed.host_str() != Some(trusted_host) {
        return Err(RejectionReason::UrlPolicyViolation);
    }

    // `Url` drops the scheme default, so any remaining port is non-standard.
    if parsed.port().is_some() {
        return Err(RejectionReason::UrlPolicyViolation);
    }

    if !parsed.path().starts_with(trusted_path_prefix) {
        return Err(RejectionReason::UrlPolicyViolation);
    }

    if !raw_origin_matches(url.as_raw(), trusted_host) {
        return Err(RejectionReason::UrlPolicyViolation);
    }

    Ok(())
}

/// `Url` lower-cases scheme and host; the header text itself must already
/// be canonical.
fn raw_origin_matches(raw: &str, trusted_host: &str) -> bool {
    let Some(rest) = raw.strip_prefix("https://") else {
        return false;
    };
    let Some(after_host) = rest.strip_prefix(trusted_host) else {
        return false;
    };
    matches!(after_host.chars().next(), Some('/') | Some(':'))
}
