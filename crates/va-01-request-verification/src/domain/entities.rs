//! # Domain Entities
//!
//! Core data structures for request verification. Every value here lives for
//! exactly one verification call.

use super::errors::RejectionReason;
use bytes::Bytes;
use http::HeaderMap;
use serde::Deserialize;
use url::Url;

/// Header carrying the URL of the signer's certificate chain.
pub const SIGNATURE_CERT_CHAIN_URL_HEADER: &str = "SignatureCertChainUrl";

/// Header carrying the base64 detached signature over the raw body.
pub const SIGNATURE_HEADER: &str = "Signature";

// =============================================================================
// Inbound Request
// =============================================================================

/// An inbound webhook request, captured once.
///
/// The body is held as the exact bytes received on the wire. Nothing may
/// re-serialise it before verification: the signature covers these bytes.
#[derive(Clone, Debug)]
pub struct InboundRequest {
    body: Bytes,
    signature: Option<String>,
    cert_chain_url: Option<String>,
    application_id: Option<String>,
    timestamp: Option<String>,
}

impl InboundRequest {
    /// Capture a request from its headers and fully buffered body.
    ///
    /// The payload is parsed leniently: an unparseable body simply yields no
    /// application id and no timestamp, and the authenticator rejects it.
    pub fn capture(headers: &HeaderMap, body: Bytes) -> Self {
        let envelope = serde_json::from_slice::<SkillEnvelope>(&body).ok();
        let (application_id, timestamp) = match envelope {
            Some(envelope) => (envelope.application_id(), envelope.timestamp()),
            None => (None, None),
        };

        Self {
            signature: header_value(headers, SIGNATURE_HEADER),
            cert_chain_url: header_value(headers, SIGNATURE_CERT_CHAIN_URL_HEADER),
            body,
            application_id,
            timestamp,
        }
    }

    /// Raw body bytes exactly as transmitted.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Value of the `Signature` header, if present.
    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    /// Value of the `SignatureCertChainUrl` header, if present.
    pub fn cert_chain_url(&self) -> Option<&str> {
        self.cert_chain_url.as_deref()
    }

    /// Application id claimed by the payload.
    pub fn application_id(&self) -> Option<&str> {
        self.application_id.as_deref()
    }

    /// Unparsed `request.timestamp` from the payload.
    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref()
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// The handful of payload fields verification needs.
#[derive(Debug, Default, Deserialize)]
struct SkillEnvelope {
    #[serde(default)]
    session: Option<SessionSection>,
    #[serde(default)]
    context: Option<ContextSection>,
    #[serde(default)]
    request: Option<RequestSection>,
}

#[derive(Debug, Deserialize)]
struct SessionSection {
    application: Option<ApplicationSection>,
}

#[derive(Debug, Deserialize)]
struct ContextSection {
    #[serde(rename = "System")]
    system: Option<SessionSection>,
}

#[derive(Debug, Deserialize)]
struct ApplicationSection {
    #[serde(rename = "applicationId")]
    application_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RequestSection {
    timestamp: Option<String>,
}

impl SkillEnvelope {
    /// Session application id, falling back to `context.System` (sessionless requests).
    fn application_id(&self) -> Option<String> {
        let from = |section: Option<&SessionSection>| {
            section
                .and_then(|s| s.application.as_ref())
                .and_then(|a| a.application_id.clone())
        };
        from(self.session.as_ref())
            .or_else(|| from(self.context.as_ref().and_then(|c| c.system.as_ref())))
    }

    fn timestamp(&self) -> Option<String> {
        self.request.as_ref().and_then(|r| r.timestamp.clone())
    }
}

// =============================================================================
// Certificate Chain URL
// =============================================================================

/// An untrusted certificate-chain URL.
///
/// Keeps the raw header text next to the parsed form: `Url` lower-cases the
/// scheme and host, and the origin policy must see the original casing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CertificateChainUrl {
    raw: String,
    parsed: Url,
}

impl CertificateChainUrl {
    /// Parse an absolute URL.
    pub fn parse(raw: &str) -> Result<Self, RejectionReason> {
        let raw = raw.trim();
        let parsed = Url::parse(raw).map_err(|_| RejectionReason::MalformedUrl)?;
        if parsed.cannot_be_a_base() {
            return Err(RejectionReason::MalformedUrl);
        }
        Ok(Self {
            raw: raw.to_string(),
            parsed,
        })
    }

    /// Header text as received (trimmed).
    pub fn as_raw(&self) -> &str {
        &self.raw
    }

    /// Normalised URL.
    pub fn url(&self) -> &Url {
        &self.parsed
    }
}

// =============================================================================
// Verification Outcome
// =============================================================================

/// Final outcome of authenticating one request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Request is authentic and fresh
    Accepted,
    /// Request must not be processed
    Rejected(RejectionReason),
}

impl VerificationOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    /// Rejection reason, if any.
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            Self::Accepted => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}

impl From<Result<(), RejectionReason>> for VerificationOutcome {
    fn from(result: Result<(), RejectionReason>) -> Self {
        match result {
            Ok(()) => Self::Accepted,
            Err(reason) => Self::Rejected(reason),
        }
    }
}
