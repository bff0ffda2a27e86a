//! Test utilities for request verification.
//!
//! Deterministic stand-ins for the outbound ports plus a signing fixture that
//! issues real certificates at test time. Enable with the `test-utils` feature.

use crate::domain::certificate::ParsedCertificate;
use crate::domain::chain::TrustAnchorStore;
use crate::domain::entities::{InboundRequest, SIGNATURE_CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER};
use crate::domain::errors::FetchError;
use crate::ports::outbound::{CertificateFetcher, Clock};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use http::{HeaderMap, HeaderName, HeaderValue};
use rcgen::{
    date_time_ymd, BasicConstraints, CertificateParams, DistinguishedName, DnType, IsCa, KeyPair,
};
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::signature::{SignatureEncoding, Signer};
use rsa::RsaPrivateKey;
use sha1::Sha1;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use url::Url;

/// Application id used throughout the test suites.
pub const TEST_APPLICATION_ID: &str = "amzn1.ask.skill.00000000-test";

/// Canonical certificate URL that passes the default origin policy.
pub const TEST_CERT_URL: &str = "https://s3.amazonaws.com/echo.api/echo-api-cert.pem";

/// Signer identity the default configuration expects.
pub const TEST_SUBJECT: &str = "echo-api.amazon.com";

const ROOT_COMMON_NAME: &str = "Voice Assistant Test Root";

/// The instant every fixture is built around: 2026-10-19T10:00:00Z.
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_792_404_000, 0).unwrap_or_default()
}

// =============================================================================
// Clock
// =============================================================================

/// A clock that always returns the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        Self::new(fixed_now())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

// =============================================================================
// Certificate fetcher
// =============================================================================

/// Serves one canned response and counts calls. Clones share the counter.
#[derive(Debug, Clone)]
pub struct StaticCertificateFetcher {
    response: Result<Bytes, u16>,
    calls: Arc<AtomicUsize>,
}

impl StaticCertificateFetcher {
    /// Always answer with `body`.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self {
            response: Ok(body.into()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always answer with the given HTTP status.
    pub fn failing(status: u16) -> Self {
        Self {
            response: Err(status),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Number of fetches performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CertificateFetcher for StaticCertificateFetcher {
    async fn fetch(&self, _url: &Url) -> Result<Bytes, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            Ok(body) => Ok(body.clone()),
            Err(status) => Err(FetchError::Status(*status)),
        }
    }
}

// =============================================================================
// Signing fixture
// =============================================================================

/// A test CA (P-256) and an RSA leaf for `echo-api.amazon.com`, valid
/// 2020-01-01 to 2040-01-01.
#[derive(Debug, Clone)]
pub struct SigningFixture {
    root_key_pem: String,
    root_der: Vec<u8>,
    root_pem: String,
    leaf_der: Vec<u8>,
    leaf_pem: String,
    leaf_public_key_der: Vec<u8>,
}

/// RSA key generation is slow; every fixture shares one leaf key.
fn leaf_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).expect("generate RSA test key")
    })
}

fn root_params() -> CertificateParams {
    let mut params = CertificateParams::default();
    params.distinguished_name = DistinguishedName::new();
    params
        .distinguished_name
        .push(DnType::CommonName, ROOT_COMMON_NAME);
    params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    params.not_before = date_time_ymd(2020, 1, 1);
    params.not_after = date_time_ymd(2040, 1, 1);
    params
}

impl SigningFixture {
    /// Process-wide fixture, generated on first use.
    pub fn shared() -> &'static SigningFixture {
        static FIXTURE: OnceLock<SigningFixture> = OnceLock::new();
        FIXTURE.get_or_init(SigningFixture::generate)
    }

    /// A fresh CA (same name, new key) with its own `echo-api.amazon.com` leaf.
    pub fn generate() -> Self {
        let root_key = KeyPair::generate().expect("generate CA key");
        let root = root_params()
            .self_signed(&root_key)
            .expect("self-sign test root");

        let mut fixture = Self {
            root_key_pem: root_key.serialize_pem(),
            root_der: root.der().to_vec(),
            root_pem: root.pem(),
            leaf_der: Vec::new(),
            leaf_pem: String::new(),
            leaf_public_key_der: Vec::new(),
        };

        let (leaf_der, leaf_pem) = fixture.issue_leaf(TEST_SUBJECT, (2020, 1, 1), (2040, 1, 1));
        let parsed = ParsedCertificate::from_der(&leaf_der).expect("parse test leaf");
        fixture.leaf_public_key_der = parsed.public_key_der().to_vec();
        fixture.leaf_der = leaf_der;
        fixture.leaf_pem = leaf_pem;
        fixture
    }

    /// Issue another leaf for the shared RSA key under this fixture's CA.
    ///
    /// Dates are `(year, month, day)` at midnight UTC. Returns `(der, pem)`.
    pub fn issue_leaf(
        &self,
        common_name: &str,
        not_before: (i32, u8, u8),
        not_after: (i32, u8, u8),
    ) -> (Vec<u8>, String) {
        let root_key = KeyPair::from_pem(&self.root_key_pem).expect("reload CA key");
        // Same name and key as the stored root, so links verify against it.
        let issuer = root_params()
            .self_signed(&root_key)
            .expect("rebuild test root");

        let leaf_pkcs8 = leaf_key()
            .to_pkcs8_pem(LineEnding::LF)
            .expect("encode RSA test key");
        let leaf_key_pair = KeyPair::from_pem(&leaf_pkcs8).expect("load RSA test key");

        let mut params = CertificateParams::new(vec![common_name.to_string()])
            .expect("leaf certificate params");
        params.distinguished_name = DistinguishedName::new();
        params.distinguished_name.push(DnType::CommonName, common_name);
        params.not_before = date_time_ymd(not_before.0, not_before.1, not_before.2);
        params.not_after = date_time_ymd(not_after.0, not_after.1, not_after.2);

        let leaf = params
            .signed_by(&leaf_key_pair, &issuer, &root_key)
            .expect("sign test leaf");
        (leaf.der().to_vec(), leaf.pem())
    }

    pub fn root_der(&self) -> &[u8] {
        &self.root_der
    }

    pub fn root_pem(&self) -> &str {
        &self.root_pem
    }

    pub fn leaf_der(&self) -> &[u8] {
        &self.leaf_der
    }

    pub fn leaf_pem(&self) -> &str {
        &self.leaf_pem
    }

    /// Leaf followed by the root, as the platform serves it.
    pub fn chain_pem(&self) -> String {
        format!("{}{}", self.leaf_pem, self.root_pem)
    }

    pub fn leaf_public_key_der(&self) -> &[u8] {
        &self.leaf_public_key_der
    }

    /// Trust store holding only this fixture's root.
    pub fn trust_store(&self) -> TrustAnchorStore {
        TrustAnchorStore::from_roots([self.root_der.as_slice()]).expect("load test root")
    }

    /// Base64 RSA/SHA-1 signature over `body`.
    pub fn sign(&self, body: &[u8]) -> String {
        let signing_key = SigningKey::<Sha1>::new(leaf_key().clone());
        STANDARD.encode(signing_key.sign(body).to_bytes())
    }

    /// Headers a genuine platform request would carry.
    pub fn signed_headers(&self, body: &[u8], cert_url: &str) -> HeaderMap {
        let signature = self.sign(body);
        headers(&[
            (SIGNATURE_CERT_CHAIN_URL_HEADER, cert_url),
            (SIGNATURE_HEADER, signature.as_str()),
        ])
    }

    /// A captured request signed by the fixture leaf.
    pub fn signed_request(&self, body: &str) -> InboundRequest {
        let headers = self.signed_headers(body.as_bytes(), TEST_CERT_URL);
        InboundRequest::capture(&headers, Bytes::copy_from_slice(body.as_bytes()))
    }
}

/// Build a header map from name/value pairs (names are case-insensitive).
pub fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.insert(
            HeaderName::from_bytes(name.as_bytes()).expect("header name"),
            HeaderValue::from_str(value).expect("header value"),
        );
    }
    map
}

// =============================================================================
// Payloads
// =============================================================================

fn rfc3339(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// A `LaunchRequest` payload.
pub fn launch_request_body(application_id: &str, timestamp: DateTime<Utc>) -> String {
    serde_json::json!({
        "version": "1.0",
        "session": {
            "new": true,
            "sessionId": "amzn1.echo-api.session.test",
            "application": { "applicationId": application_id },
            "user": { "userId": "amzn1.ask.account.test" }
        },
        "request": {
            "type": "LaunchRequest",
            "requestId": "amzn1.echo-api.request.test",
            "timestamp": rfc3339(timestamp),
            "locale": "en-US"
        }
    })
    .to_string()
}

/// An `IntentRequest` payload for `intent_name`.
pub fn intent_request_body(
    application_id: &str,
    timestamp: DateTime<Utc>,
    intent_name: &str,
) -> String {
    serde_json::json!({
        "version": "1.0",
        "session": {
            "new": false,
            "sessionId": "amzn1.echo-api.session.test",
            "application": { "applicationId": application_id },
            "user": { "userId": "amzn1.ask.account.test" }
        },
        "request": {
            "type": "IntentRequest",
            "requestId": "amzn1.echo-api.request.test",
            "timestamp": rfc3339(timestamp),
            "locale": "en-US",
            "intent": { "name": intent_name, "confirmationStatus": "NONE" }
        }
    })
    .to_string()
}
