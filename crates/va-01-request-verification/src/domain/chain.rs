//! # Chain Building
//!
//! Walks leaf → intermediates → trust anchor, verifying each link's
//! signature with the issuer's public key. Issuers supplied with the bundle
//! are tried before anchors. Every issuer must be a CA allowed to sign
//! certificates and must be inside its validity window. Revocation is not
//! checked.

use super::certificate::{ParsedCertificate, SigningCertificate};
use super::config::{ConfigError, VerificationConfig};
use super::errors::RejectionReason;
use chrono::{DateTime, Utc};
use p256::elliptic_curve::sec1::ToEncodedPoint as _;
use rsa::pkcs1v15;
use rsa::pkcs8::DecodePublicKey as _;
use rsa::signature::Verifier as _;
use rsa::RsaPublicKey;
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::digest::const_oid::AssociatedOid;
use sha2::{Digest, Sha256, Sha384, Sha512};
use std::path::Path;
use tracing::{debug, warn};
use x509_parser::pem::Pem;

const MAX_DEPTH: usize = 16;

/// Where trust anchors come from.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrustMode {
    /// Operating system root store
    System,
    /// Explicitly configured roots
    CustomRoots,
}

/// Revocation checking policy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationMode {
    /// Do not perform revocation checks
    NoCheck,
    /// Online revocation checks (unsupported)
    Online,
    /// Offline revocation checks (unsupported)
    Offline,
}

/// Immutable set of trust anchors, loaded once at startup.
#[derive(Debug, Clone)]
pub struct TrustAnchorStore {
    mode: TrustMode,
    anchors: Vec<ParsedCertificate>,
}

impl TrustAnchorStore {
    /// Load the operating system roots. Unparseable entries are skipped.
    pub fn system() -> Result<Self, ConfigError> {
        let loaded = rustls_native_certs::load_native_certs();
        for err in &loaded.errors {
            warn!(error = %err, "Failed to load part of the system trust store");
        }

        let anchors: Vec<_> = loaded
            .certs
            .iter()
            .filter(|der| !der.as_ref().is_empty())
            .filter_map(|der| ParsedCertificate::from_der(der.as_ref()).ok())
            .collect();

        if anchors.is_empty() {
            return Err(ConfigError::TrustAnchors(
                "system trust store is empty".into(),
            ));
        }

        debug!(count = anchors.len(), "Loaded system trust anchors");
        Ok(Self {
            mode: TrustMode::System,
            anchors,
        })
    }

    /// Use exactly the given DER roots.
    pub fn from_roots<I, B>(roots: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let anchors = roots
            .into_iter()
            .map(|der| ParsedCertificate::from_der(der.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ConfigError::TrustAnchors(e.to_string()))?;

        if anchors.is_empty() {
            return Err(ConfigError::TrustAnchors(
                "custom_roots trust mode requires at least one trusted root".into(),
            ));
        }

        Ok(Self {
            mode: TrustMode::CustomRoots,
            anchors,
        })
    }

    /// Read every `CERTIFICATE` block from the given PEM files.
    pub fn from_pem_files<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ConfigError> {
        let mut roots = Vec::new();
        for path in paths {
            let path = path.as_ref();
            let bytes = std::fs::read(path).map_err(|e| {
                ConfigError::TrustAnchors(format!("{}: {e}", path.display()))
            })?;
            for pem in Pem::iter_from_buffer(&bytes) {
                let pem = pem.map_err(|e| {
                    ConfigError::TrustAnchors(format!("{}: {e}", path.display()))
                })?;
                if pem.label == "CERTIFICATE" {
                    roots.push(pem.contents);
                }
            }
        }
        Self::from_roots(roots)
    }

    /// Load the anchors selected by `config.trust_mode`.
    pub fn from_config(config: &VerificationConfig) -> Result<Self, ConfigError> {
        match config.trust_mode {
            TrustMode::System => Self::system(),
            TrustMode::CustomRoots => Self::from_pem_files(&config.trusted_root_files),
        }
    }

    pub fn mode(&self) -> TrustMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }

    fn contains(&self, cert: &ParsedCertificate) -> bool {
        self.anchors.iter().any(|a| a.der == cert.der)
    }

    /// Build a chain from the signing certificate to one of the anchors,
    /// as of `now`.
    pub fn build_chain(
        &self,
        signing: &SigningCertificate,
        now: DateTime<Utc>,
    ) -> Result<(), RejectionReason> {
        let leaf = signing.leaf();

        // Leaf itself is an explicitly trusted root.
        if self.mode == TrustMode::CustomRoots && self.contains(leaf) {
            return Ok(());
        }

        let mut current = leaf;
        for intermediates_below in 0..MAX_DEPTH {
            let issuer = signing
                .intermediates()
                .iter()
                .chain(self.anchors.iter())
                .filter(|issuer| issuer.subject_raw == current.issuer_raw)
                .filter(|issuer| {
                    let usable = issuer.can_issue(intermediates_below) && issuer.is_valid_at(now);
                    if !usable {
                        debug!(
                            issuer = issuer.common_name().unwrap_or_default(),
                            "Skipping issuer that is not a valid CA at this time"
                        );
                    }
                    usable
                })
                .find(|issuer| {
                    verify_certificate_signature(
                        &issuer.spki_der,
                        &current.tbs_der,
                        &current.signature_oid,
                        &current.signature,
                    )
                    .is_ok()
                });

            let Some(issuer) = issuer else {
                debug!("Certificate chain ends in an untrusted root");
                return Err(RejectionReason::ChainBuildFailure);
            };

            if self.contains(issuer) {
                return Ok(());
            }

            // A self-issued intermediate that is not an anchor goes nowhere.
            if issuer.is_self_issued() {
                debug!("Certificate chain ends in an untrusted self-signed root");
                return Err(RejectionReason::ChainBuildFailure);
            }

            current = issuer;
        }

        debug!(max_depth = MAX_DEPTH, "Certificate chain too deep");
        Err(RejectionReason::ChainBuildFailure)
    }
}

fn rsa_public_key_from_spki(spki_der: &[u8]) -> Result<RsaPublicKey, String> {
    RsaPublicKey::from_public_key_der(spki_der).map_err(|e| format!("bad RSA public key: {e}"))
}

fn verify_rsa<D>(issuer_spki_der: &[u8], tbs_der: &[u8], signature: &[u8]) -> Result<(), String>
where
    D: Digest + AssociatedOid,
{
    let key = rsa_public_key_from_spki(issuer_spki_der)?;
    let vk = pkcs1v15::VerifyingKey::<D>::new(key);
    let sig = pkcs1v15::Signature::try_from(signature)
        .map_err(|e| format!("bad RSA signature bytes: {e}"))?;
    vk.verify(tbs_der, &sig)
        .map_err(|_| "certificate signature verification failed".to_string())
}

/// Verify one certificate's signature with its issuer's key, by signature OID.
fn verify_certificate_signature(
    issuer_spki_der: &[u8],
    tbs_der: &[u8],
    signature_oid: &str,
    signature: &[u8],
) -> Result<(), String> {
    match signature_oid {
        // sha1 / sha256 / sha384 / sha512 WithRSAEncryption
        "1.2.840.113549.1.1.5" => verify_rsa::<Sha1>(issuer_spki_der, tbs_der, signature),
        "1.2.840.113549.1.1.11" => verify_rsa::<Sha256>(issuer_spki_der, tbs_der, signature),
        "1.2.840.113549.1.1.12" => verify_rsa::<Sha384>(issuer_spki_der, tbs_der, signature),
        "1.2.840.113549.1.1.13" => verify_rsa::<Sha512>(issuer_spki_der, tbs_der, signature),

        // ecdsa-with-SHA256 / SHA384
        "1.2.840.10045.4.3.2" => {
            let pk = p256::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p256::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-256 issuer public key: {e}"))?;
            let sig = p256::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig)
                .map_err(|_| "certificate signature verification failed".to_string())
        }
        "1.2.840.10045.4.3.3" => {
            let pk = p384::PublicKey::from_public_key_der(issuer_spki_der)
                .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
            let ep = pk.to_encoded_point(false);
            let vk = p384::ecdsa::VerifyingKey::from_sec1_bytes(ep.as_bytes())
                .map_err(|e| format!("bad P-384 issuer public key: {e}"))?;
            let sig = p384::ecdsa::Signature::from_der(signature)
                .map_err(|e| format!("bad ECDSA signature bytes: {e}"))?;
            vk.verify(tbs_der, &sig)
                .map_err(|_| "certificate signature verification failed".to_string())
        }

        _ => Err(format!(
            "unsupported certificate signature algorithm OID: {signature_oid}"
        )),
    }
}
