//! # Signing Certificate
//!
//! Decoding of the fetched certificate bundle and the per-certificate checks
//! that do not need trust anchors: validity window and subject.

use super::errors::{CertificateError, RejectionReason};
use chrono::{DateTime, Utc};
use x509_parser::pem::Pem;
use x509_parser::x509::X509Version;

/// The fields of one X.509 certificate that verification needs.
#[derive(Debug, Clone)]
pub struct ParsedCertificate {
    pub(crate) der: Vec<u8>,
    pub(crate) subject_raw: Vec<u8>,
    pub(crate) issuer_raw: Vec<u8>,
    pub(crate) spki_der: Vec<u8>,
    pub(crate) tbs_der: Vec<u8>,
    pub(crate) signature_oid: String,
    pub(crate) signature: Vec<u8>,
    not_before: i64,
    not_after: i64,
    common_name: Option<String>,
    issuance: Issuance,
}

/// What the certificate's extensions allow it to sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Issuance {
    ca: bool,
    path_len: Option<u32>,
    /// `None` when there is no keyUsage extension.
    key_cert_sign: Option<bool>,
}

impl ParsedCertificate {
    /// Parse a single DER certificate.
    pub fn from_der(der: &[u8]) -> Result<Self, CertificateError> {
        let (_, cert) = x509_parser::parse_x509_certificate(der)
            .map_err(|e| CertificateError::InvalidDer(e.to_string()))?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(str::to_string);

        let invalid =
            |e: x509_parser::error::X509Error| CertificateError::InvalidDer(e.to_string());
        let constraints = cert.basic_constraints().map_err(invalid)?;
        let key_usage = cert.key_usage().map_err(invalid)?;

        // v1 certificates cannot carry extensions; a self-signed one is a legacy root.
        let legacy_root = cert.version() == X509Version::V1 && cert.subject() == cert.issuer();
        let issuance = Issuance {
            ca: constraints.as_ref().map_or(legacy_root, |bc| bc.value.ca),
            path_len: constraints.and_then(|bc| bc.value.path_len_constraint),
            key_cert_sign: key_usage.map(|ku| ku.value.key_cert_sign()),
        };

        Ok(Self {
            der: der.to_vec(),
            subject_raw: cert.subject().as_raw().to_vec(),
            issuer_raw: cert.issuer().as_raw().to_vec(),
            spki_der: cert.tbs_certificate.subject_pki.raw.to_vec(),
            tbs_der: cert.tbs_certificate.as_ref().to_vec(),
            signature_oid: cert.signature_algorithm.algorithm.to_id_string(),
            signature: cert.signature_value.data.to_vec(),
            not_before: cert.validity().not_before.timestamp(),
            not_after: cert.validity().not_after.timestamp(),
            common_name,
            issuance,
        })
    }

    /// DER encoding as received.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// DER-encoded SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> &[u8] {
        &self.spki_der
    }

    /// First common name of the subject.
    pub fn common_name(&self) -> Option<&str> {
        self.common_name.as_deref()
    }

    pub(crate) fn is_self_issued(&self) -> bool {
        self.subject_raw == self.issuer_raw
    }

    /// Strict validity window: `not_before < now < not_after`.
    pub(crate) fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        let now = now.timestamp();
        self.not_before < now && now < self.not_after
    }

    /// Whether this certificate may sign a chain with `intermediates_below`
    /// non-self-issued CA certificates between it and the leaf.
    ///
    /// Requires basicConstraints cA, keyCertSign when keyUsage is present,
    /// and a pathLenConstraint (if any) of at least `intermediates_below`.
    pub(crate) fn can_issue(&self, intermediates_below: usize) -> bool {
        let Issuance {
            ca,
            path_len,
            key_cert_sign,
        } = self.issuance;
        let beyond_path_len =
            matches!(path_len, Some(max) if u64::from(max) < intermediates_below as u64);
        ca && key_cert_sign.unwrap_or(true) && !beyond_path_len
    }
}

/// Leaf certificate plus any intermediates that came with it.
#[derive(Debug, Clone)]
pub struct SigningCertificate {
    leaf: ParsedCertificate,
    intermediates: Vec<ParsedCertificate>,
}

impl SigningCertificate {
    pub fn leaf(&self) -> &ParsedCertificate {
        &self.leaf
    }

    pub fn intermediates(&self) -> &[ParsedCertificate] {
        &self.intermediates
    }

    /// Strict validity window: `not_before < now < not_after`.
    pub fn check_validity(&self, now: DateTime<Utc>) -> Result<(), RejectionReason> {
        if self.leaf.is_valid_at(now) {
            Ok(())
        } else {
            Err(RejectionReason::CertificateExpiredOrNotYetValid)
        }
    }

    /// The leaf's common name must equal `expected` exactly.
    pub fn check_subject(&self, expected: &str) -> Result<(), RejectionReason> {
        match self.leaf.common_name() {
            Some(cn) if cn == expected => Ok(()),
            _ => Err(RejectionReason::CertificateWrongSubject),
        }
    }
}

/// Decode a certificate download.
///
/// Accepts a PEM bundle (leaf first, then intermediates) or a single DER
/// certificate. Non-certificate PEM blocks are skipped.
pub fn parse_certificate_bundle(bytes: &[u8]) -> Result<SigningCertificate, CertificateError> {
    let trimmed = trim_ascii_start(bytes);
    if trimmed.is_empty() {
        return Err(CertificateError::Empty);
    }

    let mut certs = if trimmed.starts_with(b"-----BEGIN") {
        let mut out = Vec::new();
        for pem in Pem::iter_from_buffer(trimmed) {
            let pem = pem.map_err(|e| CertificateError::InvalidPem(e.to_string()))?;
            if pem.label != "CERTIFICATE" {
                continue;
            }
            out.push(ParsedCertificate::from_der(&pem.contents)?);
        }
        out
    } else {
        vec![ParsedCertificate::from_der(trimmed)?]
    };

    if certs.is_empty() {
        return Err(CertificateError::Empty);
    }
    let leaf = certs.remove(0);

    Ok(SigningCertificate {
        leaf,
        intermediates: certs,
    })
}

fn trim_ascii_start(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    &bytes[start..]
}
