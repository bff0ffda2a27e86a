//! Detached body signature: RSA PKCS#1 v1.5 with SHA-1.

use super::errors::RejectionReason;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use rsa::pkcs1v15::{Signature, VerifyingKey};
use rsa::pkcs8::DecodePublicKey as _;
use rsa::signature::Verifier as _;
use rsa::RsaPublicKey;
use sha1::Sha1;
use tracing::debug;

/// Decode the `Signature` header.
pub fn decode_signature(encoded: &str) -> Result<Vec<u8>, RejectionReason> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| RejectionReason::SignatureDecodeFailure)
}

/// Verify `signature` over the exact `body` bytes with the leaf's SubjectPublicKeyInfo.
///
/// A key that is not RSA cannot have produced the signature and is reported
/// as a mismatch.
pub fn verify_body_signature(
    public_key_der: &[u8],
    body: &[u8],
    signature: &[u8],
) -> Result<(), RejectionReason> {
    let key = RsaPublicKey::from_public_key_der(public_key_der).map_err(|e| {
        debug!(error = %e, "Signing certificate does not carry an RSA key");
        RejectionReason::SignatureMismatch
    })?;

    let signature =
        Signature::try_from(signature).map_err(|_| RejectionReason::SignatureMismatch)?;

    VerifyingKey::<Sha1>::new(key)
        .verify(body, &signature)
        .map_err(|_| RejectionReason::SignatureMismatch)
}
