//! # Request Verification Service
//!
//! Application service layer implementing `RequestAuthenticationApi`.
//!
//! ## Architecture
//!
//! - `SignatureVerifier` proves the body was signed by the platform
//!   certificate, fetched through the `CertificateFetcher` port
//! - `RequestAuthenticator` adds the payload checks (application id, header
//!   presence, freshness) and implements the inbound port
//! - Cryptographic and policy decisions are delegated to the domain layer

use crate::adapters::HttpCertificateFetcher;
use crate::domain::certificate::parse_certificate_bundle;
use crate::domain::chain::TrustAnchorStore;
use crate::domain::config::{ConfigError, VerificationConfig};
use crate::domain::entities::{CertificateChainUrl, InboundRequest, VerificationOutcome};
use crate::domain::errors::RejectionReason;
use crate::domain::freshness::{check_freshness, parse_timestamp};
use crate::domain::signature::{decode_signature, verify_body_signature};
use crate::domain::url_policy::verify_certificate_url;
use crate::ports::inbound::RequestAuthenticationApi;
use crate::ports::outbound::{CertificateFetcher, Clock, SystemClock};
use async_trait::async_trait;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Verifies a detached body signature against the platform certificate.
///
/// Stages run in order and stop at the first failure: origin policy, fetch,
/// validity window, subject, chain, signature.
pub struct SignatureVerifier<F: CertificateFetcher, C: Clock> {
    config: Arc<VerificationConfig>,
    trust: Arc<TrustAnchorStore>,
    fetcher: F,
    clock: C,
}

impl<F: CertificateFetcher, C: Clock> SignatureVerifier<F, C> {
    pub fn new(
        config: Arc<VerificationConfig>,
        trust: Arc<TrustAnchorStore>,
        fetcher: F,
        clock: C,
    ) -> Self {
        Self {
            config,
            trust,
            fetcher,
            clock,
        }
    }

    /// Verify `signature` (base64) over `body` using the certificate at `cert_url`.
    pub async fn verify(
        &self,
        signature: &str,
        cert_url: &CertificateChainUrl,
        body: &[u8],
    ) -> VerificationOutcome {
        self.verify_stages(signature, cert_url, body).await.into()
    }

    async fn verify_stages(
        &self,
        signature: &str,
        cert_url: &CertificateChainUrl,
        body: &[u8],
    ) -> Result<(), RejectionReason> {
        verify_certificate_url(
            cert_url,
            &self.config.trusted_host,
            &self.config.trusted_path_prefix,
        )?;

        let bytes = self.fetcher.fetch(cert_url.url()).await.map_err(|e| {
            debug!(url = %cert_url.url(), error = %e, "Certificate fetch failed");
            RejectionReason::from(e)
        })?;

        let certificate = parse_certificate_bundle(&bytes).map_err(|e| {
            debug!(error = %e, "Certificate bundle could not be decoded");
            RejectionReason::from(e)
        })?;

        let now = self.clock.now();
        certificate.check_validity(now)?;
        certificate.check_subject(&self.config.expected_subject)?;
        self.trust.build_chain(&certificate, now)?;

        let signature = decode_signature(signature)?;
        verify_body_signature(certificate.leaf().public_key_der(), body, &signature)
    }
}

/// Decides whether an inbound request is authentic and fresh.
pub struct RequestAuthenticator<F: CertificateFetcher, C: Clock> {
    config: Arc<VerificationConfig>,
    verifier: SignatureVerifier<F, C>,
}

impl RequestAuthenticator<HttpCertificateFetcher, SystemClock> {
    /// Production authenticator: validated config, configured trust anchors,
    /// HTTPS fetcher and the system clock.
    pub fn from_config(config: VerificationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let trust = TrustAnchorStore::from_config(&config)?;
        let fetcher = HttpCertificateFetcher::from_config(&config)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        info!(
            host = %config.trusted_host,
            prefix = %config.trusted_path_prefix,
            trust_mode = ?trust.mode(),
            anchors = trust.len(),
            "Request verification configured"
        );
        Ok(Self::new(
            Arc::new(config),
            Arc::new(trust),
            fetcher,
            SystemClock,
        ))
    }
}

impl<F: CertificateFetcher, C: Clock> RequestAuthenticator<F, C> {
    pub fn new(
        config: Arc<VerificationConfig>,
        trust: Arc<TrustAnchorStore>,
        fetcher: F,
        clock: C,
    ) -> Self {
        let verifier = SignatureVerifier::new(Arc::clone(&config), trust, fetcher, clock);
        Self { config, verifier }
    }

    pub fn config(&self) -> &VerificationConfig {
        &self.config
    }

    async fn authenticate_stages(&self, request: &InboundRequest) -> Result<(), RejectionReason> {
        match request.application_id() {
            Some(id) if id == self.config.expected_application_id => {}
            _ => return Err(RejectionReason::ApplicationIdentifierMismatch),
        }

        let (Some(cert_url), Some(signature)) = (request.cert_chain_url(), request.signature())
        else {
            return Err(RejectionReason::MissingHeader);
        };

        let cert_url = CertificateChainUrl::parse(cert_url)?;

        if request.body().is_empty() {
            return Err(RejectionReason::EmptyOrMalformedBody);
        }

        let timestamp = request
            .timestamp()
            .ok_or(RejectionReason::EmptyOrMalformedBody)
            .and_then(parse_timestamp)?;
        check_freshness(
            timestamp,
            self.verifier.clock.now(),
            self.config.timestamp_tolerance,
        )?;

        match self
            .verifier
            .verify(signature, &cert_url, request.body())
            .await
        {
            VerificationOutcome::Accepted => Ok(()),
            VerificationOutcome::Rejected(reason) => Err(reason),
        }
    }
}

#[async_trait]
impl<F: CertificateFetcher, C: Clock> RequestAuthenticationApi for RequestAuthenticator<F, C> {
    async fn authenticate(&self, request: &InboundRequest) -> VerificationOutcome {
        match AssertUnwindSafe(self.authenticate_stages(request))
            .catch_unwind()
            .await
        {
            Ok(result) => {
                let outcome = VerificationOutcome::from(result);
                debug!(?outcome, "Request authentication finished");
                outcome
            }
            Err(_) => {
                error!("Request authentication panicked; rejecting");
                VerificationOutcome::Rejected(RejectionReason::FetchFailure)
            }
        }
    }
}
