//! # Rejection Taxonomy
//!
//! Each way a request can fail authenticity checks, asserted twice: the
//! precise reason from the authenticator, and the uniform bare 400 the
//! platform sees from the router.

#[cfg(test)]
mod tests {
    use super::super::support::{Harness, SignedCall};
    use axum::http::StatusCode;
    use chrono::TimeDelta;
    use tower::ServiceExt;
    use va_01_request_verification::test_utils::{
        fixed_now, intent_request_body, launch_request_body, SigningFixture,
        StaticCertificateFetcher, TEST_APPLICATION_ID, TEST_SUBJECT,
    };
    use va_01_request_verification::{RejectionReason, VerificationOutcome};
    use va_02_assistant_gateway::ALEXA_PATH;

    fn launch() -> SignedCall {
        SignedCall::new(launch_request_body(TEST_APPLICATION_ID, fixed_now()))
    }

    async fn assert_rejected(harness: &Harness, call: &SignedCall, reason: RejectionReason) {
        assert_eq!(
            call.outcome(harness).await,
            VerificationOutcome::Rejected(reason),
            "authenticator reason for {call:?}"
        );

        let response = harness
            .router()
            .oneshot(call.http_request(ALEXA_PATH))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty(), "rejection must not describe itself");
    }

    // =========================================================================
    // Request-level checks (no certificate download)
    // =========================================================================

    #[tokio::test]
    async fn test_missing_signature_header() {
        let harness = Harness::genuine();
        let mut call = launch();
        call.signature = None;
        assert_rejected(&harness, &call, RejectionReason::MissingHeader).await;

        let mut call = launch();
        call.cert_url = Some(String::new());
        assert_rejected(&harness, &call, RejectionReason::MissingHeader).await;
        assert_eq!(harness.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_url() {
        let mut call = launch();
        call.cert_url = Some("echo.api/echo-api-cert.pem".into());
        assert_rejected(&Harness::genuine(), &call, RejectionReason::MalformedUrl).await;
    }

    #[tokio::test]
    async fn test_url_outside_trusted_origin() {
        let harness = Harness::genuine();
        for url in [
            "http://s3.amazonaws.com/echo.api/echo-api-cert.pem",
            "https://notamazon.com/echo.api/echo-api-cert.pem",
            "https://S3.AMAZONAWS.COM/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/EcHo.aPi/echo-api-cert.pem",
            "https://s3.amazonaws.com:563/echo.api/echo-api-cert.pem",
            "https://s3.amazonaws.com/invalid.path/echo-api-cert.pem",
            "https://s3.amazonaws.com/echo.api/../invalid.path/echo-api-cert.pem",
        ] {
            let mut call = launch();
            call.cert_url = Some(url.into());
            assert_rejected(&harness, &call, RejectionReason::UrlPolicyViolation).await;
        }
        assert_eq!(harness.fetcher.calls(), 0, "policy runs before any download");
    }

    #[tokio::test]
    async fn test_stale_or_future_timestamp() {
        let harness = Harness::genuine();
        for offset in [TimeDelta::seconds(-151), TimeDelta::seconds(151), TimeDelta::hours(-1)] {
            let call = SignedCall::new(launch_request_body(
                TEST_APPLICATION_ID,
                fixed_now() + offset,
            ));
            assert_rejected(&harness, &call, RejectionReason::StaleTimestamp).await;
        }
        assert_eq!(harness.fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_or_malformed_body() {
        let harness = Harness::genuine();
        let no_timestamp = serde_json::json!({
            "session": { "application": { "applicationId": TEST_APPLICATION_ID } },
            "request": { "type": "LaunchRequest" }
        })
        .to_string();
        assert_rejected(
            &harness,
            &SignedCall::new(no_timestamp),
            RejectionReason::EmptyOrMalformedBody,
        )
        .await;

        let bad_timestamp = serde_json::json!({
            "session": { "application": { "applicationId": TEST_APPLICATION_ID } },
            "request": { "type": "LaunchRequest", "timestamp": "yesterday" }
        })
        .to_string();
        assert_rejected(
            &harness,
            &SignedCall::new(bad_timestamp),
            RejectionReason::EmptyOrMalformedBody,
        )
        .await;
    }

    #[tokio::test]
    async fn test_foreign_application() {
        let harness = Harness::genuine();
        let call = SignedCall::new(launch_request_body("amzn1.ask.skill.someone-else", fixed_now()));
        assert_rejected(&harness, &call, RejectionReason::ApplicationIdentifierMismatch).await;

        assert_rejected(
            &harness,
            &SignedCall::new("not json at all"),
            RejectionReason::ApplicationIdentifierMismatch,
        )
        .await;

        // An empty body has no application id to check.
        assert_rejected(
            &harness,
            &SignedCall::new(""),
            RejectionReason::ApplicationIdentifierMismatch,
        )
        .await;
    }

    // =========================================================================
    // Certificate checks
    // =========================================================================

    #[tokio::test]
    async fn test_certificate_download_failure() {
        let harness = Harness::with_fetcher(StaticCertificateFetcher::failing(404));
        assert_rejected(&harness, &launch(), RejectionReason::FetchFailure).await;

        let harness = Harness::with_fetcher(StaticCertificateFetcher::ok("not a certificate"));
        assert_rejected(&harness, &launch(), RejectionReason::FetchFailure).await;
    }

    #[tokio::test]
    async fn test_expired_and_not_yet_valid_certificates() {
        let fixture = SigningFixture::shared();
        for (not_before, not_after) in [((2020, 1, 1), (2021, 1, 1)), ((2030, 1, 1), (2035, 1, 1))] {
            let (_, leaf_pem) = fixture.issue_leaf(TEST_SUBJECT, not_before, not_after);
            let harness = Harness::with_fetcher(StaticCertificateFetcher::ok(format!(
                "{leaf_pem}{}",
                fixture.root_pem()
            )));
            assert_rejected(&harness, &launch(), RejectionReason::CertificateExpiredOrNotYetValid)
                .await;
        }
    }

    #[tokio::test]
    async fn test_wrong_subject() {
        let fixture = SigningFixture::shared();
        let (_, leaf_pem) = fixture.issue_leaf("echo-api.amazon.com.evil.example", (2020, 1, 1), (2040, 1, 1));
        let harness = Harness::with_fetcher(StaticCertificateFetcher::ok(format!(
            "{leaf_pem}{}",
            fixture.root_pem()
        )));
        assert_rejected(&harness, &launch(), RejectionReason::CertificateWrongSubject).await;
    }

    #[tokio::test]
    async fn test_chain_to_untrusted_root() {
        // Same names, different CA key: the bundled root is not an anchor.
        let stranger = SigningFixture::generate();
        let harness = Harness {
            trust: stranger.trust_store(),
            ..Harness::genuine()
        };
        assert_rejected(&harness, &launch(), RejectionReason::ChainBuildFailure).await;
    }

    // =========================================================================
    // Signature checks
    // =========================================================================

    #[tokio::test]
    async fn test_signature_not_base64() {
        let mut call = launch();
        call.signature = Some("!!not*base64!!".into());
        assert_rejected(&Harness::genuine(), &call, RejectionReason::SignatureDecodeFailure).await;
    }

    #[tokio::test]
    async fn test_body_swapped_after_signing() {
        let original = launch();
        let mut swapped = original.clone();
        swapped.body = intent_request_body(TEST_APPLICATION_ID, fixed_now(), "FeedIntent");
        assert_rejected(&Harness::genuine(), &swapped, RejectionReason::SignatureMismatch).await;
    }

    #[tokio::test]
    async fn test_single_byte_change_is_detected() {
        let original = launch();
        let mut tampered = original.clone();
        tampered.body = original.body.replacen("en-US", "en-GB", 1);
        assert_ne!(tampered.body, original.body);
        assert_rejected(&Harness::genuine(), &tampered, RejectionReason::SignatureMismatch).await;
    }
}
