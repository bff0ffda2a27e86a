//! # Accepted Request Flows
//!
//! A genuine platform request (signed by the fixture leaf, chain served from
//! the pinned bucket URL, fresh timestamp) is verified and answered by intent.

#[cfg(test)]
mod tests {
    use super::super::support::{Harness, SignedCall};
    use axum::http::StatusCode;
    use serde_json::Value;
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use tower::ServiceExt;
    use va_01_request_verification::test_utils::{
        fixed_now, intent_request_body, launch_request_body, TEST_APPLICATION_ID,
    };
    use va_01_request_verification::{SIGNATURE_CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER};
    use va_02_assistant_gateway::domain::messages;
    use va_02_assistant_gateway::ALEXA_PATH;

    async fn call(harness: &Harness, call: &SignedCall) -> (StatusCode, Value) {
        let response = harness
            .router()
            .oneshot(call.http_request(ALEXA_PATH))
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    // =========================================================================
    // Intent replies through the verified route
    // =========================================================================

    #[tokio::test]
    async fn test_launch_is_welcomed_and_session_stays_open() {
        let harness = Harness::genuine();
        let signed = SignedCall::new(launch_request_body(TEST_APPLICATION_ID, fixed_now()));

        let (status, json) = call(&harness, &signed).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"]["outputSpeech"]["type"], "PlainText");
        assert_eq!(json["response"]["outputSpeech"]["text"], messages::WELCOME);
        assert_eq!(json["response"]["reprompt"]["outputSpeech"]["text"], messages::WELCOME);
        assert_eq!(json["response"]["shouldEndSession"], false);
        assert_eq!(harness.fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_feed_intent_reads_decoded_titles() {
        let harness = Harness::genuine();
        let signed =
            SignedCall::new(intent_request_body(TEST_APPLICATION_ID, fixed_now(), "FeedIntent"));

        let (status, json) = call(&harness, &signed).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["response"]["outputSpeech"]["text"],
            "Here are the latest posts: Voice & Vision, Signed Requests - be sure to check back regularly for new content from Alex!"
        );
        assert_eq!(json["response"]["shouldEndSession"], true);
        assert!(json["response"].get("reprompt").is_none());
    }

    #[tokio::test]
    async fn test_built_in_stop_ends_session() {
        let signed = SignedCall::new(intent_request_body(
            TEST_APPLICATION_ID,
            fixed_now(),
            "AMAZON.StopIntent",
        ));

        let (status, json) = call(&Harness::genuine(), &signed).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"]["outputSpeech"]["text"], messages::EXIT);
        assert_eq!(json["response"]["shouldEndSession"], true);
    }

    #[tokio::test]
    async fn test_unknown_intent_gets_help() {
        let signed = SignedCall::new(intent_request_body(
            TEST_APPLICATION_ID,
            fixed_now(),
            "AMAZON.FallbackIntent",
        ));

        let (_, json) = call(&Harness::genuine(), &signed).await;
        assert_eq!(json["response"]["outputSpeech"]["text"], messages::HELP);
    }

    #[tokio::test]
    async fn test_sessionless_request_uses_context_application() {
        let body = serde_json::json!({
            "version": "1.0",
            "context": {
                "System": { "application": { "applicationId": TEST_APPLICATION_ID } }
            },
            "request": {
                "type": "IntentRequest",
                "requestId": "amzn1.echo-api.request.sessionless",
                "timestamp": "2026-10-19T09:59:00Z",
                "intent": { "name": "AMAZON.HelpIntent" }
            }
        })
        .to_string();

        let (status, json) = call(&Harness::genuine(), &SignedCall::new(body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"]["outputSpeech"]["text"], messages::HELP);
    }

    #[tokio::test]
    async fn test_verified_but_unrecognisable_payload_is_400() {
        // Application id and timestamp are present, but `request.type` is a number.
        let body = serde_json::json!({
            "session": { "application": { "applicationId": TEST_APPLICATION_ID } },
            "request": { "type": 7, "timestamp": "2026-10-19T10:00:00Z" }
        })
        .to_string();
        let signed = SignedCall::new(body);

        assert!(signed.outcome(&Harness::genuine()).await.is_accepted());
        let (status, _) = call(&Harness::genuine(), &signed).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    // =========================================================================
    // Real socket
    // =========================================================================

    #[tokio::test]
    async fn test_signed_request_over_tcp_with_graceful_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let gateway = Harness::genuine().gateway();
        let server = tokio::spawn(gateway.serve_on(listener, async move {
            let _ = stop_rx.await;
        }));

        let body = launch_request_body(TEST_APPLICATION_ID, fixed_now());
        let signed = SignedCall::new(body.clone());
        let client = reqwest::Client::new();

        let response = client
            .post(format!("http://{addr}{ALEXA_PATH}"))
            .header(SIGNATURE_CERT_CHAIN_URL_HEADER, signed.cert_url.clone().unwrap())
            .header(SIGNATURE_HEADER, signed.signature.clone().unwrap())
            .body(body.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
        let json: Value = response.json().await.unwrap();
        assert_eq!(json["response"]["outputSpeech"]["text"], messages::WELCOME);

        let forged = client
            .post(format!("http://{addr}{ALEXA_PATH}"))
            .header(SIGNATURE_CERT_CHAIN_URL_HEADER, signed.cert_url.clone().unwrap())
            .header(SIGNATURE_HEADER, signed.signature.clone().unwrap())
            .body(body.replace("LaunchRequest", "IntentRequest"))
            .send()
            .await
            .unwrap();
        assert_eq!(forged.status().as_u16(), 400);

        let health = client
            .get(format!("http://{addr}/health"))
            .send()
            .await
            .unwrap();
        assert_eq!(health.status().as_u16(), 200);

        stop_tx.send(()).unwrap();
        server.await.unwrap().unwrap();
    }
}
