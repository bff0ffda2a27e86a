//! # Concurrent Verification
//!
//! One router instance handles many signed requests at once; verification
//! keeps no shared mutable state beyond the fetcher's call counter.

#[cfg(test)]
mod tests {
    use super::super::support::{Harness, SignedCall};
    use axum::http::StatusCode;
    use futures::future::join_all;
    use tower::ServiceExt;
    use va_01_request_verification::test_utils::{
        fixed_now, intent_request_body, launch_request_body, TEST_APPLICATION_ID,
    };
    use va_02_assistant_gateway::ALEXA_PATH;

    const REQUESTS: usize = 32;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_parallel_genuine_and_forged_requests() {
        let harness = Harness::genuine();
        let router = harness.router();

        let calls: Vec<(SignedCall, bool)> = (0..REQUESTS)
            .map(|i| {
                let genuine = SignedCall::new(launch_request_body(TEST_APPLICATION_ID, fixed_now()));
                if i % 2 == 0 {
                    (genuine, true)
                } else {
                    let mut forged = genuine;
                    forged.body = intent_request_body(TEST_APPLICATION_ID, fixed_now(), "FeedIntent");
                    (forged, false)
                }
            })
            .collect();

        let handles = calls.into_iter().map(|(call, genuine)| {
            let router = router.clone();
            tokio::spawn(async move {
                let response = router
                    .oneshot(call.http_request(ALEXA_PATH))
                    .await
                    .unwrap();
                (response.status(), genuine)
            })
        });

        let results = join_all(handles).await;
        let mut accepted = 0;
        for result in results {
            let (status, genuine) = result.unwrap();
            if genuine {
                assert_eq!(status, StatusCode::OK);
                accepted += 1;
            } else {
                assert_eq!(status, StatusCode::BAD_REQUEST);
            }
        }

        assert_eq!(accepted, REQUESTS / 2);
        assert_eq!(harness.fetcher.calls(), REQUESTS);
    }
}
