//! Request authenticity middleware.
//!
//! Buffers the body once (bounded), hands the exact bytes to the
//! authenticator and forwards the rebuilt request only when it is accepted.
//! Every rejection is the same bare 400.

use axum::{
    body::Body,
    http::{header::CONTENT_LENGTH, Request, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};
use va_01_request_verification::{InboundRequest, RequestAuthenticationApi, VerificationOutcome};

/// Layer that authenticates signed platform requests
#[derive(Clone)]
pub struct AlexaVerificationLayer {
    authenticator: Arc<dyn RequestAuthenticationApi>,
    max_request_size: usize,
}

impl AlexaVerificationLayer {
    pub fn new(authenticator: Arc<dyn RequestAuthenticationApi>, max_request_size: usize) -> Self {
        Self {
            authenticator,
            max_request_size,
        }
    }
}

impl<S> Layer<S> for AlexaVerificationLayer {
    type Service = AlexaVerificationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AlexaVerificationService {
            inner,
            authenticator: Arc::clone(&self.authenticator),
            max_request_size: self.max_request_size,
        }
    }
}

/// Verification service
#[derive(Clone)]
pub struct AlexaVerificationService<S> {
    inner: S,
    authenticator: Arc<dyn RequestAuthenticationApi>,
    max_request_size: usize,
}

impl<S> Service<Request<Body>> for AlexaVerificationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let authenticator = Arc::clone(&self.authenticator);
        let max_request_size = self.max_request_size;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            if declared_length(&req).is_some_and(|len| len > max_request_size) {
                warn!(max = max_request_size, "Request too large (from header)");
                return Ok(StatusCode::PAYLOAD_TOO_LARGE.into_response());
            }

            let (parts, body) = req.into_parts();
            let bytes = match axum::body::to_bytes(body, max_request_size).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, max = max_request_size, "Failed to read request body");
                    return Ok(StatusCode::PAYLOAD_TOO_LARGE.into_response());
                }
            };

            let captured = InboundRequest::capture(&parts.headers, bytes.clone());
            match authenticator.authenticate(&captured).await {
                VerificationOutcome::Accepted => {
                    debug!(path = %parts.uri.path(), "Request authenticated");
                    inner.call(Request::from_parts(parts, Body::from(bytes))).await
                }
                VerificationOutcome::Rejected(reason) => {
                    warn!(
                        path = %parts.uri.path(),
                        reason = %reason,
                        code = reason.code(),
                        "Rejected unauthenticated request"
                    );
                    Ok(StatusCode::BAD_REQUEST.into_response())
                }
            }
        })
    }
}

fn declared_length(req: &Request<Body>) -> Option<usize> {
    req.headers()
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse()
        .ok()
}
