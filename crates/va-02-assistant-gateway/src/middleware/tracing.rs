//! Per-request span for the assistant gateway.
//!
//! Every request runs inside an `assistant_request` span; status and latency
//! are recorded on the span when the inner service answers, and a single
//! completion event is emitted at `info` (or `warn` for 4xx/5xx).

use axum::http::{Request, Response};
use futures::future::BoxFuture;
use std::task::{Context, Poll};
use std::time::Instant;
use tower::{Layer, Service};
use tracing::{field::Empty, info, info_span, warn, Instrument};

/// Wraps a service so each call gets its own span.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLayer;

impl TracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = RequestSpan<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestSpan { inner }
    }
}

#[derive(Clone, Debug)]
pub struct RequestSpan<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestSpan<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        // The clone may not be ready; swap so the readied service handles this call.
        let clone = self.inner.clone();
        let mut ready = std::mem::replace(&mut self.inner, clone);

        let span = info_span!(
            "assistant_request",
            http.method = %req.method(),
            http.target = %req.uri().path(),
            http.status_code = Empty,
            latency_ms = Empty,
            otel.kind = "server",
            otel.status_code = Empty,
        );

        let recorder = span.clone();
        Box::pin(
            async move {
                let started = Instant::now();
                let result = ready.call(req).await;
                let latency_ms = started.elapsed().as_millis() as u64;
                recorder.record("latency_ms", latency_ms);

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        recorder.record("http.status_code", status.as_u16());
                        if status.is_client_error() || status.is_server_error() {
                            recorder.record("otel.status_code", "ERROR");
                            warn!(status = status.as_u16(), latency_ms, "Request finished");
                        } else {
                            recorder.record("otel.status_code", "OK");
                            info!(status = status.as_u16(), latency_ms, "Request finished");
                        }
                    }
                    Err(_) => {
                        recorder.record("otel.status_code", "ERROR");
                        warn!(latency_ms, "Request failed inside the service stack");
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}
