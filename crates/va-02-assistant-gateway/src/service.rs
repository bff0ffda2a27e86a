//! Assistant gateway service - router assembly and serving.

use crate::adapters::AtomBlogProvider;
use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::handlers::{handle_alexa, health_check, AppState};
use crate::middleware::{AlexaVerificationLayer, TracingLayer};
use crate::ports::outbound::BlogProvider;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tracing::{info, warn};
use va_01_request_verification::{RequestAuthenticationApi, RequestAuthenticator};

/// Signed webhook endpoint.
pub const ALEXA_PATH: &str = "/api/assistant/alexa";
/// Same handler without verification (opt-in).
pub const ALEXA_UNSIGNED_PATH: &str = "/api/assistant/alexa/unsigned";
/// Liveness probe.
pub const HEALTH_PATH: &str = "/health";

/// Assistant gateway service state
pub struct AssistantGatewayService {
    config: GatewayConfig,
    authenticator: Arc<dyn RequestAuthenticationApi>,
    blog: Arc<dyn BlogProvider>,
}

impl AssistantGatewayService {
    /// Create a service from explicit collaborators.
    pub fn new(
        config: GatewayConfig,
        authenticator: Arc<dyn RequestAuthenticationApi>,
        blog: Arc<dyn BlogProvider>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self {
            config,
            authenticator,
            blog,
        })
    }

    /// Create the production service: real trust anchors, HTTPS certificate
    /// fetcher and the Atom feed.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let authenticator = RequestAuthenticator::from_config(config.verification.clone())
            .map_err(|e| GatewayError::TrustAnchors(e.to_string()))?;
        let blog =
            AtomBlogProvider::new(&config.feed).map_err(|e| GatewayError::Client(e.to_string()))?;

        Self::new(config, Arc::new(authenticator), Arc::new(blog))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Build the HTTP router
    pub fn router(&self) -> Router {
        let max = self.config.limits.max_request_size;
        let state = AppState {
            blog: Arc::clone(&self.blog),
            post_count: self.config.feed.post_count,
        };

        let signed = post(handle_alexa)
            .layer::<_, std::convert::Infallible>(DefaultBodyLimit::max(max))
            .layer(AlexaVerificationLayer::new(Arc::clone(&self.authenticator), max));

        let mut router = Router::new()
            .route(ALEXA_PATH, signed)
            .route(HEALTH_PATH, get(health_check));

        if self.config.routes.expose_unsigned_endpoint {
            warn!(path = ALEXA_UNSIGNED_PATH, "Unverified assistant endpoint exposed");
            router = router.route(
                ALEXA_UNSIGNED_PATH,
                post(handle_alexa).layer(DefaultBodyLimit::max(max)),
            );
        }

        let middleware = ServiceBuilder::new()
            .layer(TracingLayer::new())
            .layer(TimeoutLayer::new(self.config.timeouts.request));

        router.layer(middleware).with_state(state)
    }

    /// Bind the configured address and serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves.
    pub async fn serve_on<F>(self, listener: TcpListener, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        info!(addr = %addr, "Assistant gateway listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;

        info!("Assistant gateway stopped");
        Ok(())
    }
}
