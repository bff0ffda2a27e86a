//! Gateway error types.

use thiserror::Error;

/// Gateway startup and serving errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Trust anchors could not be loaded
    #[error("trust anchor error: {0}")]
    TrustAnchors(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Server terminated with an I/O error
    #[error("server error: {0}")]
    Serve(String),

    /// Outbound HTTP client could not be built
    #[error("http client error: {0}")]
    Client(String),
}

/// Blog feed errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// Connection, TLS or timeout failure
    #[error("feed transport error: {0}")]
    Transport(String),

    /// Feed server answered with a non-2xx status
    #[error("feed returned HTTP status {0}")]
    Status(u16),

    /// Body is not a parseable feed
    #[error("feed could not be parsed: {0}")]
    Parse(String),
}
