//! # Assistant Gateway
//!
//! HTTP surface of the voice assistant: the signed webhook endpoint, intent
//! routing and the spoken replies.
//!
//! ## Request flow
//!
//! ```text
//! POST /api/assistant/alexa
//!   → TracingLayer (span per request)
//!   → TimeoutLayer
//!   → AlexaVerificationLayer (bounded body read, authenticity check, bare 400)
//!   → handle_alexa (parse, resolve intent, reply)
//! ```
//!
//! Rejected requests never reach a handler. The body the handler parses is
//! byte-for-byte the body that was verified.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod ports;
pub mod service;

pub use adapters::AtomBlogProvider;
pub use domain::blog::BlogPost;
pub use domain::config::{
    ConfigError, FeedConfig, GatewayConfig, HttpConfig, LimitsConfig, RoutesConfig, TimeoutConfig,
};
pub use domain::error::{FeedError, GatewayError};
pub use domain::intents::Intent;
pub use domain::skill::{SkillRequest, SkillResponse};
pub use ports::outbound::BlogProvider;
pub use service::{AssistantGatewayService, ALEXA_PATH, ALEXA_UNSIGNED_PATH, HEALTH_PATH};
