//! Middleware stack for the assistant gateway.
//!
//! Layer order: Request → Tracing → Timeout → (signed route only) Verification → Handler

pub mod tracing;
pub mod verification;

pub use self::tracing::TracingLayer;
pub use verification::AlexaVerificationLayer;
