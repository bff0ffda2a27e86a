//! # Inbound Ports (Driving Ports / API)
//!
//! The one question this subsystem answers: is this request authentic?

use crate::domain::entities::{InboundRequest, VerificationOutcome};
use async_trait::async_trait;

/// Request authentication API.
///
/// Implementations must be thread-safe (`Send + Sync`) and must never fail:
/// every internal fault is reported as `VerificationOutcome::Rejected`.
#[async_trait]
pub trait RequestAuthenticationApi: Send + Sync {
    /// Authenticate one captured request.
    ///
    /// # Side effects
    /// At most one outbound certificate fetch. No retries.
    async fn authenticate(&self, request: &InboundRequest) -> VerificationOutcome;
}
