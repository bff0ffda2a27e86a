//! # Ports Layer
//!
//! Inbound (driving) and outbound (driven) interfaces of the verification
//! subsystem.

pub mod inbound;
pub mod outbound;
