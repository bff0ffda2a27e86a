//! # Domain Layer
//!
//! Pure verification logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod certificate;
pub mod chain;
pub mod config;
pub mod entities;
pub mod errors;
pub mod freshness;
pub mod signature;
pub mod url_policy;
