//! # Adapters Layer
//!
//! Concrete implementations of the outbound ports.

pub mod http_fetcher;

pub use http_fetcher::HttpCertificateFetcher;
