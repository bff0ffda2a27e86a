//! # Voice-Assistant Test Suite
//!
//! Cross-crate flows: signed requests travel through the full gateway router
//! (tracing, timeout, verification, handler) backed by the real request
//! authenticator with a generated certificate chain.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs     # Shared harness: gateway wiring, signed requests
//!     ├── flows.rs       # Accepted requests end to end, over a real socket
//!     ├── rejections.rs  # Every rejection reason, as seen by the platform
//!     └── concurrency.rs # Parallel verification through one router
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p va-tests
//! cargo test -p va-tests integration::rejections::
//! ```

pub mod integration;
