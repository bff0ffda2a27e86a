//! # Outbound Ports (Driven Ports / SPI)
//!
//! Network access and wall-clock time, kept behind traits so the
//! verification pipeline can be tested deterministically.

use crate::domain::errors::FetchError;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use url::Url;

/// Downloads the signing certificate bundle.
#[async_trait]
pub trait CertificateFetcher: Send + Sync {
    /// Single GET of `url`. Non-2xx and transport failures are errors.
    ///
    /// The URL has already passed the origin policy. Dropping the returned
    /// future must abort the request.
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError>;
}

/// Time source trait for testability
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
