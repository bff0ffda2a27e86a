//! HTTP certificate fetcher backed by `reqwest`.

use crate::domain::config::VerificationConfig;
use crate::domain::errors::FetchError;
use crate::ports::outbound::CertificateFetcher;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::{redirect, Client};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Fetches certificate bundles over HTTPS.
///
/// Redirects are never followed: the target already passed the origin
/// policy and a redirect would leave it.
#[derive(Debug, Clone)]
pub struct HttpCertificateFetcher {
    client: Client,
    max_bytes: usize,
}

impl HttpCertificateFetcher {
    /// Create a fetcher with a total request timeout and a response size cap.
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(redirect::Policy::none())
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self { client, max_bytes })
    }

    pub fn from_config(config: &VerificationConfig) -> Result<Self, FetchError> {
        Self::new(config.fetch_timeout, config.max_certificate_bytes)
    }
}

#[async_trait]
impl CertificateFetcher for HttpCertificateFetcher {
    async fn fetch(&self, url: &Url) -> Result<Bytes, FetchError> {
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes as u64 {
                return Err(FetchError::TooLarge {
                    size: len as usize,
                    limit: self.max_bytes,
                });
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge {
                    size: body.len() + chunk.len(),
                    limit: self.max_bytes,
                });
            }
            body.extend_from_slice(&chunk);
        }

        debug!(%url, bytes = body.len(), "Fetched signing certificate");
        Ok(body.freeze())
    }
}
