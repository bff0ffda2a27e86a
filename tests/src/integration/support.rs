//! Shared harness for the integration flows.

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::Request;
use axum::Router;
use std::sync::Arc;
use va_01_request_verification::test_utils::{
    FixedClock, SigningFixture, StaticCertificateFetcher, TEST_APPLICATION_ID, TEST_CERT_URL,
};
use va_01_request_verification::{
    InboundRequest, RequestAuthenticationApi, RequestAuthenticator, TrustAnchorStore,
    VerificationConfig, VerificationOutcome, SIGNATURE_CERT_CHAIN_URL_HEADER, SIGNATURE_HEADER,
};
use va_02_assistant_gateway::{
    AssistantGatewayService, BlogPost, BlogProvider, FeedError, GatewayConfig,
};

/// Canned blog feed.
pub struct FixedBlog(pub Vec<BlogPost>);

#[async_trait]
impl BlogProvider for FixedBlog {
    async fn latest_posts(&self) -> Result<Vec<BlogPost>, FeedError> {
        Ok(self.0.clone())
    }
}

/// Everything a flow can vary: what the certificate URL serves and which
/// roots are trusted.
pub struct Harness {
    pub fetcher: StaticCertificateFetcher,
    pub trust: TrustAnchorStore,
}

impl Harness {
    /// The shared fixture chain, trusted.
    pub fn genuine() -> Self {
        let fixture = SigningFixture::shared();
        Self {
            fetcher: StaticCertificateFetcher::ok(fixture.chain_pem()),
            trust: fixture.trust_store(),
        }
    }

    pub fn with_fetcher(fetcher: StaticCertificateFetcher) -> Self {
        Self {
            fetcher,
            ..Self::genuine()
        }
    }

    pub fn authenticator(&self) -> RequestAuthenticator<StaticCertificateFetcher, FixedClock> {
        RequestAuthenticator::new(
            Arc::new(VerificationConfig::for_application(TEST_APPLICATION_ID)),
            Arc::new(self.trust.clone()),
            self.fetcher.clone(),
            FixedClock::default(),
        )
    }

    pub fn gateway(&self) -> AssistantGatewayService {
        let config = GatewayConfig {
            verification: VerificationConfig::for_application(TEST_APPLICATION_ID),
            ..GatewayConfig::default()
        };
        let blog = FixedBlog(vec![
            BlogPost::titled("Voice &amp; Vision"),
            BlogPost::titled("Signed Requests"),
        ]);
        AssistantGatewayService::new(config, Arc::new(self.authenticator()), Arc::new(blog))
            .expect("valid gateway config")
    }

    pub fn router(&self) -> Router {
        self.gateway().router()
    }
}

/// A platform request as it will be sent: body plus signature headers.
#[derive(Debug, Clone)]
pub struct SignedCall {
    pub body: String,
    pub cert_url: Option<String>,
    pub signature: Option<String>,
}

impl SignedCall {
    /// `body` signed by the shared fixture leaf, pointing at the default URL.
    pub fn new(body: impl Into<String>) -> Self {
        let body = body.into();
        let signature = SigningFixture::shared().sign(body.as_bytes());
        Self {
            body,
            cert_url: Some(TEST_CERT_URL.to_string()),
            signature: Some(signature),
        }
    }

    pub fn http_request(&self, path: &str) -> Request<Body> {
        let mut builder = Request::post(path).header("content-type", "application/json");
        if let Some(url) = &self.cert_url {
            builder = builder.header(SIGNATURE_CERT_CHAIN_URL_HEADER, url);
        }
        if let Some(signature) = &self.signature {
            builder = builder.header(SIGNATURE_HEADER, signature);
        }
        builder
            .body(Body::from(self.body.clone()))
            .expect("valid request")
    }

    pub fn captured(&self) -> InboundRequest {
        let request = self.http_request("/");
        InboundRequest::capture(request.headers(), Bytes::from(self.body.clone()))
    }

    /// Outcome of the authenticator alone, without HTTP.
    pub async fn outcome(&self, harness: &Harness) -> VerificationOutcome {
        harness.authenticator().authenticate(&self.captured()).await
    }
}
