//! Atom feed blog provider.

use crate::domain::blog::BlogPost;
use crate::domain::config::FeedConfig;
use crate::domain::error::FeedError;
use crate::ports::outbound::BlogProvider;
use async_trait::async_trait;
use feed_rs::model::Entry;
use reqwest::Client;
use tracing::debug;

/// Reads posts from a remote Atom (or RSS) feed on every call.
#[derive(Debug, Clone)]
pub struct AtomBlogProvider {
    client: Client,
    url: String,
}

impl AtomBlogProvider {
    pub fn new(config: &FeedConfig) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl BlogProvider for AtomBlogProvider {
    async fn latest_posts(&self) -> Result<Vec<BlogPost>, FeedError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FeedError::Transport(e.to_string()))?;

        let posts = parse_feed(&bytes)?;
        debug!(url = %self.url, posts = posts.len(), "Fetched blog feed");
        Ok(posts)
    }
}

/// Parse a feed document into posts, in document order.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<BlogPost>, FeedError> {
    let feed = feed_rs::parser::parse(bytes).map_err(|e| FeedError::Parse(e.to_string()))?;
    Ok(feed.entries.into_iter().map(to_post).collect())
}

fn to_post(entry: Entry) -> BlogPost {
    let image_url = entry
        .links
        .iter()
        .find(|link| {
            link.media_type
                .as_deref()
                .is_some_and(|t| t.starts_with("image/"))
        })
        .map(|link| link.href.clone());

    BlogPost {
        title: entry.title.map(|t| t.content).unwrap_or_default(),
        published: entry.published,
        categories: entry.categories.into_iter().map(|c| c.term).collect(),
        image_url,
        description: entry.summary.map(|s| s.content),
    }
}
