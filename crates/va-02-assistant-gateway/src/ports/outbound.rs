//! Outbound ports for the assistant gateway.

use crate::domain::blog::BlogPost;
use crate::domain::error::FeedError;
use async_trait::async_trait;

/// Source of the latest blog posts, newest first.
#[async_trait]
pub trait BlogProvider: Send + Sync {
    async fn latest_posts(&self) -> Result<Vec<BlogPost>, FeedError>;
}
