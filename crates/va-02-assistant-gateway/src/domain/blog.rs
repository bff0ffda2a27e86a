//! Blog post summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the blog feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub published: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
}

impl BlogPost {
    /// A post with only a title.
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            published: None,
            categories: Vec::new(),
            image_url: None,
            description: None,
        }
    }
}
