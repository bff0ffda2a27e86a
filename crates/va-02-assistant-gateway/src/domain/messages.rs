//! Spoken replies.

use super::blog::BlogPost;

pub const WELCOME: &str = "Welcome to the Suave Pirate assistant! You can ask me about the latest posts from Alex Dunn by saying - what are the latest posts?";

pub const HELP: &str =
    "Try saying, \"What are the latest posts?\" to get the latest blog posts on alexdunn.org";

pub const EXIT: &str = "Be sure to come back for updates from Suave Pirate!";

/// Read out the first `count` titles. Feed titles arrive HTML-escaped.
pub fn latest_posts(posts: &[BlogPost], count: usize) -> String {
    let titles: Vec<&str> = posts.iter().take(count).map(|p| p.title.as_str()).collect();
    let text = format!(
        "Here are the latest posts: {} - be sure to check back regularly for new content from Alex!",
        titles.join(", ")
    );
    html_escape::decode_html_entities(&text).into_owned()
}
