use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::channel::RawChannel;

/// Placeholder used when a channel or item has no title.
const MISSING_TITLE: &str = "null";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static tag pattern is valid"));

/// One feed item in canonical form. Articles are rebuilt from the fetch cache
/// on every aggregation pass and are never stored on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Title of the channel the article came from.
    pub title: String,
    /// URL of the feed the article was fetched from.
    pub source: String,
    /// Headline of the item itself.
    pub post_title: String,
    pub description: Option<String>,
    pub category: Option<Vec<String>>,
    pub image_url: Option<String>,
    /// Link to the full article; the identity used for bookmarks.
    pub article_url: Option<String>,
}

impl Article {
    pub fn new(title: String, source: String, post_title: String) -> Self {
        Self {
            title,
            source,
            post_title,
            description: None,
            category: None,
            image_url: None,
            article_url: None,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description;
        self
    }

    pub fn with_category(mut self, category: Option<Vec<String>>) -> Self {
        self.category = category;
        self
    }

    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_article_url(mut self, article_url: Option<String>) -> Self {
        self.article_url = article_url;
        self
    }

    /// Only articles that link somewhere can be bookmarked.
    pub fn is_bookmarkable(&self) -> bool {
        self.article_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    /// Convert every item of a parsed channel into an article, keeping item order.
    pub fn from_channel(channel: &RawChannel, source_url: &str) -> Vec<Article> {
        let channel_title = channel
            .title
            .clone()
            .unwrap_or_else(|| MISSING_TITLE.to_string());

        channel
            .items
            .iter()
            .map(|item| {
                let post_title = item
                    .title
                    .clone()
                    .unwrap_or_else(|| MISSING_TITLE.to_string());

                Article::new(channel_title.clone(), source_url.to_string(), post_title)
                    .with_description(item.description.as_deref().map(strip_html))
                    .with_category(item.categories.clone())
                    .with_image_url(item.image.clone())
                    .with_article_url(item.link.clone())
            })
            .collect()
    }
}

/// Canonicalize a parsed channel fetched from `source_url`.
pub fn canonicalize(channel: &RawChannel, source_url: &str) -> Vec<Article> {
    Article::from_channel(channel, source_url)
}

/// Remove every `<...>` tag and trim surrounding whitespace.
pub fn strip_html(html: &str) -> String {
    HTML_TAG.replace_all(html, "").trim().to_string()
}
