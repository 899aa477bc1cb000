use feed_rs::model::Entry;
use feed_rs::parser;
use reqwest::blocking::Client;
use tracing::debug;

use crate::config::Config;
use crate::domain::{RawChannel, RawItem};
use crate::errors::{FetchError, NewsfeedResult};
use crate::sources::traits::FeedSource;

/// Fetches RSS, Atom and JSON feeds over HTTP and parses them with `feed-rs`.
///
/// Uses the blocking client: construct it outside the async runtime and call it
/// from `spawn_blocking`.
pub struct RssAtomSource {
    client: Client,
}

impl RssAtomSource {
    pub fn new() -> Self {
        Self::from_config(&Config::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            client: Client::builder()
                .timeout(config.fetch_timeout)
                .user_agent(config.user_agent.clone())
                .build()
                .unwrap_or_else(|_| Client::new()),
        }
    }

    fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        Ok(response.bytes()?.to_vec())
    }

    /// Parse raw feed bytes into a channel
    pub fn channel_from_bytes(bytes: &[u8]) -> Result<RawChannel, FetchError> {
        let parsed = parser::parse(bytes).map_err(|e| FetchError::Parse(e.to_string()))?;

        Ok(RawChannel {
            title: parsed.title.map(|t| t.content),
            items: parsed.entries.into_iter().map(Self::entry_to_item).collect(),
        })
    }

    fn entry_to_item(entry: Entry) -> RawItem {
        let image = Self::entry_image(&entry);
        let link = Self::entry_link(&entry);

        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        let categories = if entry.categories.is_empty() {
            None
        } else {
            Some(entry.categories.into_iter().map(|c| c.term).collect())
        };

        RawItem {
            title: entry.title.map(|t| t.content),
            description,
            categories,
            image,
            link,
        }
    }

    /// Prefer the alternate link, otherwise whatever link comes first
    fn entry_link(entry: &Entry) -> Option<String> {
        entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("alternate"))
            .or_else(|| {
                entry
                    .links
                    .iter()
                    .find(|l| l.rel.as_deref() != Some("enclosure"))
            })
            .map(|l| l.href.clone())
    }

    fn entry_image(entry: &Entry) -> Option<String> {
        let thumbnail = entry
            .media
            .iter()
            .flat_map(|m| m.thumbnails.iter())
            .map(|t| t.image.uri.clone())
            .next();

        let media_image = || {
            entry
                .media
                .iter()
                .flat_map(|m| m.content.iter())
                .find(|c| {
                    c.content_type
                        .as_ref()
                        .is_some_and(|mime| mime.ty().as_str() == "image")
                })
                .and_then(|c| c.url.as_ref().map(|u| u.to_string()))
        };

        let enclosure = || {
            entry
                .links
                .iter()
                .find(|l| {
                    l.rel.as_deref() == Some("enclosure")
                        && l.media_type.as_deref().is_some_and(|t| t.starts_with("image/"))
                })
                .map(|l| l.href.clone())
        };

        thumbnail.or_else(media_image).or_else(enclosure)
    }
}

impl Default for RssAtomSource {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSource for RssAtomSource {
    fn fetch_channel(&self, url: &str) -> NewsfeedResult<RawChannel> {
        debug!(url, "fetching feed");
        let bytes = self.fetch_bytes(url)?;
        let channel = Self::channel_from_bytes(&bytes)?;
        debug!(url, items = channel.items.len(), "parsed feed");
        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::canonicalize;

    // Sample RSS feed (based on Rust Blog format)
    const SAMPLE_RSS: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Rust Blog</title>
    <link>https://blog.rust-lang.org/</link>
    <description>Empowering everyone to build reliable and efficient software.</description>
    <item>
      <title>Announcing Rust 1.75.0</title>
      <link>https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html</link>
      <description><![CDATA[<p>The Rust team is happy to announce a new version of Rust, 1.75.0.</p>]]></description>
      <category>release</category>
      <category>compiler</category>
      <media:content url="https://blog.rust-lang.org/images/1.75.png" type="image/png"/>
      <pubDate>Thu, 28 Dec 2023 00:00:00 +0000</pubDate>
      <guid>https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html</guid>
    </item>
    <item>
      <title>Rust 2024 Call for Testing</title>
      <link>https://blog.rust-lang.org/2024/01/10/Rust-2024-CFT.html</link>
      <pubDate>Wed, 10 Jan 2024 00:00:00 +0000</pubDate>
      <guid>https://blog.rust-lang.org/2024/01/10/Rust-2024-CFT.html</guid>
    </item>
  </channel>
</rss>"#;

    // Sample Atom feed
    const SAMPLE_ATOM: &[u8] = br#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>Example Tech Blog</title>
  <link href="https://example.com/"/>
  <id>https://example.com/feed.atom</id>
  <updated>2024-01-15T12:00:00Z</updated>
  <entry>
    <title>Understanding WebAssembly</title>
    <link href="https://example.com/posts/wasm-intro"/>
    <id>https://example.com/posts/wasm-intro</id>
    <updated>2024-01-15T12:00:00Z</updated>
    <category term="wasm"/>
    <content type="html"><![CDATA[<article><h1>Understanding WebAssembly</h1><p>A binary instruction format.</p></article>]]></content>
  </entry>
</feed>"#;

    #[test]
    fn test_rss_channel_items() {
        let channel = RssAtomSource::channel_from_bytes(SAMPLE_RSS).unwrap();

        assert_eq!(channel.title.as_deref(), Some("Rust Blog"));
        assert_eq!(channel.items.len(), 2);

        let first = &channel.items[0];
        assert_eq!(first.title.as_deref(), Some("Announcing Rust 1.75.0"));
        assert_eq!(
            first.link.as_deref(),
            Some("https://blog.rust-lang.org/2023/12/28/Rust-1.75.0.html")
        );
        assert_eq!(
            first.categories,
            Some(vec!["release".to_string(), "compiler".to_string()])
        );
        assert_eq!(
            first.image.as_deref(),
            Some("https://blog.rust-lang.org/images/1.75.png")
        );

        let second = &channel.items[1];
        assert!(second.description.is_none());
        assert!(second.categories.is_none());
        assert!(second.image.is_none());
    }

    #[test]
    fn test_rss_canonicalized_description_is_plain_text() {
        let channel = RssAtomSource::channel_from_bytes(SAMPLE_RSS).unwrap();
        let articles = canonicalize(&channel, "https://blog.rust-lang.org/feed.xml");

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].title, "Rust Blog");
        assert_eq!(
            articles[0].description.as_deref(),
            Some("The Rust team is happy to announce a new version of Rust, 1.75.0.")
        );
    }

    #[test]
    fn test_atom_falls_back_to_content_body() {
        let channel = RssAtomSource::channel_from_bytes(SAMPLE_ATOM).unwrap();

        assert_eq!(channel.title.as_deref(), Some("Example Tech Blog"));
        assert_eq!(channel.items.len(), 1);

        let entry = &channel.items[0];
        assert_eq!(entry.title.as_deref(), Some("Understanding WebAssembly"));
        assert_eq!(entry.link.as_deref(), Some("https://example.com/posts/wasm-intro"));
        assert_eq!(entry.categories, Some(vec!["wasm".to_string()]));

        let articles = canonicalize(&channel, "https://example.com/feed.atom");
        assert_eq!(
            articles[0].description.as_deref(),
            Some("Understanding WebAssemblyA binary instruction format.")
        );
    }

    #[test]
    fn test_non_image_media_is_not_an_image() {
        let rss = br#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <title>Video Blog</title>
    <item>
      <title>Episode 1</title>
      <link>https://video.example/episodes/1</link>
      <media:content url="https://video.example/episodes/1.mp4" type="video/mp4"/>
    </item>
  </channel>
</rss>"#;

        let channel = RssAtomSource::channel_from_bytes(rss).unwrap();

        assert_eq!(channel.items.len(), 1);
        assert!(channel.items[0].image.is_none());
    }

    #[test]
    fn test_malformed_feed_is_parse_error() {
        let result = RssAtomSource::channel_from_bytes(b"<html><body>not a feed</body></html>");
        assert!(matches!(result, Err(FetchError::Parse(_))));
    }
}
