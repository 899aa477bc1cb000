use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{RawChannel, RawItem};
use crate::errors::{FetchError, NewsfeedResult};
use crate::sources::FeedSource;

/// In-memory feed source that counts calls and can simulate slow networks.
pub struct StubSource {
    channels: HashMap<String, RawChannel>,
    calls: Arc<AtomicUsize>,
    delay: Duration,
    url_delays: HashMap<String, Duration>,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            channels: HashMap::new(),
            calls: Arc::new(AtomicUsize::new(0)),
            delay: Duration::ZERO,
            url_delays: HashMap::new(),
        }
    }

    pub fn with_channel(mut self, url: &str, channel: RawChannel) -> Self {
        self.channels.insert(url.to_string(), channel);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Slow down one url only, overriding the shared delay.
    pub fn with_url_delay(mut self, url: &str, delay: Duration) -> Self {
        self.url_delays.insert(url.to_string(), delay);
        self
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl FeedSource for StubSource {
    fn fetch_channel(&self, url: &str) -> NewsfeedResult<RawChannel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let delay = self.url_delays.get(url).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }

        self.channels
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status(404).into())
    }
}

/// A channel titled `title` with `count` linked items.
pub fn channel_with_items(title: &str, count: usize) -> RawChannel {
    (0..count).fold(RawChannel::new(Some(title.to_string())), |channel, i| {
        channel.with_item(
            RawItem::new(Some(format!("{} item {}", title, i)))
                .with_link(Some(format!("https://{}.example/posts/{}", title.to_lowercase(), i))),
        )
    })
}
