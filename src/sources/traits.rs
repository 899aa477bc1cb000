use crate::domain::RawChannel;
use crate::errors::NewsfeedResult;

/// Something that can turn a feed URL into a parsed channel.
///
/// Implementations may block; callers run them on the blocking thread pool.
#[cfg_attr(test, mockall::automock)]
pub trait FeedSource: Send + Sync {
    /// Fetch and parse the feed at `url`.
    fn fetch_channel(&self, url: &str) -> NewsfeedResult<RawChannel>;
}

impl<S: FeedSource + ?Sized> FeedSource for std::sync::Arc<S> {
    fn fetch_channel(&self, url: &str) -> NewsfeedResult<RawChannel> {
        (**self).fetch_channel(url)
    }
}
