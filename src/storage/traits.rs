use crate::domain::{Bookmark, Feed};
use crate::errors::NewsfeedResult;

#[cfg_attr(test, mockall::automock)]
pub trait FeedRepository: Send + Sync {
    /// Insert a feed, replacing any existing row with the same url.
    fn upsert(&self, feed: &Feed) -> NewsfeedResult<i64>;
    fn remove(&self, id: i64) -> NewsfeedResult<()>;
    fn remove_by_url(&self, url: &str) -> NewsfeedResult<()>;
    fn get_all(&self) -> NewsfeedResult<Vec<Feed>>;
    fn get_by_url(&self, url: &str) -> NewsfeedResult<Option<Feed>>;
}

#[cfg_attr(test, mockall::automock)]
pub trait BookmarkRepository: Send + Sync {
    /// Insert a bookmark, replacing any existing row with the same article url.
    fn upsert(&self, bookmark: &Bookmark) -> NewsfeedResult<i64>;
    /// Returns the number of rows deleted.
    fn remove_by_url(&self, article_url: &str) -> NewsfeedResult<usize>;
    fn clear(&self) -> NewsfeedResult<usize>;
    fn get_all(&self) -> NewsfeedResult<Vec<Bookmark>>;
}
