pub mod aggregator;
pub mod bookmark_store;
pub mod feed_registry;
pub mod fetch_cache;
pub mod shuffle;

mod blocking;
#[cfg(test)]
mod test_support;

pub use aggregator::Aggregator;
pub use bookmark_store::{BookmarkFlag, BookmarkStore};
pub use feed_registry::FeedRegistry;
pub use fetch_cache::FetchCache;
pub use shuffle::fisher_yates;
