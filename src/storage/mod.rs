pub mod traits;
pub mod sqlite;

pub use traits::{BookmarkRepository, FeedRepository};
pub use sqlite::{SqliteBookmarkRepository, SqliteFeedRepository, SqliteStorage};
