mod connection;
mod feed_repository;
mod bookmark_repository;

pub use connection::SqliteStorage;
pub use feed_repository::SqliteFeedRepository;
pub use bookmark_repository::SqliteBookmarkRepository;
