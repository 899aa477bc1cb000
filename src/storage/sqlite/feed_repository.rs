use rusqlite::Row;

use crate::domain::Feed;
use crate::errors::{NewsfeedError, NewsfeedResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::FeedRepository;

pub struct SqliteFeedRepository {
    storage: SqliteStorage,
}

impl SqliteFeedRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn row_to_feed(row: &Row<'_>) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: Some(row.get(0)?),
            title: row.get(1)?,
            url: row.get(2)?,
        })
    }
}

impl FeedRepository for SqliteFeedRepository {
    fn upsert(&self, feed: &Feed) -> NewsfeedResult<i64> {
        let conn = self.storage.connection()?;

        // REPLACE drops the conflicting row, so the feed gets a fresh id
        conn.execute(
            "INSERT OR REPLACE INTO feeds (title, url) VALUES (?1, ?2)",
            (&feed.title, &feed.url),
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn remove(&self, id: i64) -> NewsfeedResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM feeds WHERE id = ?1", [id])?;
        Ok(())
    }

    fn remove_by_url(&self, url: &str) -> NewsfeedResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM feeds WHERE url = ?1", [url])?;
        Ok(())
    }

    fn get_all(&self) -> NewsfeedResult<Vec<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT id, title, url FROM feeds ORDER BY id ASC")?;

        let feeds = stmt.query_map([], Self::row_to_feed)?;

        feeds.collect::<Result<Vec<_>, _>>().map_err(NewsfeedError::from)
    }

    fn get_by_url(&self, url: &str) -> NewsfeedResult<Option<Feed>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT id, title, url FROM feeds WHERE url = ?1")?;

        match stmt.query_row([url], Self::row_to_feed) {
            Ok(f) => Ok(Some(f)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(NewsfeedError::from(e)),
        }
    }
}
