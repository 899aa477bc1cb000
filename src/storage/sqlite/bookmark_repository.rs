use rusqlite::Row;

use crate::domain::Bookmark;
use crate::errors::{NewsfeedError, NewsfeedResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::BookmarkRepository;

const SELECT_COLUMNS: &str =
    "SELECT id, article_url, title, source, post_title, description, category, image_url FROM bookmarks";

pub struct SqliteBookmarkRepository {
    storage: SqliteStorage,
}

impl SqliteBookmarkRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }

    fn row_to_bookmark(row: &Row<'_>) -> rusqlite::Result<(Bookmark, Option<String>)> {
        let bookmark = Bookmark {
            id: Some(row.get(0)?),
            article_url: row.get(1)?,
            title: row.get(2)?,
            source: row.get(3)?,
            post_title: row.get(4)?,
            description: row.get(5)?,
            category: None,
            image_url: row.get(7)?,
        };
        Ok((bookmark, row.get(6)?))
    }
}

/// Categories are stored as a JSON array in a single text column.
fn encode_category(category: &Option<Vec<String>>) -> NewsfeedResult<Option<String>> {
    category
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(NewsfeedError::from)
}

fn decode_category(raw: Option<String>) -> NewsfeedResult<Option<Vec<String>>> {
    raw.as_deref()
        .map(serde_json::from_str)
        .transpose()
        .map_err(NewsfeedError::from)
}

impl BookmarkRepository for SqliteBookmarkRepository {
    fn upsert(&self, bookmark: &Bookmark) -> NewsfeedResult<i64> {
        let category = encode_category(&bookmark.category)?;
        let conn = self.storage.connection()?;

        let id = conn.query_row(
            r#"INSERT INTO bookmarks (article_url, title, source, post_title, description, category, image_url)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
               ON CONFLICT(article_url) DO UPDATE SET
                   title = excluded.title,
                   source = excluded.source,
                   post_title = excluded.post_title,
                   description = excluded.description,
                   category = excluded.category,
                   image_url = excluded.image_url
               RETURNING id"#,
            (
                &bookmark.article_url,
                &bookmark.title,
                &bookmark.source,
                &bookmark.post_title,
                &bookmark.description,
                &category,
                &bookmark.image_url,
            ),
            |row| row.get(0),
        )?;

        Ok(id)
    }

    fn remove_by_url(&self, article_url: &str) -> NewsfeedResult<usize> {
        let conn = self.storage.connection()?;
        let deleted = conn.execute("DELETE FROM bookmarks WHERE article_url = ?1", [article_url])?;
        Ok(deleted)
    }

    fn clear(&self) -> NewsfeedResult<usize> {
        let conn = self.storage.connection()?;
        let deleted = conn.execute("DELETE FROM bookmarks", [])?;
        Ok(deleted)
    }

    fn get_all(&self) -> NewsfeedResult<Vec<Bookmark>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(&format!("{} ORDER BY id ASC", SELECT_COLUMNS))?;

        let rows = stmt
            .query_map([], Self::row_to_bookmark)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(mut bookmark, raw_category)| {
                bookmark.category = decode_category(raw_category)?;
                Ok(bookmark)
            })
            .collect()
    }
}
