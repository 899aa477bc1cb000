use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::domain::{Article, Bookmark};
use crate::errors::{NewsfeedError, NewsfeedResult};
use crate::services::blocking::run_blocking;
use crate::storage::traits::BookmarkRepository;

fn contains(bookmarks: &[Bookmark], article_url: &str) -> bool {
    bookmarks.iter().any(|b| b.article_url == article_url)
}

/// Live view of whether one article url is bookmarked.
pub struct BookmarkFlag {
    article_url: String,
    rx: watch::Receiver<Arc<Vec<Bookmark>>>,
    last: bool,
}

impl BookmarkFlag {
    pub fn article_url(&self) -> &str {
        &self.article_url
    }

    pub fn get(&self) -> bool {
        contains(&self.rx.borrow(), &self.article_url)
    }

    /// Wait until the bookmark state flips and return the new value.
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        loop {
            self.rx.changed().await.ok()?;
            let now = self.get();
            if now != self.last {
                self.last = now;
                return Some(now);
            }
        }
    }
}

/// Saved articles, keyed by article url.
///
/// Every mutation runs as its own storage call and republishes the full list.
pub struct BookmarkStore<R: BookmarkRepository + 'static> {
    repository: Arc<R>,
    tx: watch::Sender<Arc<Vec<Bookmark>>>,
    writes: Mutex<()>,
}

impl<R: BookmarkRepository + 'static> BookmarkStore<R> {
    pub async fn open(repository: R) -> NewsfeedResult<Self> {
        let repository = Arc::new(repository);
        let bookmarks = run_blocking(&repository, |r| r.get_all()).await?;
        let (tx, _) = watch::channel(Arc::new(bookmarks));

        Ok(Self {
            repository,
            tx,
            writes: Mutex::new(()),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Bookmark>>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Vec<Bookmark>> {
        Arc::clone(&self.tx.borrow())
    }

    /// Saved bookmarks as articles, for rendering alongside live ones.
    pub fn saved_articles(&self) -> Vec<Article> {
        self.snapshot().iter().map(Bookmark::to_article).collect()
    }

    /// Save a snapshot of `article`. Saving the same url again overwrites the
    /// stored copy.
    pub async fn add(&self, article_url: &str, article: &Article) -> NewsfeedResult<()> {
        if article_url.trim().is_empty() {
            return Err(NewsfeedError::Validation(
                "Cannot bookmark an article without a URL".to_string(),
            ));
        }

        let bookmark = Bookmark::from_article(article_url, article);

        let _guard = self.writes.lock().await;
        run_blocking(&self.repository, move |r| r.upsert(&bookmark)).await?;
        info!(article_url, "bookmark added");

        self.refresh().await
    }

    /// Delete the bookmark for `article_url`, if any.
    pub async fn remove(&self, article_url: &str) -> NewsfeedResult<()> {
        let _guard = self.writes.lock().await;

        let url = article_url.to_string();
        let deleted = run_blocking(&self.repository, move |r| r.remove_by_url(&url)).await?;
        info!(article_url, deleted, "bookmark removed");

        self.refresh().await
    }

    pub async fn clear_all(&self) -> NewsfeedResult<()> {
        let _guard = self.writes.lock().await;

        let deleted = run_blocking(&self.repository, |r| r.clear()).await?;
        info!(deleted, "bookmarks cleared");

        self.refresh().await
    }

    /// Flip the bookmark state of `article` and return the new state.
    pub async fn toggle(&self, article: &Article) -> NewsfeedResult<bool> {
        let article_url = match article.article_url.as_deref() {
            Some(url) if article.is_bookmarkable() => url,
            _ => {
                return Err(NewsfeedError::Validation(
                    "Cannot bookmark an article without a URL".to_string(),
                ))
            }
        };

        if self.contains(article_url) {
            self.remove(article_url).await?;
            Ok(false)
        } else {
            self.add(article_url, article).await?;
            Ok(true)
        }
    }

    pub fn contains(&self, article_url: &str) -> bool {
        contains(&self.tx.borrow(), article_url)
    }

    pub fn is_bookmarked(&self, article_url: &str) -> BookmarkFlag {
        let rx = self.tx.subscribe();
        let last = contains(&rx.borrow(), article_url);

        BookmarkFlag {
            article_url: article_url.to_string(),
            rx,
            last,
        }
    }

    async fn refresh(&self) -> NewsfeedResult<()> {
        let bookmarks = run_blocking(&self.repository, |r| r.get_all()).await?;
        self.tx.send_replace(Arc::new(bookmarks));
        Ok(())
    }
}
