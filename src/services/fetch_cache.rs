use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::domain::{canonicalize, Article};
use crate::errors::{FetchError, NewsfeedResult};
use crate::sources::FeedSource;

type Entry = Arc<OnceCell<Arc<Vec<Article>>>>;

/// Per-session memo of feed url to canonical articles.
///
/// Each url gets a cell the first time it is asked for, before any fetch
/// starts. Concurrent callers for the same url wait on that cell, so a feed is
/// fetched at most once per session. A failed fetch leaves the cell empty and
/// the next caller tries again.
pub struct FetchCache<S: FeedSource + 'static> {
    source: Arc<S>,
    entries: Mutex<HashMap<String, Entry>>,
}

impl<S: FeedSource + 'static> FetchCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entry(&self, url: &str) -> Entry {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(url.to_string()).or_default())
    }

    /// Load `url` unless it is already cached, returning the articles only to
    /// the caller that performed the fetch.
    ///
    /// `Ok(None)` means the feed was already loaded, or another caller loaded it
    /// while this one waited.
    pub async fn try_load(&self, url: &str) -> NewsfeedResult<Option<Arc<Vec<Article>>>> {
        let entry = self.entry(url);
        if entry.initialized() {
            return Ok(None);
        }

        let fetched_here = AtomicBool::new(false);
        let flag = &fetched_here;
        let articles = entry
            .get_or_try_init(|| {
                let source = Arc::clone(&self.source);
                let url = url.to_string();
                async move {
                    flag.store(true, Ordering::SeqCst);
                    fetch_articles(source, url).await
                }
            })
            .await?;

        if fetched_here.load(Ordering::SeqCst) {
            Ok(Some(Arc::clone(articles)))
        } else {
            Ok(None)
        }
    }

    /// Like [`try_load`](Self::try_load), but fetch failures are logged and
    /// dropped so one broken feed never stops the others.
    pub async fn ensure_loaded(&self, url: &str) -> Option<Arc<Vec<Article>>> {
        match self.try_load(url).await {
            Ok(articles) => articles,
            Err(e) => {
                warn!(url, error = %e, "feed fetch failed, will retry on next load");
                None
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<Arc<Vec<Article>>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(url).and_then(|cell| cell.get().cloned())
    }

    pub fn is_loaded(&self, url: &str) -> bool {
        self.get(url).is_some()
    }

    pub fn loaded_urls(&self) -> Vec<String> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let mut urls: Vec<String> = entries
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(url, _)| url.clone())
            .collect();
        urls.sort();
        urls
    }
}

async fn fetch_articles<S: FeedSource + 'static>(
    source: Arc<S>,
    url: String,
) -> NewsfeedResult<Arc<Vec<Article>>> {
    let task_url = url.clone();
    let channel = tokio::task::spawn_blocking(move || source.fetch_channel(&task_url))
        .await
        .map_err(|e| FetchError::Task(e.to_string()))??;

    let articles = canonicalize(&channel, &url);
    debug!(url = %url, articles = articles.len(), "feed loaded");
    Ok(Arc::new(articles))
}
