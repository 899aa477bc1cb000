use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::info;

use crate::domain::Feed;
use crate::errors::NewsfeedResult;
use crate::services::blocking::run_blocking;
use crate::storage::traits::FeedRepository;

/// The user's subscriptions, persisted through a [`FeedRepository`] and
/// published as full snapshots after every change.
pub struct FeedRegistry<R: FeedRepository + 'static> {
    repository: Arc<R>,
    tx: watch::Sender<Arc<Vec<Feed>>>,
    writes: Mutex<()>,
}

impl<R: FeedRepository + 'static> FeedRegistry<R> {
    /// Load the stored feeds and start publishing.
    pub async fn open(repository: R) -> NewsfeedResult<Self> {
        let repository = Arc::new(repository);
        let feeds = run_blocking(&repository, |r| r.get_all()).await?;
        let (tx, _) = watch::channel(Arc::new(feeds));

        Ok(Self {
            repository,
            tx,
            writes: Mutex::new(()),
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Feed>>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Vec<Feed>> {
        Arc::clone(&self.tx.borrow())
    }

    /// Validate and store a feed. An existing feed with the same url is
    /// replaced, so the latest title wins.
    pub async fn add(&self, title: &str, url: &str) -> NewsfeedResult<Feed> {
        let feed = Feed::validated(title, url)?;

        let _guard = self.writes.lock().await;
        let to_store = feed.clone();
        let id = run_blocking(&self.repository, move |r| r.upsert(&to_store)).await?;
        info!(id, url = %feed.url, title = %feed.title, "feed added");

        self.refresh().await?;
        Ok(Feed {
            id: Some(id),
            ..feed
        })
    }

    /// Delete a feed. Feeds that are not stored are ignored.
    pub async fn remove(&self, feed: &Feed) -> NewsfeedResult<()> {
        let _guard = self.writes.lock().await;

        match feed.id {
            Some(id) => run_blocking(&self.repository, move |r| r.remove(id)).await?,
            None => {
                let url = feed.url.clone();
                run_blocking(&self.repository, move |r| r.remove_by_url(&url)).await?
            }
        }
        info!(url = %feed.url, "feed removed");

        self.refresh().await
    }

    pub async fn get_by_url(&self, url: &str) -> NewsfeedResult<Option<Feed>> {
        let url = url.to_string();
        run_blocking(&self.repository, move |r| r.get_by_url(&url)).await
    }

    async fn refresh(&self) -> NewsfeedResult<()> {
        let feeds = run_blocking(&self.repository, |r| r.get_all()).await?;
        self.tx.send_replace(Arc::new(feeds));
        Ok(())
    }
}
