use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::{FuturesOrdered, FuturesUnordered, Stream, StreamExt};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::{Article, Feed};
use crate::services::fetch_cache::FetchCache;
use crate::services::shuffle::fisher_yates;
use crate::sources::FeedSource;

struct AggregateState {
    articles: Vec<Article>,
    rng: StdRng,
}

/// Merges every loaded feed into one shuffled reading stream.
///
/// New arrivals are appended and then the whole list is reshuffled, so the
/// order changes every time another feed finishes loading.
pub struct Aggregator<S: FeedSource + 'static> {
    cache: FetchCache<S>,
    state: Mutex<AggregateState>,
    tx: watch::Sender<Arc<Vec<Article>>>,
    seeded: bool,
}

impl<S: FeedSource + 'static> Aggregator<S> {
    pub fn new(cache: FetchCache<S>) -> Self {
        Self::with_rng(cache, StdRng::from_entropy(), false)
    }

    /// Deterministic shuffling, for reproducible output.
    ///
    /// Feeds still load concurrently, but arrivals are merged in the order
    /// the feeds were given, so network timing cannot change the result.
    pub fn with_seed(cache: FetchCache<S>, seed: u64) -> Self {
        Self::with_rng(cache, StdRng::seed_from_u64(seed), true)
    }

    fn with_rng(cache: FetchCache<S>, rng: StdRng, seeded: bool) -> Self {
        let (tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            cache,
            state: Mutex::new(AggregateState {
                articles: Vec::new(),
                rng,
            }),
            tx,
            seeded,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Article>>> {
        self.tx.subscribe()
    }

    pub fn snapshot(&self) -> Arc<Vec<Article>> {
        Arc::clone(&self.tx.borrow())
    }

    /// Load every feed concurrently, merging each one as soon as it arrives.
    ///
    /// Returns how many feeds contributed new articles.
    pub async fn load_all(&self, feeds: &[Feed]) -> usize {
        info!(feeds = feeds.len(), "loading feeds");

        let loads = feeds.iter().map(|feed| self.cache.ensure_loaded(&feed.url));
        let merged = if self.seeded {
            self.merge_arrivals(loads.collect::<FuturesOrdered<_>>()).await
        } else {
            self.merge_arrivals(loads.collect::<FuturesUnordered<_>>()).await
        };

        info!(merged, total = self.snapshot().len(), "feeds merged");
        merged
    }

    /// Keep the aggregate in step with the registry until it goes away.
    pub async fn follow(&self, mut feeds: watch::Receiver<Arc<Vec<Feed>>>) {
        loop {
            let current = Arc::clone(&feeds.borrow_and_update());
            self.load_all(&current).await;

            if feeds.changed().await.is_err() {
                debug!("feed registry closed");
                break;
            }
        }
    }

    pub fn find_by_url(&self, article_url: &str) -> Option<Article> {
        self.snapshot()
            .iter()
            .find(|a| a.article_url.as_deref() == Some(article_url))
            .cloned()
    }

    async fn merge_arrivals<St>(&self, arrivals: St) -> usize
    where
        St: Stream<Item = Option<Arc<Vec<Article>>>>,
    {
        futures::pin_mut!(arrivals);

        let mut merged = 0;
        while let Some(arrival) = arrivals.next().await {
            if let Some(articles) = arrival {
                self.merge(&articles);
                merged += 1;
            }
        }
        merged
    }

    fn merge(&self, arrivals: &[Article]) {
        let snapshot = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            let AggregateState { articles, rng } = &mut *state;

            articles.extend_from_slice(arrivals);
            fisher_yates(articles, rng);
            debug!(added = arrivals.len(), total = articles.len(), "reshuffled aggregate");

            Arc::new(articles.clone())
        };

        self.tx.send_replace(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{channel_with_items, StubSource};
    use std::collections::HashMap;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    const FEED_A: &str = "https://a.example/feed";
    const FEED_B: &str = "https://b.example/feed";

    fn feed(title: &str, url: &str) -> Feed {
        Feed::new(title.to_string(), url.to_string())
    }

    fn two_feed_source() -> StubSource {
        StubSource::new()
            .with_channel(FEED_A, channel_with_items("A", 3))
            .with_channel(FEED_B, channel_with_items("B", 2))
    }

    fn sorted_titles(articles: &[Article]) -> Vec<String> {
        let mut titles: Vec<String> = articles.iter().map(|a| a.post_title.clone()).collect();
        titles.sort();
        titles
    }

    #[tokio::test]
    async fn test_two_feeds_combine_to_five() {
        let aggregator = Aggregator::with_seed(FetchCache::new(two_feed_source()), 1);

        let merged = aggregator
            .load_all(&[feed("A", FEED_A), feed("B", FEED_B)])
            .await;
        assert_eq!(merged, 2);

        let combined = aggregator.snapshot();
        assert_eq!(combined.len(), 5);

        let mut per_source: HashMap<&str, usize> = HashMap::new();
        for article in combined.iter() {
            *per_source.entry(article.source.as_str()).or_default() += 1;
        }
        assert_eq!(per_source[FEED_A], 3);
        assert_eq!(per_source[FEED_B], 2);
    }

    #[tokio::test]
    async fn test_failed_feed_contributes_nothing() {
        let aggregator = Aggregator::with_seed(FetchCache::new(two_feed_source()), 1);

        let merged = aggregator
            .load_all(&[
                feed("A", FEED_A),
                feed("Broken", "https://broken.example/feed"),
            ])
            .await;

        assert_eq!(merged, 1);
        assert_eq!(aggregator.snapshot().len(), 3);
    }

    #[tokio::test]
    async fn test_incremental_arrival_reshuffles_whole_list() {
        let aggregator = Aggregator::with_seed(FetchCache::new(two_feed_source()), 99);
        let rx = aggregator.subscribe();

        aggregator.load_all(&[feed("A", FEED_A)]).await;
        let after_a = aggregator.snapshot();
        assert_eq!(after_a.len(), 3);

        aggregator.load_all(&[feed("A", FEED_A), feed("B", FEED_B)]).await;
        let after_b = rx.borrow().clone();

        // Same multiset plus the new feed; order is not stable across arrivals
        assert_eq!(after_b.len(), 5);
        let mut expected = sorted_titles(&after_a);
        expected.extend(["B item 0".to_string(), "B item 1".to_string()]);
        expected.sort();
        assert_eq!(sorted_titles(&after_b), expected);
    }

    #[tokio::test]
    async fn test_same_seed_same_order() {
        let feeds = [feed("A", FEED_A), feed("B", FEED_B)];

        let first = Aggregator::with_seed(FetchCache::new(two_feed_source()), 7);
        first.load_all(&feeds[..1]).await;
        first.load_all(&feeds[1..]).await;

        let second = Aggregator::with_seed(FetchCache::new(two_feed_source()), 7);
        second.load_all(&feeds[..1]).await;
        second.load_all(&feeds[1..]).await;

        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_seeded_order_ignores_arrival_timing() {
        let feeds = [feed("A", FEED_A), feed("B", FEED_B)];
        let slow = |url: &str| {
            StubSource::new()
                .with_channel(FEED_A, channel_with_items("A", 3))
                .with_channel(FEED_B, channel_with_items("B", 3))
                .with_url_delay(url, Duration::from_millis(150))
        };

        let a_last = Aggregator::with_seed(FetchCache::new(slow(FEED_A)), 42);
        a_last.load_all(&feeds).await;

        let b_last = Aggregator::with_seed(FetchCache::new(slow(FEED_B)), 42);
        b_last.load_all(&feeds).await;

        assert_eq!(a_last.snapshot().len(), 6);
        assert_eq!(a_last.snapshot(), b_last.snapshot());
    }

    #[tokio::test]
    async fn test_unseeded_load_merges_every_feed() {
        let aggregator = Aggregator::new(FetchCache::new(
            two_feed_source().with_url_delay(FEED_A, Duration::from_millis(50)),
        ));

        let merged = aggregator
            .load_all(&[feed("A", FEED_A), feed("B", FEED_B)])
            .await;

        assert_eq!(merged, 2);
        assert_eq!(aggregator.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn test_reload_does_not_duplicate() {
        let source = two_feed_source();
        let calls = source.calls();
        let aggregator = Aggregator::with_seed(FetchCache::new(source), 3);
        let feeds = [feed("A", FEED_A), feed("B", FEED_B)];

        aggregator.load_all(&feeds).await;
        let merged = aggregator.load_all(&feeds).await;

        assert_eq!(merged, 0);
        assert_eq!(aggregator.snapshot().len(), 5);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_follow_tracks_registry_snapshots() {
        let aggregator = Aggregator::with_seed(FetchCache::new(two_feed_source()), 5);
        let (tx, rx) = watch::channel(Arc::new(vec![feed("A", FEED_A)]));

        let driver = async {
            let mut combined = aggregator.subscribe();
            combined
                .wait_for(|articles| articles.len() == 3)
                .await
                .unwrap();

            tx.send_replace(Arc::new(vec![feed("A", FEED_A), feed("B", FEED_B)]));
            combined
                .wait_for(|articles| articles.len() == 5)
                .await
                .unwrap();

            drop(tx);
        };

        tokio::join!(aggregator.follow(rx), driver);
        assert_eq!(aggregator.snapshot().len(), 5);
    }

    #[tokio::test]
    async fn test_find_by_url() {
        let aggregator = Aggregator::with_seed(FetchCache::new(two_feed_source()), 1);
        aggregator.load_all(&[feed("B", FEED_B)]).await;

        let found = aggregator.find_by_url("https://b.example/posts/1").unwrap();
        assert_eq!(found.post_title, "B item 1");
        assert!(aggregator.find_by_url("https://nowhere.example/").is_none());
    }
}
