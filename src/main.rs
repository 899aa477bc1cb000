use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use newsfeed::cli::{Cli, Commands};
use newsfeed::config::Config;
use newsfeed::domain::Article;
use newsfeed::errors::{NewsfeedError, NewsfeedResult};
use newsfeed::services::{Aggregator, BookmarkStore, FeedRegistry, FetchCache};
use newsfeed::sources::RssAtomSource;
use newsfeed::storage::sqlite::{SqliteBookmarkRepository, SqliteFeedRepository, SqliteStorage};

type Registry = FeedRegistry<SqliteFeedRepository>;
type Bookmarks = BookmarkStore<SqliteBookmarkRepository>;
type Reader = Aggregator<Arc<RssAtomSource>>;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run() -> NewsfeedResult<()> {
    let cli = Cli::parse();
    init_logging();

    // Load configuration
    let config = Config::from_env()?;

    // One storage handle, shared by both repositories
    let storage = SqliteStorage::new(&config.db_path)?;

    // The blocking HTTP client has to live outside the async runtime
    let source = Arc::new(RssAtomSource::from_config(&config));

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(dispatch(cli.command, storage, Arc::clone(&source)));
    drop(runtime);

    result
}

async fn dispatch(
    command: Commands,
    storage: SqliteStorage,
    source: Arc<RssAtomSource>,
) -> NewsfeedResult<()> {
    let registry = FeedRegistry::open(SqliteFeedRepository::new(storage.clone())).await?;
    let bookmarks = BookmarkStore::open(SqliteBookmarkRepository::new(storage)).await?;

    let reader = |seed: Option<u64>| {
        let cache = FetchCache::new(Arc::clone(&source));
        match seed {
            Some(seed) => Aggregator::with_seed(cache, seed),
            None => Aggregator::new(cache),
        }
    };

    match command {
        Commands::Add { title, url } => cmd_add(&registry, &title, &url).await,
        Commands::Remove { url } => cmd_remove(&registry, url).await,
        Commands::List => cmd_list(&registry),
        Commands::Read { seed, limit } => {
            cmd_read(&registry, &bookmarks, &reader(seed), limit).await
        }
        Commands::Save { article_url } => {
            cmd_save(&registry, &bookmarks, &reader(None), &article_url).await
        }
        Commands::Unsave { article_url } => cmd_unsave(&bookmarks, &article_url).await,
        Commands::Saved => cmd_saved(&bookmarks),
        Commands::ClearSaved => cmd_clear_saved(&bookmarks).await,
    }
}

async fn cmd_add(registry: &Registry, title: &str, url: &str) -> NewsfeedResult<()> {
    let replaced = registry.get_by_url(url.trim()).await?.is_some();
    let feed = registry.add(title, url).await?;

    if replaced {
        println!("Feed updated!");
    } else {
        println!("Feed added successfully!");
    }
    println!("  Title: {}", feed.title);
    println!("  URL: {}", feed.url);

    Ok(())
}

async fn cmd_remove(registry: &Registry, url: Option<String>) -> NewsfeedResult<()> {
    if let Some(url) = url {
        match registry.get_by_url(&url).await? {
            Some(feed) => {
                registry.remove(&feed).await?;
                println!("Removed: {}", feed.title);
            }
            None => println!("No feed with URL {}", url),
        }
        return Ok(());
    }

    let feeds = registry.snapshot();

    if feeds.is_empty() {
        println!("No feeds to remove.");
        return Ok(());
    }

    // Display numbered list
    println!("Select a feed to remove:\n");
    for (i, feed) in feeds.iter().enumerate() {
        println!("  {}. {} ({})", i + 1, feed.title, feed.url);
    }
    println!();

    // Read user input
    print!("Enter number (or 'q' to cancel): ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let input = input.trim();

    if input.eq_ignore_ascii_case("q") {
        println!("Cancelled.");
        return Ok(());
    }

    let index: usize = input
        .parse()
        .map_err(|_| NewsfeedError::InvalidInput("Invalid number".to_string()))?;

    if index == 0 || index > feeds.len() {
        return Err(NewsfeedError::InvalidInput(
            "Number out of range".to_string(),
        ));
    }

    let feed = &feeds[index - 1];
    registry.remove(feed).await?;
    println!("Removed: {}", feed.title);

    Ok(())
}

fn cmd_list(registry: &Registry) -> NewsfeedResult<()> {
    let feeds = registry.snapshot();

    if feeds.is_empty() {
        println!("No feeds configured.");
        return Ok(());
    }

    println!("Configured feeds:\n");
    for feed in feeds.iter() {
        println!("  {}", feed.title);
        println!("    URL: {}", feed.url);
        println!();
    }

    Ok(())
}

async fn cmd_read(
    registry: &Registry,
    bookmarks: &Bookmarks,
    reader: &Reader,
    limit: Option<usize>,
) -> NewsfeedResult<()> {
    let feeds = registry.snapshot();

    if feeds.is_empty() {
        println!("No feeds configured.");
        return Ok(());
    }

    println!("Fetching {} feeds...\n", feeds.len());
    reader.load_all(&feeds).await;

    let articles = reader.snapshot();
    if articles.is_empty() {
        println!("No articles available.");
        return Ok(());
    }

    let shown = limit.unwrap_or(articles.len()).min(articles.len());
    for article in articles.iter().take(shown) {
        let saved = article
            .article_url
            .as_deref()
            .is_some_and(|url| bookmarks.contains(url));
        print_article(article, saved);
    }

    println!("Showing {} of {} articles.", shown, articles.len());
    Ok(())
}

async fn cmd_save(
    registry: &Registry,
    bookmarks: &Bookmarks,
    reader: &Reader,
    article_url: &str,
) -> NewsfeedResult<()> {
    println!("Fetching feeds...\n");
    reader.load_all(&registry.snapshot()).await;

    let article = reader.find_by_url(article_url).ok_or_else(|| {
        NewsfeedError::InvalidInput(format!("Article not found in your feeds: {}", article_url))
    })?;

    bookmarks.add(article_url, &article).await?;
    println!("Saved: {}", article.post_title);

    Ok(())
}

async fn cmd_unsave(bookmarks: &Bookmarks, article_url: &str) -> NewsfeedResult<()> {
    if !bookmarks.contains(article_url) {
        println!("Not bookmarked: {}", article_url);
        return Ok(());
    }

    bookmarks.remove(article_url).await?;
    println!("Removed bookmark: {}", article_url);

    Ok(())
}

fn cmd_saved(bookmarks: &Bookmarks) -> NewsfeedResult<()> {
    let saved = bookmarks.saved_articles();

    if saved.is_empty() {
        println!("No bookmarks saved.");
        return Ok(());
    }

    println!("Saved articles ({}):\n", saved.len());
    for article in &saved {
        print_article(article, true);
    }

    Ok(())
}

async fn cmd_clear_saved(bookmarks: &Bookmarks) -> NewsfeedResult<()> {
    let count = bookmarks.snapshot().len();
    bookmarks.clear_all().await?;
    println!("Cleared {} bookmarks.", count);

    Ok(())
}

fn print_article(article: &Article, saved: bool) {
    let marker = if saved { '*' } else { '-' };
    println!("{} {}", marker, article.post_title);
    println!("    {} ({})", article.title, article.source);

    if let Some(description) = article.description.as_deref().filter(|d| !d.is_empty()) {
        println!("    {}", description);
    }
    if let Some(category) = article.category.as_ref().filter(|c| !c.is_empty()) {
        println!("    [{}]", category.join(", "));
    }
    if let Some(url) = &article.article_url {
        println!("    {}", url);
    }
    println!();
}
