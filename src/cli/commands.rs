use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsfeed")]
#[command(about = "RSS/Atom aggregator with a shuffled reading stream and bookmarks")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to a feed (replaces an existing feed with the same URL)
    Add {
        /// Display name for the feed
        title: String,

        /// Full URL of the RSS/Atom feed
        url: String,
    },

    /// Remove a feed (interactive selection unless --url is given)
    Remove {
        /// URL of the feed to remove
        #[arg(long)]
        url: Option<String>,
    },

    /// List all feeds
    List,

    /// Fetch all feeds and print the combined, shuffled stream
    Read {
        /// Seed for the shuffle, for a reproducible order
        #[arg(long)]
        seed: Option<u64>,

        /// Show at most this many articles
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Bookmark an article from your feeds by its URL
    Save {
        /// Article URL
        article_url: String,
    },

    /// Remove a bookmark
    Unsave {
        /// Article URL
        article_url: String,
    },

    /// List bookmarked articles
    Saved,

    /// Delete every bookmark
    ClearSaved,
}
