//! Feed aggregation and article-state engine.
//!
//! Subscribed feeds live in a [`services::FeedRegistry`], get fetched at most
//! once per session through a [`services::FetchCache`], and are merged into a
//! shuffled stream by the [`services::Aggregator`]. Saved articles are kept by
//! the [`services::BookmarkStore`].

pub mod cli;
pub mod config;
pub mod domain;
pub mod errors;
pub mod services;
pub mod sources;
pub mod storage;
