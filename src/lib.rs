//! channel-links: collect the outbound links of a video channel's descriptions.
//!
//! A run searches for a channel, works out which videos were uploaded since the
//! last run, filters the links found in their descriptions and keeps them in a
//! per-channel CSV file, newest first.

pub mod browser;
pub mod cli;
pub mod config;
pub mod description;
pub mod error;
pub mod filter;
pub mod models;
pub mod reconcile;
pub mod resolver;
pub mod scrape;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;

pub use error::{BrowserError, ScrapeError, StoreError};
pub use scrape::{ChannelScraper, RunOutcome};
