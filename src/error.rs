//! Error types for a channel scrape run.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the browser collaborator.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,

    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Navigation timed out after {timeout_secs}s for {url}")]
    NavigationTimeout { url: String, timeout_secs: u64 },

    #[error("Browser protocol error: {0}")]
    Protocol(String),
}

/// Errors raised while loading or persisting channel records.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// Errors that end a channel scrape run, or a single video within it.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The search page listed no channel. Fatal for the run.
    #[error("Could not find channel from search: {0}")]
    ChannelNotFound(String),

    /// The listing stopped growing before the last saved video showed up.
    #[error("Last saved video \"{0}\" is no longer in the channel listing")]
    BoundaryNotFound(String),

    /// The video page had no recognizable title heading.
    #[error("Video page has no title: {0}")]
    MissingTitle(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
