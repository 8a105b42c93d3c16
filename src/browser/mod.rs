//! Browser automation seam.
//!
//! The scraper only needs a handful of page primitives; [`ChannelBrowser`] names them
//! so the run can be driven by chromiumoxide in production and by scripted pages in tests.

mod chrome;
mod config;

pub use chrome::ChromeBrowser;
pub use config::{devtools_version_url, BrowserConfig};

use std::time::Duration;

use async_trait::async_trait;

use crate::error::BrowserError;

/// Text and link target of a page element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    pub text: String,
    pub href: Option<String>,
}

impl ElementInfo {
    pub fn new(text: impl Into<String>, href: Option<&str>) -> Self {
        Self {
            text: text.into(),
            href: href.map(str::to_string),
        }
    }
}

/// Page primitives used by a channel scrape. One session serves the whole run.
#[async_trait]
pub trait ChannelBrowser: Send {
    /// Load `url` in the session page and wait for it to settle.
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// URL of the page currently shown (after any redirects or clicks).
    async fn current_url(&mut self) -> Result<String, BrowserError>;

    /// Serialized markup of the current page.
    async fn page_source(&mut self) -> Result<String, BrowserError>;

    /// All elements carrying `id`, in document order. Pages may repeat ids.
    async fn find_all_by_id(&mut self, id: &str) -> Result<Vec<ElementInfo>, BrowserError>;

    /// Click the first element carrying `id`. Returns false when there is none.
    async fn click_first_by_id(&mut self, id: &str) -> Result<bool, BrowserError>;

    /// Wait up to `timeout` for an element with class `class` and click it.
    /// Returns false when it never shows up.
    async fn click_by_class(&mut self, class: &str, timeout: Duration)
        -> Result<bool, BrowserError>;

    /// Press End on the page body, asking a lazy listing to load more.
    async fn send_end_key(&mut self) -> Result<(), BrowserError>;

    /// Release the session. Safe to call more than once.
    async fn close(&mut self);
}
