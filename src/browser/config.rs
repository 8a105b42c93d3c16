//! Browser engine configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use crate::error::BrowserError;

/// Browser engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Run in headless mode (default: true).
    /// Set to false to watch the run or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Page load timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Explicit Chrome/Chromium executable (skips discovery).
    #[serde(default)]
    pub chrome_path: Option<PathBuf>,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_timeout() -> u64 {
    30
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            timeout: default_timeout(),
            chrome_path: None,
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

/// HTTP endpoint describing a remote DevTools session, for a `ws://`, `wss://` or `http(s)://` URL.
pub fn devtools_version_url(remote_url: &str) -> Result<String, BrowserError> {
    let mut url = Url::parse(remote_url)
        .map_err(|e| BrowserError::Launch(format!("Invalid remote browser URL {}: {}", remote_url, e)))?;

    let scheme = match url.scheme() {
        "ws" | "http" => "http",
        "wss" | "https" => "https",
        other => {
            return Err(BrowserError::Launch(format!(
                "Unsupported remote browser scheme: {}",
                other
            )))
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| BrowserError::Launch(format!("Cannot use {} over {}", remote_url, scheme)))?;
    url.set_path("/json/version");
    url.set_query(None);
    Ok(url.to_string())
}
