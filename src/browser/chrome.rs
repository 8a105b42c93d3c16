//! Chromium-backed browser session.
//!
//! Uses chromiumoxide (CDP). Launches a local Chrome/Chromium with automation
//! markers disabled, or attaches to a remote DevTools endpoint.

#[cfg(feature = "browser")]
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
#[cfg(feature = "browser")]
use tracing::{debug, info, warn};

#[cfg(feature = "browser")]
use chromiumoxide::error::CdpError;
#[cfg(feature = "browser")]
use chromiumoxide::{Browser, BrowserConfig as CdpBrowserConfig, Page};
#[cfg(feature = "browser")]
use futures::StreamExt;

#[cfg(feature = "browser")]
use super::devtools_version_url;
use super::{BrowserConfig, ChannelBrowser, ElementInfo};
use crate::error::BrowserError;

/// JavaScript to wait for page ready state.
#[cfg(feature = "browser")]
const WAIT_FOR_READY_SCRIPT: &str = r#"
    new Promise((resolve) => {
        if (document.readyState === 'complete' || document.readyState === 'interactive') {
            resolve(document.readyState);
        } else {
            document.addEventListener('DOMContentLoaded', () => resolve(document.readyState));
            setTimeout(() => resolve('timeout'), 10000);
        }
    })
"#;

/// How often to look again for an element that has not rendered yet.
#[cfg(feature = "browser")]
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Where the session's browser came from.
#[cfg(any(feature = "browser", test))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ownership {
    /// Started by this session; the process is ours to shut down.
    Launched,
    /// Someone else's browser, reached over DevTools. Only our tab is ours.
    Attached,
}

#[cfg(any(feature = "browser", test))]
impl Ownership {
    fn for_config(config: &BrowserConfig) -> Self {
        if config.remote_url.is_some() {
            Ownership::Attached
        } else {
            Ownership::Launched
        }
    }

    /// Whether releasing the session should send `Browser.close`.
    fn shuts_down_browser(self) -> bool {
        self == Ownership::Launched
    }
}

#[cfg(feature = "browser")]
impl From<CdpError> for BrowserError {
    fn from(e: CdpError) -> Self {
        BrowserError::Protocol(e.to_string())
    }
}

/// Browser session driven over the Chrome DevTools Protocol.
#[cfg(feature = "browser")]
pub struct ChromeBrowser {
    config: BrowserConfig,
    browser: Option<Browser>,
    page: Option<Page>,
    ownership: Ownership,
}

#[cfg(feature = "browser")]
impl ChromeBrowser {
    /// Common Chrome executable paths to check.
    const CHROME_PATHS: &'static [&'static str] = &[
        // Linux
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        // macOS
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
        // Common install locations
        "/opt/google/chrome/google-chrome",
    ];

    /// Create a session. Chrome is started lazily on first navigation.
    pub fn new(config: BrowserConfig) -> Self {
        let ownership = Ownership::for_config(&config);
        Self {
            config,
            browser: None,
            page: None,
            ownership,
        }
    }

    /// Find Chrome executable.
    fn find_chrome(&self) -> Result<PathBuf, BrowserError> {
        if let Some(ref path) = self.config.chrome_path {
            return Ok(path.clone());
        }

        for path in Self::CHROME_PATHS {
            let p = std::path::Path::new(path);
            if p.exists() {
                info!("Found Chrome at: {}", path);
                return Ok(p.to_path_buf());
            }
        }

        for cmd in [
            "google-chrome",
            "google-chrome-stable",
            "chromium",
            "chromium-browser",
        ] {
            if let Ok(path) = which::which(cmd) {
                info!("Found Chrome in PATH: {}", path.display());
                return Ok(path);
            }
        }

        Err(BrowserError::Launch(
            "Chrome/Chromium not found. Please install it:\n\
             - Arch/Manjaro: sudo pacman -S chromium\n\
             - Ubuntu/Debian: sudo apt install chromium-browser\n\
             - Fedora: sudo dnf install chromium\n\
             - Or download from: https://www.google.com/chrome/"
                .to_string(),
        ))
    }

    /// Launch or connect to browser if not already running.
    async fn ensure_browser(&mut self) -> Result<(), BrowserError> {
        if self.page.is_some() {
            return Ok(());
        }

        let browser = match (self.ownership, self.config.remote_url.clone()) {
            (Ownership::Attached, Some(remote_url)) => self.connect_remote(&remote_url).await?,
            _ => self.launch().await?,
        };
        let page = browser.new_page("about:blank").await?;

        self.browser = Some(browser);
        self.page = Some(page);
        Ok(())
    }

    async fn launch(&self) -> Result<Browser, BrowserError> {
        info!("Launching browser (headless={})", self.config.headless);

        let chrome_path = self.find_chrome()?;
        let mut builder = CdpBrowserConfig::builder()
            .chrome_executable(chrome_path)
            .request_timeout(Duration::from_secs(self.config.timeout));

        // with_head means NOT headless
        if !self.config.headless {
            builder = builder.with_head();
        }

        builder = builder
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg("--disable-sync")
            .arg("--disable-translate")
            .arg("--mute-audio")
            .arg("--autoplay-policy=user-gesture-required")
            .arg("--no-sandbox") // Often needed for headless in containers/restricted environments
            .arg("--disable-gpu");

        for arg in &self.config.chrome_args {
            builder = builder.arg(arg);
        }

        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    /// Connect to a remote Chrome instance.
    async fn connect_remote(&self, url: &str) -> Result<Browser, BrowserError> {
        info!(
            "Connecting to remote browser at {} (timeout: {}s)",
            url, self.config.timeout
        );

        // Get WebSocket URL from the /json/version endpoint
        let version_url = devtools_version_url(url)?;

        let resp: serde_json::Value = reqwest::Client::new()
            .get(&version_url)
            .send()
            .await
            .map_err(|e| BrowserError::Launch(format!("Failed to reach remote browser: {}", e)))?
            .json()
            .await
            .map_err(|e| BrowserError::Launch(format!("Bad browser version info: {}", e)))?;

        let ws_url = resp
            .get("webSocketDebuggerUrl")
            .and_then(|v| v.as_str())
            .ok_or_else(|| BrowserError::Launch("No webSocketDebuggerUrl in response".into()))?;

        info!("Connecting to WebSocket: {}", ws_url);

        let handler_config = chromiumoxide::handler::HandlerConfig {
            request_timeout: Duration::from_secs(self.config.timeout),
            ..Default::default()
        };

        let (browser, mut handler) = Browser::connect_with_config(ws_url, handler_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        Ok(browser)
    }

    fn page(&self) -> Result<&Page, BrowserError> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::Protocol("browser session not started".into()))
    }

    /// Wait for the page to reach a ready state.
    async fn wait_for_page_ready(&self, page: &Page) {
        let ready_timeout = Duration::from_secs(self.config.timeout);
        match tokio::time::timeout(ready_timeout, page.evaluate(WAIT_FOR_READY_SCRIPT.to_string())).await {
            Ok(Ok(result)) => {
                let state: String = result
                    .into_value()
                    .unwrap_or_else(|_| "unknown".to_string());
                debug!("Page ready state: {}", state);
            }
            Ok(Err(e)) => debug!("Could not check ready state: {}", e),
            Err(_) => warn!("Timeout waiting for page ready state"),
        }
    }
}

#[cfg(feature = "browser")]
#[async_trait]
impl ChannelBrowser for ChromeBrowser {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        self.ensure_browser().await?;
        let page = self.page()?;

        info!("Navigating to {}", url);
        let nav_timeout = Duration::from_secs(self.config.timeout);
        tokio::time::timeout(nav_timeout, page.goto(url))
            .await
            .map_err(|_| BrowserError::NavigationTimeout {
                url: url.to_string(),
                timeout_secs: self.config.timeout,
            })?
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.wait_for_page_ready(page).await;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        let page = self.page()?;
        Ok(page.url().await?.unwrap_or_default())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self.page()?.content().await?)
    }

    async fn find_all_by_id(&mut self, id: &str) -> Result<Vec<ElementInfo>, BrowserError> {
        let page = self.page()?;
        // Attribute selector, so repeated ids all match.
        let elements = page.find_elements(format!("[id=\"{}\"]", id)).await?;

        let mut found = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element.inner_text().await?.unwrap_or_default();
            let href = element.attribute("href").await?;
            found.push(ElementInfo {
                text: text.trim().to_string(),
                href,
            });
        }
        Ok(found)
    }

    async fn click_first_by_id(&mut self, id: &str) -> Result<bool, BrowserError> {
        let page = self.page()?;
        match page.find_element(format!("[id=\"{}\"]", id)).await {
            Ok(element) => {
                element.click().await?;
                // Client-side routing may never fire a navigation event.
                let nav_timeout = Duration::from_secs(self.config.timeout);
                if tokio::time::timeout(nav_timeout, page.wait_for_navigation())
                    .await
                    .is_err()
                {
                    debug!("No navigation seen after clicking #{}", id);
                }
                self.wait_for_page_ready(page).await;
                Ok(true)
            }
            Err(e) => {
                debug!("No element with id {}: {}", id, e);
                Ok(false)
            }
        }
    }

    async fn click_by_class(
        &mut self,
        class: &str,
        timeout: Duration,
    ) -> Result<bool, BrowserError> {
        let page = self.page()?;
        let selector = format!(".{}", class);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if let Ok(element) = page.find_element(selector.as_str()).await {
                return match element.click().await {
                    Ok(_) => Ok(true),
                    Err(e) => {
                        debug!("Element .{} present but not clickable: {}", class, e);
                        Ok(false)
                    }
                };
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(false);
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn send_end_key(&mut self) -> Result<(), BrowserError> {
        let page = self.page()?;
        page.find_element("body").await?.press_key("End").await?;
        Ok(())
    }

    async fn close(&mut self) {
        let page = self.page.take();
        let Some(mut browser) = self.browser.take() else {
            return;
        };

        if self.ownership.shuts_down_browser() {
            if let Err(e) = browser.close().await {
                debug!("Browser close: {}", e);
            }
            let _ = browser.wait().await;
        } else {
            // Leave the remote browser running; only our tab goes away.
            if let Some(page) = page {
                if let Err(e) = page.close().await {
                    debug!("Page close: {}", e);
                }
            }
            info!("Detached from remote browser");
        }
    }
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct ChromeBrowser {
    #[allow(dead_code)]
    config: BrowserConfig,
}

#[cfg(not(feature = "browser"))]
impl ChromeBrowser {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl ChannelBrowser for ChromeBrowser {
    async fn navigate(&mut self, _url: &str) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn find_all_by_id(&mut self, _id: &str) -> Result<Vec<ElementInfo>, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn click_first_by_id(&mut self, _id: &str) -> Result<bool, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn click_by_class(
        &mut self,
        _class: &str,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn send_end_key(&mut self) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn close(&mut self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launched_browser_is_shut_down() {
        let ownership = Ownership::for_config(&BrowserConfig::default());
        assert_eq!(ownership, Ownership::Launched);
        assert!(ownership.shuts_down_browser());
    }

    #[test]
    fn test_remote_browser_is_left_running() {
        let config = BrowserConfig {
            remote_url: Some("ws://localhost:9222".to_string()),
            ..Default::default()
        };
        let ownership = Ownership::for_config(&config);
        assert_eq!(ownership, Ownership::Attached);
        assert!(!ownership.shuts_down_browser());
    }
}
