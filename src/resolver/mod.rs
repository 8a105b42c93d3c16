//! Redirect resolution for shortened description links.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{redirect, Client};
use tracing::{debug, warn};

/// Sent with every HEAD request unless the settings name another agent.
pub const USER_AGENT: &str = "channel-links/0.1 (link collection)";

/// Setting value that asks to look like a desktop browser.
const IMPERSONATE: &str = "impersonate";

/// Desktop browser agents, for link shorteners that turn away unknown clients.
const DESKTOP_AGENTS: &[&str] = &[
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_5) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.5 Safari/605.1.15",
];

/// The agent string for a `user_agent` setting. One run keeps one desktop agent.
fn agent_for(setting: Option<&str>) -> &str {
    match setting {
        None => USER_AGENT,
        Some(IMPERSONATE) => DESKTOP_AGENTS[std::process::id() as usize % DESKTOP_AGENTS.len()],
        Some(agent) => agent,
    }
}

/// Turns a link's display text into the URL it finally lands on.
///
/// Implementations never fail: when the destination cannot be determined the
/// display text comes back unchanged.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, display_text: &str) -> String;
}

/// Resolver issuing one redirect-following HEAD request per link.
#[derive(Clone)]
pub struct HttpResolver {
    client: Client,
}

impl HttpResolver {
    /// Build a resolver with a request timeout and a redirect limit.
    ///
    /// `user_agent` is sent as given, except that `None` means [`USER_AGENT`] and
    /// `"impersonate"` picks a desktop browser's agent.
    pub fn new(
        timeout: Duration,
        max_redirects: usize,
        user_agent: Option<&str>,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(agent_for(user_agent))
            .timeout(timeout)
            .redirect(redirect::Policy::limited(max_redirects))
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl LinkResolver for HttpResolver {
    async fn resolve(&self, display_text: &str) -> String {
        match self.client.head(display_text).send().await {
            Ok(response) => {
                let final_url = response.url().to_string();
                debug!(
                    "Resolved {} -> {} ({})",
                    display_text,
                    final_url,
                    response.status()
                );
                final_url
            }
            Err(e) => {
                warn!(
                    "Unable to resolve {}, keeping the original link: {}",
                    display_text, e
                );
                display_text.to_string()
            }
        }
    }
}
