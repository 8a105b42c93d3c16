//! Configuration management for channel-links using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::browser::BrowserConfig;
use crate::filter::ExclusionSet;

/// Default platform root that relative links are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// Default seconds to wait after each reveal step on the channel listing.
pub const DEFAULT_DELAY_SECONDS: f64 = 2.5;

/// Site names whose links are never collected.
pub const DEFAULT_EXCLUDED_KEYWORDS: &[&str] = &[
    "facebook",
    "instagram",
    "twitter",
    "youtube",
    "weibo",
    "whatsapp",
    "patreon",
    "wechat",
    "tumblr",
    "snapchat",
    "reddit",
    "linkedin",
    "bilibili",
    "discordapp",
    "twitch",
    "amazon",
    "docs.google",
    "tiktok",
];

/// Suffixes joined onto every excluded keyword.
pub const DEFAULT_EXCLUDED_EXTENSIONS: &[&str] = &[".com", ".tv", ".ca"];

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Platform root, e.g. `https://www.youtube.com`.
    pub base_url: String,
    /// Seconds to wait after each reveal step.
    pub delay_seconds: f64,
    /// Most videos scraped per run (`None` = all).
    pub video_cap: Option<usize>,
    pub excluded_keywords: Vec<String>,
    pub excluded_extensions: Vec<String>,
    /// Directory holding the per-channel record files.
    pub output_dir: PathBuf,
    /// Redirect resolution timeout in seconds.
    pub request_timeout: u64,
    pub max_redirects: usize,
    /// `None` for the default agent, `"impersonate"` for a browser agent, or a literal string.
    pub user_agent: Option<String>,
    /// Seconds to wait for a description's expand control.
    pub expand_wait_seconds: u64,
    pub browser: BrowserConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            delay_seconds: DEFAULT_DELAY_SECONDS,
            video_cap: None,
            excluded_keywords: to_strings(DEFAULT_EXCLUDED_KEYWORDS),
            excluded_extensions: to_strings(DEFAULT_EXCLUDED_EXTENSIONS),
            output_dir: PathBuf::from("."),
            request_timeout: 30,
            max_redirects: 10,
            user_agent: None,
            expand_wait_seconds: 10,
            browser: BrowserConfig::default(),
        }
    }
}

impl Settings {
    /// Reveal delay. Negative or non-finite values count as no delay.
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::ZERO)
    }

    pub fn expand_wait(&self) -> Duration {
        Duration::from_secs(self.expand_wait_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Exclusion set for the configured keywords and extensions.
    pub fn exclusion_set(&self) -> ExclusionSet {
        ExclusionSet::build(&self.excluded_keywords, &self.excluded_extensions)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_seconds: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_cap: Option<usize>,
    /// Replaces the default keyword list entirely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excluded_extensions: Option<Vec<String>>,
    /// Output directory; relative paths resolve against the config file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_redirects: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expand_wait_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    /// Falls back to defaults when no file is found or it fails to parse.
    pub async fn load() -> Self {
        match prefer::load("channel-links").await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("Ignoring config file: {}", e);
                            Self::default()
                        }
                    }
                } else {
                    Self::default()
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the extension: TOML, YAML, or JSON otherwise.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file {}: {}", path.display(), e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        match ext {
            "toml" => {
                toml::from_str(contents).map_err(|e| format!("Failed to parse TOML config: {}", e))
            }
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e)),
            _ => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e)),
        }
    }

    /// Directory of the config file, if it came from one.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// `~` is expanded; other relative paths are joined onto `base_dir`.
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Lay every value present in the file over `settings`.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref base_url) = self.base_url {
            settings.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(delay) = self.delay_seconds {
            settings.delay_seconds = delay;
        }
        if let Some(cap) = self.video_cap {
            settings.video_cap = Some(cap);
        }
        if let Some(ref keywords) = self.excluded_keywords {
            settings.excluded_keywords = keywords.clone();
        }
        if let Some(ref extensions) = self.excluded_extensions {
            settings.excluded_extensions = extensions.clone();
        }
        if let Some(ref output_dir) = self.output_dir {
            settings.output_dir = self.resolve_path(output_dir, base_dir);
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = timeout;
        }
        if let Some(max_redirects) = self.max_redirects {
            settings.max_redirects = max_redirects;
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(wait) = self.expand_wait_seconds {
            settings.expand_wait_seconds = wait;
        }
        if let Some(ref browser) = self.browser {
            settings.browser = browser.clone();
        }
    }
}

/// Load settings from `config_path`, or from a discovered config file when `None`.
///
/// An explicitly given file must exist and parse; a discovered one is best-effort.
pub async fn load_settings(config_path: Option<&Path>) -> Result<(Settings, Config), String> {
    let config = match config_path {
        Some(path) => Config::load_from_path(path).await?,
        None => Config::load().await,
    };

    let base_dir = config
        .base_dir()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings, &base_dir);
    Ok((settings, config))
}
