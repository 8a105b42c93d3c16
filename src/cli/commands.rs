//! CLI parser and the scrape command.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use console::style;

use crate::browser::ChromeBrowser;
use crate::config::{load_settings, Settings};
use crate::resolver::HttpResolver;
use crate::scrape::{ChannelScraper, RunOutcome};
use crate::storage::CsvStore;

use super::helpers::{prompt_query, truncate, video_progress_bar};

#[derive(Parser)]
#[command(name = "channel-links")]
#[command(about = "Collect outbound links from a channel's video descriptions")]
#[command(version)]
pub struct Cli {
    /// Channel to search for (prompted when omitted)
    query: Option<String>,

    /// Config file path (overrides auto-discovery)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Scrape at most this many videos
    #[arg(short, long)]
    limit: Option<usize>,

    /// Seconds to wait after each scroll of the video listing
    #[arg(long)]
    delay: Option<f64>,

    /// Directory for the record files
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Show the browser window
    #[arg(long)]
    headful: bool,

    /// Connect to a running Chrome DevTools endpoint instead of launching one
    #[arg(long, env = "CHANNEL_LINKS_REMOTE_URL")]
    remote_url: Option<String>,
}

impl Cli {
    /// Command line flags win over the config file.
    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(limit) = self.limit {
            settings.video_cap = Some(limit);
        }
        if let Some(delay) = self.delay {
            settings.delay_seconds = delay;
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = dir.clone();
        }
        if self.headful {
            settings.browser.headless = false;
        }
        if let Some(ref url) = self.remote_url {
            settings.browser.remote_url = Some(url.clone());
        }
    }
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (mut settings, _config) = load_settings(cli.config.as_deref())
        .await
        .map_err(anyhow::Error::msg)?;
    cli.apply_overrides(&mut settings);

    let query = match cli.query {
        Some(ref query) => query.trim().to_string(),
        None => prompt_query().context("Failed to read channel from stdin")?,
    };
    if query.is_empty() {
        anyhow::bail!("No channel given");
    }

    cmd_scrape(settings, &query).await
}

async fn cmd_scrape(settings: Settings, query: &str) -> anyhow::Result<()> {
    println!("{} Searching for channel: {}", style("→").cyan(), query);

    let resolver = HttpResolver::new(
        settings.request_timeout(),
        settings.max_redirects,
        settings.user_agent.as_deref(),
    )
    .context("Failed to build HTTP client")?;
    let store = CsvStore::new(settings.output_dir.clone());
    let browser = ChromeBrowser::new(settings.browser.clone());

    let mut scraper =
        ChannelScraper::new(browser, resolver, store, settings).with_progress(video_progress_bar());

    let outcome = scraper
        .run(query)
        .await
        .with_context(|| format!("Scrape of \"{}\" failed", query))?;

    match outcome {
        RunOutcome::UpToDate { channel } => {
            println!(
                "{} {} is up to date, no new videos",
                style("✓").green(),
                style(truncate(&channel, 60)).bold()
            );
        }
        RunOutcome::Written {
            path, total_records, ..
        } if total_records == 0 => {
            println!(
                "{} No data was found! Wrote headers to {}",
                style("!").yellow(),
                path.display()
            );
        }
        RunOutcome::Written {
            channel,
            path,
            new_records,
            total_records,
        } => {
            println!(
                "{} {}: {} new links ({} total) written to {}",
                style("✓").green(),
                style(truncate(&channel, 60)).bold(),
                new_records,
                total_records,
                path.display()
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::parse_from([
            "channel-links",
            "wood shop",
            "--limit",
            "5",
            "--delay",
            "0.5",
            "-o",
            "/tmp/links",
            "--headful",
        ]);
        assert_eq!(cli.query.as_deref(), Some("wood shop"));

        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.video_cap, Some(5));
        assert_eq!(settings.delay_seconds, 0.5);
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/links"));
        assert!(!settings.browser.headless);
    }

    #[test]
    fn test_no_flags_keep_settings() {
        let cli = Cli::parse_from(["channel-links"]);
        assert!(cli.query.is_none());

        let mut settings = Settings::default();
        cli.apply_overrides(&mut settings);
        assert_eq!(settings.video_cap, None);
        assert!(settings.browser.headless);
    }
}
