//! Channel scrape orchestration.
//!
//! One run: find the channel through the search page, load what was saved for it,
//! reconcile the listing, scrape the description of every wanted video, then write
//! the new records ahead of the saved ones.

use std::path::PathBuf;

use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::browser::ChannelBrowser;
use crate::config::Settings;
use crate::description::extract_video_page;
use crate::error::ScrapeError;
use crate::filter::{ExclusionSet, LinkFilter};
use crate::models::{ChannelSession, VideoLinkRecord, VideoRef};
use crate::reconcile::{Reconciler, Reconciliation};
use crate::resolver::LinkResolver;
use crate::storage::RecordStore;

/// Element id of channel entries on the search results page.
pub const CHANNEL_TITLE_ID: &str = "channel-title";

/// Class of the control expanding a truncated description.
pub const EXPAND_BUTTON_CLASS: &str = "more-button";

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Nothing was uploaded since the last run; the record file was left alone.
    UpToDate { channel: String },
    /// The record file was (re)written.
    Written {
        channel: String,
        path: PathBuf,
        new_records: usize,
        total_records: usize,
    },
}

/// Drives one channel scrape over a browser session, a resolver and a record store.
pub struct ChannelScraper<B, R, S> {
    browser: B,
    resolver: R,
    store: S,
    settings: Settings,
    exclusions: ExclusionSet,
    progress: ProgressBar,
}

impl<B, R, S> ChannelScraper<B, R, S>
where
    B: ChannelBrowser,
    R: LinkResolver,
    S: RecordStore,
{
    pub fn new(browser: B, resolver: R, store: S, settings: Settings) -> Self {
        let exclusions = settings.exclusion_set();
        Self {
            browser,
            resolver,
            store,
            settings,
            exclusions,
            progress: ProgressBar::hidden(),
        }
    }

    /// Report per-video progress on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Scrape the channel best matching `query`. The browser is closed however the run ends.
    pub async fn run(&mut self, query: &str) -> Result<RunOutcome, ScrapeError> {
        let result = self.scrape(query).await;
        self.progress.finish_and_clear();
        self.browser.close().await;
        result
    }

    async fn scrape(&mut self, query: &str) -> Result<RunOutcome, ScrapeError> {
        let channel_name = self.find_channel(query).await?;

        let prior = self.store.load(&channel_name)?;
        let session = ChannelSession::new(channel_name, prior);
        info!(
            "{} mode for {} ({} saved records)",
            session.mode(),
            session.channel_name(),
            session.prior_records().len()
        );

        let videos = match self.list_videos(&session).await? {
            Reconciliation::UpToDate => {
                return Ok(RunOutcome::UpToDate {
                    channel: session.channel_name().to_string(),
                })
            }
            Reconciliation::Videos(videos) => videos,
        };

        let new_records = self.scrape_videos(&videos).await;
        let new_count = new_records.len();

        let channel = session.channel_name().to_string();
        let merged = session.merge(new_records);
        if merged.is_empty() {
            warn!("No data was found!");
        }

        let path = self.store.persist(&channel, &merged)?;
        Ok(RunOutcome::Written {
            channel,
            path,
            new_records: new_count,
            total_records: merged.len(),
        })
    }

    /// Search for `query` and open the first channel result. Returns its display name.
    async fn find_channel(&mut self, query: &str) -> Result<String, ScrapeError> {
        let search_url = format!(
            "{}/results?search_query={}",
            self.settings.base_url,
            urlencoding::encode(query)
        );
        self.browser.navigate(&search_url).await?;

        let name = self
            .browser
            .find_all_by_id(CHANNEL_TITLE_ID)
            .await?
            .into_iter()
            .next()
            .map(|element| element.text)
            .filter(|text| !text.is_empty())
            .ok_or_else(|| ScrapeError::ChannelNotFound(query.to_string()))?;

        if !self.browser.click_first_by_id(CHANNEL_TITLE_ID).await? {
            return Err(ScrapeError::ChannelNotFound(query.to_string()));
        }

        info!("Found channel {}", name);
        Ok(name)
    }

    async fn list_videos(&mut self, session: &ChannelSession) -> Result<Reconciliation, ScrapeError> {
        let channel_url = self.browser.current_url().await?;
        let listing_url = format!("{}/videos", channel_url.trim_end_matches('/'));
        self.browser.navigate(&listing_url).await?;

        Reconciler::new(
            &mut self.browser,
            &self.settings.base_url,
            self.settings.delay(),
            self.settings.video_cap,
        )
        .reconcile(session.last_saved_title())
        .await
    }

    /// Scrape every video in order. A failing video is logged and skipped.
    async fn scrape_videos(&mut self, videos: &[VideoRef]) -> Vec<VideoLinkRecord> {
        let total = videos.len();
        self.progress.set_length(total as u64);

        let mut records = Vec::new();
        for (i, video) in videos.iter().enumerate() {
            self.progress
                .set_message(format!("({}/{}) - {}", i + 1, total, video.title));
            match self.scrape_video(video).await {
                Ok(found) => {
                    debug!("{} links kept from {}", found.len(), video.title);
                    records.extend(found);
                }
                Err(e) => warn!("Skipping \"{}\" ({}): {}", video.title, video.url, e),
            }
            self.progress.inc(1);
        }
        records
    }

    async fn scrape_video(&mut self, video: &VideoRef) -> Result<Vec<VideoLinkRecord>, ScrapeError> {
        self.browser.navigate(&video.url).await?;

        match self
            .browser
            .click_by_class(EXPAND_BUTTON_CLASS, self.settings.expand_wait())
            .await
        {
            Ok(true) => debug!("Expanded description of {}", video.title),
            Ok(false) => debug!("No expand control on {}", video.title),
            Err(e) => debug!("Expand control check failed on {}: {}", video.title, e),
        }

        let current_url = self.browser.current_url().await?;
        let content = extract_video_page(&self.browser.page_source().await?);
        let title = content
            .title
            .ok_or_else(|| ScrapeError::MissingTitle(video.url.clone()))?;

        let filter = LinkFilter {
            exclusions: &self.exclusions,
            base_url: &self.settings.base_url,
            current_video_url: &current_url,
            video_title: &title,
        };
        Ok(filter.apply(content.links, &self.resolver).await)
    }
}
