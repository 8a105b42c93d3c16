//! Video list reconciliation against a progressively loaded channel listing.
//!
//! The listing shows videos newest first and loads more each time the page is
//! scrolled to the end. In CREATE mode every video is wanted (up to the cap). In
//! UPDATE mode only the videos above the last saved one are wanted.
//!
//! Videos are matched by title text. Two uploads sharing a title make the boundary
//! ambiguous: the first (newest) occurrence wins. Saved records carry no stable
//! video id to do better with.

use std::time::Duration;

use tracing::{debug, info};

use crate::browser::ChannelBrowser;
use crate::error::ScrapeError;
use crate::models::VideoRef;
use crate::utils::absolute_link;

/// Element id carried by every video entry of a channel listing.
pub const VIDEO_TITLE_ID: &str = "video-title";

/// What the listing holds for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The newest listed video is the last saved one.
    UpToDate,
    /// Videos to scrape, newest first.
    Videos(Vec<VideoRef>),
}

/// Drives reveal steps on the channel's video listing.
pub struct Reconciler<'a, B: ?Sized> {
    browser: &'a mut B,
    base_url: &'a str,
    delay: Duration,
    cap: Option<usize>,
}

impl<'a, B> Reconciler<'a, B>
where
    B: ChannelBrowser + ?Sized,
{
    pub fn new(browser: &'a mut B, base_url: &'a str, delay: Duration, cap: Option<usize>) -> Self {
        Self {
            browser,
            base_url,
            delay,
            cap,
        }
    }

    /// Work out the videos to scrape. `last_saved` selects UPDATE mode.
    pub async fn reconcile(
        &mut self,
        last_saved: Option<&str>,
    ) -> Result<Reconciliation, ScrapeError> {
        match last_saved {
            None => self.all_videos().await.map(Reconciliation::Videos),
            Some(title) => self.videos_since(title).await,
        }
    }

    /// CREATE mode: reveal until the listing stops growing or reaches the cap.
    async fn all_videos(&mut self) -> Result<Vec<VideoRef>, ScrapeError> {
        info!("Grabbing videos...");
        let mut previous = 0;
        let videos = loop {
            self.reveal().await?;
            let videos = self.listed_videos().await?;
            let count = videos.len();
            if count == previous || self.cap.is_some_and(|cap| count >= cap) {
                break videos;
            }
            previous = count;
        };

        info!("Total videos found: {}", videos.len());
        Ok(apply_cap(videos, self.cap))
    }

    /// UPDATE mode: reveal until `last_saved` is listed, then take what sits above it.
    async fn videos_since(&mut self, last_saved: &str) -> Result<Reconciliation, ScrapeError> {
        info!("Grabbing NEW videos...");
        let mut videos = self.listed_videos().await?;

        if videos.first().is_some_and(|v| v.title == last_saved) {
            info!("Found no new videos, records are up to date");
            return Ok(Reconciliation::UpToDate);
        }

        loop {
            let found = position_of(&videos, last_saved).is_some();
            // Past the cap, scrolling further cannot change what is kept.
            if found && self.cap.map_or(true, |cap| videos.len() > cap) {
                break;
            }

            self.reveal().await?;
            let next = self.listed_videos().await?;
            let grew = next.len() > videos.len();
            videos = next;
            if !grew {
                debug!("Listing stopped growing at {} videos", videos.len());
                break;
            }
        }

        let new_videos = new_videos_before(&videos, last_saved)
            .ok_or_else(|| ScrapeError::BoundaryNotFound(last_saved.to_string()))?;
        info!("New videos found: {}", new_videos.len());

        if new_videos.is_empty() {
            return Ok(Reconciliation::UpToDate);
        }
        Ok(Reconciliation::Videos(apply_cap(new_videos, self.cap)))
    }

    async fn reveal(&mut self) -> Result<(), ScrapeError> {
        self.browser.send_end_key().await?;
        tokio::time::sleep(self.delay).await;
        Ok(())
    }

    async fn listed_videos(&mut self) -> Result<Vec<VideoRef>, ScrapeError> {
        let elements = self.browser.find_all_by_id(VIDEO_TITLE_ID).await?;
        Ok(elements
            .into_iter()
            .filter_map(|element| {
                let href = element.href?;
                Some(VideoRef::new(element.text, absolute_link(self.base_url, &href)))
            })
            .collect())
    }
}

/// Index of the first (newest) video titled `title`.
pub fn position_of(videos: &[VideoRef], title: &str) -> Option<usize> {
    videos.iter().position(|v| v.title == title)
}

/// Videos strictly above the first video titled `last_saved`, or `None` if it is not listed.
pub fn new_videos_before(videos: &[VideoRef], last_saved: &str) -> Option<Vec<VideoRef>> {
    position_of(videos, last_saved).map(|idx| videos[..idx].to_vec())
}

/// Keep at most `cap` videos.
pub fn apply_cap(mut videos: Vec<VideoRef>, cap: Option<usize>) -> Vec<VideoRef> {
    if let Some(cap) = cap {
        videos.truncate(cap);
    }
    videos
}
