//! Scripted collaborators for unit tests.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::browser::{ChannelBrowser, ElementInfo};
use crate::error::{BrowserError, StoreError};
use crate::models::VideoLinkRecord;
use crate::resolver::LinkResolver;
use crate::storage::RecordStore;

/// A fake channel site: a search result, a listing revealed in steps, and watch pages.
#[derive(Default)]
pub(crate) struct ScriptedBrowser {
    videos: Vec<ElementInfo>,
    /// Number of listed videos after each reveal step; the last value repeats.
    steps: Vec<usize>,
    stage: usize,
    reveals: usize,
    channels: Vec<(String, String)>,
    pages: HashMap<String, String>,
    failing: HashSet<String>,
    expand_fails: bool,
    current: String,
    visited: Vec<String>,
    closed: bool,
}

impl ScriptedBrowser {
    /// A channel with `count` videos, newest ("Video {count}") first.
    pub fn channel(count: usize, steps: &[usize]) -> Self {
        let videos = (1..=count)
            .rev()
            .map(|n| {
                ElementInfo::new(format!("Video {}", n), Some(format!("/watch?v=vid{}", n).as_str()))
            })
            .collect();
        Self {
            videos,
            steps: steps.to_vec(),
            ..Default::default()
        }
    }

    /// Add a channel to the search results; results keep the order they were added in.
    pub fn with_channel(mut self, name: &str, url: &str) -> Self {
        self.channels.push((name.to_string(), url.to_string()));
        self
    }

    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), html.to_string());
        self
    }

    /// Make navigation to `url` fail.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }

    /// Make every click on the expand control fail.
    pub fn failing_expand(mut self) -> Self {
        self.expand_fails = true;
        self
    }

    pub fn reveals(&self) -> usize {
        self.reveals
    }

    pub fn visited(&self) -> &[String] {
        &self.visited
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn listed(&self) -> usize {
        let revealed = self
            .steps
            .get(self.stage)
            .or(self.steps.last())
            .copied()
            .unwrap_or(0);
        revealed.min(self.videos.len())
    }

    fn on_search_page(&self) -> bool {
        self.current.contains("/results?search_query=")
    }
}

#[async_trait]
impl ChannelBrowser for ScriptedBrowser {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        if self.failing.contains(url) {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message: "net::ERR_CONNECTION_RESET".to_string(),
            });
        }
        self.visited.push(url.to_string());
        self.current = url.to_string();
        self.stage = 0;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, BrowserError> {
        Ok(self.current.clone())
    }

    async fn page_source(&mut self) -> Result<String, BrowserError> {
        Ok(self
            .pages
            .get(&self.current)
            .cloned()
            .unwrap_or_else(|| "<html><body></body></html>".to_string()))
    }

    async fn find_all_by_id(&mut self, id: &str) -> Result<Vec<ElementInfo>, BrowserError> {
        Ok(match id {
            "video-title" => self.videos[..self.listed()].to_vec(),
            "channel-title" if self.on_search_page() => self
                .channels
                .iter()
                .map(|(name, _)| ElementInfo::new(name.clone(), None))
                .collect(),
            _ => Vec::new(),
        })
    }

    async fn click_first_by_id(&mut self, id: &str) -> Result<bool, BrowserError> {
        if id != "channel-title" || !self.on_search_page() {
            return Ok(false);
        }
        match self.channels.first().cloned() {
            Some((_, url)) => {
                self.current = url;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn click_by_class(
        &mut self,
        _class: &str,
        _timeout: Duration,
    ) -> Result<bool, BrowserError> {
        if self.expand_fails {
            return Err(BrowserError::Protocol("element is not clickable".to_string()));
        }
        Ok(self.pages.contains_key(&self.current))
    }

    async fn send_end_key(&mut self) -> Result<(), BrowserError> {
        self.reveals += 1;
        if self.stage + 1 < self.steps.len() {
            self.stage += 1;
        }
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }
}

/// Resolver answering from a fixed table; unknown links come back unchanged.
#[derive(Default)]
pub(crate) struct TableResolver {
    table: HashMap<String, String>,
    asked: Mutex<Vec<String>>,
}

impl TableResolver {
    pub fn with(pairs: &[(&str, &str)]) -> Self {
        Self {
            table: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            asked: Mutex::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }
}

#[async_trait]
impl LinkResolver for TableResolver {
    async fn resolve(&self, display_text: &str) -> String {
        self.asked.lock().unwrap().push(display_text.to_string());
        self.table
            .get(display_text)
            .cloned()
            .unwrap_or_else(|| display_text.to_string())
    }
}

/// Record store kept in memory, counting writes.
#[derive(Default)]
pub(crate) struct MemoryStore {
    files: Mutex<HashMap<String, Vec<VideoLinkRecord>>>,
    writes: Mutex<usize>,
}

impl MemoryStore {
    pub fn with(channel: &str, records: Vec<VideoLinkRecord>) -> Self {
        let store = Self::default();
        store
            .files
            .lock()
            .unwrap()
            .insert(channel.to_string(), records);
        store
    }

    pub fn records(&self, channel: &str) -> Option<Vec<VideoLinkRecord>> {
        self.files.lock().unwrap().get(channel).cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }
}

impl RecordStore for MemoryStore {
    fn load(&self, channel: &str) -> Result<Option<Vec<VideoLinkRecord>>, StoreError> {
        Ok(self.records(channel))
    }

    fn persist(&self, channel: &str, records: &[VideoLinkRecord]) -> Result<PathBuf, StoreError> {
        self.files
            .lock()
            .unwrap()
            .insert(channel.to_string(), records.to_vec());
        *self.writes.lock().unwrap() += 1;
        Ok(PathBuf::from(format!("{}.csv", channel)))
    }
}
