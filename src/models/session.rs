//! Per-run channel session state.

use super::VideoLinkRecord;

/// Whether this run scrapes a channel for the first time or refreshes saved records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Create,
    Update,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Create => "CREATE",
            Mode::Update => "UPDATE",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A channel resolved from a search, together with whatever was saved for it before.
#[derive(Debug, Clone)]
pub struct ChannelSession {
    channel_name: String,
    prior_records: Vec<VideoLinkRecord>,
}

impl ChannelSession {
    /// Start a session. `prior` is `None` when nothing was ever saved for the channel.
    pub fn new(channel_name: impl Into<String>, prior: Option<Vec<VideoLinkRecord>>) -> Self {
        Self {
            channel_name: channel_name.into(),
            prior_records: prior.unwrap_or_default(),
        }
    }

    pub fn channel_name(&self) -> &str {
        &self.channel_name
    }

    pub fn prior_records(&self) -> &[VideoLinkRecord] {
        &self.prior_records
    }

    /// UPDATE when at least one record was saved, CREATE otherwise.
    pub fn mode(&self) -> Mode {
        if self.prior_records.is_empty() {
            Mode::Create
        } else {
            Mode::Update
        }
    }

    /// Title of the newest saved video (the first record).
    pub fn last_saved_title(&self) -> Option<&str> {
        self.prior_records.first().map(|r| r.video_title.as_str())
    }

    /// Newly scraped records (newest first) followed by the prior records, order preserved.
    pub fn merge(self, new_records: Vec<VideoLinkRecord>) -> Vec<VideoLinkRecord> {
        let mut merged = new_records;
        merged.extend(self.prior_records);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, name: &str) -> VideoLinkRecord {
        VideoLinkRecord::new(title, name, format!("https://www.youtube.com/redirect?q={}", name))
    }

    #[test]
    fn test_mode_follows_prior_records() {
        assert_eq!(ChannelSession::new("chan", None).mode(), Mode::Create);
        assert_eq!(ChannelSession::new("chan", Some(vec![])).mode(), Mode::Create);
        assert_eq!(
            ChannelSession::new("chan", Some(vec![record("v1", "a")])).mode(),
            Mode::Update
        );
    }

    #[test]
    fn test_last_saved_title_is_first_record() {
        let session = ChannelSession::new(
            "chan",
            Some(vec![record("newest", "a"), record("older", "b")]),
        );
        assert_eq!(session.last_saved_title(), Some("newest"));
        assert_eq!(ChannelSession::new("chan", None).last_saved_title(), None);
    }

    #[test]
    fn test_merge_prepends_new_records() {
        let prior = vec![record("v2", "a"), record("v2", "b"), record("v1", "c")];
        let new = vec![record("v4", "d"), record("v3", "e")];
        let session = ChannelSession::new("chan", Some(prior.clone()));

        let merged = session.merge(new.clone());

        assert_eq!(merged.len(), new.len() + prior.len());
        assert_eq!(&merged[..2], new.as_slice());
        assert_eq!(&merged[2..], prior.as_slice());
    }

    #[test]
    fn test_merge_without_new_records_keeps_prior() {
        let prior = vec![record("v1", "a")];
        let session = ChannelSession::new("chan", Some(prior.clone()));
        assert_eq!(session.merge(Vec::new()), prior);
    }
}
