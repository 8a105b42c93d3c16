//! Video and link record models.

use serde::{Deserialize, Serialize};

/// Column headers of a persisted record file, in order.
pub const RECORD_HEADERS: [&str; 3] = ["Video Title", "URL Name", "URL Link"];

/// A video found in a channel listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRef {
    pub title: String,
    pub url: String,
}

impl VideoRef {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// An anchor found inside a video description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptionLink {
    /// Visible text of the anchor.
    pub text: String,
    /// Raw `href` attribute, often relative to the platform.
    pub href: String,
}

impl DescriptionLink {
    pub fn new(text: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            href: href.into(),
        }
    }
}

/// One outbound link of one video. This is the unit of output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoLinkRecord {
    #[serde(rename = "Video Title")]
    pub video_title: String,
    /// Display name of the link, resolved through redirects when possible.
    #[serde(rename = "URL Name")]
    pub url_name: String,
    /// Absolute link as it appears on the video page.
    #[serde(rename = "URL Link")]
    pub url_link: String,
}

impl VideoLinkRecord {
    pub fn new(
        video_title: impl Into<String>,
        url_name: impl Into<String>,
        url_link: impl Into<String>,
    ) -> Self {
        Self {
            video_title: video_title.into(),
            url_name: url_name.into(),
            url_link: url_link.into(),
        }
    }
}
