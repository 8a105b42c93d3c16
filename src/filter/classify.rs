//! Link classification: self-timestamps, hashtags, and excluded domains.

use crate::models::DescriptionLink;
use crate::utils::{absolute_link, canonical_video_url};

/// Domain-like substrings that mark a link as excluded.
///
/// Built by joining every keyword with every extension (`"facebook"` + `".com"`).
/// Matching is case-sensitive substring containment, not host equality.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet {
    entries: Vec<String>,
}

impl ExclusionSet {
    /// Cross-join keywords with extensions, extension-major, dropping duplicates.
    pub fn build<K, E>(keywords: &[K], extensions: &[E]) -> Self
    where
        K: AsRef<str>,
        E: AsRef<str>,
    {
        let mut entries: Vec<String> = Vec::with_capacity(keywords.len() * extensions.len());
        for extension in extensions {
            for keyword in keywords {
                let entry = format!("{}{}", keyword.as_ref(), extension.as_ref());
                if !entries.contains(&entry) {
                    entries.push(entry);
                }
            }
        }
        Self { entries }
    }

    /// True if any entry occurs in `candidate`.
    pub fn matches(&self, candidate: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| candidate.contains(entry.as_str()))
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// True if the link jumps within the current video, or is a hashtag chip.
///
/// Timestamp hrefs are platform-relative (`/watch?v=abc&t=42s`), so they are made absolute
/// against `base_url` before comparison with the canonical form of `current_video_url`.
pub fn is_self_timestamp_or_hashtag(
    link: &DescriptionLink,
    current_video_url: &str,
    base_url: &str,
) -> bool {
    if link.text.starts_with('#') {
        return true;
    }
    let target = absolute_link(base_url, &link.href);
    canonical_video_url(&target) == canonical_video_url(current_video_url)
}

/// Heuristic: the visible text is a complete URL worth resolving.
///
/// Long links are shown ellipsized on the page, and resolving a truncated URL
/// would only produce garbage.
pub fn looks_like_full_url(text: &str) -> bool {
    text.contains("http") && !text.contains("...") && !text.contains('\u{2026}')
}
