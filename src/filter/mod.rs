//! Description link filtering pipeline.
//!
//! Links pass four stages in strict order:
//! 1. drop in-video timestamps and hashtags
//! 2. drop links whose visible text matches the exclusion set
//! 3. resolve complete-looking URLs through their redirects
//! 4. drop links whose resolved name matches the exclusion set
//!
//! Stage 4 catches shortened links (`bit.ly/...`) that expand to an excluded domain.

mod classify;

pub use classify::{is_self_timestamp_or_hashtag, looks_like_full_url, ExclusionSet};

use tracing::debug;

use crate::models::{DescriptionLink, VideoLinkRecord};
use crate::resolver::LinkResolver;
use crate::utils::absolute_link;

/// Per-video context for the filtering pipeline.
pub struct LinkFilter<'a> {
    pub exclusions: &'a ExclusionSet,
    pub base_url: &'a str,
    /// URL of the video being scraped, as reported by the browser.
    pub current_video_url: &'a str,
    pub video_title: &'a str,
}

impl LinkFilter<'_> {
    /// Stages 1 and 2: cheap checks on what the page shows.
    pub fn prefilter(&self, links: Vec<DescriptionLink>) -> Vec<DescriptionLink> {
        links
            .into_iter()
            .filter(|link| {
                !is_self_timestamp_or_hashtag(link, self.current_video_url, self.base_url)
            })
            .filter(|link| !self.exclusions.matches(&link.text))
            .collect()
    }

    /// Run all four stages and build records for the survivors.
    pub async fn apply<R>(&self, links: Vec<DescriptionLink>, resolver: &R) -> Vec<VideoLinkRecord>
    where
        R: LinkResolver + ?Sized,
    {
        let candidates = self.prefilter(links);
        let mut records = Vec::with_capacity(candidates.len());

        for link in candidates {
            let url_name = if looks_like_full_url(&link.text) {
                resolver.resolve(&link.text).await
            } else {
                link.text.clone()
            };

            if self.exclusions.matches(&url_name) {
                debug!("Dropping {} (resolved to excluded {})", link.text, url_name);
                continue;
            }

            records.push(VideoLinkRecord::new(
                self.video_title,
                url_name,
                absolute_link(self.base_url, &link.href),
            ));
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TableResolver;

    const BASE: &str = "https://www.youtube.com";
    const VIDEO: &str = "https://www.youtube.com/watch?v=abc123";

    fn exclusions() -> ExclusionSet {
        ExclusionSet::build(&["facebook", "twitter", "instagram"], &[".com"])
    }

    fn filter(exclusions: &ExclusionSet) -> LinkFilter<'_> {
        LinkFilter {
            exclusions,
            base_url: BASE,
            current_video_url: VIDEO,
            video_title: "My Video",
        }
    }

    #[tokio::test]
    async fn test_plain_link_becomes_record() {
        let set = exclusions();
        let resolver = TableResolver::default();
        let links = vec![DescriptionLink::new(
            "https://example.com/shop",
            "/redirect?q=https%3A%2F%2Fexample.com%2Fshop",
        )];

        let records = filter(&set).apply(links, &resolver).await;

        assert_eq!(
            records,
            vec![VideoLinkRecord::new(
                "My Video",
                "https://example.com/shop",
                "https://www.youtube.com/redirect?q=https%3A%2F%2Fexample.com%2Fshop",
            )]
        );
    }

    #[tokio::test]
    async fn test_shortened_link_to_excluded_domain_is_dropped() {
        let set = exclusions();
        let resolver = TableResolver::with(&[("https://bit.ly/xyz", "https://twitter.com/someone")]);
        let links = vec![DescriptionLink::new("https://bit.ly/xyz", "/redirect?q=bitly")];

        // Survives stage 2 on its visible text...
        assert_eq!(filter(&set).prefilter(links.clone()).len(), 1);
        // ...but not stage 4.
        let records = filter(&set).apply(links, &resolver).await;
        assert!(records.is_empty());
        assert_eq!(resolver.asked(), vec!["https://bit.ly/xyz".to_string()]);
    }

    #[tokio::test]
    async fn test_excluded_text_never_reaches_resolver() {
        let set = exclusions();
        let resolver = TableResolver::default();
        let links = vec![
            DescriptionLink::new("https://facebook.com/me", "/redirect?q=fb"),
            DescriptionLink::new("#shorts", "/hashtag/shorts"),
            DescriptionLink::new("0:42", "/watch?v=abc123&t=42s"),
        ];

        let records = filter(&set).apply(links, &resolver).await;

        assert!(records.is_empty());
        assert!(resolver.asked().is_empty());
    }

    #[tokio::test]
    async fn test_timestamp_dropped_regardless_of_text() {
        let set = exclusions();
        let resolver = TableResolver::default();
        let links = vec![DescriptionLink::new(
            "https://example.com/looks-external",
            "/watch?v=abc123&t=1s",
        )];

        assert!(filter(&set).apply(links, &resolver).await.is_empty());
    }

    #[tokio::test]
    async fn test_ellipsized_text_is_not_resolved() {
        let set = exclusions();
        let resolver = TableResolver::default();
        let links = vec![
            DescriptionLink::new("https://www.example.com/products/long-na...", "/redirect?q=a"),
            DescriptionLink::new("Merch store", "/redirect?q=b"),
        ];

        let records = filter(&set).apply(links, &resolver).await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url_name, "https://www.example.com/products/long-na...");
        assert_eq!(records[1].url_name, "Merch store");
        assert!(resolver.asked().is_empty());
    }

    #[tokio::test]
    async fn test_order_is_preserved() {
        let set = exclusions();
        let resolver = TableResolver::with(&[("https://bit.ly/a", "https://example.com/a")]);
        let links = vec![
            DescriptionLink::new("https://bit.ly/a", "/redirect?q=1"),
            DescriptionLink::new("https://instagram.com/me", "/redirect?q=2"),
            DescriptionLink::new("https://example.org/b", "/redirect?q=3"),
        ];

        let names: Vec<String> = filter(&set)
            .apply(links, &resolver)
            .await
            .into_iter()
            .map(|r| r.url_name)
            .collect();

        assert_eq!(names, vec!["https://example.com/a", "https://example.org/b"]);
    }
}
