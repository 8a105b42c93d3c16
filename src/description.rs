//! Video page parsing: title heading and description anchors.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::models::DescriptionLink;

static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div#description").expect("description selector should parse"));

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("anchor selector should parse"));

/// Title headings, oldest page layout first.
static TITLES: LazyLock<Vec<Selector>> = LazyLock::new(|| {
    ["h1.title", "h1.ytd-watch-metadata", "#title h1"]
        .iter()
        .map(|s| Selector::parse(s).expect("title selector should parse"))
        .collect()
});

/// A parsed video page.
pub struct VideoPage {
    document: Html,
}

impl VideoPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Visible text of the video heading, if the page has one.
    pub fn title(&self) -> Option<String> {
        TITLES.iter().find_map(|selector| {
            self.document
                .select(selector)
                .map(element_text)
                .find(|text| !text.is_empty())
        })
    }

    /// Every anchor with an `href` inside the description container.
    ///
    /// A page without a description container yields no links.
    pub fn description_links(&self) -> Vec<DescriptionLink> {
        let Some(container) = self.document.select(&DESCRIPTION).next() else {
            return Vec::new();
        };

        container
            .select(&ANCHOR)
            .filter_map(|anchor| {
                let href = anchor.value().attr("href")?;
                Some(DescriptionLink::new(element_text(anchor), href))
            })
            .collect()
    }
}

/// Title and links of a video page, detached from the parsed tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoPageContent {
    pub title: Option<String>,
    pub links: Vec<DescriptionLink>,
}

/// Parse page markup and pull out what the scraper needs.
pub fn extract_video_page(html: &str) -> VideoPageContent {
    let page = VideoPage::parse(html);
    VideoPageContent {
        title: page.title(),
        links: page.description_links(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WATCH_PAGE: &str = r##"
        <html><body>
          <h1 class="title style-scope ytd-video-primary-info-renderer">
            <yt-formatted-string>Building a Shed</yt-formatted-string>
          </h1>
          <div id="description" class="style-scope">
            <yt-formatted-string>
              Tools I used:
              <a href="/redirect?q=https%3A%2F%2Fexample.com%2Fsaw">https://example.com/saw</a>
              <a href="/watch?v=abc123&amp;t=42s">0:42</a>
              <a href="/hashtag/diy">#diy</a>
              <a>no href here</a>
            </yt-formatted-string>
          </div>
          <div id="comments"><a href="/channel/other">someone</a></div>
        </body></html>
    "##;

    #[test]
    fn test_extracts_title() {
        assert_eq!(
            VideoPage::parse(WATCH_PAGE).title().as_deref(),
            Some("Building a Shed")
        );
    }

    #[test]
    fn test_extracts_description_anchors_only() {
        let links = VideoPage::parse(WATCH_PAGE).description_links();
        assert_eq!(
            links,
            vec![
                DescriptionLink::new(
                    "https://example.com/saw",
                    "/redirect?q=https%3A%2F%2Fexample.com%2Fsaw"
                ),
                DescriptionLink::new("0:42", "/watch?v=abc123&t=42s"),
                DescriptionLink::new("#diy", "/hashtag/diy"),
            ]
        );
    }

    #[test]
    fn test_missing_description_yields_no_links() {
        let html = r#"<html><body><h1 class="title">Short</h1></body></html>"#;
        let content = extract_video_page(html);
        assert_eq!(content.title.as_deref(), Some("Short"));
        assert!(content.links.is_empty());
    }

    #[test]
    fn test_empty_description_yields_no_links() {
        let html = r#"<div id="description"></div>"#;
        assert!(extract_video_page(html).links.is_empty());
    }

    #[test]
    fn test_modern_title_layout() {
        let html = r#"<div id="title"><h1 class="style-scope ytd-watch-metadata"> New Layout </h1></div>"#;
        assert_eq!(extract_video_page(html).title.as_deref(), Some("New Layout"));
    }

    #[test]
    fn test_missing_title() {
        assert_eq!(extract_video_page("<html><body></body></html>").title, None);
    }
}
