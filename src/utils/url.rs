//! Link normalization against the platform base URL.

/// Resolve an href to a full URL, handling both absolute and platform-relative paths.
pub fn absolute_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with("//") {
        format!("https:{}", href)
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}

/// Strip volatile parameters from a video URL: everything from the first `&` on.
///
/// `https://host/watch?v=abc&t=42s` and `https://host/watch?v=abc&pp=x` both become
/// `https://host/watch?v=abc`.
pub fn canonical_video_url(url: &str) -> &str {
    url.split('&').next().unwrap_or(url)
}
