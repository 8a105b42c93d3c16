//! File name sanitization.

/// Replace characters that are unsafe in file names and bound the length.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .take(100)
        .collect::<String>();
    let cleaned = cleaned.trim().trim_start_matches('.');

    if cleaned.is_empty() {
        "channel".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("Linus Tech Tips"), "Linus Tech Tips");
        assert_eq!(sanitize_filename("Café Ünïcode"), "Café Ünïcode");
    }

    #[test]
    fn test_sanitize_replaces_separators() {
        assert_eq!(sanitize_filename("AC/DC: Live?"), "AC_DC_ Live_");
        assert_eq!(sanitize_filename("../etc"), "_etc");
    }

    #[test]
    fn test_sanitize_never_empty() {
        assert_eq!(sanitize_filename("   "), "channel");
        assert_eq!(sanitize_filename(".."), "channel");
    }
}
