use anyhow::Result;
use url::Url;

/// Base of the short-form viewing URL
pub const SHORTS_URL_BASE: &str = "https://www.youtube.com/shorts/";

/// Short-form viewing URL for a video id
pub fn shorts_url(video_id: &str) -> String {
    format!("{}{}", SHORTS_URL_BASE, video_id)
}

/// Validate a URL and return normalized version
pub fn validate_and_normalize_url(url: &str) -> Result<String> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed.to_string())
}

/// Accept either a full video URL or a bare video id
pub fn video_url_from_input(input: &str) -> Result<String> {
    let input = input.trim();
    if input.starts_with("http://") || input.starts_with("https://") {
        return validate_and_normalize_url(input);
    }

    let is_video_id = !input.is_empty()
        && input
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if is_video_id {
        Ok(shorts_url(input))
    } else {
        anyhow::bail!("Expected a video URL or video id, got: {}", input)
    }
}

/// Timestamped export filename, e.g. `transcripts_20240101_120000.csv`
pub fn export_filename(extension: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("transcripts_{}.{}", timestamp, extension)
}

/// Shorten text for single-line display, appending `...` when cut
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }

    let cut = flattened
        .chars()
        .take(max_chars.saturating_sub(3))
        .collect::<String>();
    format!("{}...", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shorts_url() {
        assert_eq!(shorts_url("dQw4w9WgXcQ"), "https://www.youtube.com/shorts/dQw4w9WgXcQ");
    }

    #[test]
    fn test_validate_and_normalize_url() {
        assert!(validate_and_normalize_url("https://example.com").is_ok());
        assert!(validate_and_normalize_url("http://example.com").is_ok());
        assert!(validate_and_normalize_url("ftp://example.com").is_err());
        assert!(validate_and_normalize_url("not-a-url").is_err());
    }

    #[test]
    fn test_video_url_from_input() {
        assert_eq!(
            video_url_from_input("abc_DEF-123").unwrap(),
            "https://www.youtube.com/shorts/abc_DEF-123"
        );
        assert_eq!(
            video_url_from_input("https://www.youtube.com/shorts/xyz").unwrap(),
            "https://www.youtube.com/shorts/xyz"
        );
        assert!(video_url_from_input("two words").is_err());
        assert!(video_url_from_input("").is_err());
    }

    #[test]
    fn test_export_filename() {
        let name = export_filename("csv");
        assert!(name.starts_with("transcripts_"));
        assert!(name.ends_with(".csv"));
        assert_eq!(name.len(), "transcripts_20240101_120000.csv".len());
    }

    #[test]
    fn test_truncate_for_display() {
        assert_eq!(truncate_for_display("short", 10), "short");
        assert_eq!(truncate_for_display("line one\nline two", 50), "line one line two");
        assert_eq!(truncate_for_display("abcdefghijkl", 8), "abcde...");
    }
}
