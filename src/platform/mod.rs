use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod youtube;

pub use youtube::YouTubeClient;

/// One page of channel search results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Videos on this page, in the order returned by the platform
    pub items: Vec<SearchItem>,

    /// Cursor for the next page, `None` once the listing is exhausted
    pub next_page_token: Option<String>,
}

/// A single search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchItem {
    pub video_id: String,
    pub title: String,
}

/// Per-video metadata used for classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDetails {
    /// ISO-8601 duration code, e.g. `PT42S`
    pub duration: String,
    pub view_count: Option<u64>,
}

/// Errors reported by a video platform
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("API quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("API key rejected: {0}")]
    InvalidCredentials(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),
}

impl PlatformError {
    /// Categorize an error body or message by its content.
    ///
    /// Quota checks win over credential checks since quota messages can also
    /// mention invalid requests. The API words rejected keys as "API key not
    /// valid", so that phrase counts as a credential failure too.
    pub fn classify(status: Option<u16>, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_lowercase();

        if lower.contains("quota") {
            PlatformError::QuotaExceeded(message)
        } else if lower.contains("invalid") || lower.contains("not valid") {
            PlatformError::InvalidCredentials(message)
        } else {
            match status {
                Some(status) => PlatformError::Api { status, message },
                None => PlatformError::Transport(message),
            }
        }
    }

    /// Message suitable for showing to the person running the tool
    pub fn user_message(&self) -> String {
        match self {
            PlatformError::QuotaExceeded(_) => {
                "The YouTube API quota has been exceeded. Please try again later.".to_string()
            }
            PlatformError::InvalidCredentials(_) => {
                "The provided API key is not valid or has expired.".to_string()
            }
            PlatformError::Api { .. } | PlatformError::Transport(_) => {
                format!("Error communicating with the YouTube API: {}", self)
            }
        }
    }
}

/// Search and metadata lookup against a video platform
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoPlatform: Send + Sync {
    /// Fetch one page of a channel's videos
    async fn search_channel_videos(
        &self,
        api_key: &str,
        channel_id: &str,
        page_token: Option<String>,
    ) -> Result<SearchPage, PlatformError>;

    /// Look up duration (and statistics) for a single video.
    ///
    /// Returns `Ok(None)` when the platform has no record for the id.
    async fn video_details(
        &self,
        api_key: &str,
        video_id: &str,
    ) -> Result<Option<VideoDetails>, PlatformError>;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quota() {
        let err = PlatformError::classify(Some(403), "The request cannot be completed because you have exceeded your quota.");
        assert!(matches!(err, PlatformError::QuotaExceeded(_)));
    }

    #[test]
    fn test_classify_invalid_key() {
        let err = PlatformError::classify(Some(400), "API key not valid. Please pass a valid API key. (keyInvalid)");
        assert!(matches!(err, PlatformError::InvalidCredentials(_)));
    }

    #[test]
    fn test_classify_generic() {
        assert_eq!(
            PlatformError::classify(Some(500), "Backend Error"),
            PlatformError::Api { status: 500, message: "Backend Error".to_string() }
        );
        assert_eq!(
            PlatformError::classify(None, "connection refused"),
            PlatformError::Transport("connection refused".to_string())
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let quota = PlatformError::QuotaExceeded("x".into()).user_message();
        let invalid = PlatformError::InvalidCredentials("x".into()).user_message();
        let generic = PlatformError::Transport("x".into()).user_message();
        assert_ne!(quota, invalid);
        assert_ne!(quota, generic);
        assert_ne!(invalid, generic);
    }
}
