use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{PlatformError, SearchItem, SearchPage, VideoDetails, VideoPlatform};

/// YouTube Data API v3 client
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchListResponse {
    #[serde(default)]
    items: Vec<SearchResult>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResult {
    id: SearchResultId,
    snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResultId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoResource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoResource {
    content_details: Option<ContentDetails>,
    statistics: Option<Statistics>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
}

/// `{"error": {...}}` body returned on API failures
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<ApiErrorReason>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorReason {
    #[serde(default)]
    reason: String,
}

impl ApiErrorDetail {
    fn into_platform_error(self, status: u16) -> PlatformError {
        let reasons = self
            .errors
            .iter()
            .map(|e| e.reason.as_str())
            .filter(|r| !r.is_empty())
            .collect::<Vec<_>>();

        let message = if reasons.is_empty() {
            self.message
        } else {
            format!("{} ({})", self.message, reasons.join(", "))
        };

        PlatformError::classify(Some(self.code.unwrap_or(status)), message)
    }
}

impl YouTubeClient {
    pub const DEFAULT_BASE_URL: &'static str = "https://www.googleapis.com/youtube/v3/";
    const PAGE_SIZE: u32 = 50;

    /// Create a client against the public YouTube Data API
    pub fn new() -> Result<Self, PlatformError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL, Duration::from_secs(30))
    }

    /// Create a client against a custom API root (used by tests and proxies)
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, PlatformError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base_url = Url::parse(&base)
            .map_err(|e| PlatformError::Transport(format!("Invalid API base URL {}: {}", base_url, e)))?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PlatformError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, resource: &str, params: &[(&str, &str)]) -> Result<Url, PlatformError> {
        let mut url = self
            .base_url
            .join(resource)
            .map_err(|e| PlatformError::Transport(format!("Invalid endpoint {}: {}", resource, e)))?;

        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    /// Issue a GET and decode the JSON body, mapping API error bodies to [`PlatformError`]
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, PlatformError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PlatformError::Transport(e.to_string()))?;

        if let Ok(ApiErrorBody { error: Some(error) }) = serde_json::from_str::<ApiErrorBody>(&body) {
            return Err(error.into_platform_error(status.as_u16()));
        }

        if !status.is_success() {
            return Err(PlatformError::classify(Some(status.as_u16()), body));
        }

        serde_json::from_str(&body)
            .map_err(|e| PlatformError::Transport(format!("Malformed API response: {}", e)))
    }
}

#[async_trait]
impl VideoPlatform for YouTubeClient {
    #[tracing::instrument(skip(self, api_key))]
    async fn search_channel_videos(
        &self,
        api_key: &str,
        channel_id: &str,
        page_token: Option<String>,
    ) -> Result<SearchPage, PlatformError> {
        let page_size = Self::PAGE_SIZE.to_string();
        let mut params = vec![
            ("part", "id,snippet"),
            ("channelId", channel_id),
            ("maxResults", page_size.as_str()),
            ("type", "video"),
            ("key", api_key),
        ];
        if let Some(token) = page_token.as_deref() {
            params.push(("pageToken", token));
        }

        let url = self.endpoint("search", &params)?;
        let response: SearchListResponse = self.get_json(url).await?;

        let items = response
            .items
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id?;
                let title = item.snippet.map(|s| s.title).unwrap_or_default();
                Some(SearchItem { video_id, title })
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            count = items.len(),
            has_next = response.next_page_token.is_some(),
            "Fetched search page"
        );

        Ok(SearchPage {
            items,
            next_page_token: response.next_page_token.filter(|t| !t.is_empty()),
        })
    }

    #[tracing::instrument(skip(self, api_key))]
    async fn video_details(
        &self,
        api_key: &str,
        video_id: &str,
    ) -> Result<Option<VideoDetails>, PlatformError> {
        let url = self.endpoint(
            "videos",
            &[
                ("part", "contentDetails,statistics"),
                ("id", video_id),
                ("key", api_key),
            ],
        )?;
        let response: VideoListResponse = self.get_json(url).await?;

        let details = response.items.into_iter().next().and_then(|video| {
            let duration = video.content_details?.duration?;
            let view_count = video
                .statistics
                .and_then(|s| s.view_count)
                .and_then(|v| v.parse::<u64>().ok());
            Some(VideoDetails { duration, view_count })
        });

        Ok(details)
    }

    fn platform_name(&self) -> &'static str {
        "YouTube"
    }
}
