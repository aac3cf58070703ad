use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{normalize, SessionStage, TranscriptError, TranscriptService};

/// Session-based client for a DownSub-style transcript extraction service.
///
/// Every call to [`TranscriptSession::run`] opens a fresh cookie jar, scrapes
/// the anti-forgery token from the landing page, submits the extraction form
/// and downloads the transcript it points to.
#[derive(Debug, Clone)]
pub struct TranscriptSession {
    base_url: Url,
    timeout: Duration,
    token_patterns: Vec<Regex>,
}

/// Intermediate states of one session run
enum SessionState {
    Start,
    TokenFetched { token: String },
    ExtractionSubmitted { body: String },
    LocationResolved { location: Url },
    TranscriptFetched { raw: String },
}

#[derive(Debug, Deserialize)]
struct ExtractResponse {
    #[serde(default)]
    data: Vec<ExtractEntry>,
}

#[derive(Debug, Deserialize)]
struct ExtractEntry {
    url: Option<String>,
}

impl TranscriptSession {
    pub const DEFAULT_BASE_URL: &'static str = "https://downsub.com/";
    const EXTRACT_PATH: &'static str = "api/extract";
    const TRANSCRIPT_TYPE: &'static str = "auto";
    const USER_AGENT: &'static str = concat!("shortscribe/", env!("CARGO_PKG_VERSION"));

    const TOKEN_PATTERNS: [&'static str; 3] = [
        r#"(?i)<input[^>]*\bname\s*=\s*["']_token["'][^>]*\bvalue\s*=\s*["']([^"']*)["']"#,
        r#"(?i)<input[^>]*\bvalue\s*=\s*["']([^"']*)["'][^>]*\bname\s*=\s*["']_token["']"#,
        r#"(?i)<meta[^>]*\bname\s*=\s*["']csrf-token["'][^>]*\bcontent\s*=\s*["']([^"']*)["']"#,
    ];

    pub fn new() -> Result<Self, TranscriptError> {
        Self::with_base_url(Self::DEFAULT_BASE_URL, Duration::from_secs(30))
    }

    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, TranscriptError> {
        let mut base = base_url.to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let base_url = Url::parse(&base)
            .map_err(|e| TranscriptError::Session(format!("Invalid service URL {}: {}", base_url, e)))?;

        let token_patterns = Self::TOKEN_PATTERNS
            .iter()
            .map(|pattern| Regex::new(pattern))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| TranscriptError::Session(e.to_string()))?;

        Ok(Self {
            base_url,
            timeout,
            token_patterns,
        })
    }

    /// Drive one session through every state, returning the normalized transcript
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, video_url: &str) -> Result<String, TranscriptError> {
        let client = self.open_client()?;
        let mut state = SessionState::Start;

        loop {
            state = match state {
                SessionState::Start => SessionState::TokenFetched {
                    token: self.fetch_token(&client).await?,
                },
                SessionState::TokenFetched { token } => SessionState::ExtractionSubmitted {
                    body: self.submit_extraction(&client, &token, video_url).await?,
                },
                SessionState::ExtractionSubmitted { body } => SessionState::LocationResolved {
                    location: self.resolve_location(&body)?,
                },
                SessionState::LocationResolved { location } => SessionState::TranscriptFetched {
                    raw: self.fetch_transcript(&client, location).await?,
                },
                SessionState::TranscriptFetched { raw } => {
                    let text = normalize(&raw);
                    tracing::debug!(chars = text.len(), "Transcript fetched");
                    return Ok(text);
                }
            };
        }
    }

    /// A new client per run so cookies never leak between videos
    fn open_client(&self) -> Result<Client, TranscriptError> {
        Client::builder()
            .cookie_store(true)
            .timeout(self.timeout)
            .user_agent(Self::USER_AGENT)
            .build()
            .map_err(|e| TranscriptError::Session(e.to_string()))
    }

    async fn fetch_token(&self, client: &Client) -> Result<String, TranscriptError> {
        let stage = SessionStage::Start;
        let response = client
            .get(self.base_url.clone())
            .send()
            .await
            .map_err(|source| TranscriptError::Request { stage, source })?;
        check_status(stage, response.status())?;

        let page = response
            .text()
            .await
            .map_err(|source| TranscriptError::Request { stage, source })?;

        let token = self.extract_token(&page).ok_or(TranscriptError::MissingToken)?;
        tracing::debug!("Anti-forgery token acquired");
        Ok(token)
    }

    fn extract_token(&self, page: &str) -> Option<String> {
        self.token_patterns
            .iter()
            .filter_map(|pattern| pattern.captures(page))
            .filter_map(|captures| captures.get(1))
            .map(|m| m.as_str().trim())
            .find(|token| !token.is_empty())
            .map(str::to_string)
    }

    async fn submit_extraction(
        &self,
        client: &Client,
        token: &str,
        video_url: &str,
    ) -> Result<String, TranscriptError> {
        let stage = SessionStage::TokenFetched;
        let endpoint = self
            .base_url
            .join(Self::EXTRACT_PATH)
            .map_err(|e| TranscriptError::Session(e.to_string()))?;

        let response = client
            .post(endpoint)
            .header("X-Requested-With", "XMLHttpRequest")
            .header("Accept", "application/json")
            .form(&[
                ("_token", token),
                ("url", video_url),
                ("type", Self::TRANSCRIPT_TYPE),
            ])
            .send()
            .await
            .map_err(|source| TranscriptError::Request { stage, source })?;
        check_status(stage, response.status())?;

        response
            .text()
            .await
            .map_err(|source| TranscriptError::Request { stage, source })
    }

    fn resolve_location(&self, body: &str) -> Result<Url, TranscriptError> {
        let response: ExtractResponse = serde_json::from_str(body)
            .map_err(|e| TranscriptError::MalformedResponse(e.to_string()))?;

        let location = response
            .data
            .into_iter()
            .next()
            .and_then(|entry| entry.url)
            .filter(|url| !url.trim().is_empty())
            .ok_or(TranscriptError::MissingLocation)?;

        self.base_url
            .join(location.trim())
            .map_err(|e| TranscriptError::InvalidLocation {
                location,
                reason: e.to_string(),
            })
    }

    async fn fetch_transcript(&self, client: &Client, location: Url) -> Result<String, TranscriptError> {
        let stage = SessionStage::LocationResolved;
        tracing::debug!(%location, "Downloading transcript");

        let response = client
            .get(location)
            .send()
            .await
            .map_err(|source| TranscriptError::Request { stage, source })?;
        check_status(stage, response.status())?;

        response
            .text()
            .await
            .map_err(|source| TranscriptError::Request { stage, source })
    }
}

fn check_status(stage: SessionStage, status: StatusCode) -> Result<(), TranscriptError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(TranscriptError::Status {
            stage,
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl TranscriptService for TranscriptSession {
    async fn acquire_transcript(&self, video_url: &str) -> Option<String> {
        match self.run(video_url).await {
            Ok(text) => Some(text),
            Err(e) => {
                tracing::warn!(url = video_url, stage = %e.stage(), error = %e, "Transcript session failed");
                None
            }
        }
    }
}
