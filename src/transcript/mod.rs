use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod normalize;
pub mod session;

pub use normalize::normalize;
pub use session::TranscriptSession;

/// Transcript lookup outcome for one video
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptResult {
    pub video_id: String,

    /// Normalized transcript, `None` if any step of the acquisition failed
    pub transcript: Option<String>,
}

/// Steps of a transcript session, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStage {
    Start,
    TokenFetched,
    ExtractionSubmitted,
    LocationResolved,
    TranscriptFetched,
}

impl fmt::Display for SessionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionStage::Start => write!(f, "start"),
            SessionStage::TokenFetched => write!(f, "token-fetched"),
            SessionStage::ExtractionSubmitted => write!(f, "extraction-submitted"),
            SessionStage::LocationResolved => write!(f, "location-resolved"),
            SessionStage::TranscriptFetched => write!(f, "transcript-fetched"),
        }
    }
}

/// Why a transcript session ended in the failed state
#[derive(thiserror::Error, Debug)]
pub enum TranscriptError {
    #[error("Failed to build HTTP session: {0}")]
    Session(String),

    #[error("Request failed after {stage}: {source}")]
    Request {
        stage: SessionStage,
        #[source]
        source: reqwest::Error,
    },

    #[error("Unexpected HTTP {status} after {stage}")]
    Status { stage: SessionStage, status: u16 },

    #[error("Anti-forgery token not found on landing page")]
    MissingToken,

    #[error("Malformed extraction response: {0}")]
    MalformedResponse(String),

    #[error("Extraction response has no transcript location")]
    MissingLocation,

    #[error("Invalid transcript location {location}: {reason}")]
    InvalidLocation { location: String, reason: String },
}

impl TranscriptError {
    /// Last state reached before the failure
    pub fn stage(&self) -> SessionStage {
        match self {
            TranscriptError::Session(_) | TranscriptError::MissingToken => SessionStage::Start,
            TranscriptError::Request { stage, .. } | TranscriptError::Status { stage, .. } => *stage,
            TranscriptError::MalformedResponse(_)
            | TranscriptError::MissingLocation
            | TranscriptError::InvalidLocation { .. } => SessionStage::ExtractionSubmitted,
        }
    }
}

/// Anything that can turn a video URL into transcript text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TranscriptService: Send + Sync {
    /// Acquire the normalized transcript for `video_url`.
    ///
    /// Returns `None` on any failure; errors never escape.
    async fn acquire_transcript(&self, video_url: &str) -> Option<String>;
}
