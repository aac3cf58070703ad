//! Shortscribe - collect automatic transcripts for a YouTube channel's Shorts
//!
//! The library lists a channel's short-form videos through the YouTube Data
//! API, classifies them by duration, and runs a session against a transcript
//! extraction service for each one. Results are cached for a while and
//! returned as an ordered table of rows.

pub mod cache;
pub mod cli;
pub mod config;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod shorts;
pub mod transcript;
pub mod utils;

pub use cache::ResultCache;
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use pipeline::{PipelineOrchestrator, PipelineSettings, ResultRow, RunOutcome, TRANSCRIPT_PLACEHOLDER};
pub use platform::{PlatformError, VideoPlatform, YouTubeClient};
pub use shorts::{ChannelShortsEnumerator, EnumerationOutcome, ShortRecord};
pub use transcript::{TranscriptError, TranscriptService, TranscriptSession};

/// Result type used throughout the library
pub type Result<T> = anyhow::Result<T>;
