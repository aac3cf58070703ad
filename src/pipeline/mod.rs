use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::cache::ResultCache;
use crate::config::Config;
use crate::platform::{PlatformError, VideoPlatform};
use crate::shorts::{ChannelShortsEnumerator, EnumerationOutcome, ShortRecord};
use crate::transcript::{TranscriptResult, TranscriptService};

/// Text used in place of a transcript that could not be acquired
pub const TRANSCRIPT_PLACEHOLDER: &str = "transcription unavailable";

/// One line of the final result table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub video_id: String,
    pub title: String,
    pub url: String,
    /// Transcript text, or [`TRANSCRIPT_PLACEHOLDER`]
    pub transcript: String,
}

impl ResultRow {
    pub fn new(short: ShortRecord, result: TranscriptResult) -> Self {
        Self {
            video_id: short.video_id,
            title: short.title,
            url: short.url,
            transcript: result
                .transcript
                .unwrap_or_else(|| TRANSCRIPT_PLACEHOLDER.to_string()),
        }
    }

    pub fn has_transcript(&self) -> bool {
        self.transcript != TRANSCRIPT_PLACEHOLDER
    }
}

/// How a pipeline run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every enumerated short was attempted
    Completed(Vec<ResultRow>),

    /// Enumeration produced nothing; `cause` is set when an upstream error
    /// was responsible
    NoResults { cause: Option<PlatformError> },
}

impl RunOutcome {
    pub fn rows(&self) -> &[ResultRow] {
        match self {
            RunOutcome::Completed(rows) => rows,
            RunOutcome::NoResults { .. } => &[],
        }
    }

    pub fn into_rows(self) -> Vec<ResultRow> {
        match self {
            RunOutcome::Completed(rows) => rows,
            RunOutcome::NoResults { .. } => Vec::new(),
        }
    }
}

/// Policy knobs for a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Hard cap on enumerated shorts
    pub max_results: usize,
    /// Pause after each transcript
    pub pace_delay: Duration,
    pub shorts_ttl: Duration,
    pub transcript_ttl: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            max_results: 50,
            pace_delay: Duration::from_secs(1),
            shorts_ttl: Duration::from_secs(3600),
            transcript_ttl: Duration::from_secs(600),
        }
    }
}

impl TryFrom<&Config> for PipelineSettings {
    type Error = anyhow::Error;

    fn try_from(config: &Config) -> Result<Self, Self::Error> {
        Ok(Self {
            max_results: config.pipeline.max_results,
            pace_delay: config.pace_delay()?,
            shorts_ttl: Duration::from_secs(config.cache.shorts_ttl_secs),
            transcript_ttl: Duration::from_secs(config.cache.transcript_ttl_secs),
        })
    }
}

/// Enumerates a channel's shorts and collects a transcript for each, one
/// video at a time
pub struct PipelineOrchestrator<P, T>
where
    P: VideoPlatform + ?Sized,
    T: TranscriptService + ?Sized,
{
    enumerator: ChannelShortsEnumerator<P>,
    transcripts: Arc<T>,
    settings: PipelineSettings,
    shorts_cache: ResultCache<(String, String), EnumerationOutcome>,
    transcript_cache: ResultCache<String, Option<String>>,
}

impl<P, T> PipelineOrchestrator<P, T>
where
    P: VideoPlatform + ?Sized,
    T: TranscriptService + ?Sized,
{
    pub fn new(platform: Arc<P>, transcripts: Arc<T>, settings: PipelineSettings) -> Self {
        Self {
            enumerator: ChannelShortsEnumerator::new(platform, settings.max_results),
            transcripts,
            settings,
            shorts_cache: ResultCache::new(),
            transcript_cache: ResultCache::new(),
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Enumerate the channel's shorts, served from cache for `shorts_ttl`
    pub async fn shorts(&self, api_key: &str, channel_id: &str) -> EnumerationOutcome {
        let key = (api_key.to_string(), channel_id.to_string());
        self.shorts_cache
            .get_or_compute(key, self.settings.shorts_ttl, || {
                self.enumerator.enumerate(api_key, channel_id)
            })
            .await
    }

    /// Acquire a transcript for one short, served from cache for `transcript_ttl`
    pub async fn transcript(&self, short: &ShortRecord) -> TranscriptResult {
        let transcript = self
            .transcript_cache
            .get_or_compute(short.url.clone(), self.settings.transcript_ttl, || {
                self.transcripts.acquire_transcript(&short.url)
            })
            .await;

        TranscriptResult {
            video_id: short.video_id.clone(),
            transcript,
        }
    }

    /// Run the whole pipeline.
    ///
    /// `progress` is called with `(completed, total)` after every video.
    #[tracing::instrument(skip(self, api_key, progress))]
    pub async fn run<F>(
        &self,
        api_key: &str,
        channel_id: &str,
        max_count: usize,
        mut progress: F,
    ) -> RunOutcome
    where
        F: FnMut(usize, usize),
    {
        let outcome = self.shorts(api_key, channel_id).await;
        if outcome.is_empty() {
            match &outcome.failure {
                Some(e) => tracing::warn!(error = %e, "No results or upstream error"),
                None => tracing::info!("No results or upstream error"),
            }
            return RunOutcome::NoResults {
                cause: outcome.failure,
            };
        }

        let limit = max_count.clamp(1, self.settings.max_results.max(1));
        let shorts = outcome.shorts.into_iter().take(limit).collect::<Vec<_>>();
        let total = shorts.len();
        tracing::info!(total, "Collecting transcripts");

        let mut rows = Vec::with_capacity(total);
        for (index, short) in shorts.into_iter().enumerate() {
            let result = self.transcript(&short).await;
            if result.transcript.is_none() {
                tracing::warn!(video_id = %short.video_id, "Transcript unavailable");
            }

            rows.push(ResultRow::new(short, result));
            progress(index + 1, total);

            if !self.settings.pace_delay.is_zero() {
                tokio::time::sleep(self.settings.pace_delay).await;
            }
        }

        let missing = rows.iter().filter(|row| !row.has_transcript()).count();
        tracing::info!(total, missing, "Pipeline complete");

        RunOutcome::Completed(rows)
    }
}
