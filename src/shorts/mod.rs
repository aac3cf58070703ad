use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

pub mod duration;

pub use duration::is_short_form;

use crate::platform::{PlatformError, VideoPlatform};
use crate::utils::shorts_url;

/// Search hit plus the metadata fetched for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoCandidate {
    pub video_id: String,
    pub title: String,
    pub duration_code: String,
    pub view_count: Option<u64>,
}

/// A video that passed the short-form classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortRecord {
    pub video_id: String,
    pub title: String,
    /// Short-form viewing URL derived from `video_id`
    pub url: String,
}

impl From<VideoCandidate> for ShortRecord {
    fn from(candidate: VideoCandidate) -> Self {
        Self {
            url: shorts_url(&candidate.video_id),
            video_id: candidate.video_id,
            title: candidate.title,
        }
    }
}

/// Result of one enumeration.
///
/// `failure` is set when a page-level error aborted the listing; `shorts` is
/// empty in that case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnumerationOutcome {
    pub shorts: Vec<ShortRecord>,
    pub failure: Option<PlatformError>,
}

impl EnumerationOutcome {
    fn failed(error: PlatformError) -> Self {
        Self {
            shorts: Vec::new(),
            failure: Some(error),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.shorts.is_empty()
    }
}

/// Lists a channel's short-form videos
pub struct ChannelShortsEnumerator<P: VideoPlatform + ?Sized> {
    platform: Arc<P>,
    max_results: usize,
}

impl<P: VideoPlatform + ?Sized> ChannelShortsEnumerator<P> {
    pub const DEFAULT_MAX_RESULTS: usize = 50;

    pub fn new(platform: Arc<P>, max_results: usize) -> Self {
        Self {
            platform,
            max_results,
        }
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }

    /// Page through the channel's videos, keeping those classified as Shorts.
    ///
    /// Never fails: a page-level error yields an empty outcome carrying the
    /// error, while a failed metadata lookup only skips that video.
    #[tracing::instrument(skip(self, api_key))]
    pub async fn enumerate(&self, api_key: &str, channel_id: &str) -> EnumerationOutcome {
        let mut shorts: Vec<ShortRecord> = Vec::new();
        let mut seen = HashSet::new();
        let mut seen_tokens = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0usize;

        while shorts.len() < self.max_results {
            let page = match self
                .platform
                .search_channel_videos(api_key, channel_id, page_token.take())
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    tracing::error!(error = %e, platform = self.platform.platform_name(), "Channel search failed");
                    return EnumerationOutcome::failed(e);
                }
            };
            pages += 1;

            for item in page.items {
                if shorts.len() >= self.max_results {
                    break;
                }
                if !seen.insert(item.video_id.clone()) {
                    tracing::debug!(video_id = %item.video_id, "Skipping duplicate search result");
                    continue;
                }

                let details = match self.platform.video_details(api_key, &item.video_id).await {
                    Ok(Some(details)) => details,
                    Ok(None) => {
                        tracing::warn!(video_id = %item.video_id, "No metadata returned for video");
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(video_id = %item.video_id, error = %e, "Could not fetch video metadata");
                        continue;
                    }
                };

                let candidate = VideoCandidate {
                    video_id: item.video_id,
                    title: item.title,
                    duration_code: details.duration,
                    view_count: details.view_count,
                };

                if is_short_form(&candidate.duration_code) {
                    tracing::debug!(
                        video_id = %candidate.video_id,
                        duration = %candidate.duration_code,
                        views = ?candidate.view_count,
                        "Found short"
                    );
                    shorts.push(candidate.into());
                }
            }

            match page.next_page_token {
                Some(token) if seen_tokens.insert(token.clone()) => page_token = Some(token),
                Some(token) => {
                    tracing::warn!(%token, "Search cursor repeated, stopping pagination");
                    break;
                }
                None => break,
            }
        }

        tracing::info!(count = shorts.len(), pages, "Finished channel enumeration");

        EnumerationOutcome {
            shorts,
            failure: None,
        }
    }
}
