use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Video platform API settings
    pub youtube: YoutubeConfig,

    /// Transcript extraction service settings
    pub transcript: TranscriptServiceConfig,

    /// Pipeline policy
    pub pipeline: PipelineConfig,

    /// Cache lifetimes
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct YoutubeConfig {
    /// Root of the YouTube Data API
    pub api_base_url: String,

    /// API key used when none is given on the command line
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptServiceConfig {
    /// Landing page of the extraction service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cap on enumerated shorts
    pub max_results: usize,

    /// Seconds to wait between transcript fetches
    pub pace_delay_secs: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub shorts_ttl_secs: u64,
    pub transcript_ttl_secs: u64,
}

impl Default for YoutubeConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/youtube/v3/".to_string(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl Default for TranscriptServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://downsub.com/".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_results: 50,
            pace_delay_secs: 1.0,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            shorts_ttl_secs: 3600,
            transcript_ttl_secs: 600,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            youtube: YoutubeConfig::default(),
            transcript: TranscriptServiceConfig::default(),
            pipeline: PipelineConfig::default(),
            cache: CacheConfig::default(),
        }
    }
}

impl Config {
    /// Upper bound the platform allows for `max_results`
    pub const MAX_RESULTS_LIMIT: usize = 50;

    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load from an explicit path, writing defaults there if it is missing
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs_err::read_to_string(config_path)
                .context("Failed to read config file")?;

            let config: Config = serde_yaml::from_str(&content)
                .context("Failed to parse config file")?;

            config.validate()?;
            Ok(config)
        } else {
            let config = Self::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub async fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to(&config_path)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs_err::create_dir_all(parent)?;
            }
        }

        let content = serde_yaml::to_string(self)
            .context("Failed to serialize config")?;

        fs_err::write(config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?;

        Ok(config_dir.join("shortscribe").join("config.yaml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.max_results == 0 || self.pipeline.max_results > Self::MAX_RESULTS_LIMIT {
            anyhow::bail!(
                "pipeline.max_results must be between 1 and {}",
                Self::MAX_RESULTS_LIMIT
            );
        }

        self.pace_delay()?;

        for (name, value) in [
            ("youtube.api_base_url", &self.youtube.api_base_url),
            ("transcript.base_url", &self.transcript.base_url),
        ] {
            url::Url::parse(value)
                .with_context(|| format!("{} is not a valid URL: {}", name, value))?;
        }

        Ok(())
    }

    /// Delay between transcript fetches as a `Duration`
    pub fn pace_delay(&self) -> Result<Duration> {
        Duration::try_from_secs_f64(self.pipeline.pace_delay_secs).map_err(|_| {
            anyhow::anyhow!(
                "pipeline.pace_delay_secs must be a non-negative number of seconds, got {}",
                self.pipeline.pace_delay_secs
            )
        })
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  YouTube API: {}", self.youtube.api_base_url);
        println!(
            "  YouTube API Key: {}",
            if self.youtube.api_key.is_some() { "(set)" } else { "(not set)" }
        );
        println!("  Transcript Service: {}", self.transcript.base_url);
        println!("  Max Results: {}", self.pipeline.max_results);
        println!("  Pace Delay: {}s", self.pipeline.pace_delay_secs);
        println!("  Shorts Cache TTL: {}s", self.cache.shorts_ttl_secs);
        println!("  Transcript Cache TTL: {}s", self.cache.transcript_ttl_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config, Config::default());
        assert!(path.exists());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mut config = Config::default();
        config.pipeline.max_results = 20;
        config.pipeline.pace_delay_secs = 0.5;
        config.youtube.api_key = Some("abc".to_string());
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "pipeline:\n  pace_delay_secs: 2.5\n").unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.pipeline.pace_delay_secs, 2.5);
        assert_eq!(config.pipeline.max_results, 50);
        assert_eq!(config.cache.transcript_ttl_secs, 600);
    }

    #[test]
    fn test_rejects_out_of_range_max_results() {
        let mut config = Config::default();
        config.pipeline.max_results = 51;
        assert!(config.validate().is_err());

        config.pipeline.max_results = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_pace_delay() {
        let mut config = Config::default();
        config.pipeline.pace_delay_secs = -1.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_unrepresentable_pace_delay() {
        let mut config = Config::default();
        config.pipeline.pace_delay_secs = 1e30;
        assert!(config.validate().is_err());

        config.pipeline.pace_delay_secs = f64::NAN;
        assert!(config.validate().is_err());

        config.pipeline.pace_delay_secs = 0.25;
        assert_eq!(config.pace_delay().unwrap(), Duration::from_millis(250));
    }

    #[test]
    fn test_rejects_bad_service_url() {
        let mut config = Config::default();
        config.transcript.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }
}
