use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "shortscribe",
    about = "Shortscribe - Collect automatic transcripts for a YouTube channel's Shorts",
    version,
    long_about = "Lists the Shorts published by a YouTube channel through the YouTube Data API and fetches an automatically generated transcript for each one, producing a table you can print or export as JSON/CSV."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Find a channel's Shorts and transcribe them
    Run {
        /// Channel ID (the `UC...` value in the channel URL)
        #[arg(short, long, value_name = "CHANNEL_ID")]
        channel_id: String,

        /// YouTube Data API key (falls back to the config file)
        #[arg(short = 'k', long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Number of Shorts to process
        #[arg(short = 'n', long, default_value = "10", value_parser = clap::value_parser!(u32).range(1..=50))]
        max_shorts: u32,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also write a timestamped CSV export to the current directory
        #[arg(long)]
        export: bool,

        /// Print full transcripts instead of a one-line preview (text format)
        #[arg(long)]
        full: bool,
    },

    /// Fetch the transcript for a single video URL or id
    Transcript {
        /// Video URL or bare video id
        #[arg(value_name = "URL_OR_ID")]
        url: String,
    },

    /// Show or create the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Plain text listing
    Text,
    /// JSON document
    Json,
    /// CSV table
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_defaults() {
        let cli = Cli::try_parse_from(["shortscribe", "run", "--channel-id", "UC123", "--api-key", "k"]).unwrap();
        match cli.command {
            Commands::Run { channel_id, api_key, max_shorts, format, export, .. } => {
                assert_eq!(channel_id, "UC123");
                assert_eq!(api_key.as_deref(), Some("k"));
                assert_eq!(max_shorts, 10);
                assert_eq!(format, OutputFormat::Text);
                assert!(!export);
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_max_shorts_range() {
        assert!(Cli::try_parse_from(["shortscribe", "run", "-c", "UC1", "-n", "0"]).is_err());
        assert!(Cli::try_parse_from(["shortscribe", "run", "-c", "UC1", "-n", "51"]).is_err());
        assert!(Cli::try_parse_from(["shortscribe", "run", "-c", "UC1", "-n", "50"]).is_ok());
    }
}
