use anyhow::{Context, Result};
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shortscribe::cli::{Cli, Commands, OutputFormat};
use shortscribe::config::Config;
use shortscribe::pipeline::{PipelineOrchestrator, PipelineSettings, RunOutcome};
use shortscribe::platform::YouTubeClient;
use shortscribe::transcript::TranscriptSession;
use shortscribe::{output, utils};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "shortscribe=debug"
    } else {
        "shortscribe=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load().await?;

    match cli.command {
        Commands::Run {
            channel_id,
            api_key,
            max_shorts,
            output,
            format,
            export,
            full,
        } => {
            let api_key = api_key
                .or_else(|| config.youtube.api_key.clone())
                .filter(|key| !key.trim().is_empty())
                .context("A YouTube API key is required: pass --api-key, set YOUTUBE_API_KEY, or add youtube.api_key to the config file")?;

            let options = RunOptions {
                output,
                format,
                export,
                full,
                quiet: cli.quiet,
            };
            run_pipeline(&config, &api_key, &channel_id, max_shorts as usize, options).await?;
        }
        Commands::Transcript { url } => {
            let url = utils::video_url_from_input(&url)?;
            let session = transcript_session(&config)?;

            tracing::info!("Fetching transcript for URL: {}", url);
            let text = session
                .run(&url)
                .await
                .with_context(|| format!("Could not generate a transcript for {}", url))?;

            println!("{}", text);
        }
        Commands::Config { show } => {
            if show {
                config.display();
            } else {
                println!("Configuration file: {}", Config::config_path()?.display());
                println!("Edit it to change API endpoints, pacing and cache lifetimes.");
            }
        }
    }

    Ok(())
}

struct RunOptions {
    output: Option<PathBuf>,
    format: OutputFormat,
    export: bool,
    full: bool,
    quiet: bool,
}

fn transcript_session(config: &Config) -> Result<TranscriptSession> {
    TranscriptSession::with_base_url(
        &config.transcript.base_url,
        Duration::from_secs(config.transcript.timeout_secs),
    )
    .context("Failed to initialize transcript session")
}

async fn run_pipeline(
    config: &Config,
    api_key: &str,
    channel_id: &str,
    max_shorts: usize,
    options: RunOptions,
) -> Result<()> {
    let platform = YouTubeClient::with_base_url(
        &config.youtube.api_base_url,
        Duration::from_secs(config.youtube.timeout_secs),
    )
    .context("Failed to initialize YouTube API client")?;
    let session = transcript_session(config)?;

    let pipeline = PipelineOrchestrator::new(
        Arc::new(platform),
        Arc::new(session),
        PipelineSettings::try_from(config)?,
    );

    let progress = if options.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    progress.enable_steady_tick(Duration::from_millis(120));
    progress.set_message("Searching for Shorts in the channel...");

    tracing::info!("Starting run for channel: {}", channel_id);

    let outcome = pipeline
        .run(api_key, channel_id, max_shorts, |done, total| {
            progress.set_length(total as u64);
            progress.set_position(done as u64);
            progress.set_message(format!("Processed Short {}/{}", done, total));
        })
        .await;

    let rows = match outcome {
        RunOutcome::NoResults { cause } => {
            progress.finish_and_clear();
            eprintln!(
                "{}",
                style("No Shorts were found in this channel or an error occurred.").red()
            );
            if let Some(cause) = cause {
                anyhow::bail!(cause.user_message());
            }
            return Ok(());
        }
        RunOutcome::Completed(rows) => rows,
    };

    progress.finish_with_message("Done");

    let missing = rows.iter().filter(|row| !row.has_transcript()).count();
    eprintln!(
        "{} {} Shorts processed, {} without transcript",
        style("Process completed!").green().bold(),
        rows.len(),
        missing
    );

    match &options.output {
        Some(path) => {
            output::save_to_file(&rows, path, &options.format, options.full)?;
            println!("Results saved to: {}", path.display());
        }
        None => {
            output::print_to_console(&rows, &options.format, options.full)?;
        }
    }

    if options.export {
        let path = PathBuf::from(utils::export_filename("csv"));
        output::save_to_file(&rows, &path, &OutputFormat::Csv, true)?;
        println!("CSV export saved to: {}", path.display());
    }

    Ok(())
}
