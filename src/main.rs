//! Subburn - Styled Subtitle Burning Workflow
//!
//! Entry point: parses arguments, loads configuration, sets up logging and
//! dispatches to the workflow.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use subburn::cli::{Args, Commands};
use subburn::config::Config;
use subburn::workflow::{RunOptions, StageOutcome, Workflow};

const DEFAULT_CONFIG_FILE: &str = "subburn.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;
    info!("Starting Subburn - Styled Subtitle Burning Workflow");

    // Load configuration
    let mut config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                info!("Found {} in current directory, loading...", DEFAULT_CONFIG_FILE);
                Config::from_file(DEFAULT_CONFIG_FILE)?
            } else {
                Config::default()
            }
        }
    };

    match args.command {
        Commands::Process { input, model, style, no_emoji, overwrite } => {
            if let Some(model) = model {
                config.transcriber.model = model;
            }
            config.style = style.apply(&config.style);
            config.validate()?;

            let workflow = Workflow::new(config)?;
            workflow.check_dependencies().await?;

            let options = RunOptions { force: overwrite, enable_emoji: !no_emoji };
            let result = workflow.process_video(&input, options).await?;

            for report in &result.stages {
                let outcome = match report.outcome {
                    StageOutcome::Ran => "done",
                    StageOutcome::Reused => "reused",
                    StageOutcome::Skipped => "skipped",
                };
                println!("{:<12} {}", report.stage.to_string(), outcome);
            }
            println!("Transcript: {}", result.srt_path.display());
            println!("Subtitles:  {}", result.ass_path.display());
            println!("Video:      {}", result.output_video.display());
        }
        Commands::Batch { input_dir, jobs, no_emoji, overwrite } => {
            config.validate()?;
            let workflow = Arc::new(Workflow::new(config)?);
            workflow.check_dependencies().await?;

            let options = RunOptions { force: overwrite, enable_emoji: !no_emoji };
            let summary = workflow.process_directory(&input_dir, options, jobs).await?;

            println!("\nProcessed {} videos, {} failed", summary.succeeded.len(), summary.failed.len());
            for (video, error) in &summary.failed {
                println!("  {}: {}", video.display(), error);
            }
            if !summary.failed.is_empty() {
                anyhow::bail!("{} of the videos failed", summary.failed.len());
            }
        }
        Commands::Annotate { input } => {
            config.validate()?;
            let workflow = Workflow::new(config)?;
            let output = workflow.annotate(&input)?;
            if output == input {
                println!("No emoji triggers fired; {} unchanged", input.display());
            } else {
                println!("Annotated transcript: {}", output.display());
            }
        }
        Commands::Convert { input, output, width, height, style } => {
            config.style = style.apply(&config.style);
            config.validate()?;
            let workflow = Workflow::new(config)?;

            let output = output.unwrap_or_else(|| input.with_extension("ass"));
            let canvas = width.zip(height);
            workflow.synthesize(&input, &output, canvas)?;
            println!("Subtitles: {}", output.display());
        }
        Commands::Burn { video, subtitles } => {
            config.validate()?;
            let workflow = Workflow::new(config)?;
            let output = workflow.burn(&video, &subtitles).await?;
            println!("Video: {}", output.display());
        }
        Commands::InitConfig { output } => {
            config.save_to_file(&output)?;
            println!("Wrote configuration to {}", output.display());
        }
    }

    info!("Subburn completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let log_dir = std::env::current_dir()?.join(".subburn").join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "subburn.log");
    let (non_blocking_file, guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!("Logging initialized - console: {}, file: {}",
          log_level, log_dir.join("subburn.log").display());

    Ok(())
}
