//! rexml-batch command-line entry point

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Parser;
use normalize_engine::RandomSuffix;
use rexml_batch::config::program_base_dir;
use rexml_batch::{BatchRunner, Config};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_CONFIG: &str = "rexml-batch.toml";

/// Command-line arguments for the batch normalizer
#[derive(Parser, Debug)]
#[command(name = "rexml-batch")]
#[command(version, about = "Normalize reXML lease files from a source folder into a target folder")]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Source folder (overrides SourceFolder)
    #[arg(long)]
    source: Option<PathBuf>,

    /// Target folder (overrides TargetFolder)
    #[arg(long)]
    target: Option<PathBuf>,

    /// Base directory for relative folders and LogFiles (overrides BaseDirectory)
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Reference date for month-to-month terms, yyyy-mm-dd
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Seed for duplicate lease reference suffixes
    #[arg(long)]
    seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None if PathBuf::from(DEFAULT_CONFIG).is_file() => Config::from_file(DEFAULT_CONFIG)?,
        None => Config::default(),
    };
    if args.source.is_some() {
        config.source_folder = args.source;
    }
    if args.target.is_some() {
        config.target_folder = args.target;
    }
    if args.base_dir.is_some() {
        config.base_directory = args.base_dir;
    }

    let settings = config.resolve(&program_base_dir()?)?;
    info!(
        "Normalizing \"{}\" into \"{}\"",
        settings.source_dir.display(),
        settings.target_dir.display()
    );

    let mut runner = BatchRunner::new(settings);
    if let Some(today) = args.today {
        runner = runner.with_today(today);
    }

    let summary = match args.seed {
        Some(seed) => runner.run(&mut RandomSuffix::seeded(seed))?,
        None => runner.run(&mut RandomSuffix::from_entropy())?,
    };

    info!(
        "Done: {} of {} file(s) written",
        summary.written, summary.files_found
    );
    Ok(())
}
