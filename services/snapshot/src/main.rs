//! Latest-forecast snapshot tool.
//!
//! Finds the newest GRIB2 forecast in each configured public bucket,
//! downloads one file per provider, and renders surface temperature and
//! wind-speed maps as PNGs.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use snapshot::config::SnapshotConfig;
use snapshot::pipeline::{run_all, RunOptions};

#[derive(Parser, Debug)]
#[command(name = "snapshot")]
#[command(about = "Render the latest surface forecast from public model buckets")]
struct Args {
    /// Provider configuration file (YAML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for rendered images
    #[arg(short, long, default_value = "assets")]
    output_dir: PathBuf,

    /// Scratch directory for downloaded files
    #[arg(long, default_value = "/tmp/forecast-snapshot")]
    work_dir: PathBuf,

    /// Run a single provider instead of all configured
    #[arg(short, long)]
    provider: Option<String>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &args.config {
        Some(path) => SnapshotConfig::from_yaml(path)?,
        None => SnapshotConfig::default(),
    };

    if let Some(provider) = &args.provider {
        config.select_provider(provider)?;
    }

    info!(
        providers = config.providers.len(),
        lookback_days = config.lookback_days,
        output_dir = %args.output_dir.display(),
        "Starting forecast snapshot"
    );

    let opts = RunOptions {
        output_dir: args.output_dir,
        work_dir: args.work_dir,
    };

    let successes = run_all(&config, &opts).await;
    let total = config.providers.len();

    if successes == 0 {
        anyhow::bail!("All {} providers failed to produce output", total);
    }

    info!(succeeded = successes, total, "Snapshot run complete");
    Ok(())
}
