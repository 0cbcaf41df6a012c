//! cryptohist CLI: download hourly crypto price history to CSV.
//!
//! With no arguments, downloads the last 4 years of hourly bars for
//! bitcoin, ethereum, binancecoin, and solana into `data/raw/<asset>.csv`.
//! Assets without data are reported and skipped; the process still exits 0.

use anyhow::Result;
use clap::Parser;
use cryptohist_core::data::{download_assets, CircuitBreaker, StdoutProgress, YahooProvider};
use cryptohist_core::DownloadConfig;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "cryptohist",
    about = "Download hourly crypto price history from Yahoo Finance to CSV"
)]
struct Cli {
    /// TOML config file (assets, lookback, window size, interval, output dir).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory. Overrides the config. Defaults to data/raw.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Debug-level diagnostics on stderr.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => DownloadConfig::from_file(path)?,
        None => DownloadConfig::default(),
    };
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }

    let today = chrono::Local::now().date_naive();
    let plan = config.plan(today);
    tracing::info!(
        assets = config.assets.len(),
        windows = plan.windows.len(),
        output_dir = %config.output_dir.display(),
        "starting download"
    );

    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker)?;

    let summary = download_assets(
        &provider,
        &config.asset_set(),
        &plan,
        &config.output_dir,
        &StdoutProgress,
    )?;

    for skipped in &summary.skipped_windows {
        tracing::debug!(
            ticker = %skipped.ticker,
            window = %skipped.window,
            reason = %skipped.reason,
            "window skipped"
        );
    }

    Ok(())
}

/// Diagnostics go to stderr so stdout stays the progress log.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!("{level},hyper=warn,hyper_util=warn,reqwest=warn");
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
