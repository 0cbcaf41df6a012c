//! Download orchestrator: fetch, merge, and write each asset in turn, with
//! progress reporting.

use super::assets::{Asset, AssetSet};
use super::fetch::{fetch_windowed, SkippedWindow};
use super::normalize::merge_blocks;
use super::provider::{DataError, DataProvider};
use super::window::{DateWindow, DownloadPlan};
use super::writer::write_csv;
use std::path::{Path, PathBuf};

/// Download every asset in order: fetch → merge → write.
///
/// An asset with no data is reported through `progress` and skipped; nothing
/// is written for it. Write failures abort the run.
pub fn download_assets(
    provider: &dyn DataProvider,
    assets: &AssetSet,
    plan: &DownloadPlan,
    output_dir: &Path,
    progress: &dyn DownloadProgress,
) -> Result<DownloadSummary, DataError> {
    let total = assets.len();
    let mut summary = DownloadSummary {
        total,
        ..Default::default()
    };

    progress.on_batch_start(plan);

    for (i, asset) in assets.iter().enumerate() {
        progress.on_asset_start(asset, i, total);

        match download_single(provider, asset, plan, output_dir, progress, &mut summary)? {
            Some(path) => {
                progress.on_saved(asset, &path);
                summary.saved.push((asset.name.clone(), path));
            }
            None => {
                tracing::debug!(asset = %asset.name, ticker = %asset.ticker, "no data for asset");
                progress.on_empty(asset);
                summary.empty.push(asset.name.clone());
            }
        }
    }

    progress.on_batch_complete(&summary);
    Ok(summary)
}

/// Download a single asset. `None` means every window came back empty.
fn download_single(
    provider: &dyn DataProvider,
    asset: &Asset,
    plan: &DownloadPlan,
    output_dir: &Path,
    progress: &dyn DownloadProgress,
    summary: &mut DownloadSummary,
) -> Result<Option<PathBuf>, DataError> {
    let outcome = fetch_windowed(provider, &asset.ticker, plan, progress);
    summary.skipped_windows.extend(outcome.skipped);

    let mut table = merge_blocks(outcome.blocks)?;
    if table.height() == 0 {
        return Ok(None);
    }

    write_csv(&mut table, &asset.name, output_dir).map(Some)
}

/// Summary of a batch download.
#[derive(Debug, Default)]
pub struct DownloadSummary {
    pub total: usize,
    /// Asset name and written file, in download order.
    pub saved: Vec<(String, PathBuf)>,
    /// Assets for which no window returned data.
    pub empty: Vec<String>,
    pub skipped_windows: Vec<SkippedWindow>,
}

impl DownloadSummary {
    pub fn succeeded(&self) -> usize {
        self.saved.len()
    }

    pub fn failed(&self) -> usize {
        self.empty.len()
    }
}

/// Progress callbacks for a batch download.
pub trait DownloadProgress: Send {
    fn on_batch_start(&self, plan: &DownloadPlan);

    fn on_asset_start(&self, asset: &Asset, index: usize, total: usize);

    /// Called before each window request.
    fn on_window(&self, window: &DateWindow);

    fn on_saved(&self, asset: &Asset, path: &Path);

    /// Called when an asset produced no data at all.
    fn on_empty(&self, asset: &Asset);

    /// Called once when the batch is done, whatever the per-asset outcomes.
    fn on_batch_complete(&self, summary: &DownloadSummary);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress;

impl DownloadProgress for StdoutProgress {
    fn on_batch_start(&self, plan: &DownloadPlan) {
        println!(
            "Downloading the last {} at {} frequency...",
            plan.lookback_label(),
            plan.interval
        );
    }

    fn on_asset_start(&self, asset: &Asset, _index: usize, _total: usize) {
        println!("\nDownloading {} ({})", asset.name, asset.ticker);
    }

    fn on_window(&self, window: &DateWindow) {
        println!("   Fetching {window}");
    }

    fn on_saved(&self, _asset: &Asset, path: &Path) {
        println!("✔ Saved to: {}", path.display());
    }

    fn on_empty(&self, asset: &Asset) {
        println!("❌ Could not download data for {}", asset.name);
    }

    fn on_batch_complete(&self, summary: &DownloadSummary) {
        println!(
            "\n✅ Process finished: {}/{} assets saved, {} without data.",
            summary.succeeded(),
            summary.total,
            summary.failed()
        );
    }
}

/// Progress reporter that prints nothing.
pub struct SilentProgress;

impl DownloadProgress for SilentProgress {
    fn on_batch_start(&self, _plan: &DownloadPlan) {}
    fn on_asset_start(&self, _asset: &Asset, _index: usize, _total: usize) {}
    fn on_window(&self, _window: &DateWindow) {}
    fn on_saved(&self, _asset: &Asset, _path: &Path) {}
    fn on_empty(&self, _asset: &Asset) {}
    fn on_batch_complete(&self, _summary: &DownloadSummary) {}
}
