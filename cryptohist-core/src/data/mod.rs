//! Data download pipeline: windowed fetch, merge, and CSV export

pub mod assets;
pub mod circuit_breaker;
pub mod download;
pub mod fetch;
pub mod normalize;
pub mod provider;
pub mod window;
pub mod writer;
pub mod yahoo;

pub use assets::{Asset, AssetSet};
pub use circuit_breaker::CircuitBreaker;
pub use download::{download_assets, DownloadProgress, DownloadSummary, SilentProgress, StdoutProgress};
pub use fetch::{fetch_windowed, FetchOutcome, SkipReason, SkippedWindow};
pub use normalize::{merge_blocks, DATE_COLUMN};
pub use provider::{DataError, DataProvider, HourlyBar};
pub use window::{lookback_windows, DateWindow, DownloadPlan};
pub use writer::write_csv;
pub use yahoo::YahooProvider;
