//! Data provider trait, bar types, and structured error types.
//!
//! The DataProvider trait abstracts over market-data sources so the windowed
//! fetcher can run against Yahoo Finance in production and a fake in tests.
//! Providers hand back one polars frame per requested window; everything
//! downstream (merge, flatten, write) works on frames.

use super::window::DateWindow;
use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the timestamp column in provider frames (acts as the row index).
pub const TIMESTAMP_COLUMN: &str = "Datetime";

/// Separator between the field level and the ticker level of a two-level
/// column header, e.g. `Close::BTC-USD`.
pub const LEVEL_SEPARATOR: &str = "::";

/// Value fields carried by a bar, in the column order providers emit them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarField {
    AdjClose,
    Close,
    High,
    Low,
    Open,
    Volume,
}

impl BarField {
    pub const ALL: [BarField; 6] = [
        BarField::AdjClose,
        BarField::Close,
        BarField::High,
        BarField::Low,
        BarField::Open,
        BarField::Volume,
    ];

    /// Column label used in frames and in the written CSV.
    pub fn label(self) -> &'static str {
        match self {
            BarField::AdjClose => "Adj Close",
            BarField::Close => "Close",
            BarField::High => "High",
            BarField::Low => "Low",
            BarField::Open => "Open",
            BarField::Volume => "Volume",
        }
    }
}

/// Raw hourly OHLCV bar from a data provider.
///
/// Missing values stay `None` so they serialize as empty CSV cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyBar {
    pub timestamp: DateTime<Utc>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub adj_close: Option<f64>,
    pub volume: Option<u64>,
}

/// Structured error types for data operations.
///
/// These are designed to be displayable in CLI output and in log lines.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider rejected request: {0}")]
    ProviderRejected(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("frame error: {0}")]
    Frame(String),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    pub(crate) fn frame(context: &str, e: PolarsError) -> Self {
        DataError::Frame(format!("{context}: {e}"))
    }
}

/// Trait for market-data providers.
///
/// Implementations handle the specifics of talking to one source. A provider
/// answers a single `[start, end)` window; splitting a long lookback into
/// windows is the fetcher's job.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `ticker` over `window` at the given bar interval (e.g. `1h`).
    ///
    /// A window with no data is `Ok` with an empty frame, built by
    /// [`bars_to_frame`].
    fn fetch_block(
        &self,
        ticker: &str,
        window: DateWindow,
        interval: &str,
    ) -> Result<DataFrame, DataError>;

    /// Whether the provider will take requests right now. The fetcher skips
    /// a window without calling [`DataProvider::fetch_block`] when this is false.
    fn is_available(&self) -> bool {
        true
    }
}

/// Build a block frame from bars.
///
/// With `ticker` set, value columns get two-level `Field::TICKER` headers,
/// mirroring a ticker-scoped provider response. Without it they are
/// single-level.
pub fn bars_to_frame(bars: &[HourlyBar], ticker: Option<&str>) -> Result<DataFrame, DataError> {
    let header = |field: BarField| match ticker {
        Some(t) => format!("{}{LEVEL_SEPARATOR}{t}", field.label()),
        None => field.label().to_string(),
    };

    let timestamps: Vec<i64> = bars.iter().map(|b| b.timestamp.timestamp_millis()).collect();
    let adj_closes: Vec<Option<f64>> = bars.iter().map(|b| b.adj_close).collect();
    let closes: Vec<Option<f64>> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<Option<f64>> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<Option<f64>> = bars.iter().map(|b| b.low).collect();
    let opens: Vec<Option<f64>> = bars.iter().map(|b| b.open).collect();
    let volumes: Vec<Option<u64>> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        Column::new(TIMESTAMP_COLUMN.into(), timestamps)
            .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
            .map_err(|e| DataError::frame("timestamp cast", e))?,
        Column::new(header(BarField::AdjClose).into(), adj_closes),
        Column::new(header(BarField::Close).into(), closes),
        Column::new(header(BarField::High).into(), highs),
        Column::new(header(BarField::Low).into(), lows),
        Column::new(header(BarField::Open).into(), opens),
        Column::new(header(BarField::Volume).into(), volumes),
    ])
    .map_err(|e| DataError::frame("dataframe creation", e))
}
