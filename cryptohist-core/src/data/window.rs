//! Lookback windowing.
//!
//! Intraday history is capped per request by the provider, so a long lookback
//! is split into consecutive `[start, end)` date windows of bounded length.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open `[start, end)` range of calendar dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Length in days.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

impl fmt::Display for DateWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Split `[end - lookback_days, end)` into consecutive windows of at most
/// `step_days` days. The last window is clipped to `end`.
pub fn lookback_windows(end: NaiveDate, lookback_days: u32, step_days: u32) -> Vec<DateWindow> {
    let mut windows = Vec::new();
    if step_days == 0 || lookback_days == 0 {
        return windows;
    }

    let step = Duration::days(i64::from(step_days));
    let mut window_start = end - Duration::days(i64::from(lookback_days));

    while window_start < end {
        let window_end = (window_start + step).min(end);
        windows.push(DateWindow::new(window_start, window_end));
        window_start = window_end;
    }

    windows
}

/// Everything the fetcher needs to know about one run's requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    pub windows: Vec<DateWindow>,
    pub interval: String,
    pub lookback_days: u32,
}

impl DownloadPlan {
    pub fn new(end: NaiveDate, lookback_days: u32, window_days: u32, interval: &str) -> Self {
        Self {
            windows: lookback_windows(end, lookback_days, window_days),
            interval: interval.to_string(),
            lookback_days,
        }
    }

    /// Human-readable lookback, in whole years when it divides evenly.
    pub fn lookback_label(&self) -> String {
        match self.lookback_days {
            365 => "1 year".to_string(),
            d @ 730.. if d % 365 == 0 => format!("{} years", d / 365),
            1 => "1 day".to_string(),
            d => format!("{d} days"),
        }
    }
}
