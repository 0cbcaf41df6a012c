//! Windowed fetcher: walks a download plan one window at a time.

use super::download::DownloadProgress;
use super::provider::DataProvider;
use super::window::{DateWindow, DownloadPlan};
use polars::prelude::DataFrame;
use std::fmt;

/// Why a window contributed nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The provider answered, but with no rows.
    Empty,
    /// The provider call failed; holds the rendered error.
    Failed(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Empty => write!(f, "no data"),
            SkipReason::Failed(msg) => write!(f, "failed: {msg}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedWindow {
    pub ticker: String,
    pub window: DateWindow,
    pub reason: SkipReason,
}

/// Non-empty block frames in window order, plus the windows that were dropped.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub blocks: Vec<DataFrame>,
    pub skipped: Vec<SkippedWindow>,
}

impl FetchOutcome {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

/// Fetch every window of `plan` for `ticker`.
///
/// Failed and empty windows are skipped, never retried and never surfaced
/// as errors. A window is also skipped, without a request, while the
/// provider reports itself unavailable. An outcome with no blocks means the
/// ticker produced nothing.
pub fn fetch_windowed(
    provider: &dyn DataProvider,
    ticker: &str,
    plan: &DownloadPlan,
    progress: &dyn DownloadProgress,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();

    for &window in &plan.windows {
        progress.on_window(&window);

        if !provider.is_available() {
            outcome.skipped.push(SkippedWindow {
                ticker: ticker.to_string(),
                window,
                reason: SkipReason::Failed(format!("{} is unavailable", provider.name())),
            });
            continue;
        }

        let reason = match provider.fetch_block(ticker, window, &plan.interval) {
            Ok(frame) if frame.height() > 0 => {
                tracing::debug!(
                    ticker,
                    %window,
                    rows = frame.height(),
                    provider = provider.name(),
                    "window fetched"
                );
                outcome.blocks.push(frame);
                continue;
            }
            Ok(_) => SkipReason::Empty,
            Err(e) => SkipReason::Failed(e.to_string()),
        };

        tracing::debug!(ticker, %window, %reason, "skipping window");
        outcome.skipped.push(SkippedWindow {
            ticker: ticker.to_string(),
            window,
            reason,
        });
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::download::SilentProgress;
    use crate::data::provider::{bars_to_frame, DataError, HourlyBar};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use chrono::{NaiveDate, TimeZone, Utc};

    /// Answers by window index: some rows, no rows, or an error.
    struct ScriptedProvider {
        plan: DownloadPlan,
        script: Vec<Option<bool>>,
        available: AtomicBool,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(plan: DownloadPlan, script: Vec<Option<bool>>) -> Self {
            Self {
                plan,
                script,
                available: AtomicBool::new(true),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl DataProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn fetch_block(
            &self,
            ticker: &str,
            window: DateWindow,
            _interval: &str,
        ) -> Result<DataFrame, DataError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let idx = self.plan.windows.iter().position(|w| *w == window).unwrap();
            let bars = match self.script[idx] {
                None => return Err(DataError::NetworkUnreachable("timeout".into())),
                Some(false) => Vec::new(),
                Some(true) => vec![HourlyBar {
                    timestamp: Utc
                        .from_utc_datetime(&window.start.and_hms_opt(0, 0, 0).unwrap()),
                    open: Some(1.0),
                    high: Some(1.0),
                    low: Some(1.0),
                    close: Some(1.0),
                    adj_close: Some(1.0),
                    volume: Some(1),
                }],
            };
            bars_to_frame(&bars, Some(ticker))
        }

        fn is_available(&self) -> bool {
            self.available.load(Ordering::SeqCst)
        }
    }

    fn plan() -> DownloadPlan {
        DownloadPlan::new(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), 1460, 365, "1h")
    }

    #[test]
    fn keeps_non_empty_blocks_in_order() {
        let provider = ScriptedProvider::new(plan(), vec![Some(true), Some(false), Some(true), Some(true)]);
        let outcome = fetch_windowed(&provider, "BTC-USD", &provider.plan, &SilentProgress);

        assert_eq!(outcome.blocks.len(), 3);
        assert_eq!(outcome.skipped.len(), 1);
        assert_eq!(outcome.skipped[0].window, provider.plan.windows[1]);
        assert_eq!(outcome.skipped[0].reason, SkipReason::Empty);
    }

    #[test]
    fn errors_are_skipped_like_empty_windows() {
        let provider = ScriptedProvider::new(plan(), vec![None, Some(true), None, Some(false)]);
        let outcome = fetch_windowed(&provider, "ETH-USD", &provider.plan, &SilentProgress);

        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.skipped.len(), 3);
        assert!(matches!(outcome.skipped[0].reason, SkipReason::Failed(ref m) if m.contains("timeout")));
        assert_eq!(outcome.skipped[2].reason, SkipReason::Empty);
    }

    #[test]
    fn all_windows_empty_yields_empty_outcome() {
        let provider = ScriptedProvider::new(plan(), vec![Some(false); 4]);
        let outcome = fetch_windowed(&provider, "SOL-USD", &provider.plan, &SilentProgress);
        assert!(outcome.is_empty());
        assert_eq!(outcome.skipped.len(), 4);
    }

    #[test]
    fn consecutive_failures_keep_requesting() {
        let provider = ScriptedProvider::new(plan(), vec![None, None, None, Some(true)]);
        let outcome = fetch_windowed(&provider, "BTC-USD", &provider.plan, &SilentProgress);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 4);
        assert_eq!(outcome.blocks.len(), 1);
        assert_eq!(outcome.skipped.len(), 3);
    }

    #[test]
    fn unavailable_provider_is_not_called() {
        let provider = ScriptedProvider::new(plan(), vec![Some(true); 4]);
        provider.available.store(false, Ordering::SeqCst);
        let outcome = fetch_windowed(&provider, "BTC-USD", &provider.plan, &SilentProgress);

        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(outcome.is_empty());
        assert_eq!(outcome.skipped.len(), 4);
        assert!(outcome
            .skipped
            .iter()
            .all(|s| matches!(&s.reason, SkipReason::Failed(m) if m.contains("scripted is unavailable"))));
    }
}
