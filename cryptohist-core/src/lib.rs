//! cryptohist core: windowed hourly price download, merge, and CSV export.
//!
//! This crate contains the whole pipeline:
//! - Lookback windowing sized to the provider's intraday history limit
//! - DataProvider trait with a Yahoo Finance implementation
//! - Block merging: concat, timestamp dedup, header flattening
//! - CSV writer and the per-asset download orchestrator
//! - TOML download configuration

pub mod config;
pub mod data;

pub use config::DownloadConfig;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: provider-facing types are Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<data::YahooProvider>();
        require_sync::<data::YahooProvider>();
        require_send::<data::CircuitBreaker>();
        require_sync::<data::CircuitBreaker>();
        require_send::<data::HourlyBar>();
        require_sync::<data::HourlyBar>();
        require_send::<data::DateWindow>();
        require_sync::<data::DateWindow>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<DownloadConfig>();
        require_sync::<DownloadConfig>();
    }

    /// Compile-time check: the provider trait can be used as a trait object.
    #[allow(dead_code)]
    fn assert_provider_object_safe(provider: &dyn data::DataProvider) -> bool {
        provider.is_available()
    }
}
