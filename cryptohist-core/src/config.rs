//! Download configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all) gives
//! the standard run: four crypto assets, four years of hourly bars fetched in
//! 365-day windows, written under `data/raw`.

use crate::data::assets::{Asset, AssetSet};
use crate::data::provider::DataError;
use crate::data::window::DownloadPlan;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_LOOKBACK_DAYS: u32 = 4 * 365;
pub const DEFAULT_WINDOW_DAYS: u32 = 365;
pub const DEFAULT_INTERVAL: &str = "1h";
pub const DEFAULT_OUTPUT_DIR: &str = "data/raw";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Total history to fetch, counted back from today.
    pub lookback_days: u32,
    /// Maximum span of a single provider request.
    pub window_days: u32,
    /// Bar interval passed to the provider.
    pub interval: String,
    pub output_dir: PathBuf,
    /// Assets to download, in order.
    pub assets: Vec<Asset>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            window_days: DEFAULT_WINDOW_DAYS,
            interval: DEFAULT_INTERVAL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            assets: AssetSet::default_crypto().assets,
        }
    }
}

impl DownloadConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string and validate it.
    pub fn from_toml(content: &str) -> Result<Self, DataError> {
        let config: Self = toml::from_str(content)
            .map_err(|e| DataError::Config(format!("parse config TOML: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        if self.window_days == 0 {
            return Err(DataError::Config("window_days must be positive".into()));
        }
        if self.interval.trim().is_empty() {
            return Err(DataError::Config("interval must not be empty".into()));
        }
        Ok(())
    }

    pub fn asset_set(&self) -> AssetSet {
        AssetSet {
            assets: self.assets.clone(),
        }
    }

    /// Build the request plan for a run ending on `today`.
    pub fn plan(&self, today: NaiveDate) -> DownloadPlan {
        DownloadPlan::new(today, self.lookback_days, self.window_days, &self.interval)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = DownloadConfig::from_toml("").unwrap();
        assert_eq!(config, DownloadConfig::default());
        assert_eq!(config.asset_set(), AssetSet::default_crypto());
        assert_eq!(config.output_dir, PathBuf::from("data/raw"));
    }

    #[test]
    fn partial_toml_overrides_only_given_keys() {
        let config = DownloadConfig::from_toml(
            r#"
            lookback_days = 730
            output_dir = "out"

            [[assets]]
            name = "cardano"
            ticker = "ADA-USD"
            "#,
        )
        .unwrap();

        assert_eq!(config.lookback_days, 730);
        assert_eq!(config.window_days, DEFAULT_WINDOW_DAYS);
        assert_eq!(config.interval, "1h");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(config.assets, vec![Asset::new("cardano", "ADA-USD")]);
    }

    #[test]
    fn zero_window_is_rejected() {
        assert!(matches!(
            DownloadConfig::from_toml("window_days = 0"),
            Err(DataError::Config(_))
        ));
    }

    #[test]
    fn default_plan_has_four_windows() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let plan = DownloadConfig::default().plan(today);
        assert_eq!(plan.windows.len(), 4);
        assert_eq!(plan.interval, "1h");
        assert_eq!(plan.windows.last().unwrap().end, today);
    }

    #[test]
    fn loads_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("download.toml");
        std::fs::write(&path, "interval = \"1d\"\n").unwrap();

        let config = DownloadConfig::from_file(&path).unwrap();
        assert_eq!(config.interval, "1d");

        let missing = DownloadConfig::from_file(&tmp.path().join("nope.toml"));
        assert!(matches!(missing, Err(DataError::Io { .. })));
    }
}
