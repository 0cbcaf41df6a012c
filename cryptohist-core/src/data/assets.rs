//! Asset set: the display names and tickers a run downloads.
//!
//! Configured as `[[assets]]` TOML tables. Order is significant: assets are
//! downloaded and reported in the order they are listed.

use serde::{Deserialize, Serialize};

/// One downloadable asset: file-friendly display name plus provider ticker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub name: String,
    pub ticker: String,
}

impl Asset {
    pub fn new(name: impl Into<String>, ticker: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ticker: ticker.into(),
        }
    }
}

/// Ordered list of assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetSet {
    pub assets: Vec<Asset>,
}

impl AssetSet {
    /// The four default crypto assets.
    pub fn default_crypto() -> Self {
        let assets = [
            ("bitcoin", "BTC-USD"),
            ("ethereum", "ETH-USD"),
            ("binancecoin", "BNB-USD"),
            ("solana", "SOL-USD"),
        ]
        .into_iter()
        .map(|(name, ticker)| Asset::new(name, ticker))
        .collect();

        Self { assets }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Asset> {
        self.assets.iter()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl Default for AssetSet {
    fn default() -> Self {
        Self::default_crypto()
    }
}

impl<'a> IntoIterator for &'a AssetSet {
    type Item = &'a Asset;
    type IntoIter = std::slice::Iter<'a, Asset>;

    fn into_iter(self) -> Self::IntoIter {
        self.assets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_set_is_ordered() {
        let set = AssetSet::default();
        let pairs: Vec<(&str, &str)> = set
            .iter()
            .map(|a| (a.name.as_str(), a.ticker.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("bitcoin", "BTC-USD"),
                ("ethereum", "ETH-USD"),
                ("binancecoin", "BNB-USD"),
                ("solana", "SOL-USD"),
            ]
        );
        assert_eq!(set.len(), 4);
    }

    #[test]
    fn iterates_by_reference_in_order() {
        let set = AssetSet {
            assets: vec![Asset::new("solana", "SOL-USD"), Asset::new("bitcoin", "BTC-USD")],
        };
        let names: Vec<&str> = (&set).into_iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["solana", "bitcoin"]);
        assert!(!set.is_empty());
        assert!(AssetSet { assets: vec![] }.is_empty());
    }
}
