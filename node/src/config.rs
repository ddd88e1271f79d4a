//! Node configuration.

use std::path::PathBuf;

use anyfee_common::{AssetId, AssetIdError};
use anyfee_rates::{AssetDirectory, RateEngineConfig, DEFAULT_RATES_FILE};

/// Policy asset of the default regtest chain.
pub const DEFAULT_NATIVE_ASSET: &str =
    "b2e15d0d7a0c94e4e2ce0fe6e8691b9e451377f6e46e8045a86f7c4b5d4f0f23";

/// Main node configuration.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory holding the rates file.
    pub data_dir: PathBuf,
    /// Rates file name inside the data directory.
    pub rates_file: String,
    /// Rates to seed the table with when nothing is persisted.
    pub initial_rates_file: Option<PathBuf>,
    /// Label of the native asset.
    pub native_asset_label: String,
    /// Hex of the native asset.
    pub native_asset: String,
    /// Extra `(label, hex)` bindings for the asset registry.
    pub asset_labels: Vec<(String, String)>,
    /// Log level.
    pub log_level: String,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".anyfee"),
            rates_file: DEFAULT_RATES_FILE.to_string(),
            initial_rates_file: None,
            native_asset_label: "bitcoin".to_string(),
            native_asset: DEFAULT_NATIVE_ASSET.to_string(),
            asset_labels: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl NodeConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var("ANYFEE_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }

        if let Ok(file) = std::env::var("ANYFEE_RATES_FILE") {
            config.rates_file = file;
        }

        if let Ok(file) = std::env::var("ANYFEE_INITIAL_RATES_FILE") {
            config.initial_rates_file = Some(PathBuf::from(file));
        }

        if let Ok(label) = std::env::var("ANYFEE_NATIVE_ASSET_LABEL") {
            config.native_asset_label = label;
        }

        if let Ok(hex) = std::env::var("ANYFEE_NATIVE_ASSET") {
            config.native_asset = hex;
        }

        if let Ok(labels) = std::env::var("ANYFEE_ASSET_LABELS") {
            config.asset_labels = parse_asset_labels(&labels);
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.rates_file.is_empty() {
            return Err("Rates file name cannot be empty".to_string());
        }

        if self.native_asset_label.is_empty() {
            return Err("Native asset label cannot be empty".to_string());
        }

        let native = self
            .native_asset()
            .map_err(|e| format!("Invalid native asset: {}", e))?;
        if native.is_null() {
            return Err("Native asset cannot be the null asset".to_string());
        }

        for (label, hex) in &self.asset_labels {
            if label.is_empty() {
                return Err(format!("Empty label for asset {}", hex));
            }
            AssetId::from_hex(hex).map_err(|e| format!("Invalid asset for label {}: {}", label, e))?;
        }

        self.asset_directory()
            .map_err(|e| format!("Invalid asset labels: {}", e))?;

        Ok(())
    }

    /// The native asset.
    pub fn native_asset(&self) -> Result<AssetId, AssetIdError> {
        AssetId::from_hex(&self.native_asset)
    }

    /// Full path of the persisted rates file.
    pub fn rates_path(&self) -> PathBuf {
        self.data_dir.join(&self.rates_file)
    }

    /// Engine configuration derived from this node configuration.
    pub fn engine_config(&self) -> RateEngineConfig {
        RateEngineConfig {
            rates_path: self.rates_path(),
            initial_rates_path: self.initial_rates_file.clone(),
        }
    }

    /// Build the asset registry. Later bindings of a label replace earlier
    /// ones, including the native asset's.
    pub fn asset_directory(&self) -> anyhow::Result<AssetDirectory> {
        let directory = AssetDirectory::new();
        directory.bind(self.native_asset_label.as_str(), self.native_asset()?)?;
        for (label, hex) in &self.asset_labels {
            directory.bind(label.as_str(), AssetId::from_hex(hex)?)?;
        }
        Ok(directory)
    }
}

/// Parse `label=hex` pairs separated by commas.
fn parse_asset_labels(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((label, hex)) => (label.trim().to_string(), hex.trim().to_string()),
            None => (String::new(), pair.to_string()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyfee_rates::AssetRegistry;

    #[test]
    fn test_default_config() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.rates_path(),
            PathBuf::from(".anyfee").join("exchangerates.json")
        );
    }

    #[test]
    fn test_invalid_config() {
        let mut config = NodeConfig::default();
        config.native_asset = "invalid".to_string();
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.native_asset = "0".repeat(64);
        assert!(config.validate().is_err());

        let mut config = NodeConfig::default();
        config.asset_labels = parse_asset_labels("usdt=nothex");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_asset_labels() {
        let hex = "ab".repeat(32);
        let labels = parse_asset_labels(&format!(" usdt = {hex} ,, loose"));

        assert_eq!(
            labels,
            vec![
                ("usdt".to_string(), hex.clone()),
                (String::new(), "loose".to_string()),
            ]
        );
    }

    #[test]
    fn test_asset_directory() {
        let hex = "ab".repeat(32);
        let config = NodeConfig {
            native_asset_label: "gasset".to_string(),
            asset_labels: vec![("usdt".to_string(), hex.clone())],
            ..Default::default()
        };

        let directory = config.asset_directory().unwrap();

        assert_eq!(
            directory.resolve("gasset").unwrap().to_hex(),
            DEFAULT_NATIVE_ASSET
        );
        assert_eq!(directory.resolve("usdt").unwrap().to_hex(), hex);
    }

    #[test]
    fn test_rebinding_native_label() {
        let other = "ab".repeat(32);
        let config = NodeConfig {
            asset_labels: vec![("bitcoin".to_string(), other.clone())],
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        let directory = config.asset_directory().unwrap();
        let native = config.native_asset().unwrap();
        let moved = AssetId::from_hex(&other).unwrap();

        assert_eq!(directory.resolve("bitcoin"), Some(moved));
        assert_eq!(directory.display_key(&moved), "bitcoin");
        assert_eq!(directory.display_key(&native), DEFAULT_NATIVE_ASSET);
    }

    #[test]
    fn test_hex_label_for_other_asset_rejected() {
        let config = NodeConfig {
            asset_labels: vec![("cd".repeat(32), "ab".repeat(32))],
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.asset_directory().is_err());
    }
}
