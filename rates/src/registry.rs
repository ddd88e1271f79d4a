//! Asset label resolution.

use anyfee_common::AssetId;
use dashmap::DashMap;
use tracing::debug;

use crate::error::RegistryError;

/// Resolves operator-facing asset names to identifiers and back.
pub trait AssetRegistry: Send + Sync {
    /// Resolve a label, or failing that a 64 character asset hex.
    fn resolve(&self, label_or_hex: &str) -> Option<AssetId>;

    /// Human-readable label of an asset, if it has one.
    fn label_for(&self, asset: &AssetId) -> Option<String>;

    /// Key used for the asset in rate documents: its label when the label
    /// resolves back to the asset, else its hex.
    fn display_key(&self, asset: &AssetId) -> String {
        self.label_for(asset)
            .filter(|label| self.resolve(label) == Some(*asset))
            .unwrap_or_else(|| asset.to_hex())
    }
}

/// In-memory label directory.
pub struct AssetDirectory {
    by_label: DashMap<String, AssetId>,
    by_asset: DashMap<AssetId, String>,
}

impl AssetDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self {
            by_label: DashMap::new(),
            by_asset: DashMap::new(),
        }
    }

    /// Bind `label` to `asset`. The newest label of an asset is the one
    /// used when writing rate documents.
    ///
    /// Rebinding a label moves it: the asset it named before falls back to
    /// another of its labels, or to its hex. A label may not be the hex of
    /// a different asset.
    pub fn bind(&self, label: impl Into<String>, asset: AssetId) -> Result<(), RegistryError> {
        let label = label.into();
        if label.is_empty() {
            return Err(RegistryError::EmptyLabel);
        }
        if let Ok(named) = AssetId::from_hex(&label) {
            if named != asset {
                return Err(RegistryError::LabelShadowsAsset { label, asset });
            }
        }

        debug!(label = %label, asset = %asset, "Bound asset label");
        let previous = self.by_label.insert(label.clone(), asset);
        self.by_asset.insert(asset, label.clone());

        if let Some(previous) = previous.filter(|previous| *previous != asset) {
            self.by_asset.remove_if(&previous, |_, bound| *bound == label);
            if let Some(fallback) = self.first_label_of(&previous) {
                self.by_asset.entry(previous).or_insert(fallback);
            }
        }
        Ok(())
    }

    /// Builder form of [`AssetDirectory::bind`].
    pub fn with_label(
        self,
        label: impl Into<String>,
        asset: AssetId,
    ) -> Result<Self, RegistryError> {
        self.bind(label, asset)?;
        Ok(self)
    }

    fn first_label_of(&self, asset: &AssetId) -> Option<String> {
        self.by_label
            .iter()
            .filter(|entry| entry.value() == asset)
            .map(|entry| entry.key().clone())
            .min()
    }

    pub fn len(&self) -> usize {
        self.by_label.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_label.is_empty()
    }
}

impl Default for AssetDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl AssetRegistry for AssetDirectory {
    fn resolve(&self, label_or_hex: &str) -> Option<AssetId> {
        if let Some(asset) = self.by_label.get(label_or_hex) {
            return Some(*asset);
        }

        AssetId::from_hex(label_or_hex)
            .ok()
            .filter(|asset| !asset.is_null())
    }

    fn label_for(&self, asset: &AssetId) -> Option<String> {
        self.by_asset.get(asset).map(|label| label.clone())
    }
}
