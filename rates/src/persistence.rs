//! JSON file store for the rate table.
//!
//! The document is a single object mapping each asset's label (or hex when
//! it has none) to its scaled rate, with keys in sorted order so that saving
//! an unchanged table produces identical bytes.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::error::PersistError;
use crate::registry::AssetRegistry;
use crate::table::RateSnapshot;
use crate::update::{validate_rates, ProposedRate};

/// File name of the rate document inside the node's data directory.
pub const DEFAULT_RATES_FILE: &str = "exchangerates.json";

/// Rate document keyed by label or asset hex.
pub type RatesDocument = BTreeMap<String, i64>;

/// Render a snapshot as a rate document.
pub fn to_document(snapshot: &RateSnapshot, registry: &dyn AssetRegistry) -> RatesDocument {
    snapshot
        .iter()
        .map(|(asset, entry)| (registry.display_key(asset), entry.scaled_value()))
        .collect()
}

/// Reads and writes the rate document at a fixed path.
#[derive(Debug, Clone)]
pub struct RateStore {
    path: PathBuf,
}

impl RateStore {
    /// Create a store for the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for [`DEFAULT_RATES_FILE`] inside `data_dir`.
    pub fn in_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self::new(data_dir.as_ref().join(DEFAULT_RATES_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored table. `Ok(None)` when there is no file yet.
    pub fn load(&self, registry: &dyn AssetRegistry) -> Result<Option<RateSnapshot>, PersistError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No rates file");
                return Ok(None);
            }
            Err(source) => {
                return Err(PersistError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let object: serde_json::Map<String, JsonValue> =
            serde_json::from_str(&contents).map_err(|e| self.malformed(e.to_string()))?;

        let proposal = ProposedRate::from_json_object(&object);
        let snapshot = validate_rates(&proposal, registry).map_err(|errors| {
            self.malformed(
                errors
                    .iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join("; "),
            )
        })?;

        info!(
            path = %self.path.display(),
            entries = snapshot.len(),
            "Loaded exchange rates"
        );
        Ok(Some(snapshot))
    }

    /// Write the table, replacing the file atomically.
    pub fn save(
        &self,
        snapshot: &RateSnapshot,
        registry: &dyn AssetRegistry,
    ) -> Result<(), PersistError> {
        let document = to_document(snapshot, registry);
        let mut contents = serde_json::to_string_pretty(&document)?;
        contents.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io(source))?;
        }

        let staging = self.staging_path();
        if let Err(source) =
            fs::write(&staging, contents).and_then(|()| fs::rename(&staging, &self.path))
        {
            if let Err(e) = fs::remove_file(&staging) {
                if e.kind() != ErrorKind::NotFound {
                    warn!(path = %staging.display(), error = %e, "Failed to remove staging file");
                }
            }
            return Err(self.io(source));
        }

        debug!(
            path = %self.path.display(),
            entries = document.len(),
            "Saved exchange rates"
        );
        Ok(())
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_RATES_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn io(&self, source: std::io::Error) -> PersistError {
        PersistError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn malformed(&self, reason: String) -> PersistError {
        PersistError::MalformedPersistedData {
            path: self.path.clone(),
            reason,
        }
    }
}
