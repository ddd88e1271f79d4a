//! Exchange-rate engine: query, update and startup loading.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::{PersistError, UpdateError};
use crate::notify::{FeeRecompute, RatesUpdated};
use crate::persistence::{to_document, RateStore, RatesDocument, DEFAULT_RATES_FILE};
use crate::registry::AssetRegistry;
use crate::table::{RateTableUpdate, SharedRateTable};
use crate::update::{validate_rates, ProposedRate};

/// Configuration for the rate engine.
#[derive(Debug, Clone)]
pub struct RateEngineConfig {
    /// Where the live table is persisted.
    pub rates_path: PathBuf,
    /// Rates to start from when nothing has been persisted yet.
    pub initial_rates_path: Option<PathBuf>,
}

impl Default for RateEngineConfig {
    fn default() -> Self {
        Self {
            rates_path: PathBuf::from(DEFAULT_RATES_FILE),
            initial_rates_path: None,
        }
    }
}

/// Where the table came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    /// The persisted rates file.
    Persisted { entries: usize },
    /// The configured initial rates file.
    Initial { entries: usize, persisted: bool },
    /// Nothing on disk; the seeded native rate stays.
    Default,
}

/// Owns the administrative path of the rate table.
pub struct RateEngine {
    table: SharedRateTable,
    registry: Arc<dyn AssetRegistry>,
    store: RateStore,
    recompute: Arc<dyn FeeRecompute>,
    config: RateEngineConfig,
}

impl RateEngine {
    /// Create a new engine around an existing table.
    pub fn new(
        table: SharedRateTable,
        registry: Arc<dyn AssetRegistry>,
        recompute: Arc<dyn FeeRecompute>,
        config: RateEngineConfig,
    ) -> Self {
        Self {
            table,
            registry,
            store: RateStore::new(config.rates_path.clone()),
            recompute,
            config,
        }
    }

    /// The table valuation callers read from.
    pub fn table(&self) -> &SharedRateTable {
        &self.table
    }

    pub fn registry(&self) -> &Arc<dyn AssetRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &RateStore {
        &self.store
    }

    /// Load persisted rates, falling back to the initial rates file.
    ///
    /// A failed load leaves the table as it was.
    #[instrument(skip(self), fields(path = %self.store.path().display()))]
    pub fn load(&self) -> Result<LoadSource, PersistError> {
        let update = self.table.begin_update();

        if let Some(snapshot) = self.store.load(self.registry.as_ref())? {
            let entries = snapshot.len();
            update.install(snapshot);
            return Ok(LoadSource::Persisted { entries });
        }

        let Some(initial_path) = &self.config.initial_rates_path else {
            info!("No persisted exchange rates, keeping defaults");
            return Ok(LoadSource::Default);
        };

        let initial = RateStore::new(initial_path.clone());
        let Some(snapshot) = initial.load(self.registry.as_ref())? else {
            warn!(
                initial = %initial_path.display(),
                "Initial exchange rates file not found, keeping defaults"
            );
            return Ok(LoadSource::Default);
        };

        let entries = snapshot.len();
        update.install(snapshot);
        let persisted = self.persist(&update).is_ok();
        info!(
            initial = %initial_path.display(),
            entries,
            persisted,
            "Seeded exchange rates from initial file"
        );
        Ok(LoadSource::Initial { entries, persisted })
    }

    /// Current rates keyed by label or asset hex.
    pub fn get_rates(&self) -> RatesDocument {
        to_document(&self.table.snapshot(), self.registry.as_ref())
    }

    /// Replace the whole table with `proposal`.
    ///
    /// Nothing changes unless every entry is valid. Once installed, the
    /// table is persisted and fee recomputation is signalled; a failed write
    /// is reported as [`UpdateError::PersistedFalse`] with the new table
    /// still live.
    #[instrument(skip(self, proposal), fields(entries = proposal.len()))]
    pub fn set_rates(&self, proposal: &[ProposedRate]) -> Result<RatesUpdated, UpdateError> {
        let update = self.table.begin_update();

        let snapshot = validate_rates(proposal, self.registry.as_ref()).map_err(|errors| {
            warn!(errors = errors.len(), "Rejected exchange rate update");
            UpdateError::Rejected(errors)
        })?;

        let entries = snapshot.len();
        update.install(snapshot);
        let persisted = self.persist(&update);
        drop(update);

        let event = RatesUpdated::new(entries, persisted.is_ok());
        self.recompute.rates_changed(&event);

        match persisted {
            Ok(()) => {
                info!(update_id = %event.id, entries, "Exchange rates updated");
                Ok(event)
            }
            Err(source) => Err(UpdateError::PersistedFalse { source }),
        }
    }

    fn persist(&self, update: &RateTableUpdate<'_>) -> Result<(), PersistError> {
        self.store
            .save(&update.current(), self.registry.as_ref())
            .map_err(|e| {
                warn!(error = %e, "Failed to persist exchange rates");
                e
            })
    }
}
