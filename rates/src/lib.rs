//! AnyFee Exchange Rates
//!
//! Values fees paid in arbitrary assets against the node's reference fee
//! unit, so that transactions paying in different assets can be ranked and
//! checked against minimum fee policies.
//!
//! # Features
//!
//! - Saturating fixed-point conversion in both directions
//! - Snapshot reads that never observe a half-applied update
//! - All-or-nothing rate updates with a complete error report
//! - Deterministic JSON persistence keyed by asset label or hex
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use anyfee_rates::{
//!     AssetDirectory, NoRecompute, ProposedRate, RateEngine, RateEngineConfig, RateTable,
//! };
//!
//! let table = Arc::new(RateTable::new(native_asset));
//! let registry = Arc::new(AssetDirectory::new().with_label("bitcoin", native_asset)?);
//! let engine = RateEngine::new(table.clone(), registry, Arc::new(NoRecompute), RateEngineConfig::default());
//!
//! engine.set_rates(&[ProposedRate::new("bitcoin", 100_000_000)])?;
//!
//! // Hot path: value a fee of 1000 atoms
//! let value = table.amount_to_value(1000, &native_asset)?;
//! ```

pub mod conversion;
pub mod engine;
pub mod error;
pub mod notify;
pub mod persistence;
pub mod registry;
pub mod table;
pub mod update;

pub use conversion::{Valuation, SCALE};
pub use engine::{LoadSource, RateEngine, RateEngineConfig};
pub use error::{
    ConversionError, ConversionResult, PersistError, RegistryError, UpdateError,
    ValidationError, ValidationErrorKind,
};
pub use notify::{ChannelRecompute, FeeRecompute, NoRecompute, RatesUpdated};
pub use persistence::{RateStore, RatesDocument, DEFAULT_RATES_FILE};
pub use registry::{AssetDirectory, AssetRegistry};
pub use table::{RateEntry, RateSnapshot, RateTable, RateTableUpdate, SharedRateTable};
pub use update::{validate_rates, ProposedRate, RawRate};
