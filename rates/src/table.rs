//! The live fee exchange-rate table.
//!
//! Readers take an immutable [`RateSnapshot`] and run a whole conversion
//! against it. Writers build a complete replacement snapshot off to the
//! side and install it with a single handle swap while holding the table's
//! update lock, so a reader sees either the old table or the new one.

use std::collections::HashMap;
use std::sync::Arc;

use anyfee_common::{Amount, AssetId, Value};
use parking_lot::{Mutex, MutexGuard, RwLock};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conversion::{self, Valuation, SCALE};
use crate::error::ConversionResult;

/// Scaled exchange rate of one asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct RateEntry {
    scaled_value: i64,
}

impl RateEntry {
    /// The 1:1 rate of the native asset.
    pub const IDENTITY: RateEntry = RateEntry {
        scaled_value: SCALE,
    };

    /// Create a rate entry. Negative rates are rejected.
    pub fn new(scaled_value: i64) -> Option<Self> {
        (scaled_value >= 0).then_some(Self { scaled_value })
    }

    /// Get the fixed-point rate.
    pub fn scaled_value(&self) -> i64 {
        self.scaled_value
    }

    /// A zero rate makes the asset worthless for fee purposes.
    pub fn is_zero(&self) -> bool {
        self.scaled_value == 0
    }
}

impl TryFrom<i64> for RateEntry {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        RateEntry::new(value).ok_or_else(|| format!("negative exchange rate {}", value))
    }
}

impl From<RateEntry> for i64 {
    fn from(entry: RateEntry) -> i64 {
        entry.scaled_value
    }
}

/// Immutable view of every known rate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateSnapshot {
    rates: HashMap<AssetId, RateEntry>,
}

impl RateSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot holding only the identity rate of the native asset.
    pub fn seeded(native_asset: AssetId) -> Self {
        let mut snapshot = Self::new();
        snapshot.insert(native_asset, RateEntry::IDENTITY);
        snapshot
    }

    /// Set the rate of an asset, replacing any earlier rate.
    ///
    /// Only possible while the snapshot is still owned by its builder;
    /// installed snapshots are shared behind an `Arc` and never change.
    pub fn insert(&mut self, asset: AssetId, entry: RateEntry) -> Option<RateEntry> {
        self.rates.insert(asset, entry)
    }

    /// Get the rate of an asset.
    pub fn get(&self, asset: &AssetId) -> Option<RateEntry> {
        self.rates.get(asset).copied()
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.rates.contains_key(asset)
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    /// Iterate over all rates in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&AssetId, &RateEntry)> {
        self.rates.iter()
    }

    /// Value a fee paid in `asset`.
    pub fn amount_to_value(
        &self,
        amount: Amount,
        asset: &AssetId,
    ) -> ConversionResult<Valuation<Value>> {
        match self.get(asset) {
            Some(entry) => conversion::amount_to_value(amount, entry),
            None => {
                debug!(asset = %asset, "No exchange rate for asset");
                Ok(Valuation::NoRate)
            }
        }
    }

    /// Amount of `asset` needed to pay `value` reference units.
    pub fn value_to_amount(
        &self,
        value: Value,
        asset: &AssetId,
    ) -> ConversionResult<Valuation<Amount>> {
        match self.get(asset) {
            Some(entry) => conversion::value_to_amount(value, asset, entry),
            None => {
                debug!(asset = %asset, "No exchange rate for asset");
                Ok(Valuation::NoRate)
            }
        }
    }
}

impl FromIterator<(AssetId, RateEntry)> for RateSnapshot {
    fn from_iter<I: IntoIterator<Item = (AssetId, RateEntry)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}

/// Process-wide exchange-rate table shared by valuation and admin paths.
pub struct RateTable {
    native_asset: AssetId,
    current: RwLock<Arc<RateSnapshot>>,
    update_lock: Mutex<()>,
}

impl RateTable {
    /// Create a table seeded with the native asset at the identity rate.
    pub fn new(native_asset: AssetId) -> Self {
        Self {
            native_asset,
            current: RwLock::new(Arc::new(RateSnapshot::seeded(native_asset))),
            update_lock: Mutex::new(()),
        }
    }

    /// The asset valued 1:1 with the reference unit by default.
    pub fn native_asset(&self) -> AssetId {
        self.native_asset
    }

    /// Current snapshot. Hold on to it for the length of one calculation.
    pub fn snapshot(&self) -> Arc<RateSnapshot> {
        Arc::clone(&self.current.read())
    }

    /// Value a fee against the current snapshot.
    pub fn amount_to_value(
        &self,
        amount: Amount,
        asset: &AssetId,
    ) -> ConversionResult<Valuation<Value>> {
        self.snapshot().amount_to_value(amount, asset)
    }

    /// Convert a reference value into `asset` against the current snapshot.
    pub fn value_to_amount(
        &self,
        value: Value,
        asset: &AssetId,
    ) -> ConversionResult<Valuation<Amount>> {
        self.snapshot().value_to_amount(value, asset)
    }

    /// Acquire the update lock. Blocks while another update is in flight.
    pub fn begin_update(&self) -> RateTableUpdate<'_> {
        RateTableUpdate {
            table: self,
            _guard: self.update_lock.lock(),
        }
    }
}

/// Exclusive right to replace the table's contents.
///
/// Dropping it releases the update lock.
pub struct RateTableUpdate<'a> {
    table: &'a RateTable,
    _guard: MutexGuard<'a, ()>,
}

impl RateTableUpdate<'_> {
    /// Snapshot live at the time of the call.
    pub fn current(&self) -> Arc<RateSnapshot> {
        self.table.snapshot()
    }

    /// Swap in `snapshot` as the whole table, returning the previous one.
    pub fn install(&self, snapshot: RateSnapshot) -> Arc<RateSnapshot> {
        let entries = snapshot.len();
        let previous = std::mem::replace(&mut *self.table.current.write(), Arc::new(snapshot));
        info!(
            entries,
            previous_entries = previous.len(),
            "Installed exchange rate table"
        );
        previous
    }
}

/// Shared rate table.
pub type SharedRateTable = Arc<RateTable>;
