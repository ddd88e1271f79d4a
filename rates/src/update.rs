//! Validation of proposed rate sets.
//!
//! A proposal is checked entry by entry without stopping at the first
//! failure, so the caller gets every problem in one report. Only a proposal
//! with no failures produces a snapshot.

use serde_json::Value as JsonValue;

use crate::error::ValidationError;
use crate::registry::AssetRegistry;
use crate::table::{RateEntry, RateSnapshot};

/// Raw rate as supplied by an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawRate {
    /// An integer rate, not yet range checked.
    Integer(i64),
    /// Anything that is not a 64-bit integer, kept as text for the report.
    Other(String),
}

/// One `label_or_hex -> rate` pair of a proposal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposedRate {
    pub label: String,
    pub rate: RawRate,
}

impl ProposedRate {
    /// Create a proposal entry from an integer rate.
    pub fn new(label: impl Into<String>, scaled_value: i64) -> Self {
        Self {
            label: label.into(),
            rate: RawRate::Integer(scaled_value),
        }
    }

    /// Create a proposal entry from an arbitrary JSON value.
    pub fn from_json(label: impl Into<String>, value: &JsonValue) -> Self {
        let rate = match value.as_i64() {
            Some(v) => RawRate::Integer(v),
            None => RawRate::Other(value.to_string()),
        };
        Self {
            label: label.into(),
            rate,
        }
    }

    /// Entries of a JSON object, in the object's key order.
    pub fn from_json_object(object: &serde_json::Map<String, JsonValue>) -> Vec<Self> {
        object
            .iter()
            .map(|(label, value)| Self::from_json(label.as_str(), value))
            .collect()
    }
}

/// Validate every entry and build the replacement snapshot.
///
/// Later entries win when two labels name the same asset.
pub fn validate_rates<'a, I>(
    proposal: I,
    registry: &dyn AssetRegistry,
) -> Result<RateSnapshot, Vec<ValidationError>>
where
    I: IntoIterator<Item = &'a ProposedRate>,
{
    let mut snapshot = RateSnapshot::new();
    let mut errors = Vec::new();

    for (index, proposed) in proposal.into_iter().enumerate() {
        let asset = registry.resolve(&proposed.label);
        if asset.is_none() {
            errors.push(ValidationError::unknown_asset(index, proposed.label.as_str()));
        }

        let entry = match &proposed.rate {
            RawRate::Integer(v) => match RateEntry::new(*v) {
                Some(entry) => Some(entry),
                None => {
                    errors.push(ValidationError::invalid_rate(
                        index,
                        proposed.label.as_str(),
                        v.to_string(),
                    ));
                    None
                }
            },
            RawRate::Other(raw) => {
                errors.push(ValidationError::invalid_rate(
                    index,
                    proposed.label.as_str(),
                    raw.as_str(),
                ));
                None
            }
        };

        if let (Some(asset), Some(entry)) = (asset, entry) {
            snapshot.insert(asset, entry);
        }
    }

    if errors.is_empty() {
        Ok(snapshot)
    } else {
        Err(errors)
    }
}
