//! Request handlers for the fee exchange-rate operations.
//!
//! These are the operator-facing entry points: `getfeeexchangerates` and
//! `setfeeexchangerates`, plus two valuation queries. Handlers take and
//! return JSON so that any transport can sit in front of them.

use std::sync::Arc;

use anyfee_common::{AssetId, Value};
use anyfee_rates::{
    ConversionError, ProposedRate, RateEngine, UpdateError, ValidationError, Valuation,
};
use serde_json::{json, Value as JsonValue};
use thiserror::Error;
use tracing::instrument;

/// Errors returned to the operator.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Request parameters have the wrong shape.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The proposed rates were rejected.
    #[error("Error loading rates from JSON: {}", unordered_list(.0))]
    InvalidRates(Vec<ValidationError>),

    /// The rates are live but could not be saved.
    #[error("Error saving exchange rates to JSON file {path}: \n{reason}\n")]
    SaveFailed { path: String, reason: String },

    /// A valuation query could not be answered.
    #[error("Conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

impl HandlerError {
    /// Numeric error code, following JSON-RPC conventions of the node.
    pub fn code(&self) -> i32 {
        match self {
            HandlerError::InvalidParameter(_) | HandlerError::Conversion(_) => -8,
            HandlerError::InvalidRates(_) | HandlerError::SaveFailed { .. } => -4,
        }
    }
}

fn unordered_list(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("- {}", e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Handlers bound to a rate engine.
pub struct RatesHandler {
    engine: Arc<RateEngine>,
}

impl RatesHandler {
    pub fn new(engine: Arc<RateEngine>) -> Self {
        Self { engine }
    }

    /// Current whitelist of fee assets and their rates.
    pub fn get_fee_exchange_rates(&self) -> JsonValue {
        json!(self.engine.get_rates())
    }

    /// Replace the fee asset whitelist and rates.
    #[instrument(skip(self, params))]
    pub fn set_fee_exchange_rates(&self, params: &JsonValue) -> Result<JsonValue, HandlerError> {
        let rates = params.as_object().ok_or_else(|| {
            HandlerError::InvalidParameter("rates must be a JSON object".to_string())
        })?;

        let proposal = ProposedRate::from_json_object(rates);
        match self.engine.set_rates(&proposal) {
            Ok(_) => Ok(JsonValue::Null),
            Err(UpdateError::Rejected(errors)) => Err(HandlerError::InvalidRates(errors)),
            Err(UpdateError::PersistedFalse { source }) => Err(HandlerError::SaveFailed {
                path: self.engine.store().path().display().to_string(),
                reason: format!("- {}", source),
            }),
        }
    }

    /// Reference value of `amount` atoms of an asset.
    pub fn value_of(&self, asset: &str, amount: i64) -> Result<JsonValue, HandlerError> {
        let asset_id = self.resolve(asset)?;
        let valuation = self.engine.table().amount_to_value(amount, &asset_id)?;
        Ok(render(
            asset,
            &asset_id,
            json!({ "amount": amount }),
            valuation.map(|v| v.get()),
            "value",
        ))
    }

    /// Atoms of an asset worth `value` reference units.
    pub fn amount_for(&self, asset: &str, value: i64) -> Result<JsonValue, HandlerError> {
        let asset_id = self.resolve(asset)?;
        let valuation = self
            .engine
            .table()
            .value_to_amount(Value::new(value), &asset_id)?;
        Ok(render(asset, &asset_id, json!({ "value": value }), valuation, "amount"))
    }

    fn resolve(&self, asset: &str) -> Result<AssetId, HandlerError> {
        self.engine.registry().resolve(asset).ok_or_else(|| {
            HandlerError::InvalidParameter(format!(
                "Unknown label and invalid asset hex: {}",
                asset
            ))
        })
    }
}

fn render(
    label: &str,
    asset: &AssetId,
    mut input: JsonValue,
    valuation: Valuation<i64>,
    field: &str,
) -> JsonValue {
    let outcome = match valuation {
        Valuation::Exact(_) => "exact",
        Valuation::Saturated(_) => "saturated",
        Valuation::NoRate => "no_rate",
    };
    input["asset"] = json!(label);
    input["asset_hex"] = json!(asset.to_hex());
    input[field] = json!(valuation.value());
    input["outcome"] = json!(outcome);
    input
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyfee_rates::{
        AssetDirectory, NoRecompute, RateEngineConfig, RateTable, DEFAULT_RATES_FILE,
    };
    use std::fs;

    fn gasset() -> AssetId {
        AssetId::from_bytes([0xb2; 32])
    }

    fn setup(dir: &std::path::Path) -> RatesHandler {
        let registry = Arc::new(
            AssetDirectory::new().with_label("gasset", gasset()).unwrap(),
        );
        let engine = RateEngine::new(
            Arc::new(RateTable::new(gasset())),
            registry,
            Arc::new(NoRecompute),
            RateEngineConfig {
                rates_path: dir.join(DEFAULT_RATES_FILE),
                initial_rates_path: None,
            },
        );
        RatesHandler::new(Arc::new(engine))
    }

    #[test]
    fn test_get_and_set_rates() {
        let dir = tempfile::tempdir().unwrap();
        let handler = setup(dir.path());
        let issued = "5c".repeat(32);

        assert_eq!(
            handler.get_fee_exchange_rates(),
            json!({ "gasset": 100000000 })
        );

        let rates = json!({ "gasset": 100000000, issued.clone(): 100000000 });
        assert_eq!(handler.set_fee_exchange_rates(&rates).unwrap(), JsonValue::Null);
        assert_eq!(handler.get_fee_exchange_rates(), rates);

        let on_disk: JsonValue =
            serde_json::from_str(&fs::read_to_string(dir.path().join(DEFAULT_RATES_FILE)).unwrap())
                .unwrap();
        assert_eq!(on_disk, rates);

        assert_eq!(handler.set_fee_exchange_rates(&json!({})).unwrap(), JsonValue::Null);
        assert_eq!(handler.get_fee_exchange_rates(), json!({}));
    }

    #[test]
    fn test_invalid_rates_message() {
        let dir = tempfile::tempdir().unwrap();
        let handler = setup(dir.path());
        let before = handler.get_fee_exchange_rates();

        let err = handler
            .set_fee_exchange_rates(&json!({ "invalid": 1 }))
            .unwrap_err();

        assert_eq!(err.code(), -4);
        assert_eq!(
            err.to_string(),
            "Error loading rates from JSON: - Unknown label and invalid asset hex: invalid"
        );
        assert_eq!(handler.get_fee_exchange_rates(), before);
    }

    #[test]
    fn test_non_object_params() {
        let dir = tempfile::tempdir().unwrap();
        let handler = setup(dir.path());

        let err = handler.set_fee_exchange_rates(&json!([1, 2])).unwrap_err();
        assert!(matches!(err, HandlerError::InvalidParameter(_)));
        assert_eq!(err.code(), -8);
    }

    #[test]
    fn test_valuation_queries() {
        let dir = tempfile::tempdir().unwrap();
        let handler = setup(dir.path());
        let issued = "5c".repeat(32);
        handler
            .set_fee_exchange_rates(&json!({ "gasset": 100000000, issued.clone(): 50000000 }))
            .unwrap();

        let value = handler.value_of(&issued, 200).unwrap();
        assert_eq!(value["value"], json!(100));
        assert_eq!(value["outcome"], json!("exact"));

        let amount = handler.amount_for(&issued, 100).unwrap();
        assert_eq!(amount["amount"], json!(200));

        let unpriced = handler.value_of(&"77".repeat(32), 10).unwrap();
        assert_eq!(unpriced["value"], JsonValue::Null);
        assert_eq!(unpriced["outcome"], json!("no_rate"));

        assert!(matches!(
            handler.value_of("nosuchasset", 10),
            Err(HandlerError::InvalidParameter(_))
        ));
        assert!(matches!(
            handler.value_of("gasset", -1),
            Err(HandlerError::Conversion(ConversionError::NegativeInput(-1)))
        ));
    }
}
