//! Exchange-rate error types.

use std::fmt;
use std::path::PathBuf;

use anyfee_common::AssetId;
use thiserror::Error;

/// Errors that can occur while converting against a rate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    /// The asset's rate is zero, so no amount of it is worth any value.
    #[error("Exchange rate for asset {0} is zero")]
    DivisionByZeroRate(AssetId),

    /// Amounts and values fed to the converter must not be negative.
    #[error("Cannot convert negative quantity {0}")]
    NegativeInput(i64),
}

/// Result type for conversions.
pub type ConversionResult<T> = Result<T, ConversionError>;

/// Why a single proposed rate was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Label is not registered and is not a valid asset hex either.
    UnknownAsset,
    /// The value is not a non-negative 64-bit integer.
    InvalidRate { raw: String },
}

/// A refused entry of a proposed rate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Position of the entry in the proposal's iteration order, starting at
    /// zero. Proposals read from a JSON object iterate in key order.
    pub index: usize,
    /// Label or hex exactly as it was proposed.
    pub label: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn unknown_asset(index: usize, label: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            kind: ValidationErrorKind::UnknownAsset,
        }
    }

    pub fn invalid_rate(index: usize, label: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            index,
            label: label.into(),
            kind: ValidationErrorKind::InvalidRate { raw: raw.into() },
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ValidationErrorKind::UnknownAsset => {
                write!(f, "Unknown label and invalid asset hex: {}", self.label)
            }
            ValidationErrorKind::InvalidRate { raw } => {
                write!(f, "Invalid exchange rate for {}: {}", self.label, raw)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Errors raised when binding asset labels.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The label is the hex of another asset and would hide it.
    #[error("Label {label} is the hex of a different asset than {asset}")]
    LabelShadowsAsset { label: String, asset: AssetId },

    #[error("Asset label cannot be empty")]
    EmptyLabel,
}

impl RegistryError {
    /// Get error code for the request layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            RegistryError::LabelShadowsAsset { .. } => "LABEL_SHADOWS_ASSET",
            RegistryError::EmptyLabel => "EMPTY_LABEL",
        }
    }
}

/// Errors raised by the rates file store.
#[derive(Debug, Error)]
pub enum PersistError {
    /// Reading or writing the file failed.
    #[error("I/O error on rates file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file exists but does not hold a valid rate document.
    #[error("Malformed rates file {path}: {reason}")]
    MalformedPersistedData { path: PathBuf, reason: String },

    /// The table could not be encoded.
    #[error("Failed to encode rates: {0}")]
    Encode(#[from] serde_json::Error),
}

impl PersistError {
    /// Get error code for the request layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            PersistError::Io { .. } => "RATES_IO",
            PersistError::MalformedPersistedData { .. } => "MALFORMED_RATES",
            PersistError::Encode(_) => "RATES_ENCODE",
        }
    }
}

/// Errors returned by a rate update.
#[derive(Debug, Error)]
pub enum UpdateError {
    /// At least one entry failed validation; the live table is untouched.
    #[error("Rejected rate update with {} invalid entries", .0.len())]
    Rejected(Vec<ValidationError>),

    /// The new table is live in memory but could not be written to disk.
    #[error("Rates installed but not persisted: {source}")]
    PersistedFalse {
        #[source]
        source: PersistError,
    },
}

impl UpdateError {
    /// Get error code for the request layer.
    pub fn error_code(&self) -> &'static str {
        match self {
            UpdateError::Rejected(_) => "INVALID_RATES",
            UpdateError::PersistedFalse { .. } => "PERSISTED_FALSE",
        }
    }

    /// Whether the in-memory table was replaced despite the error.
    pub fn table_changed(&self) -> bool {
        matches!(self, UpdateError::PersistedFalse { .. })
    }
}
