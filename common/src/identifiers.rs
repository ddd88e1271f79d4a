//! Identifier types for assets that can pay fees.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Length of an asset identifier in bytes.
pub const ASSET_ID_LEN: usize = 32;

/// Error returned when an asset identifier cannot be parsed from hex.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetIdError {
    /// Input is not valid hexadecimal.
    #[error("Invalid asset hex: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes.
    #[error("Asset id must be {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Opaque 256-bit identifier of a fungible asset.
///
/// Rendered as 64 lowercase hex characters. The all-zero identifier is the
/// null asset and never names a real asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct AssetId([u8; ASSET_ID_LEN]);

impl AssetId {
    /// The null asset.
    pub const NULL: AssetId = AssetId([0u8; ASSET_ID_LEN]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; ASSET_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse from a 64 character hex string.
    pub fn from_hex(s: &str) -> Result<Self, AssetIdError> {
        let bytes = hex::decode(s).map_err(|_| AssetIdError::InvalidHex(s.to_string()))?;
        let bytes: [u8; ASSET_ID_LEN] =
            bytes
                .try_into()
                .map_err(|v: Vec<u8>| AssetIdError::InvalidLength {
                    expected: ASSET_ID_LEN,
                    actual: v.len(),
                })?;
        Ok(Self(bytes))
    }

    /// Get the raw bytes.
    pub fn as_bytes(&self) -> &[u8; ASSET_ID_LEN] {
        &self.0
    }

    /// Lowercase hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Check if this is the null asset.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; ASSET_ID_LEN]
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for AssetId {
    type Err = AssetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for AssetId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AssetId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
