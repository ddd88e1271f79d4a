//! Monetary types for fee valuation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Amount in atomic units of some asset.
pub type Amount = i64;

/// Amount denominated in the node's reference fee unit.
///
/// Values from different fee assets only become comparable once converted
/// into this unit. Arithmetic saturates instead of wrapping.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Value(i64);

impl Value {
    /// Zero reference units.
    pub const ZERO: Value = Value(0);

    /// Largest representable value.
    pub const MAX: Value = Value(i64::MAX);

    /// Create a new value.
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Get the raw value.
    pub const fn get(&self) -> i64 {
        self.0
    }

    /// Check if the value is zero.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the value is negative.
    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Add for Value {
    type Output = Value;

    fn add(self, other: Value) -> Self::Output {
        Value(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Value {
    fn add_assign(&mut self, other: Value) {
        *self = *self + other;
    }
}

impl Sub for Value {
    type Output = Value;

    fn sub(self, other: Value) -> Self::Output {
        Value(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Value {
    fn sub_assign(&mut self, other: Value) {
        *self = *self - other;
    }
}

impl Sum for Value {
    fn sum<I: Iterator<Item = Value>>(iter: I) -> Self {
        iter.fold(Value::ZERO, Add::add)
    }
}
