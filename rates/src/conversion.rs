//! Fixed-point conversion between asset amounts and reference value.
//!
//! A rate is stored as `scaled_value`, the worth of one atomic unit of the
//! asset expressed in reference units and multiplied by [`SCALE`]. Both
//! directions use floor division on a 128-bit intermediate and saturate at
//! `i64::MAX`; they are not exact inverses of each other.

use anyfee_common::{Amount, AssetId, Value};

use crate::error::{ConversionError, ConversionResult};
use crate::table::RateEntry;

/// Fixed-point scale of every stored rate. A rate of `SCALE` is 1:1.
///
/// Changing this invalidates every persisted rate file.
pub const SCALE: i64 = 100_000_000;

/// Result of valuing a quantity against the rate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Valuation<T> {
    /// The converted quantity is exact up to floor rounding.
    Exact(T),
    /// The true result exceeded `i64::MAX` and was clamped to it.
    Saturated(T),
    /// The asset has no entry in the table.
    NoRate,
}

impl<T: Copy> Valuation<T> {
    /// Converted quantity, if the asset had a rate.
    pub fn value(&self) -> Option<T> {
        match self {
            Valuation::Exact(v) | Valuation::Saturated(v) => Some(*v),
            Valuation::NoRate => None,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Valuation::Exact(_))
    }

    pub fn is_saturated(&self) -> bool {
        matches!(self, Valuation::Saturated(_))
    }

    pub fn is_no_rate(&self) -> bool {
        matches!(self, Valuation::NoRate)
    }

    /// Map the converted quantity, keeping the outcome.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Valuation<U> {
        match self {
            Valuation::Exact(v) => Valuation::Exact(f(v)),
            Valuation::Saturated(v) => Valuation::Saturated(f(v)),
            Valuation::NoRate => Valuation::NoRate,
        }
    }
}

impl<T: Copy + Default> Valuation<T> {
    /// Treat an asset without a rate as worthless.
    ///
    /// Callers that rank fees may use this; callers enforcing a minimum fee
    /// should reject on [`Valuation::NoRate`] instead.
    pub fn or_zero(&self) -> T {
        self.value().unwrap_or_default()
    }
}

/// `floor(x * num / den)` clamped to `i64::MAX`. Inputs are non-negative
/// and `den` is positive.
fn mul_div_floor(x: i64, num: i64, den: i64) -> (i64, bool) {
    debug_assert!(x >= 0 && num >= 0 && den > 0);
    let wide = (x as i128) * (num as i128) / (den as i128);
    if wide > i64::MAX as i128 {
        (i64::MAX, true)
    } else {
        (wide as i64, false)
    }
}

/// Value `amount` atomic units of an asset whose rate is `entry`.
pub fn amount_to_value(amount: Amount, entry: RateEntry) -> ConversionResult<Valuation<Value>> {
    if amount < 0 {
        return Err(ConversionError::NegativeInput(amount));
    }

    let (value, saturated) = mul_div_floor(amount, entry.scaled_value(), SCALE);
    Ok(if saturated {
        Valuation::Saturated(Value::new(value))
    } else {
        Valuation::Exact(Value::new(value))
    })
}

/// Number of atomic units of `asset` worth `value` reference units.
pub fn value_to_amount(
    value: Value,
    asset: &AssetId,
    entry: RateEntry,
) -> ConversionResult<Valuation<Amount>> {
    if value.is_negative() {
        return Err(ConversionError::NegativeInput(value.get()));
    }
    if entry.is_zero() {
        return Err(ConversionError::DivisionByZeroRate(*asset));
    }

    let (amount, saturated) = mul_div_floor(value.get(), SCALE, entry.scaled_value());
    Ok(if saturated {
        Valuation::Saturated(amount)
    } else {
        Valuation::Exact(amount)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rate(scaled: i64) -> RateEntry {
        RateEntry::new(scaled).unwrap()
    }

    fn asset() -> AssetId {
        AssetId::from_bytes([7u8; 32])
    }

    #[test]
    fn test_half_rate_example() {
        let x = rate(50_000_000);

        assert_eq!(
            amount_to_value(200, x).unwrap(),
            Valuation::Exact(Value::new(100))
        );
        assert_eq!(
            value_to_amount(Value::new(100), &asset(), x).unwrap(),
            Valuation::Exact(200)
        );
    }

    #[test]
    fn test_floor_rounding() {
        // 3 * 0.5 = 1.5 -> 1
        assert_eq!(
            amount_to_value(3, rate(50_000_000)).unwrap(),
            Valuation::Exact(Value::new(1))
        );
        // 1 / 3 = 0.33 -> 0
        assert_eq!(
            value_to_amount(Value::new(1), &asset(), rate(3 * SCALE)).unwrap(),
            Valuation::Exact(0)
        );
    }

    #[test]
    fn test_zero_rate() {
        let zero = rate(0);

        assert_eq!(
            amount_to_value(1_000_000, zero).unwrap(),
            Valuation::Exact(Value::ZERO)
        );
        assert_eq!(
            value_to_amount(Value::new(1), &asset(), zero),
            Err(ConversionError::DivisionByZeroRate(asset()))
        );
    }

    #[test]
    fn test_negative_input() {
        assert_eq!(
            amount_to_value(-1, rate(SCALE)),
            Err(ConversionError::NegativeInput(-1))
        );
        assert_eq!(
            value_to_amount(Value::new(-5), &asset(), rate(SCALE)),
            Err(ConversionError::NegativeInput(-5))
        );
    }

    #[test]
    fn test_saturation_at_extremes() {
        let result = amount_to_value(i64::MAX, rate(i64::MAX)).unwrap();
        assert_eq!(result, Valuation::Saturated(Value::MAX));

        let result = value_to_amount(Value::MAX, &asset(), rate(1)).unwrap();
        assert_eq!(result, Valuation::Saturated(i64::MAX));

        // Exactly i64::MAX is still exact.
        let result = amount_to_value(i64::MAX, rate(SCALE)).unwrap();
        assert_eq!(result, Valuation::Exact(Value::MAX));
    }

    #[test]
    fn test_valuation_policy_helpers() {
        let none: Valuation<Value> = Valuation::NoRate;
        assert_eq!(none.value(), None);
        assert_eq!(none.or_zero(), Value::ZERO);
        assert!(none.is_no_rate());
        assert!(!none.is_saturated());

        let saturated = Valuation::Saturated(Value::MAX);
        assert!(saturated.is_saturated());
        assert!(!saturated.is_exact());
        assert_eq!(saturated.value(), Some(Value::MAX));
        assert_eq!(saturated.map(|v| v.get()), Valuation::Saturated(i64::MAX));
    }

    proptest! {
        #[test]
        fn prop_identity_rate_is_exact(amount in 0i64..=i64::MAX) {
            let result = amount_to_value(amount, rate(SCALE)).unwrap();
            prop_assert_eq!(result, Valuation::Exact(Value::new(amount)));

            let back = value_to_amount(Value::new(amount), &asset(), rate(SCALE)).unwrap();
            prop_assert_eq!(back, Valuation::Exact(amount));
        }

        #[test]
        fn prop_overflow_saturates(amount in 1i64..=i64::MAX, scaled in 1i64..=i64::MAX) {
            let exact = (amount as i128) * (scaled as i128) / (SCALE as i128);
            let result = amount_to_value(amount, rate(scaled)).unwrap();
            if exact > i64::MAX as i128 {
                prop_assert_eq!(result, Valuation::Saturated(Value::MAX));
            } else {
                prop_assert_eq!(result, Valuation::Exact(Value::new(exact as i64)));
            }
            prop_assert!(!result.or_zero().is_negative());
        }

        #[test]
        fn prop_zero_rate_never_divides(value in 0i64..=i64::MAX) {
            prop_assert_eq!(
                value_to_amount(Value::new(value), &asset(), rate(0)),
                Err(ConversionError::DivisionByZeroRate(asset()))
            );
        }

        #[test]
        fn prop_amount_round_trip_loses_at_most_one(
            amount in 0i64..1_000_000_000_000,
            scaled in SCALE..100 * SCALE,
        ) {
            let entry = rate(scaled);
            let value = amount_to_value(amount, entry).unwrap();
            prop_assert!(value.is_exact());
            let back = value_to_amount(value.or_zero(), &asset(), entry).unwrap().or_zero();
            prop_assert!(back <= amount);
            prop_assert!(amount - back <= 1);
        }

        #[test]
        fn prop_value_round_trip_loses_at_most_one(
            value in 0i64..1_000_000_000_000,
            scaled in SCALE / 1000..=SCALE,
        ) {
            let entry = rate(scaled);
            let amount = value_to_amount(Value::new(value), &asset(), entry).unwrap();
            prop_assert!(amount.is_exact());
            let back = amount_to_value(amount.or_zero(), entry).unwrap().or_zero();
            prop_assert!(back.get() <= value);
            prop_assert!(value - back.get() <= 1);
        }
    }
}
