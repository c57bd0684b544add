//! Amount, timestamp, and fixed-point fraction types.
//!
//! Token amounts are unsigned base units. Every product of two amounts is
//! computed in `u128` so no intermediate can overflow or truncate early.
//! Fractions (severity, recovery) use [`Wad`], an 18-decimal scaled integer
//! that always rounds **down**.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{WAD_DECIMALS, WAD_SCALE};

/// Token amount in base units of the pooled asset or a tranche token.
pub type Amount = u64;

/// UNIX timestamp in seconds.
pub type Timestamp = u64;

/// Fixed-point fraction with 18 decimals: `Wad(WAD_SCALE)` is `1.0`.
///
/// # Rounding
/// Every constructor and multiplication floors. A payout computed as
/// `Wad::mul_floor(amount)` therefore never exceeds the exact rational value,
/// so pooled payouts can never exceed what was recovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Wad(pub u128);

impl Wad {
    /// `0.0`
    pub const ZERO: Self = Self(0);
    /// `1.0`
    pub const ONE: Self = Self(WAD_SCALE);

    /// `floor(numerator / denominator)` as a fraction.
    ///
    /// Returns `None` when `denominator` is zero.
    #[must_use]
    pub fn from_ratio(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        // u64::MAX * 1e18 < u128::MAX, so the product cannot overflow.
        Some(Self(u128::from(numerator) * WAD_SCALE / u128::from(denominator)))
    }

    /// Raw scaled value.
    #[must_use]
    pub fn raw(self) -> u128 {
        self.0
    }

    /// Clamp into `[0, 1]`.
    #[must_use]
    pub fn clamp_unit(self) -> Self {
        self.min(Self::ONE)
    }

    /// `self - rhs`, floored at zero.
    #[must_use]
    pub fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `self * n` for an integer `n`, saturating at `u128::MAX`.
    #[must_use]
    pub fn saturating_mul_int(self, n: u64) -> Self {
        Self(self.0.saturating_mul(u128::from(n)))
    }

    /// `floor(amount * self)`.
    ///
    /// Returns `None` if the result does not fit in an [`Amount`]; this can
    /// only happen for fractions above `1.0`.
    #[must_use]
    pub fn mul_floor(self, amount: Amount) -> Option<Amount> {
        let product = u128::from(amount).checked_mul(self.0)? / WAD_SCALE;
        Amount::try_from(product).ok()
    }

    /// Render as a [`Decimal`] for logs and reports.
    ///
    /// Returns `None` if the raw value exceeds the 96-bit decimal mantissa.
    #[must_use]
    pub fn to_decimal(self) -> Option<Decimal> {
        let raw = i128::try_from(self.0).ok()?;
        Decimal::try_from_i128_with_scale(raw, WAD_DECIMALS)
            .ok()
            .map(|d| d.normalize())
    }
}

impl fmt::Display for Wad {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_decimal() {
            Some(d) => write!(f, "{d}"),
            None => write!(f, "{}e-{WAD_DECIMALS}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_ratio_floors() {
        let third = Wad::from_ratio(1, 3).unwrap();
        assert_eq!(third.raw(), 333_333_333_333_333_333);
        assert_eq!(Wad::from_ratio(1, 2).unwrap().raw(), WAD_SCALE / 2);
    }

    #[test]
    fn from_ratio_zero_denominator() {
        assert!(Wad::from_ratio(5, 0).is_none());
    }

    #[test]
    fn from_ratio_max_numerator_does_not_overflow() {
        let w = Wad::from_ratio(u64::MAX, u64::MAX).unwrap();
        assert_eq!(w, Wad::ONE);
    }

    #[test]
    fn mul_floor_rounds_down() {
        let third = Wad::from_ratio(1, 3).unwrap();
        // 10 * 0.333.. = 3.33.. → 3
        assert_eq!(third.mul_floor(10), Some(3));
        assert_eq!(Wad::ONE.mul_floor(u64::MAX), Some(u64::MAX));
        assert_eq!(Wad::ZERO.mul_floor(12345), Some(0));
    }

    #[test]
    fn mul_floor_overflow_above_one() {
        let two = Wad::ONE.saturating_mul_int(2);
        assert_eq!(two.mul_floor(u64::MAX), None);
    }

    #[test]
    fn clamp_and_saturating_ops() {
        let two = Wad::ONE.saturating_mul_int(2);
        assert_eq!(two.clamp_unit(), Wad::ONE);
        assert_eq!(Wad::ZERO.saturating_sub(Wad::ONE), Wad::ZERO);
    }

    #[test]
    fn display_as_decimal() {
        assert_eq!(Wad::ONE.to_string(), "1");
        assert_eq!(Wad::from_ratio(1, 4).unwrap().to_string(), "0.25");
        assert_eq!(Wad::ZERO.to_string(), "0");
    }
}
