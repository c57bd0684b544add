//! Remainder-free distribution and pro-rata payout.
//!
//! The same [`split_evenly`] drives both the deposit fan-out and the
//! withdraw fan-out, so an adapter's share is computed identically in both
//! directions.

use splitrisk_types::{Amount, Result, SplitRiskError, constants};

/// Split `total` into `n` shares that differ by at most one unit.
///
/// `base = total / n`, `remainder = total % n`; the first `remainder` shares
/// get `base + 1`, the rest get `base`. The shares always sum to `total`.
///
/// # Errors
/// Returns [`SplitRiskError::NoAdapters`] if `n == 0`.
pub fn split_evenly(total: Amount, n: usize) -> Result<Vec<Amount>> {
    if n == 0 {
        return Err(SplitRiskError::NoAdapters);
    }
    let divisor = Amount::try_from(n).map_err(|_| SplitRiskError::ArithmeticOverflow {
        context: "split_evenly share count",
    })?;
    let base = total / divisor;
    // remainder < n, so it fits back into usize.
    let remainder = usize::try_from(total % divisor).unwrap_or(n);

    Ok((0..n)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

/// Split a deposit into `tranche_count` equal tranche mints.
///
/// # Errors
/// - [`SplitRiskError::InvalidTrancheCount`] if `tranche_count == 0`
/// - [`SplitRiskError::AmountNotDivisible`] if `total % tranche_count != 0`
pub fn split_tranches(total: Amount, tranche_count: u8) -> Result<Vec<Amount>> {
    if tranche_count == 0 {
        return Err(SplitRiskError::InvalidTrancheCount {
            count: tranche_count,
            min: constants::MIN_TRANCHE_COUNT,
            max: constants::MAX_TRANCHE_COUNT,
        });
    }
    let divisor = Amount::from(tranche_count);
    if total % divisor != 0 {
        return Err(SplitRiskError::AmountNotDivisible {
            amount: total,
            divisor,
        });
    }
    Ok(vec![total / divisor; usize::from(tranche_count)])
}

/// `floor(user_units * pool / total_units)` with a `u128` intermediate.
///
/// Returns 0 whenever `total_units` is 0; a zero divisor is a normal
/// "nothing to pay" case, never an error. The result saturates at
/// [`Amount::MAX`], which is only reachable when `user_units > total_units`.
#[must_use]
pub fn proportional_share(user_units: Amount, total_units: Amount, pool: Amount) -> Amount {
    if total_units == 0 {
        return 0;
    }
    let share = u128::from(user_units) * u128::from(pool) / u128::from(total_units);
    Amount::try_from(share).unwrap_or(Amount::MAX)
}
