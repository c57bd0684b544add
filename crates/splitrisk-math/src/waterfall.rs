//! Loss-absorption ("waterfall") curve.
//!
//! With severity `x` = fraction of invested principal not recovered, and
//! `N` equally sized tranches indexed from most senior (`0`) to most junior
//! (`N - 1`):
//!
//! ```text
//! recovery(i, N, x) = clamp((N - i) - N·x, 0, 1)
//! ```
//!
//! For `N = 2` this is the familiar pair
//!
//! ```text
//! senior(x) = min(1, 2·(1 - x))     junior(x) = max(0, 1 - 2·x)
//! ```
//!
//! The junior class absorbs the first half of the loss entirely and the
//! senior class degrades linearly from `x = 0.5` to `x = 1`. For `N = 3` the
//! breakpoints are 0, 1/3, 2/3 and 1 with strict seniority A > B > C.
//!
//! The [`Wad`] functions expose the curve itself. Payout pools are computed
//! by [`tranche_payout`] on exact integers (`x = loss / invested` is never
//! rounded), flooring once at the end; the sum of all pools therefore never
//! exceeds the amount recovered.

use splitrisk_types::{Amount, Result, SplitRiskError, TrancheId, Wad};

/// Severity `x = (invested - recovered) / invested`, clamped to `[0, 1]`.
///
/// Zero when nothing was invested or more than the principal came back.
#[must_use]
pub fn severity(invested: Amount, recovered: Amount) -> Wad {
    let loss = invested.saturating_sub(recovered);
    Wad::from_ratio(loss, invested).unwrap_or(Wad::ZERO)
}

/// Recovery fraction of tranche `tranche` out of `count` at severity `x`.
#[must_use]
pub fn tranche_recovery_fraction(tranche: TrancheId, count: u8, x: Wad) -> Wad {
    let x = x.clamp_unit();
    let head = Wad::ONE.saturating_mul_int(u64::from(count.saturating_sub(tranche.0)));
    head.saturating_sub(x.saturating_mul_int(u64::from(count)))
        .clamp_unit()
}

/// `min(1, 2·(1 - x))`
#[must_use]
pub fn senior_recovery_fraction(x: Wad) -> Wad {
    tranche_recovery_fraction(TrancheId(0), 2, x)
}

/// `max(0, 1 - 2·x)`
#[must_use]
pub fn junior_recovery_fraction(x: Wad) -> Wad {
    tranche_recovery_fraction(TrancheId(1), 2, x)
}

/// Payout owed to a whole tranche pool of size `pool`.
///
/// Evaluates `floor(pool · clamp((N - i) - N·loss/invested, 0, 1))` without
/// rounding `x` first:
///
/// ```text
/// numerator = clamp((N - i)·invested - N·loss, 0, invested)
/// payout    = floor(pool · numerator / invested)
/// ```
///
/// `pool` and `numerator` both fit in `u64`, so the product fits in `u128`.
#[must_use]
pub fn tranche_payout(
    pool: Amount,
    tranche: TrancheId,
    count: u8,
    invested: Amount,
    recovered: Amount,
) -> Amount {
    if invested == 0 {
        return pool;
    }
    let invested_wide = u128::from(invested);
    let loss = u128::from(invested.saturating_sub(recovered));
    let head = u128::from(count.saturating_sub(tranche.0)) * invested_wide;
    let numerator = head
        .saturating_sub(u128::from(count) * loss)
        .min(invested_wide);
    // numerator <= invested <= u64::MAX, so the quotient <= pool.
    Amount::try_from(u128::from(pool) * numerator / invested_wide).unwrap_or(pool)
}

/// Frozen payout pool for every tranche, most senior first.
///
/// `tranche_totals[i]` is the outstanding supply of tranche `i` at divest;
/// each unit was minted against one unit of principal.
///
/// # Errors
/// Returns [`SplitRiskError::InvalidTrancheCount`] if there are no tranches
/// or more than `u8::MAX`.
pub fn payout_pools(
    tranche_totals: &[Amount],
    invested: Amount,
    recovered: Amount,
) -> Result<Vec<Amount>> {
    let count = u8::try_from(tranche_totals.len())
        .ok()
        .filter(|&c| c > 0)
        .ok_or(SplitRiskError::InvalidTrancheCount {
            count: u8::try_from(tranche_totals.len()).unwrap_or(u8::MAX),
            min: splitrisk_types::constants::MIN_TRANCHE_COUNT,
            max: splitrisk_types::constants::MAX_TRANCHE_COUNT,
        })?;

    Ok(TrancheId::all(count)
        .zip(tranche_totals)
        .map(|(tranche, &pool)| tranche_payout(pool, tranche, count, invested, recovered))
        .collect())
}
