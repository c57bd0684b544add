//! Time model: phase boundaries, phase flags, and the injected clock.
//!
//! A protocol instance runs through four windows separated by strictly
//! increasing boundaries `S < T1 < T2 < T3`:
//!
//! ```text
//!   ISSUANCE      INSURANCE          DIVEST        CLAIM        CLOSED
//! ───────────┼──────────────────┼─────────────┼────────────┼──────────▶
//!            S                  T1            T2           T3
//! ```
//!
//! The predicates that decide which window `now` falls into live in
//! `splitrisk-math::phase`; this module only holds the data.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{SplitRiskError, Result, Timestamp, constants};

// ---------------------------------------------------------------------------
// TimePeriod
// ---------------------------------------------------------------------------

/// The four phase boundaries of a protocol instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimePeriod {
    /// `S`: end of issuance, start of insurance.
    pub insurance_start: Timestamp,
    /// `T1`: end of insurance. Still insured at exactly `T1`.
    pub insurance_end: Timestamp,
    /// `T2`: end of the divest window.
    pub divest_deadline: Timestamp,
    /// `T3`: end of the claim buffer.
    pub claim_deadline: Timestamp,
}

impl TimePeriod {
    /// Build from explicit boundaries, enforcing `S < T1 < T2 < T3`.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::InvalidTimePeriods`] if the ordering is violated.
    pub fn new(s: Timestamp, t1: Timestamp, t2: Timestamp, t3: Timestamp) -> Result<Self> {
        if !(s < t1 && t1 < t2 && t2 < t3) {
            return Err(SplitRiskError::InvalidTimePeriods {
                reason: format!("expected S < T1 < T2 < T3, got {s}, {t1}, {t2}, {t3}"),
            });
        }
        Ok(Self {
            insurance_start: s,
            insurance_end: t1,
            divest_deadline: t2,
            claim_deadline: t3,
        })
    }

    /// Derive boundaries from an anchor time and fixed offsets:
    /// `S = anchor + issuance`, `T1 = S + insurance`, `T2 = T1 + divest_buffer`,
    /// `T3 = T2 + claim_buffer`.
    ///
    /// # Errors
    /// - [`SplitRiskError::InvalidTimePeriods`] if any offset is zero
    /// - [`SplitRiskError::ArithmeticOverflow`] if a boundary exceeds `u64::MAX`
    pub fn from_anchor(anchor: Timestamp, offsets: &PeriodOffsets) -> Result<Self> {
        offsets.validate()?;
        let overflow = || SplitRiskError::ArithmeticOverflow {
            context: "time period derivation",
        };
        let s = anchor.checked_add(offsets.issuance).ok_or_else(overflow)?;
        let t1 = s.checked_add(offsets.insurance).ok_or_else(overflow)?;
        let t2 = t1.checked_add(offsets.divest_buffer).ok_or_else(overflow)?;
        let t3 = t2.checked_add(offsets.claim_buffer).ok_or_else(overflow)?;
        Self::new(s, t1, t2, t3)
    }

    /// Boundaries as `[S, T1, T2, T3]`.
    #[must_use]
    pub fn as_array(&self) -> [Timestamp; 4] {
        [
            self.insurance_start,
            self.insurance_end,
            self.divest_deadline,
            self.claim_deadline,
        ]
    }
}

impl fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "S={} T1={} T2={} T3={}",
            format_timestamp(self.insurance_start),
            format_timestamp(self.insurance_end),
            format_timestamp(self.divest_deadline),
            format_timestamp(self.claim_deadline),
        )
    }
}

/// Render a UNIX timestamp as RFC 3339, falling back to raw seconds.
#[must_use]
pub fn format_timestamp(ts: Timestamp) -> String {
    i64::try_from(ts)
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .map_or_else(|| ts.to_string(), |dt| dt.to_rfc3339())
}

// ---------------------------------------------------------------------------
// PeriodOffsets
// ---------------------------------------------------------------------------

/// Fixed offsets used to derive a [`TimePeriod`] from an anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodOffsets {
    /// Anchor → S.
    pub issuance: u64,
    /// S → T1.
    pub insurance: u64,
    /// T1 → T2.
    pub divest_buffer: u64,
    /// T2 → T3.
    pub claim_buffer: u64,
}

impl PeriodOffsets {
    /// Every offset must be nonzero for the derived boundaries to be strictly
    /// increasing.
    pub fn validate(&self) -> Result<()> {
        if self.issuance == 0
            || self.insurance == 0
            || self.divest_buffer == 0
            || self.claim_buffer == 0
        {
            return Err(SplitRiskError::InvalidTimePeriods {
                reason: format!("offsets must be nonzero: {self:?}"),
            });
        }
        Ok(())
    }
}

impl Default for PeriodOffsets {
    fn default() -> Self {
        Self {
            issuance: constants::DEFAULT_ISSUANCE_PERIOD_SECS,
            insurance: constants::DEFAULT_INSURANCE_PERIOD_SECS,
            divest_buffer: constants::DEFAULT_DIVEST_BUFFER_SECS,
            claim_buffer: constants::DEFAULT_CLAIM_BUFFER_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase flags
// ---------------------------------------------------------------------------

/// Boundary inclusivity at `T1` (claims) and `T2` (divest).
///
/// Observed behavior pins down `T1` for insurance but leaves the exact claim
/// instant and the divest deadline open, so both are configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryPolicy {
    /// Allow claims at exactly `now == T1`.
    pub claim_at_t1: bool,
    /// Allow divest at exactly `now == T2`.
    pub divest_at_t2: bool,
}

/// Answers to every phase question at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseFlags {
    pub can_split_risk: bool,
    pub is_insurance_period: bool,
    pub can_divest: bool,
    pub can_claim: bool,
}

/// Named window, for logs and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// `now < S`: deposits open, adapters mutable.
    Issuance,
    /// `S ≤ now ≤ T1`: pool invested, coverage active.
    Insurance,
    /// `T1 < now < T2`: pool may be divested.
    Divest,
    /// `T2 ≤ now < T3`.
    Claim,
    /// `now ≥ T3`.
    Closed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Issuance => write!(f, "ISSUANCE"),
            Self::Insurance => write!(f, "INSURANCE"),
            Self::Divest => write!(f, "DIVEST"),
            Self::Claim => write!(f, "CLAIM"),
            Self::Closed => write!(f, "CLOSED"),
        }
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of "now". Every time read in the engine goes through one of these.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

/// Wall clock backed by `chrono::Utc::now()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::try_from(Utc::now().timestamp()).unwrap_or(0)
    }
}

/// Manually driven clock for simulations and tests.
///
/// Shared through an `Arc` so the test can keep advancing time after the
/// clock has been handed to the engine.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    #[must_use]
    pub fn new(now: Timestamp) -> Self {
        Self {
            now: AtomicU64::new(now),
        }
    }

    /// Convenience constructor returning a shareable handle.
    #[must_use]
    pub fn shared(now: Timestamp) -> Arc<Self> {
        Arc::new(Self::new(now))
    }

    pub fn set(&self, now: Timestamp) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: u64) {
        self.now.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_enforces_strict_order() {
        assert!(TimePeriod::new(1, 2, 3, 4).is_ok());
        assert!(TimePeriod::new(1, 1, 3, 4).is_err());
        assert!(TimePeriod::new(1, 2, 2, 4).is_err());
        assert!(TimePeriod::new(4, 3, 2, 1).is_err());
    }

    #[test]
    fn from_anchor_default_offsets() {
        let p = TimePeriod::from_anchor(1_000, &PeriodOffsets::default()).unwrap();
        assert_eq!(p.insurance_start, 1_000 + constants::DEFAULT_ISSUANCE_PERIOD_SECS);
        assert_eq!(
            p.insurance_end,
            p.insurance_start + constants::DEFAULT_INSURANCE_PERIOD_SECS
        );
        assert_eq!(
            p.divest_deadline,
            p.insurance_end + constants::DEFAULT_DIVEST_BUFFER_SECS
        );
        assert_eq!(
            p.claim_deadline,
            p.divest_deadline + constants::DEFAULT_CLAIM_BUFFER_SECS
        );
    }

    #[test]
    fn from_anchor_is_increasing_for_past_and_future_anchors() {
        for anchor in [0, 1, 1_600_000_000, 4_000_000_000, u64::MAX / 2] {
            let p = TimePeriod::from_anchor(anchor, &PeriodOffsets::default()).unwrap();
            let [s, t1, t2, t3] = p.as_array();
            assert!(anchor < s && s < t1 && t1 < t2 && t2 < t3, "anchor {anchor}");
        }
    }

    #[test]
    fn from_anchor_overflow() {
        let err = TimePeriod::from_anchor(u64::MAX - 10, &PeriodOffsets::default()).unwrap_err();
        assert!(matches!(err, SplitRiskError::ArithmeticOverflow { .. }));
    }

    #[test]
    fn zero_offset_rejected() {
        let offsets = PeriodOffsets {
            divest_buffer: 0,
            ..PeriodOffsets::default()
        };
        assert!(matches!(
            TimePeriod::from_anchor(0, &offsets),
            Err(SplitRiskError::InvalidTimePeriods { .. })
        ));
    }

    #[test]
    fn manual_clock_advances_through_arc() {
        let clock = ManualClock::shared(100);
        let handle: Arc<ManualClock> = Arc::clone(&clock);
        clock.advance(5);
        assert_eq!(handle.now(), 105);
        clock.set(7);
        assert_eq!(handle.now(), 7);
    }

    #[test]
    fn system_clock_is_recent() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now() > 1_577_836_800);
    }

    #[test]
    fn display_renders_rfc3339() {
        let p = TimePeriod::new(0, 86_400, 172_800, 259_200).unwrap();
        let s = p.to_string();
        assert!(s.starts_with("S=1970-01-01T00:00:00+00:00"), "Got: {s}");
    }

    #[test]
    fn boundary_policy_defaults_strict() {
        let p = BoundaryPolicy::default();
        assert!(!p.claim_at_t1);
        assert!(!p.divest_at_t2);
        let parsed: BoundaryPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, p);
    }
}
