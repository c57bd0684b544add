//! Phase-boundary predicates.
//!
//! This is the only place that compares `now` against `S/T1/T2/T3`. The
//! time gate, the adapter registry and the orchestrator all ask here, so the
//! boundary rules cannot drift apart between components.
//!
//! Boundary rules:
//! - `can_split_risk`: `now < S`
//! - `is_insurance_period`: `S ≤ now ≤ T1` (still insured at exactly `T1`)
//! - `can_claim`: `now > T1`, or `now == T1` with [`BoundaryPolicy::claim_at_t1`]
//! - `can_divest`: `T1 ≤ now < T2`, or `now == T2` with [`BoundaryPolicy::divest_at_t2`]

use splitrisk_types::{BoundaryPolicy, Phase, PhaseFlags, TimePeriod, Timestamp};

/// Evaluate every phase flag for `now`.
#[must_use]
pub fn validate_phase(now: Timestamp, period: &TimePeriod, policy: BoundaryPolicy) -> PhaseFlags {
    let s = period.insurance_start;
    let t1 = period.insurance_end;
    let t2 = period.divest_deadline;

    PhaseFlags {
        can_split_risk: now < s,
        is_insurance_period: s <= now && now <= t1,
        can_divest: t1 <= now && (now < t2 || (policy.divest_at_t2 && now == t2)),
        can_claim: now > t1 || (policy.claim_at_t1 && now == t1),
    }
}

/// [`validate_phase`] over raw boundaries with the default (strict) policy.
///
/// Boundaries are not re-validated here; an unordered input simply yields
/// flags that are never simultaneously reachable.
#[must_use]
pub fn validate_phase_strict(
    now: Timestamp,
    s: Timestamp,
    t1: Timestamp,
    t2: Timestamp,
    t3: Timestamp,
) -> PhaseFlags {
    let period = TimePeriod {
        insurance_start: s,
        insurance_end: t1,
        divest_deadline: t2,
        claim_deadline: t3,
    };
    validate_phase(now, &period, BoundaryPolicy::default())
}

/// Name the window `now` falls into.
#[must_use]
pub fn phase_at(now: Timestamp, period: &TimePeriod) -> Phase {
    if now < period.insurance_start {
        Phase::Issuance
    } else if now <= period.insurance_end {
        Phase::Insurance
    } else if now < period.divest_deadline {
        Phase::Divest
    } else if now < period.claim_deadline {
        Phase::Claim
    } else {
        Phase::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const S: Timestamp = 100;
    const T1: Timestamp = 200;
    const T2: Timestamp = 300;
    const T3: Timestamp = 400;

    fn period() -> TimePeriod {
        TimePeriod::new(S, T1, T2, T3).unwrap()
    }

    #[test]
    fn issuance_window() {
        let f = validate_phase_strict(S - 1, S, T1, T2, T3);
        assert!(f.can_split_risk);
        assert!(!f.is_insurance_period);
        assert!(!f.can_claim);
        assert!(!f.can_divest);
    }

    #[test]
    fn split_risk_closes_at_s() {
        let f = validate_phase_strict(S, S, T1, T2, T3);
        assert!(!f.can_split_risk);
        assert!(f.is_insurance_period);
    }

    #[test]
    fn at_t1_still_insured_and_not_claimable() {
        let f = validate_phase_strict(T1, S, T1, T2, T3);
        assert!(f.is_insurance_period);
        assert!(!f.can_claim);
    }

    #[test]
    fn one_after_t1_claimable() {
        let f = validate_phase_strict(T1 + 1, S, T1, T2, T3);
        assert!(!f.is_insurance_period);
        assert!(f.can_claim);
    }

    #[test]
    fn claim_at_t1_policy() {
        let policy = BoundaryPolicy {
            claim_at_t1: true,
            ..BoundaryPolicy::default()
        };
        let f = validate_phase(T1, &period(), policy);
        assert!(f.can_claim);
        assert!(f.is_insurance_period);
    }

    #[test]
    fn divest_window_bounds() {
        assert!(!validate_phase_strict(T1 - 1, S, T1, T2, T3).can_divest);
        assert!(validate_phase_strict(T1, S, T1, T2, T3).can_divest);
        assert!(validate_phase_strict(T2 - 1, S, T1, T2, T3).can_divest);
        assert!(!validate_phase_strict(T2, S, T1, T2, T3).can_divest);
    }

    #[test]
    fn divest_at_t2_policy() {
        let policy = BoundaryPolicy {
            divest_at_t2: true,
            ..BoundaryPolicy::default()
        };
        assert!(validate_phase(T2, &period(), policy).can_divest);
        assert!(!validate_phase(T2 + 1, &period(), policy).can_divest);
    }

    #[test]
    fn claims_stay_open_after_t3() {
        assert!(validate_phase_strict(T3 + 1_000, S, T1, T2, T3).can_claim);
    }

    #[test]
    fn named_phases() {
        let p = period();
        assert_eq!(phase_at(0, &p), Phase::Issuance);
        assert_eq!(phase_at(S, &p), Phase::Insurance);
        assert_eq!(phase_at(T1, &p), Phase::Insurance);
        assert_eq!(phase_at(T1 + 1, &p), Phase::Divest);
        assert_eq!(phase_at(T2, &p), Phase::Claim);
        assert_eq!(phase_at(T3, &p), Phase::Closed);
    }
}
