//! Time gate: owns the phase boundaries and answers phase questions.
//!
//! Boundaries are set exactly once. Every predicate delegates to
//! [`validate_phase`], so the gate, the adapter registry and the insurance
//! core always agree on which window `now` falls into.

use splitrisk_math::{phase_at, validate_phase};
use splitrisk_types::{
    BoundaryPolicy, Phase, PeriodOffsets, PhaseFlags, Result, SplitRiskError, TimePeriod,
    Timestamp,
};

#[derive(Debug, Clone)]
pub struct TimeGate {
    period: Option<TimePeriod>,
    offsets: PeriodOffsets,
    policy: BoundaryPolicy,
}

impl TimeGate {
    #[must_use]
    pub fn new(offsets: PeriodOffsets, policy: BoundaryPolicy) -> Self {
        Self {
            period: None,
            offsets,
            policy,
        }
    }

    /// Fix the boundaries. One-time.
    ///
    /// # Errors
    /// - [`SplitRiskError::AlreadyInitialized`] on a second call
    /// - [`SplitRiskError::InvalidTimePeriods`] unless `S < T1 < T2 < T3`
    pub fn set_time_periods(
        &mut self,
        s: Timestamp,
        t1: Timestamp,
        t2: Timestamp,
        t3: Timestamp,
    ) -> Result<TimePeriod> {
        if self.period.is_some() {
            return Err(SplitRiskError::AlreadyInitialized {
                what: "time periods",
            });
        }
        let period = TimePeriod::new(s, t1, t2, t3)?;
        tracing::info!(%period, "Time periods set");
        self.period = Some(period);
        Ok(period)
    }

    /// Derive boundaries from `anchor` with this gate's offsets. Pure.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::ArithmeticOverflow`] if a boundary would
    /// exceed `u64::MAX`.
    pub fn calculate_new_time_periods(&self, anchor: Timestamp) -> Result<TimePeriod> {
        TimePeriod::from_anchor(anchor, &self.offsets)
    }

    /// The boundaries, once set.
    #[must_use]
    pub fn period(&self) -> Option<&TimePeriod> {
        self.period.as_ref()
    }

    #[must_use]
    pub fn policy(&self) -> BoundaryPolicy {
        self.policy
    }

    /// All flags at `now`; every flag is false until boundaries are set.
    #[must_use]
    pub fn flags(&self, now: Timestamp) -> PhaseFlags {
        match &self.period {
            Some(period) => validate_phase(now, period, self.policy),
            None => PhaseFlags {
                can_split_risk: false,
                is_insurance_period: false,
                can_divest: false,
                can_claim: false,
            },
        }
    }

    #[must_use]
    pub fn can_split_risk(&self, now: Timestamp) -> bool {
        self.flags(now).can_split_risk
    }

    #[must_use]
    pub fn is_insurance_period(&self, now: Timestamp) -> bool {
        self.flags(now).is_insurance_period
    }

    #[must_use]
    pub fn can_divest(&self, now: Timestamp) -> bool {
        self.flags(now).can_divest
    }

    #[must_use]
    pub fn can_claim(&self, now: Timestamp) -> bool {
        self.flags(now).can_claim
    }

    #[must_use]
    pub fn phase(&self, now: Timestamp) -> Option<Phase> {
        self.period.as_ref().map(|period| phase_at(now, period))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> TimeGate {
        let mut gate = TimeGate::new(PeriodOffsets::default(), BoundaryPolicy::default());
        gate.set_time_periods(100, 200, 300, 400).unwrap();
        gate
    }

    #[test]
    fn set_once() {
        let mut gate = gate();
        assert_eq!(
            gate.set_time_periods(1, 2, 3, 4).unwrap_err(),
            SplitRiskError::AlreadyInitialized {
                what: "time periods"
            }
        );
        assert_eq!(gate.period().unwrap().insurance_start, 100);
    }

    #[test]
    fn rejects_unordered() {
        let mut gate = TimeGate::new(PeriodOffsets::default(), BoundaryPolicy::default());
        assert!(matches!(
            gate.set_time_periods(100, 100, 300, 400),
            Err(SplitRiskError::InvalidTimePeriods { .. })
        ));
        // A rejected call does not consume the one-time slot.
        assert!(gate.set_time_periods(100, 200, 300, 400).is_ok());
    }

    #[test]
    fn unset_gate_allows_nothing() {
        let gate = TimeGate::new(PeriodOffsets::default(), BoundaryPolicy::default());
        assert!(!gate.can_split_risk(0));
        assert!(!gate.can_claim(u64::MAX));
        assert_eq!(gate.phase(0), None);
    }

    #[test]
    fn t1_boundary_is_exact() {
        let gate = gate();
        assert!(gate.can_split_risk(99));
        assert!(!gate.can_split_risk(100));
        assert!(gate.is_insurance_period(200));
        assert!(!gate.can_claim(200));
        assert!(!gate.is_insurance_period(201));
        assert!(gate.can_claim(201));
    }

    #[test]
    fn claim_at_t1_policy() {
        let policy = BoundaryPolicy {
            claim_at_t1: true,
            divest_at_t2: false,
        };
        let mut gate = TimeGate::new(PeriodOffsets::default(), policy);
        gate.set_time_periods(100, 200, 300, 400).unwrap();
        assert!(gate.is_insurance_period(200));
        assert!(gate.can_claim(200));
    }

    #[test]
    fn phases_in_order() {
        let gate = gate();
        assert_eq!(gate.phase(0), Some(Phase::Issuance));
        assert_eq!(gate.phase(150), Some(Phase::Insurance));
        assert_eq!(gate.phase(250), Some(Phase::Divest));
        assert_eq!(gate.phase(350), Some(Phase::Claim));
        assert_eq!(gate.phase(400), Some(Phase::Closed));
    }

    #[test]
    fn calculate_from_anchor_is_increasing() {
        let gate = gate();
        let p = gate.calculate_new_time_periods(1_000).unwrap();
        assert!(p.insurance_start > 1_000);
        assert!(p.insurance_start < p.insurance_end);
        assert!(p.insurance_end < p.divest_deadline);
        assert!(p.divest_deadline < p.claim_deadline);
        assert!(matches!(
            gate.calculate_new_time_periods(u64::MAX - 10),
            Err(SplitRiskError::ArithmeticOverflow { .. })
        ));
    }
}
