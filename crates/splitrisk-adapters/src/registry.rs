//! Adapter registry: membership and fault-isolated fan-out.
//!
//! Membership may only change while risk splitting is open (`now < S`);
//! after that the adapter set is frozen for the life of the instance.
//!
//! Deposits and withdrawals are fanned out with [`split_evenly`]. Each
//! adapter call is isolated: a failure is logged, recorded as a
//! `LendingError` event, and the loop moves on to the next adapter.

use splitrisk_math::{split_evenly, validate_phase};
use splitrisk_types::{
    AdapterId, Amount, BoundaryPolicy, ProtocolEvent, Result, SplitRiskError, TimePeriod,
    Timestamp,
};

use crate::adapter::{AdapterError, LendingAdapter};
use crate::slot_map::SlotMap;

/// What happened at one adapter during a fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterOutcome {
    pub adapter: AdapterId,
    /// Share requested from / offered to this adapter.
    pub attempted: Amount,
    /// Amount that actually moved (0 on failure).
    pub moved: Amount,
    pub error: Option<AdapterError>,
}

/// Result of a deposit or withdraw fan-out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    pub outcomes: Vec<AdapterOutcome>,
    /// Sum of the requested shares.
    pub attempted: Amount,
    /// Sum of the amounts that actually moved.
    pub moved: Amount,
    /// Events in fan-out order.
    pub events: Vec<ProtocolEvent>,
}

impl FanOutReport {
    /// Number of adapters whose call failed.
    #[must_use]
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| o.error.is_some()).count()
    }

    /// Attempted minus moved.
    #[must_use]
    pub fn shortfall(&self) -> Amount {
        self.attempted.saturating_sub(self.moved)
    }
}

/// Owns the adapters and fans pool movements out across them.
pub struct AdapterRegistry {
    adapters: SlotMap<Box<dyn LendingAdapter>>,
    period: TimePeriod,
    policy: BoundaryPolicy,
}

impl AdapterRegistry {
    /// Create an empty registry whose membership window is governed by `period`.
    #[must_use]
    pub fn new(period: TimePeriod, policy: BoundaryPolicy) -> Self {
        Self {
            adapters: SlotMap::new(),
            period,
            policy,
        }
    }

    fn ensure_issuance(&self, now: Timestamp) -> Result<()> {
        if validate_phase(now, &self.period, self.policy).can_split_risk {
            Ok(())
        } else {
            Err(SplitRiskError::PastIssuancePeriod {
                now,
                issuance_end: self.period.insurance_start,
            })
        }
    }

    /// Register an adapter. Only allowed while `now < S`.
    ///
    /// # Errors
    /// - [`SplitRiskError::PastIssuancePeriod`] once issuance has ended
    /// - [`SplitRiskError::ArithmeticOverflow`] if no slot index is left
    pub fn add_adapter(
        &mut self,
        now: Timestamp,
        adapter: Box<dyn LendingAdapter>,
    ) -> Result<AdapterId> {
        self.ensure_issuance(now)?;
        let name = adapter.name().to_string();
        let id = self.adapters.insert(adapter)?;
        tracing::info!(adapter = %id, name = %name, "Adapter registered");
        Ok(id)
    }

    /// Deregister an adapter. Only allowed while `now < S`.
    ///
    /// # Errors
    /// - [`SplitRiskError::PastIssuancePeriod`] once issuance has ended
    /// - [`SplitRiskError::AdapterNotFound`] if `id` is stale or unknown
    pub fn remove_adapter(
        &mut self,
        now: Timestamp,
        id: AdapterId,
    ) -> Result<Box<dyn LendingAdapter>> {
        self.ensure_issuance(now)?;
        let adapter = self
            .adapters
            .remove(id)
            .ok_or(SplitRiskError::AdapterNotFound(id))?;
        tracing::info!(adapter = %id, name = %adapter.name(), "Adapter removed");
        Ok(adapter)
    }

    /// Split `amount` evenly and deposit each share.
    ///
    /// # Errors
    /// - [`SplitRiskError::NoAdapters`] if no adapter is registered
    /// - [`SplitRiskError::NothingToInvest`] if `amount` is zero
    pub fn deposit_all(&mut self, amount: Amount) -> Result<FanOutReport> {
        if self.adapters.is_empty() {
            return Err(SplitRiskError::NoAdapters);
        }
        if amount == 0 {
            return Err(SplitRiskError::NothingToInvest);
        }
        let shares = split_evenly(amount, self.adapters.len())?;
        let mut report = FanOutReport::default();

        for ((id, adapter), share) in self.adapters.iter_mut().zip(shares) {
            if share == 0 {
                continue;
            }
            report.attempted += share;
            match adapter.deposit(share) {
                Ok(()) => {
                    tracing::debug!(adapter = %id, amount = share, "Deposit successful");
                    report.moved += share;
                    report.events.push(ProtocolEvent::DepositSuccessful {
                        adapter: id,
                        amount: share,
                    });
                    report.outcomes.push(AdapterOutcome {
                        adapter: id,
                        attempted: share,
                        moved: share,
                        error: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        adapter = %id,
                        name = %adapter.name(),
                        amount = share,
                        error = %err,
                        "Adapter deposit failed; continuing fan-out"
                    );
                    report.events.push(ProtocolEvent::LendingError {
                        adapter: id,
                        amount: share,
                    });
                    report.outcomes.push(AdapterOutcome {
                        adapter: id,
                        attempted: share,
                        moved: 0,
                        error: Some(err),
                    });
                }
            }
        }

        tracing::info!(
            attempted = report.attempted,
            deposited = report.moved,
            failures = report.failures(),
            "Deposit fan-out complete"
        );
        Ok(report)
    }

    /// Split `amount` evenly and withdraw each share.
    ///
    /// The report's `moved` is the sum of what adapters actually returned.
    /// It may be below `amount` after a loss, or above it when a venue hands
    /// back accrued yield with the principal.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::NoAdapters`] if no adapter is registered.
    pub fn withdraw_all(&mut self, amount: Amount) -> Result<FanOutReport> {
        let shares = split_evenly(amount, self.adapters.len())?;
        let mut report = FanOutReport::default();

        for ((id, adapter), share) in self.adapters.iter_mut().zip(shares) {
            if share == 0 {
                continue;
            }
            report.attempted += share;
            match adapter.withdraw(share) {
                Ok(returned) => {
                    if returned < share {
                        tracing::warn!(
                            adapter = %id,
                            requested = share,
                            returned,
                            "Adapter returned less than requested"
                        );
                    } else if returned > share {
                        tracing::info!(
                            adapter = %id,
                            requested = share,
                            returned,
                            "Adapter returned yield above principal"
                        );
                    }
                    report.moved = report.moved.checked_add(returned).ok_or(
                        SplitRiskError::ArithmeticOverflow {
                            context: "withdraw fan-out total",
                        },
                    )?;
                    report.events.push(ProtocolEvent::WithdrawSuccessful {
                        adapter: id,
                        amount: returned,
                    });
                    report.outcomes.push(AdapterOutcome {
                        adapter: id,
                        attempted: share,
                        moved: returned,
                        error: None,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        adapter = %id,
                        name = %adapter.name(),
                        amount = share,
                        error = %err,
                        "Adapter withdraw failed; continuing fan-out"
                    );
                    report.events.push(ProtocolEvent::LendingError {
                        adapter: id,
                        amount: share,
                    });
                    report.outcomes.push(AdapterOutcome {
                        adapter: id,
                        attempted: share,
                        moved: 0,
                        error: Some(err),
                    });
                }
            }
        }

        tracing::info!(
            requested = report.attempted,
            recovered = report.moved,
            failures = report.failures(),
            "Withdraw fan-out complete"
        );
        Ok(report)
    }

    /// Sum of every adapter's reported balance.
    #[must_use]
    pub fn aggregate_balance(&self) -> Amount {
        self.adapters
            .iter()
            .fold(0, |acc: Amount, (_, a)| acc.saturating_add(a.balance()))
    }

    #[must_use]
    pub fn get(&self, id: AdapterId) -> Option<&dyn LendingAdapter> {
        self.adapters.get(id).map(|a| &**a)
    }

    /// Live adapter ids in fan-out order.
    #[must_use]
    pub fn ids(&self) -> Vec<AdapterId> {
        self.adapters.iter().map(|(id, _)| id).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{FailingAdapter, InMemoryAdapter, LossyAdapter};

    const S: Timestamp = 1_000;

    fn registry() -> AdapterRegistry {
        let period = TimePeriod::new(S, 2_000, 3_000, 4_000).unwrap();
        AdapterRegistry::new(period, BoundaryPolicy::default())
    }

    #[test]
    fn add_only_during_issuance() {
        let mut reg = registry();
        assert!(reg.add_adapter(S - 1, Box::new(InMemoryAdapter::new("a"))).is_ok());
        let err = reg
            .add_adapter(S, Box::new(InMemoryAdapter::new("b")))
            .unwrap_err();
        assert!(matches!(err, SplitRiskError::PastIssuancePeriod { .. }));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn remove_only_during_issuance() {
        let mut reg = registry();
        let id = reg.add_adapter(0, Box::new(InMemoryAdapter::new("a"))).unwrap();
        let err = reg.remove_adapter(S + 5, id).err().unwrap();
        assert!(matches!(err, SplitRiskError::PastIssuancePeriod { .. }));
        assert!(reg.remove_adapter(S - 1, id).is_ok());
        assert!(reg.is_empty());
    }

    #[test]
    fn remove_stale_id_fails() {
        let mut reg = registry();
        let id = reg.add_adapter(0, Box::new(InMemoryAdapter::new("a"))).unwrap();
        reg.remove_adapter(0, id).unwrap();
        let err = reg.remove_adapter(0, id).err().unwrap();
        assert_eq!(err, SplitRiskError::AdapterNotFound(id));
    }

    #[test]
    fn deposit_all_splits_with_remainder() {
        let mut reg = registry();
        let ids: Vec<_> = (0..3)
            .map(|i| {
                reg.add_adapter(0, Box::new(InMemoryAdapter::new(format!("a{i}"))))
                    .unwrap()
            })
            .collect();
        let report = reg.deposit_all(10).unwrap();
        assert_eq!(report.moved, 10);
        assert_eq!(report.failures(), 0);
        let balances: Vec<_> = ids.iter().map(|&id| reg.get(id).unwrap().balance()).collect();
        assert_eq!(balances, vec![4, 3, 3]);
        assert_eq!(reg.aggregate_balance(), 10);
    }

    #[test]
    fn deposit_all_requires_adapters() {
        let mut reg = registry();
        assert_eq!(reg.deposit_all(100).unwrap_err(), SplitRiskError::NoAdapters);
    }

    #[test]
    fn deposit_all_requires_amount() {
        let mut reg = registry();
        reg.add_adapter(0, Box::new(InMemoryAdapter::new("a"))).unwrap();
        assert_eq!(reg.deposit_all(0).unwrap_err(), SplitRiskError::NothingToInvest);
    }

    #[test]
    fn failing_adapter_is_isolated() {
        let mut reg = registry();
        let bad = reg.add_adapter(0, Box::new(FailingAdapter::new("bad"))).unwrap();
        let good = reg.add_adapter(0, Box::new(InMemoryAdapter::new("good"))).unwrap();

        let report = reg.deposit_all(100).unwrap();

        assert_eq!(report.failures(), 1);
        assert_eq!(report.moved, 50);
        assert_eq!(report.shortfall(), 50);
        assert_eq!(reg.get(good).unwrap().balance(), 50);
        let lending_errors: Vec<_> = report.events.iter().filter(|e| e.is_lending_error()).collect();
        assert_eq!(
            lending_errors,
            vec![&ProtocolEvent::LendingError {
                adapter: bad,
                amount: 50
            }]
        );
    }

    #[test]
    fn withdraw_all_sums_actual_returns() {
        let mut reg = registry();
        reg.add_adapter(0, Box::new(InMemoryAdapter::new("full"))).unwrap();
        reg.add_adapter(0, Box::new(LossyAdapter::new("half", 1, 2))).unwrap();
        reg.deposit_all(100).unwrap();

        let report = reg.withdraw_all(100).unwrap();
        assert_eq!(report.attempted, 100);
        assert_eq!(report.moved, 75);
        assert_eq!(report.failures(), 0);
    }

    #[test]
    fn withdraw_failure_contributes_zero() {
        let mut reg = registry();
        reg.add_adapter(0, Box::new(InMemoryAdapter::new("ok"))).unwrap();
        reg.add_adapter(0, Box::new(FailingAdapter::new("bad"))).unwrap();
        reg.deposit_all(100).unwrap();

        let report = reg.withdraw_all(100).unwrap();
        assert_eq!(report.moved, 50);
        assert_eq!(report.failures(), 1);
    }

    #[test]
    fn withdraw_credits_yield_above_principal() {
        let mut reg = registry();
        let id = reg
            .add_adapter(0, Box::new(InMemoryAdapter::with_balance("rich", 1_000)))
            .unwrap();
        let report = reg.withdraw_all(10).unwrap();
        assert_eq!(report.attempted, 10);
        assert_eq!(report.moved, 1_000);
        assert_eq!(report.shortfall(), 0);
        assert_eq!(
            report.events,
            vec![ProtocolEvent::WithdrawSuccessful {
                adapter: id,
                amount: 1_000
            }]
        );
    }
}
