//! Property tests for risk splitting against a live core.

use std::sync::Arc;

use proptest::prelude::*;
use splitrisk_core::{Holder, InsuranceCore};
use splitrisk_types::*;

const WALLET: Amount = 10_000_000;

fn core(tranche_count: u8) -> InsuranceCore<Arc<ManualClock>> {
    let config = ProtocolConfig {
        schedule: PeriodSchedule::Explicit {
            s: 100,
            t1: 200,
            t2: 300,
            t3: 400,
        },
        ..ProtocolConfig::anchored(0)
    }
    .with_tranche_count(tranche_count);
    InsuranceCore::new(config, ManualClock::shared(0)).unwrap()
}

fn funded(tranche_count: u8, user: UserId) -> InsuranceCore<Arc<ManualClock>> {
    let mut core = core(tranche_count);
    core.fund(user, WALLET).unwrap();
    core.approve_custody(user, WALLET);
    core.drain_events();
    core
}

proptest! {
    #[test]
    fn divisible_deposit_mints_equal_shares(n in 2u8..=3, units in 1u64..1_000_000) {
        let amount = units * u64::from(n);
        let alice = UserId::new();
        let mut core = funded(n, alice);

        core.split_risk(alice, amount).unwrap();

        for ledger in core.tranches() {
            prop_assert_eq!(ledger.balance_of(alice), units);
            prop_assert_eq!(ledger.total_supply(), units);
        }
        prop_assert_eq!(core.asset().balance_of(alice), WALLET - amount);
        prop_assert_eq!(core.asset().balance_of(Holder::Custody), amount);
        prop_assert_eq!(core.asset().allowance(alice, Holder::Custody), WALLET - amount);
        prop_assert_eq!(core.events(), &[ProtocolEvent::RiskSplit { user: alice, amount }][..]);
        prop_assert!(core.verify_invariants().is_ok());
    }

    #[test]
    fn uneven_or_tiny_deposit_changes_nothing(n in 2u8..=3, amount in 0u64..1_000_000) {
        let divisor = u64::from(n);
        prop_assume!(amount < divisor || amount % divisor != 0);
        let alice = UserId::new();
        let mut core = funded(n, alice);

        let err = core.split_risk(alice, amount).unwrap_err();
        if amount < divisor {
            prop_assert_eq!(err, SplitRiskError::AmountTooLow { amount, minimum: divisor });
        } else {
            prop_assert_eq!(err, SplitRiskError::AmountNotDivisible { amount, divisor });
        }

        for ledger in core.tranches() {
            prop_assert_eq!(ledger.balance_of(alice), 0);
            prop_assert_eq!(ledger.total_supply(), 0);
        }
        prop_assert_eq!(core.asset().balance_of(alice), WALLET);
        prop_assert_eq!(core.asset().balance_of(Holder::Custody), 0);
        prop_assert_eq!(core.asset().allowance(alice, Holder::Custody), WALLET);
        prop_assert!(core.events().is_empty());
    }
}
