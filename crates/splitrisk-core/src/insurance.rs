//! Insurance core: the settlement state machine.
//!
//! ```text
//!  ISSUANCE ──invest()──▶ INSURANCE (invested) ──divest()──▶ LIQUID
//!  split_risk             coverage active                    claim / claim_all
//!  add/remove adapter
//! ```
//!
//! Transitions are one-way. Every entry point reads the clock once,
//! validates everything, and only then mutates; an error leaves the core
//! untouched. Adapter calls are the only place control leaves the core, and
//! their failures are isolated into `LendingError` events.

use serde::{Deserialize, Serialize};
use splitrisk_adapters::{AdapterRegistry, LendingAdapter};
use splitrisk_math::{payout_pools, phase_at, severity, split_tranches};
use splitrisk_types::{
    AdapterId, Amount, Clock, Phase, PhaseFlags, ProtocolConfig, ProtocolEvent, Result,
    SplitRiskError, TimePeriod, Timestamp, TrancheId, UserId, constants,
};

use crate::asset_ledger::{AssetLedger, Holder};
use crate::settlement::SettlementSnapshot;
use crate::time_gate::TimeGate;
use crate::tranche_ledger::TrancheLedger;

/// Live lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolState {
    /// Custody balance handed to `deposit_all` at invest.
    pub total_invested: Amount,
    /// Portion of `total_invested` adapters actually accepted.
    pub deployed: Amount,
    pub is_invested: bool,
    pub in_liquid_mode: bool,
}

impl ProtocolState {
    #[must_use]
    pub fn stage(&self) -> &'static str {
        match (self.is_invested, self.in_liquid_mode) {
            (_, true) => "LIQUID",
            (true, false) => "INVESTED",
            (false, false) => "ISSUANCE",
        }
    }
}

/// One protocol instance: tranches, custody, adapters and the clock.
pub struct InsuranceCore<C: Clock> {
    config: ProtocolConfig,
    clock: C,
    gate: TimeGate,
    period: TimePeriod,
    registry: AdapterRegistry,
    tranches: Vec<TrancheLedger>,
    asset: AssetLedger,
    state: ProtocolState,
    snapshot: Option<SettlementSnapshot>,
    events: Vec<ProtocolEvent>,
}

impl<C: Clock> InsuranceCore<C> {
    /// Build an instance from a validated config.
    ///
    /// # Errors
    /// Any configuration error from [`ProtocolConfig::validate`].
    pub fn new(config: ProtocolConfig, clock: C) -> Result<Self> {
        config.validate()?;
        let period = config.resolve_periods()?;

        let mut gate = TimeGate::new(config.offsets, config.boundary_policy);
        gate.set_time_periods(
            period.insurance_start,
            period.insurance_end,
            period.divest_deadline,
            period.claim_deadline,
        )?;

        let tranches = TrancheId::all(config.tranche_count)
            .map(TrancheLedger::new)
            .collect();

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            asset = %config.asset,
            tranches = config.tranche_count,
            %period,
            "Insurance core created"
        );

        Ok(Self {
            registry: AdapterRegistry::new(period, config.boundary_policy),
            asset: AssetLedger::new(config.asset.clone()),
            config,
            clock,
            gate,
            period,
            tranches,
            state: ProtocolState::default(),
            snapshot: None,
            events: Vec::new(),
        })
    }

    // ── Issuance ────────────────────────────────────────────────────────

    /// Pull `amount` of the asset from `user` into custody and mint
    /// `amount / N` of every tranche to them.
    ///
    /// # Errors
    /// - [`SplitRiskError::PastIssuancePeriod`] once `now >= S`
    /// - [`SplitRiskError::AmountTooLow`] if `amount < N`
    /// - [`SplitRiskError::AmountNotDivisible`] if `amount % N != 0`
    /// - [`SplitRiskError::InsufficientAllowance`] / [`SplitRiskError::InsufficientBalance`]
    pub fn split_risk(&mut self, user: UserId, amount: Amount) -> Result<()> {
        let now = self.clock.now();
        if !self.gate.can_split_risk(now) {
            return Err(self.past_issuance(now));
        }
        let minimum = Amount::from(self.config.tranche_count);
        if amount < minimum {
            return Err(SplitRiskError::AmountTooLow { amount, minimum });
        }
        let shares = split_tranches(amount, self.config.tranche_count)?;
        if !self
            .tranches
            .iter()
            .zip(&shares)
            .all(|(ledger, &share)| ledger.can_mint(share))
        {
            return Err(SplitRiskError::ArithmeticOverflow {
                context: "tranche supply",
            });
        }

        self.asset
            .transfer_from(Holder::Custody, user, Holder::Custody, amount)?;
        for (ledger, share) in self.tranches.iter_mut().zip(shares) {
            ledger.mint(user, share)?;
        }

        tracing::info!(user = %user, amount, "Risk split");
        self.emit(ProtocolEvent::RiskSplit { user, amount });
        Ok(())
    }

    /// Register a lending adapter. Only while `now < S`.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::PastIssuancePeriod`] once issuance has ended.
    pub fn add_adapter(&mut self, adapter: Box<dyn LendingAdapter>) -> Result<AdapterId> {
        let name = adapter.name().to_string();
        let id = self.registry.add_adapter(self.clock.now(), adapter)?;
        self.emit(ProtocolEvent::AdapterAdded { adapter: id, name });
        Ok(id)
    }

    /// Deregister a lending adapter. Only while `now < S`.
    ///
    /// # Errors
    /// - [`SplitRiskError::PastIssuancePeriod`] once issuance has ended
    /// - [`SplitRiskError::AdapterNotFound`] for an unknown or stale id
    pub fn remove_adapter(&mut self, id: AdapterId) -> Result<Box<dyn LendingAdapter>> {
        let adapter = self.registry.remove_adapter(self.clock.now(), id)?;
        self.emit(ProtocolEvent::AdapterRemoved { adapter: id });
        Ok(adapter)
    }

    // ── Insurance ───────────────────────────────────────────────────────

    /// Fan the whole custody balance out across the adapters.
    ///
    /// A failing adapter's share stays in custody and is counted as
    /// recovered at divest.
    ///
    /// # Errors
    /// - [`SplitRiskError::BeforeInsurancePeriod`] if `now < S`
    /// - [`SplitRiskError::AlreadyInvested`] if invested or already liquid
    /// - [`SplitRiskError::NothingToInvest`] if custody is empty
    /// - [`SplitRiskError::NoAdapters`] if no adapter is registered
    pub fn invest(&mut self) -> Result<Amount> {
        let now = self.clock.now();
        if self.gate.can_split_risk(now) {
            return Err(SplitRiskError::BeforeInsurancePeriod {
                now,
                starts_at: self.period.insurance_start,
            });
        }
        if self.state.is_invested || self.state.in_liquid_mode {
            return Err(SplitRiskError::AlreadyInvested);
        }
        let amount = self.asset.balance_of(Holder::Custody);
        if amount == 0 {
            return Err(SplitRiskError::NothingToInvest);
        }
        if self.registry.is_empty() {
            return Err(SplitRiskError::NoAdapters);
        }

        let report = self.registry.deposit_all(amount)?;
        self.asset.send_external(Holder::Custody, report.moved)?;

        self.state.total_invested = amount;
        self.state.deployed = report.moved;
        self.state.is_invested = true;

        tracing::info!(
            amount,
            deployed = report.moved,
            failures = report.failures(),
            "Pool invested"
        );
        self.events.extend(report.events);
        self.emit(ProtocolEvent::Invested {
            amount,
            deployed: report.moved,
        });
        Ok(report.moved)
    }

    // ── Divest ──────────────────────────────────────────────────────────

    /// Pull the pool back, compute severity, and freeze the payout pools.
    ///
    /// # Errors
    /// - [`SplitRiskError::InsurancePeriodActive`] before `T1`
    /// - [`SplitRiskError::InClaimPeriod`] once the divest window has closed
    /// - [`SplitRiskError::AlreadyDivested`] if already liquid
    /// - [`SplitRiskError::NotInvested`] if the pool was never invested
    pub fn divest(&mut self) -> Result<SettlementSnapshot> {
        let now = self.clock.now();
        let period = self.period;
        if !self.gate.can_divest(now) {
            return Err(if now < period.insurance_end {
                SplitRiskError::InsurancePeriodActive {
                    now,
                    ends_at: period.insurance_end,
                }
            } else {
                SplitRiskError::InClaimPeriod {
                    now,
                    divest_deadline: period.divest_deadline,
                }
            });
        }
        if self.state.in_liquid_mode {
            return Err(SplitRiskError::AlreadyDivested);
        }
        if !self.state.is_invested {
            return Err(SplitRiskError::NotInvested);
        }

        let invested = self.state.total_invested;
        let retained = invested - self.state.deployed;

        // Same split as the deposit, so each adapter is asked for its own share.
        let report = self.registry.withdraw_all(invested)?;
        self.asset.receive_external(Holder::Custody, report.moved)?;

        let recovered = report
            .moved
            .checked_add(retained)
            .ok_or(SplitRiskError::ArithmeticOverflow {
                context: "recovered amount",
            })?;
        let supplies: Vec<Amount> = self.tranches.iter().map(TrancheLedger::total_supply).collect();
        let pools = payout_pools(&supplies, invested, recovered)?;
        let severity = severity(invested, recovered);

        let snapshot = SettlementSnapshot::new(now, invested, recovered, severity, supplies, pools);

        self.state.in_liquid_mode = true;
        self.state.is_invested = false;

        tracing::info!(
            invested,
            recovered,
            severity = %severity,
            pools = ?snapshot.payout_pools,
            residual = snapshot.residual(),
            digest = %snapshot.digest_hex(),
            "Pool divested"
        );
        self.events.extend(report.events);
        self.emit(ProtocolEvent::Divested {
            recovered,
            severity,
        });
        self.snapshot = Some(snapshot.clone());
        Ok(snapshot)
    }

    // ── Claim ───────────────────────────────────────────────────────────

    /// Burn `amounts[i]` of tranche `i` and pay the pro-rata share of each
    /// frozen pool. Returns the total paid.
    ///
    /// # Errors
    /// - [`SplitRiskError::TrancheCountMismatch`] unless one amount per tranche
    /// - [`SplitRiskError::NotLiquid`] before divest
    /// - [`SplitRiskError::ClaimNotOpen`] before claims open
    /// - [`SplitRiskError::NothingToClaim`] if every amount is zero
    /// - [`SplitRiskError::InsufficientBalance`] if any amount exceeds the balance
    pub fn claim(&mut self, user: UserId, amounts: &[Amount]) -> Result<Amount> {
        if amounts.len() != self.tranches.len() {
            return Err(SplitRiskError::TrancheCountMismatch {
                expected: self.tranches.len(),
                actual: amounts.len(),
            });
        }
        let snapshot = self.ensure_claimable()?;
        if amounts.iter().all(|&a| a == 0) {
            return Err(SplitRiskError::NothingToClaim);
        }

        let mut payouts = Vec::with_capacity(amounts.len());
        let mut total: Amount = 0;
        for (ledger, &amount) in self.tranches.iter().zip(amounts) {
            let available = ledger.balance_of(user);
            if amount > available {
                return Err(SplitRiskError::InsufficientBalance {
                    needed: amount,
                    available,
                });
            }
            let paid = snapshot.payout_for(ledger.id(), amount);
            total = total
                .checked_add(paid)
                .ok_or(SplitRiskError::ArithmeticOverflow {
                    context: "claim total",
                })?;
            payouts.push(paid);
        }
        let custody = self.asset.balance_of(Holder::Custody);
        if custody < total {
            return Err(SplitRiskError::SupplyInvariantViolation {
                reason: format!("claim owes {total} but custody holds {custody}"),
            });
        }

        // Burn first, then pay.
        for (ledger, &amount) in self.tranches.iter_mut().zip(amounts) {
            if amount > 0 {
                ledger.burn(user, amount)?;
            }
        }
        self.asset.release_custody(user, total)?;

        for ((tranche, &burned), paid) in TrancheId::all(self.config.tranche_count)
            .zip(amounts)
            .zip(payouts)
        {
            if burned == 0 {
                continue;
            }
            tracing::info!(user = %user, %tranche, burned, paid, "Claimed");
            self.emit(ProtocolEvent::Claimed {
                user,
                tranche,
                burned,
                paid,
            });
        }
        Ok(total)
    }

    /// Claim the caller's full balance in every tranche.
    ///
    /// # Errors
    /// As [`Self::claim`]; [`SplitRiskError::NothingToClaim`] if every balance is zero.
    pub fn claim_all(&mut self, user: UserId) -> Result<Amount> {
        self.ensure_claimable()?;
        let amounts: Vec<Amount> = self.tranches.iter().map(|t| t.balance_of(user)).collect();
        self.claim(user, &amounts)
    }

    /// Move tranche tokens between holders.
    ///
    /// # Errors
    /// - [`SplitRiskError::UnknownTranche`] for an index outside the classes
    /// - [`SplitRiskError::InsufficientBalance`] if `from` holds too little
    pub fn transfer_tranche(
        &mut self,
        tranche: TrancheId,
        from: UserId,
        to: UserId,
        amount: Amount,
    ) -> Result<()> {
        self.tranches
            .get_mut(tranche.index())
            .ok_or(SplitRiskError::UnknownTranche(tranche))?
            .transfer(from, to, amount)
    }

    // ── Inspection ──────────────────────────────────────────────────────

    #[must_use]
    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    #[must_use]
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<&SettlementSnapshot> {
        self.snapshot.as_ref()
    }

    #[must_use]
    pub fn period(&self) -> &TimePeriod {
        &self.period
    }

    #[must_use]
    pub fn time_gate(&self) -> &TimeGate {
        &self.gate
    }

    #[must_use]
    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    #[must_use]
    pub fn flags(&self) -> PhaseFlags {
        self.gate.flags(self.clock.now())
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        phase_at(self.clock.now(), &self.period)
    }

    #[must_use]
    pub fn tranche(&self, index: usize) -> Option<&TrancheLedger> {
        self.tranches.get(index)
    }

    #[must_use]
    pub fn tranches(&self) -> &[TrancheLedger] {
        &self.tranches
    }

    #[must_use]
    pub fn asset(&self) -> &AssetLedger {
        &self.asset
    }

    /// Faucet: credit `user` with `amount` of the pooled asset.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::ArithmeticOverflow`] if the balance would overflow.
    pub fn fund(&mut self, user: UserId, amount: Amount) -> Result<()> {
        self.asset.mint(user, amount)
    }

    /// Let the pool pull up to `amount` from `user` in [`Self::split_risk`].
    pub fn approve_custody(&mut self, user: UserId, amount: Amount) {
        self.asset.approve(user, Holder::Custody, amount);
    }

    /// Move the pooled asset between holders. Custody is never a valid source.
    ///
    /// # Errors
    /// - [`SplitRiskError::CustodyProtected`] if `from` is [`Holder::Custody`]
    /// - [`SplitRiskError::InsufficientBalance`] if `from` holds too little
    pub fn transfer_asset(
        &mut self,
        from: impl Into<Holder>,
        to: impl Into<Holder>,
        amount: Amount,
    ) -> Result<()> {
        self.asset.transfer(from, to, amount)
    }

    #[must_use]
    pub fn events(&self) -> &[ProtocolEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<ProtocolEvent> {
        std::mem::take(&mut self.events)
    }

    /// Check asset conservation and `Σ balances == supply` on every tranche.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::SupplyInvariantViolation`] on any mismatch.
    pub fn verify_invariants(&self) -> Result<()> {
        self.asset.verify_supply()?;
        for ledger in &self.tranches {
            if ledger.sum_of_balances() != u128::from(ledger.total_supply()) {
                return Err(SplitRiskError::SupplyInvariantViolation {
                    reason: format!(
                        "{}: balances {} != supply {}",
                        ledger.symbol(),
                        ledger.sum_of_balances(),
                        ledger.total_supply()
                    ),
                });
            }
        }
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────

    fn past_issuance(&self, now: Timestamp) -> SplitRiskError {
        SplitRiskError::PastIssuancePeriod {
            now,
            issuance_end: self.period.insurance_start,
        }
    }

    fn ensure_claimable(&self) -> Result<&SettlementSnapshot> {
        let now = self.clock.now();
        let snapshot = match (&self.snapshot, self.state.in_liquid_mode) {
            (Some(snapshot), true) => snapshot,
            _ => return Err(SplitRiskError::NotLiquid),
        };
        if !self.gate.can_claim(now) {
            return Err(SplitRiskError::ClaimNotOpen { now });
        }
        Ok(snapshot)
    }

    fn emit(&mut self, event: ProtocolEvent) {
        tracing::debug!(event = event.name(), "{event}");
        self.events.push(event);
    }
}
