//! Fungible claim token for one seniority class.
//!
//! Anyone may read balances and move their own tokens. Minting and burning
//! are reserved to the insurance core (`pub(crate)`), which mints on
//! `split_risk` and burns on `claim`.
//!
//! Invariant: `Σ balances == total_supply`.

use std::collections::HashMap;

use splitrisk_types::{Amount, Result, SplitRiskError, TrancheId, UserId};

#[derive(Debug, Clone)]
pub struct TrancheLedger {
    id: TrancheId,
    balances: HashMap<UserId, Amount>,
    total_supply: Amount,
}

impl TrancheLedger {
    #[must_use]
    pub fn new(id: TrancheId) -> Self {
        Self {
            id,
            balances: HashMap::new(),
            total_supply: 0,
        }
    }

    #[must_use]
    pub fn id(&self) -> TrancheId {
        self.id
    }

    /// Token symbol, e.g. `SR-A`.
    #[must_use]
    pub fn symbol(&self) -> String {
        format!("SR-{}", self.id.letter())
    }

    #[must_use]
    pub fn balance_of(&self, user: UserId) -> Amount {
        self.balances.get(&user).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn total_supply(&self) -> Amount {
        self.total_supply
    }

    /// Number of accounts with a nonzero balance.
    #[must_use]
    pub fn holders(&self) -> usize {
        self.balances.values().filter(|&&b| b > 0).count()
    }

    /// Move `amount` of this class from `from` to `to`.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::InsufficientBalance`] if `from` holds less than `amount`.
    pub fn transfer(&mut self, from: UserId, to: UserId, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(SplitRiskError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        if from == to || amount == 0 {
            return Ok(());
        }
        // balance(to) + amount <= total_supply, so this cannot overflow.
        self.balances.insert(from, available - amount);
        *self.balances.entry(to).or_insert(0) += amount;
        tracing::debug!(tranche = %self.id, from = %from, to = %to, amount, "Tranche transfer");
        Ok(())
    }

    /// Whether `amount` more units can be minted.
    pub(crate) fn can_mint(&self, amount: Amount) -> bool {
        self.total_supply.checked_add(amount).is_some()
    }

    pub(crate) fn mint(&mut self, to: UserId, amount: Amount) -> Result<()> {
        self.total_supply = self
            .total_supply
            .checked_add(amount)
            .ok_or(SplitRiskError::ArithmeticOverflow {
                context: "tranche supply",
            })?;
        *self.balances.entry(to).or_insert(0) += amount;
        Ok(())
    }

    pub(crate) fn burn(&mut self, from: UserId, amount: Amount) -> Result<()> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(SplitRiskError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert(from, available - amount);
        self.total_supply -= amount;
        Ok(())
    }

    /// Sum of balances, for invariant checks.
    #[must_use]
    pub fn sum_of_balances(&self) -> u128 {
        self.balances.values().map(|&b| u128::from(b)).sum()
    }
}
