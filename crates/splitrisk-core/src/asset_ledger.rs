//! Ledger for the pooled asset.
//!
//! Tracks per-holder balances and allowances with supply accounting. All
//! mutations are atomic: either the full operation succeeds or nothing
//! changes.
//!
//! Value only enters or leaves the ledger through three doors, so after every
//! operation:
//! ```text
//! Σ(balances) == minted + received_external - sent_external
//! ```
//! `send_external` / `receive_external` are the adapter fan-out flows.
//!
//! Only user accounts are writable from outside this crate. Every movement
//! out of [`Holder::Custody`] goes through a `pub(crate)` method owned by the
//! insurance core; a public [`AssetLedger::transfer`] from custody is refused.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use splitrisk_types::{Amount, Result, SplitRiskError, UserId};

/// Account on the asset ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Holder {
    User(UserId),
    /// The pool's own account, controlled by the insurance core.
    Custody,
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(user) => write!(f, "{user}"),
            Self::Custody => write!(f, "custody"),
        }
    }
}

impl From<UserId> for Holder {
    fn from(user: UserId) -> Self {
        Self::User(user)
    }
}

/// Balances, allowances and supply counters for one asset.
#[derive(Debug, Clone)]
pub struct AssetLedger {
    symbol: String,
    balances: HashMap<Holder, Amount>,
    /// `(owner, spender) -> remaining allowance`.
    allowances: HashMap<(Holder, Holder), Amount>,
    minted: u128,
    sent_external: u128,
    received_external: u128,
}

impl AssetLedger {
    #[must_use]
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            minted: 0,
            sent_external: 0,
            received_external: 0,
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    #[must_use]
    pub fn balance_of(&self, holder: impl Into<Holder>) -> Amount {
        self.balances.get(&holder.into()).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn allowance(&self, owner: impl Into<Holder>, spender: Holder) -> Amount {
        self.allowances
            .get(&(owner.into(), spender))
            .copied()
            .unwrap_or(0)
    }

    /// Create new units for `to` out of thin air (faucet).
    ///
    /// # Errors
    /// Returns [`SplitRiskError::ArithmeticOverflow`] if the balance would overflow.
    pub fn mint(&mut self, to: UserId, amount: Amount) -> Result<()> {
        let to = Holder::User(to);
        let credited = self.credited_balance(to, amount)?;
        self.balances.insert(to, credited);
        self.minted += u128::from(amount);
        tracing::debug!(asset = %self.symbol, to = %to, amount, "Minted");
        Ok(())
    }

    /// Set (not add to) the allowance of `spender` over `owner`'s funds.
    pub fn approve(&mut self, owner: UserId, spender: Holder, amount: Amount) {
        self.allowances.insert((Holder::User(owner), spender), amount);
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// # Errors
    /// - [`SplitRiskError::CustodyProtected`] if `from` is [`Holder::Custody`]
    /// - [`SplitRiskError::InsufficientBalance`] if `from` holds less than `amount`
    /// - [`SplitRiskError::ArithmeticOverflow`] if `to` would overflow
    pub fn transfer(
        &mut self,
        from: impl Into<Holder>,
        to: impl Into<Holder>,
        amount: Amount,
    ) -> Result<()> {
        let from = from.into();
        if from == Holder::Custody {
            tracing::warn!(asset = %self.symbol, amount, "Refused transfer out of custody");
            return Err(SplitRiskError::CustodyProtected);
        }
        self.move_balance(from, to.into(), amount)
    }

    /// Pay `amount` out of custody to `to`.
    pub(crate) fn release_custody(&mut self, to: impl Into<Holder>, amount: Amount) -> Result<()> {
        self.move_balance(Holder::Custody, to.into(), amount)
    }

    /// Move `amount` from `from` to `to` on behalf of `spender`, consuming allowance.
    ///
    /// # Errors
    /// - [`SplitRiskError::InsufficientAllowance`] if the allowance is too small
    /// - [`SplitRiskError::InsufficientBalance`] if `from` holds less than `amount`
    /// - [`SplitRiskError::ArithmeticOverflow`] if `to` would overflow
    pub(crate) fn transfer_from(
        &mut self,
        spender: Holder,
        from: impl Into<Holder>,
        to: impl Into<Holder>,
        amount: Amount,
    ) -> Result<()> {
        let (from, to) = (from.into(), to.into());
        let approved = self.allowance(from, spender);
        if approved < amount {
            return Err(SplitRiskError::InsufficientAllowance {
                needed: amount,
                approved,
            });
        }
        self.move_balance(from, to, amount)?;
        self.allowances.insert((from, spender), approved - amount);
        Ok(())
    }

    /// Record `amount` leaving `from` for an external venue.
    pub(crate) fn send_external(&mut self, from: impl Into<Holder>, amount: Amount) -> Result<()> {
        let from = from.into();
        let debited = self.debited_balance(from, amount)?;
        self.balances.insert(from, debited);
        self.sent_external += u128::from(amount);
        Ok(())
    }

    /// Record `amount` arriving at `to` from an external venue.
    pub(crate) fn receive_external(&mut self, to: impl Into<Holder>, amount: Amount) -> Result<()> {
        let to = to.into();
        let credited = self.credited_balance(to, amount)?;
        self.balances.insert(to, credited);
        self.received_external += u128::from(amount);
        Ok(())
    }

    /// Sum of every holder's balance.
    #[must_use]
    pub fn total_balances(&self) -> u128 {
        self.balances.values().map(|&b| u128::from(b)).sum()
    }

    /// `minted + received_external - sent_external`, or `None` if more left
    /// than ever existed.
    #[must_use]
    pub fn expected_supply(&self) -> Option<u128> {
        (self.minted + self.received_external).checked_sub(self.sent_external)
    }

    /// Verify that balances add up to the expected supply.
    ///
    /// # Errors
    /// Returns [`SplitRiskError::SupplyInvariantViolation`] if they do not.
    pub fn verify_supply(&self) -> Result<()> {
        let actual = self.total_balances();
        match self.expected_supply() {
            Some(expected) if expected == actual => Ok(()),
            expected => Err(SplitRiskError::SupplyInvariantViolation {
                reason: format!(
                    "Asset {}: actual supply {actual} != expected {expected:?} \
                     (minted={}, received={}, sent={})",
                    self.symbol, self.minted, self.received_external, self.sent_external,
                ),
            }),
        }
    }

    fn move_balance(&mut self, from: Holder, to: Holder, amount: Amount) -> Result<()> {
        let debited = self.debited_balance(from, amount)?;
        if from == to {
            return Ok(());
        }
        let credited = self.credited_balance(to, amount)?;
        self.balances.insert(from, debited);
        self.balances.insert(to, credited);
        Ok(())
    }

    fn debited_balance(&self, holder: Holder, amount: Amount) -> Result<Amount> {
        let available = self.balance_of(holder);
        available
            .checked_sub(amount)
            .ok_or(SplitRiskError::InsufficientBalance {
                needed: amount,
                available,
            })
    }

    fn credited_balance(&self, holder: Holder, amount: Amount) -> Result<Amount> {
        self.balance_of(holder)
            .checked_add(amount)
            .ok_or(SplitRiskError::ArithmeticOverflow {
                context: "asset balance credit",
            })
    }
}
