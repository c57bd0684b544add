//! Deterministic in-memory adapters for tests (`test-helpers` feature).

use splitrisk_types::Amount;

use crate::adapter::{AdapterError, LendingAdapter};

/// Holds deposits and returns them in full.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdapter {
    name: String,
    balance: Amount,
}

impl InMemoryAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balance: 0,
        }
    }

    /// Start with a pre-existing position (e.g. accrued yield).
    pub fn with_balance(name: impl Into<String>, balance: Amount) -> Self {
        Self {
            name: name.into(),
            balance,
        }
    }
}

impl LendingAdapter for InMemoryAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn deposit(&mut self, amount: Amount) -> Result<(), AdapterError> {
        self.balance = self.balance.saturating_add(amount);
        Ok(())
    }

    fn withdraw(&mut self, amount: Amount) -> Result<Amount, AdapterError> {
        if self.balance == 0 {
            return Err(AdapterError::InsufficientLiquidity {
                requested: amount,
                available: 0,
            });
        }
        // Hand back the whole position, accrued yield included.
        let out = std::mem::take(&mut self.balance);
        Ok(out)
    }

    fn balance(&self) -> Amount {
        self.balance
    }
}

/// Rejects every call.
#[derive(Debug, Clone)]
pub struct FailingAdapter {
    name: String,
}

impl FailingAdapter {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LendingAdapter for FailingAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn deposit(&mut self, _amount: Amount) -> Result<(), AdapterError> {
        Err(AdapterError::Rejected {
            reason: format!("{} is paused", self.name),
        })
    }

    fn withdraw(&mut self, _amount: Amount) -> Result<Amount, AdapterError> {
        Err(AdapterError::Unavailable)
    }

    fn balance(&self) -> Amount {
        0
    }
}

/// Accepts deposits but only returns `numerator / denominator` of the
/// position on withdraw, simulating a venue that took a loss.
#[derive(Debug, Clone)]
pub struct LossyAdapter {
    name: String,
    balance: Amount,
    numerator: u64,
    denominator: u64,
}

impl LossyAdapter {
    pub fn new(name: impl Into<String>, numerator: u64, denominator: u64) -> Self {
        Self {
            name: name.into(),
            balance: 0,
            numerator: numerator.min(denominator),
            denominator,
        }
    }
}

impl LendingAdapter for LossyAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn deposit(&mut self, amount: Amount) -> Result<(), AdapterError> {
        self.balance = self.balance.saturating_add(amount);
        Ok(())
    }

    fn withdraw(&mut self, amount: Amount) -> Result<Amount, AdapterError> {
        let requested = amount.min(self.balance);
        self.balance -= requested;
        if self.denominator == 0 {
            return Ok(0);
        }
        let returned = u128::from(requested) * u128::from(self.numerator)
            / u128::from(self.denominator);
        Ok(Amount::try_from(returned).unwrap_or(requested))
    }

    fn balance(&self) -> Amount {
        self.balance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_round_trip() {
        let mut a = InMemoryAdapter::new("mem");
        a.deposit(40).unwrap();
        a.deposit(2).unwrap();
        assert_eq!(a.balance(), 42);
        assert_eq!(a.withdraw(42).unwrap(), 42);
        assert_eq!(a.balance(), 0);
        assert!(a.withdraw(1).is_err());
    }

    #[test]
    fn failing_rejects_everything() {
        let mut a = FailingAdapter::new("down");
        assert!(matches!(a.deposit(1), Err(AdapterError::Rejected { .. })));
        assert_eq!(a.withdraw(1), Err(AdapterError::Unavailable));
    }

    #[test]
    fn lossy_returns_fraction() {
        let mut a = LossyAdapter::new("haircut", 3, 4);
        a.deposit(100).unwrap();
        assert_eq!(a.withdraw(100).unwrap(), 75);
        assert_eq!(a.balance(), 0);
    }
}
