//! Protocol events.
//!
//! The engine appends one event per observable effect to an in-memory log
//! and mirrors it to `tracing`. Adapter failures appear **only** here
//! (`LendingError`); they never become errors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{AdapterId, Amount, TrancheId, UserId, Wad};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolEvent {
    /// A deposit was pulled into custody and split into tranche tokens.
    RiskSplit { user: UserId, amount: Amount },
    AdapterAdded { adapter: AdapterId, name: String },
    AdapterRemoved { adapter: AdapterId },
    /// An adapter accepted its share of a deposit fan-out.
    DepositSuccessful { adapter: AdapterId, amount: Amount },
    /// An adapter returned funds during a withdraw fan-out.
    WithdrawSuccessful { adapter: AdapterId, amount: Amount },
    /// An adapter call failed; `amount` is what was attempted.
    LendingError { adapter: AdapterId, amount: Amount },
    /// The pool was invested. `deployed` excludes shares of failed adapters.
    Invested { amount: Amount, deployed: Amount },
    /// The pool was divested and payout pools frozen.
    Divested { recovered: Amount, severity: Wad },
    /// Tranche tokens were burned and the pro-rata payout sent.
    Claimed {
        user: UserId,
        tranche: TrancheId,
        burned: Amount,
        paid: Amount,
    },
}

impl ProtocolEvent {
    /// Upper snake-case event name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RiskSplit { .. } => "RISK_SPLIT",
            Self::AdapterAdded { .. } => "ADAPTER_ADDED",
            Self::AdapterRemoved { .. } => "ADAPTER_REMOVED",
            Self::DepositSuccessful { .. } => "DEPOSIT_SUCCESSFUL",
            Self::WithdrawSuccessful { .. } => "WITHDRAW_SUCCESSFUL",
            Self::LendingError { .. } => "LENDING_ERROR",
            Self::Invested { .. } => "INVESTED",
            Self::Divested { .. } => "DIVESTED",
            Self::Claimed { .. } => "CLAIMED",
        }
    }

    /// Whether this is an isolated adapter failure.
    #[must_use]
    pub fn is_lending_error(&self) -> bool {
        matches!(self, Self::LendingError { .. })
    }
}

impl fmt::Display for ProtocolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RiskSplit { user, amount } => write!(f, "RISK_SPLIT user={user} amount={amount}"),
            Self::AdapterAdded { adapter, name } => write!(f, "ADAPTER_ADDED {adapter} ({name})"),
            Self::AdapterRemoved { adapter } => write!(f, "ADAPTER_REMOVED {adapter}"),
            Self::DepositSuccessful { adapter, amount } => {
                write!(f, "DEPOSIT_SUCCESSFUL {adapter} amount={amount}")
            }
            Self::WithdrawSuccessful { adapter, amount } => {
                write!(f, "WITHDRAW_SUCCESSFUL {adapter} amount={amount}")
            }
            Self::LendingError { adapter, amount } => {
                write!(f, "LENDING_ERROR {adapter} amount={amount}")
            }
            Self::Invested { amount, deployed } => {
                write!(f, "INVESTED amount={amount} deployed={deployed}")
            }
            Self::Divested {
                recovered,
                severity,
            } => write!(f, "DIVESTED recovered={recovered} severity={severity}"),
            Self::Claimed {
                user,
                tranche,
                burned,
                paid,
            } => write!(f, "CLAIMED user={user} {tranche} burned={burned} paid={paid}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_stable() {
        let ev = ProtocolEvent::LendingError {
            adapter: AdapterId::new(0, 0),
            amount: 50,
        };
        assert_eq!(ev.name(), "LENDING_ERROR");
        assert!(ev.is_lending_error());
        assert!(ev.to_string().starts_with("LENDING_ERROR adapter:0v0"));
    }

    #[test]
    fn divested_display_uses_decimal_severity() {
        let ev = ProtocolEvent::Divested {
            recovered: 75,
            severity: Wad::from_ratio(1, 4).unwrap(),
        };
        assert_eq!(ev.to_string(), "DIVESTED recovered=75 severity=0.25");
    }

    #[test]
    fn serde_roundtrip() {
        let ev = ProtocolEvent::Claimed {
            user: UserId::new(),
            tranche: TrancheId(1),
            burned: 10,
            paid: 9,
        };
        let json = serde_json::to_string(&ev).unwrap();
        let back: ProtocolEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(ev, back);
    }
}
