//! The lending adapter capability.
//!
//! An adapter wraps one external yield venue. It is **untrusted**: any call
//! may fail for any reason, and a withdraw may return less than requested.
//! Nothing an adapter does can abort a fan-out.

use splitrisk_types::Amount;
use thiserror::Error;

/// Why an adapter call failed. Never escapes the registry as an error; it is
/// logged and turned into a `LendingError` event.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The venue refused the call.
    #[error("adapter rejected call: {reason}")]
    Rejected { reason: String },

    /// The venue is unreachable or paused.
    #[error("adapter unavailable")]
    Unavailable,

    /// The venue cannot honour a withdrawal of this size.
    #[error("adapter liquidity exhausted: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: Amount, available: Amount },
}

/// Capability interface over one external yield venue.
pub trait LendingAdapter {
    /// Human-readable venue name, for logs and events.
    fn name(&self) -> &str;

    /// Hand `amount` of the pooled asset to the venue.
    fn deposit(&mut self, amount: Amount) -> Result<(), AdapterError>;

    /// Ask for `amount` back; returns what was actually returned.
    fn withdraw(&mut self, amount: Amount) -> Result<Amount, AdapterError>;

    /// Current position held at the venue.
    fn balance(&self) -> Amount;
}

impl<A: LendingAdapter + ?Sized> LendingAdapter for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn deposit(&mut self, amount: Amount) -> Result<(), AdapterError> {
        (**self).deposit(amount)
    }

    fn withdraw(&mut self, amount: Amount) -> Result<Amount, AdapterError> {
        (**self).withdraw(amount)
    }

    fn balance(&self) -> Amount {
        (**self).balance()
    }
}
