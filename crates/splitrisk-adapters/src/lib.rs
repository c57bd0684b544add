//! # splitrisk-adapters
//!
//! **Adapter plane**: the capability boundary around external yield venues
//! and the fault-isolated fan-out that spreads the pool across them.
//!
//! ## Architecture
//!
//! 1. **LendingAdapter**: untrusted deposit/withdraw/balance capability
//! 2. **SlotMap**: generational arena holding adapters behind stable [`AdapterId`]s
//! 3. **AdapterRegistry**: membership gated to the issuance window, even-split
//!    fan-out, per-adapter failure isolation
//!
//! ## Failure Policy
//!
//! ```text
//! for each adapter:
//!     Ok  → DepositSuccessful / WithdrawSuccessful
//!     Err → LendingError(adapter, attempted), keep going
//! ```
//!
//! A failing adapter contributes zero; the caller reconciles on the amounts
//! actually moved, reported in a [`FanOutReport`].
//!
//! [`AdapterId`]: splitrisk_types::AdapterId

pub mod adapter;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod registry;
pub mod slot_map;

pub use adapter::{AdapterError, LendingAdapter};
pub use registry::{AdapterOutcome, AdapterRegistry, FanOutReport};
pub use slot_map::SlotMap;
