//! # splitrisk-math
//!
//! **Pure settlement math for SplitRisk.**
//!
//! Everything here is a function of its arguments: no state, no I/O, no
//! clock reads:
//!
//! - **Distribution**: even split with remainder, tranche split, pro-rata share
//! - **Phase**: the single canonical answer to "which window is `now` in?"
//! - **Waterfall**: the loss-absorption curve and frozen payout pools
//!
//! All products of two amounts are computed in `u128`; all divisions floor.

pub mod distribution;
pub mod phase;
pub mod waterfall;

pub use distribution::{proportional_share, split_evenly, split_tranches};
pub use phase::{phase_at, validate_phase, validate_phase_strict};
pub use waterfall::{
    junior_recovery_fraction, payout_pools, senior_recovery_fraction, severity,
    tranche_payout, tranche_recovery_fraction,
};
