//! # splitrisk-types
//!
//! Shared types, errors, and configuration for the **SplitRisk** tranche
//! settlement engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`UserId`], [`AdapterId`], [`TrancheId`]
//! - **Amounts**: [`Amount`], [`Timestamp`], and the [`Wad`] fixed-point fraction
//! - **Time model**: [`TimePeriod`], [`PhaseFlags`], [`Phase`], [`BoundaryPolicy`], [`Clock`]
//! - **Events**: [`ProtocolEvent`]
//! - **Configuration**: [`ProtocolConfig`], [`PeriodSchedule`], [`PeriodOffsets`]
//! - **Errors**: [`SplitRiskError`] with `SR_ERR_` prefix codes
//! - **Constants**: period offsets, tranche limits, fixed-point scale

pub mod amount;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod ids;
pub mod time;

// Re-export all primary types at crate root for ergonomic imports:
//   use splitrisk_types::{UserId, Amount, TimePeriod, SplitRiskError, ...};

pub use amount::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use time::*;

// Constants are accessed via `splitrisk_types::constants::FOO`
// (not re-exported to avoid name collisions).
