//! # splitrisk-core
//!
//! Stateful settlement engine for **SplitRisk** tranche insurance.
//!
//! - [`TimeGate`]: one-time phase boundaries and phase queries
//! - [`TrancheLedger`]: one fungible claim token per seniority class
//! - [`AssetLedger`]: the pooled asset, with custody and supply conservation
//! - [`InsuranceCore`]: issuance → insurance → liquid state machine
//! - [`SettlementSnapshot`]: payout pools frozen at divest
//!
//! ## Lifecycle
//!
//! ```text
//! ┌───────────┐ invest ┌───────────┐ divest ┌───────────┐
//! │ ISSUANCE  │───────▶│ INSURANCE │───────▶│  LIQUID   │
//! │           │        │           │        │           │
//! │ split_risk│        │ adapters  │        │ claim     │
//! │ adapters± │        │ hold pool │        │ claim_all │
//! └───────────┘        └───────────┘        └───────────┘
//!        now < S          S ≤ now ≤ T1       T1 < now
//! ```
//!
//! Losses are absorbed junior first: with two tranches the junior class
//! loses everything before the senior class loses anything.

pub mod asset_ledger;
pub mod insurance;
pub mod settlement;
pub mod time_gate;
pub mod tranche_ledger;

pub use asset_ledger::{AssetLedger, Holder};
pub use insurance::{InsuranceCore, ProtocolState};
pub use settlement::SettlementSnapshot;
pub use time_gate::TimeGate;
pub use tranche_ledger::TrancheLedger;
