//! System-wide constants for the SplitRisk settlement engine.

/// Seconds in one day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Default length of the issuance window (anchor → S).
pub const DEFAULT_ISSUANCE_PERIOD_SECS: u64 = 7 * SECONDS_PER_DAY;

/// Default length of the insurance window (S → T1).
pub const DEFAULT_INSURANCE_PERIOD_SECS: u64 = 28 * SECONDS_PER_DAY;

/// Default length of the divest buffer (T1 → T2).
pub const DEFAULT_DIVEST_BUFFER_SECS: u64 = SECONDS_PER_DAY;

/// Default length of the claim buffer (T2 → T3).
pub const DEFAULT_CLAIM_BUFFER_SECS: u64 = 3 * SECONDS_PER_DAY;

/// Default number of seniority classes (senior A, junior B).
pub const DEFAULT_TRANCHE_COUNT: u8 = 2;

/// Smallest supported tranche count.
pub const MIN_TRANCHE_COUNT: u8 = 2;

/// Largest supported tranche count (A > B > C).
pub const MAX_TRANCHE_COUNT: u8 = 3;

/// Scale of the [`crate::Wad`] fixed-point type (18 decimals).
pub const WAD_SCALE: u128 = 1_000_000_000_000_000_000;

/// Number of decimals represented by [`WAD_SCALE`].
pub const WAD_DECIMALS: u32 = 18;

/// Default pooled asset symbol.
pub const DEFAULT_ASSET: &str = "DAI";

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "SplitRisk";
