//! Error types for the SplitRisk settlement engine.
//!
//! All errors use the `SR_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Phase violations (operation outside its time window or state)
//! - 2xx: Input invariant violations
//! - 3xx: Balance errors
//! - 4xx: Adapter registry errors
//! - 5xx: Configuration errors
//! - 9xx: General / internal errors
//!
//! Adapter call failures are deliberately absent: they are isolated inside
//! the fan-out and surface as `LendingError` events, never as errors.

use thiserror::Error;

use crate::{AdapterId, Amount, Timestamp, TrancheId};

/// Central error enum for all SplitRisk operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SplitRiskError {
    // =================================================================
    // Phase Errors (1xx)
    // =================================================================
    /// Issuance has ended; risk splitting and adapter changes are closed.
    #[error("SR_ERR_100: Past issuance period (now {now}, issuance ended at {issuance_end})")]
    PastIssuancePeriod { now: Timestamp, issuance_end: Timestamp },

    /// Investing is only possible once the insurance period has started.
    #[error("SR_ERR_101: Insurance period not started (now {now}, starts at {starts_at})")]
    BeforeInsurancePeriod { now: Timestamp, starts_at: Timestamp },

    /// Divesting is only possible once insurance has ended.
    #[error("SR_ERR_102: Insurance period still active (now {now}, ends at {ends_at})")]
    InsurancePeriodActive { now: Timestamp, ends_at: Timestamp },

    /// The divest window has closed.
    #[error("SR_ERR_103: In claim period (now {now}, divest closed at {divest_deadline})")]
    InClaimPeriod { now: Timestamp, divest_deadline: Timestamp },

    /// Claims require the pool to have been divested.
    #[error("SR_ERR_104: Protocol is not in liquid mode")]
    NotLiquid,

    /// Claims are not open at this instant.
    #[error("SR_ERR_105: Claims not open (now {now})")]
    ClaimNotOpen { now: Timestamp },

    /// The pool has already been invested (or already settled).
    #[error("SR_ERR_106: Pool already invested")]
    AlreadyInvested,

    /// Divest requires an invested pool.
    #[error("SR_ERR_107: Pool is not invested")]
    NotInvested,

    /// The pool has already been divested.
    #[error("SR_ERR_108: Pool already divested")]
    AlreadyDivested,

    // =================================================================
    // Input Errors (2xx)
    // =================================================================
    /// The deposit is smaller than the number of tranches.
    #[error("SR_ERR_200: Amount {amount} below minimum {minimum}")]
    AmountTooLow { amount: Amount, minimum: Amount },

    /// The deposit does not split evenly across tranches.
    #[error("SR_ERR_201: Amount {amount} not divisible by {divisor}")]
    AmountNotDivisible { amount: Amount, divisor: Amount },

    /// A fan-out was attempted with no registered adapters.
    #[error("SR_ERR_202: No adapters registered")]
    NoAdapters,

    /// Nothing is held in custody to invest.
    #[error("SR_ERR_203: Nothing to invest")]
    NothingToInvest,

    /// A claim supplied the wrong number of tranche amounts.
    #[error("SR_ERR_204: Expected {expected} tranche amounts, got {actual}")]
    TrancheCountMismatch { expected: usize, actual: usize },

    /// All tranche balances are zero.
    #[error("SR_ERR_205: Nothing to claim")]
    NothingToClaim,

    /// A tranche index outside the configured classes.
    #[error("SR_ERR_206: Unknown tranche {0}")]
    UnknownTranche(TrancheId),

    // =================================================================
    // Balance Errors (3xx)
    // =================================================================
    /// Not enough balance to perform the operation.
    #[error("SR_ERR_300: Insufficient balance: need {needed}, have {available}")]
    InsufficientBalance { needed: Amount, available: Amount },

    /// Not enough approved allowance for the pull.
    #[error("SR_ERR_301: Insufficient allowance: need {needed}, approved {approved}")]
    InsufficientAllowance { needed: Amount, approved: Amount },

    /// The pooled custody account can only be moved by the insurance core.
    #[error("SR_ERR_302: Custody balance is not transferable")]
    CustodyProtected,

    // =================================================================
    // Adapter Registry Errors (4xx)
    // =================================================================
    /// The adapter handle is stale or was never issued.
    #[error("SR_ERR_400: Adapter not found: {0}")]
    AdapterNotFound(AdapterId),

    // =================================================================
    // Configuration Errors (5xx)
    // =================================================================
    /// A one-time setter was called twice.
    #[error("SR_ERR_500: Already initialized: {what}")]
    AlreadyInitialized { what: &'static str },

    /// Phase boundaries are not strictly increasing.
    #[error("SR_ERR_501: Invalid time periods: {reason}")]
    InvalidTimePeriods { reason: String },

    /// Tranche count outside the supported range.
    #[error("SR_ERR_502: Invalid tranche count {count} (supported {min}..={max})")]
    InvalidTrancheCount { count: u8, min: u8, max: u8 },

    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("SR_ERR_503: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("SR_ERR_504: Serialization error: {0}")]
    Serialization(String),

    /// I/O error.
    #[error("SR_ERR_505: I/O error: {0}")]
    Io(String),

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// An arithmetic step would overflow.
    #[error("SR_ERR_900: Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: &'static str },

    /// Supply conservation invariant violated. Critical safety alert.
    #[error("SR_ERR_901: Supply invariant violation: {reason}")]
    SupplyInvariantViolation { reason: String },
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, SplitRiskError>;

impl From<std::io::Error> for SplitRiskError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SplitRiskError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl SplitRiskError {
    /// The stable `SR_ERR_nnn` code of this error.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::PastIssuancePeriod { .. } => "SR_ERR_100",
            Self::BeforeInsurancePeriod { .. } => "SR_ERR_101",
            Self::InsurancePeriodActive { .. } => "SR_ERR_102",
            Self::InClaimPeriod { .. } => "SR_ERR_103",
            Self::NotLiquid => "SR_ERR_104",
            Self::ClaimNotOpen { .. } => "SR_ERR_105",
            Self::AlreadyInvested => "SR_ERR_106",
            Self::NotInvested => "SR_ERR_107",
            Self::AlreadyDivested => "SR_ERR_108",
            Self::AmountTooLow { .. } => "SR_ERR_200",
            Self::AmountNotDivisible { .. } => "SR_ERR_201",
            Self::NoAdapters => "SR_ERR_202",
            Self::NothingToInvest => "SR_ERR_203",
            Self::TrancheCountMismatch { .. } => "SR_ERR_204",
            Self::NothingToClaim => "SR_ERR_205",
            Self::UnknownTranche(_) => "SR_ERR_206",
            Self::InsufficientBalance { .. } => "SR_ERR_300",
            Self::InsufficientAllowance { .. } => "SR_ERR_301",
            Self::CustodyProtected => "SR_ERR_302",
            Self::AdapterNotFound(_) => "SR_ERR_400",
            Self::AlreadyInitialized { .. } => "SR_ERR_500",
            Self::InvalidTimePeriods { .. } => "SR_ERR_501",
            Self::InvalidTrancheCount { .. } => "SR_ERR_502",
            Self::Configuration(_) => "SR_ERR_503",
            Self::Serialization(_) => "SR_ERR_504",
            Self::Io(_) => "SR_ERR_505",
            Self::ArithmeticOverflow { .. } => "SR_ERR_900",
            Self::SupplyInvariantViolation { .. } => "SR_ERR_901",
        }
    }

    /// Whether this error rejects an operation for being outside its window.
    #[must_use]
    pub fn is_phase_violation(&self) -> bool {
        self.code().starts_with("SR_ERR_1")
    }
}
