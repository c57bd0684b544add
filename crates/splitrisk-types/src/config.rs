//! Configuration for a SplitRisk protocol instance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{BoundaryPolicy, PeriodOffsets, Result, SplitRiskError, TimePeriod, Timestamp, constants};

/// How the four phase boundaries are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodSchedule {
    /// Derive from an anchor with [`ProtocolConfig::offsets`].
    Offsets { anchor: Timestamp },
    /// Use the given boundaries as-is.
    Explicit {
        s: Timestamp,
        t1: Timestamp,
        t2: Timestamp,
        t3: Timestamp,
    },
}

/// Configuration for one protocol instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Symbol of the pooled asset (e.g., "DAI").
    pub asset: String,
    /// Number of seniority classes.
    #[serde(default = "default_tranche_count")]
    pub tranche_count: u8,
    /// Phase boundary source.
    pub schedule: PeriodSchedule,
    /// Offsets used by [`PeriodSchedule::Offsets`].
    #[serde(default)]
    pub offsets: PeriodOffsets,
    /// Inclusivity at `T1` and `T2`.
    #[serde(default)]
    pub boundary_policy: BoundaryPolicy,
}

fn default_tranche_count() -> u8 {
    constants::DEFAULT_TRANCHE_COUNT
}

impl ProtocolConfig {
    /// Default two-tranche config anchored at `anchor`.
    #[must_use]
    pub fn anchored(anchor: Timestamp) -> Self {
        Self {
            asset: constants::DEFAULT_ASSET.to_string(),
            tranche_count: constants::DEFAULT_TRANCHE_COUNT,
            schedule: PeriodSchedule::Offsets { anchor },
            offsets: PeriodOffsets::default(),
            boundary_policy: BoundaryPolicy::default(),
        }
    }

    /// Same config with a different tranche count.
    #[must_use]
    pub fn with_tranche_count(mut self, tranche_count: u8) -> Self {
        self.tranche_count = tranche_count;
        self
    }

    /// Same config with a different boundary policy.
    #[must_use]
    pub fn with_boundary_policy(mut self, policy: BoundaryPolicy) -> Self {
        self.boundary_policy = policy;
        self
    }

    /// Parse from a JSON document and validate.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read a JSON file and validate.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check tranche count, asset symbol, and that the schedule resolves.
    pub fn validate(&self) -> Result<()> {
        if !(constants::MIN_TRANCHE_COUNT..=constants::MAX_TRANCHE_COUNT)
            .contains(&self.tranche_count)
        {
            return Err(SplitRiskError::InvalidTrancheCount {
                count: self.tranche_count,
                min: constants::MIN_TRANCHE_COUNT,
                max: constants::MAX_TRANCHE_COUNT,
            });
        }
        if self.asset.trim().is_empty() {
            return Err(SplitRiskError::Configuration(
                "asset symbol must not be empty".to_string(),
            ));
        }
        self.resolve_periods().map(|_| ())
    }

    /// Resolve the schedule into concrete boundaries.
    pub fn resolve_periods(&self) -> Result<TimePeriod> {
        match self.schedule {
            PeriodSchedule::Offsets { anchor } => TimePeriod::from_anchor(anchor, &self.offsets),
            PeriodSchedule::Explicit { s, t1, t2, t3 } => TimePeriod::new(s, t1, t2, t3),
        }
    }
}
