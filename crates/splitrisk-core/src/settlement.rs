//! Frozen divest result.
//!
//! Taken once, at divest. Every later claim divides against these supplies
//! and pools, so neither claim order nor tranche transfers between users can
//! change what the classes recover in aggregate.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use splitrisk_math::proportional_share;
use splitrisk_types::{Amount, Timestamp, TrancheId, Wad};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementSnapshot {
    pub taken_at: Timestamp,
    /// Principal in custody when the pool was invested.
    pub invested: Amount,
    /// Withdrawn from adapters plus principal that never left custody.
    pub recovered: Amount,
    pub severity: Wad,
    /// Outstanding supply per tranche at divest, most senior first.
    pub tranche_supplies: Vec<Amount>,
    /// Payout pool per tranche, most senior first.
    pub payout_pools: Vec<Amount>,
    /// SHA-256 over every field above.
    pub digest: [u8; 32],
}

impl SettlementSnapshot {
    #[must_use]
    pub fn new(
        taken_at: Timestamp,
        invested: Amount,
        recovered: Amount,
        severity: Wad,
        tranche_supplies: Vec<Amount>,
        payout_pools: Vec<Amount>,
    ) -> Self {
        let mut snapshot = Self {
            taken_at,
            invested,
            recovered,
            severity,
            tranche_supplies,
            payout_pools,
            digest: [0u8; 32],
        };
        snapshot.digest = snapshot.compute_digest();
        snapshot
    }

    /// `SHA-256(domain_sep || taken_at || invested || recovered || severity || n || supplies || pools)`
    #[must_use]
    pub fn compute_digest(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(b"splitrisk:settlement:v1:");
        hasher.update(self.taken_at.to_le_bytes());
        hasher.update(self.invested.to_le_bytes());
        hasher.update(self.recovered.to_le_bytes());
        hasher.update(self.severity.raw().to_le_bytes());
        hasher.update((self.tranche_supplies.len() as u64).to_le_bytes());
        for (supply, pool) in self.tranche_supplies.iter().zip(&self.payout_pools) {
            hasher.update(supply.to_le_bytes());
            hasher.update(pool.to_le_bytes());
        }
        hasher.finalize().into()
    }

    #[must_use]
    pub fn verify_digest(&self) -> bool {
        self.compute_digest() == self.digest
    }

    #[must_use]
    pub fn digest_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Asset owed for burning `units` of `tranche`. Zero for unknown tranches.
    #[must_use]
    pub fn payout_for(&self, tranche: TrancheId, units: Amount) -> Amount {
        match (
            self.tranche_supplies.get(tranche.index()),
            self.payout_pools.get(tranche.index()),
        ) {
            (Some(&supply), Some(&pool)) => proportional_share(units, supply, pool),
            _ => 0,
        }
    }

    /// Sum of all payout pools.
    #[must_use]
    pub fn total_payout(&self) -> Amount {
        self.payout_pools.iter().fold(0, |acc: Amount, &p| acc.saturating_add(p))
    }

    /// Recovered value not owed to any class (rounding dust or surplus).
    #[must_use]
    pub fn residual(&self) -> Amount {
        self.recovered.saturating_sub(self.total_payout())
    }

    /// Realized recovery fraction of `tranche`, for reporting.
    #[must_use]
    pub fn recovery_fraction(&self, tranche: TrancheId) -> Option<Wad> {
        let supply = *self.tranche_supplies.get(tranche.index())?;
        let pool = *self.payout_pools.get(tranche.index())?;
        Some(Wad::from_ratio(pool, supply).unwrap_or(Wad::ONE))
    }
}
