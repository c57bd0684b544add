//! Identifiers used throughout SplitRisk.
//!
//! Users are identified by UUIDv7. Adapters are identified by a generational
//! slot handle so a removed adapter's id can never silently alias a newer one.
//! Tranches are identified by their seniority index (0 = most senior).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Unique identifier for a depositor / claim holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AdapterId
// ---------------------------------------------------------------------------

/// Stable handle to a registered lending adapter.
///
/// `index` names a slot; `generation` is bumped every time the slot is
/// vacated, so a handle held across a removal stops resolving instead of
/// pointing at whichever adapter reuses the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct AdapterId {
    pub index: u32,
    pub generation: u32,
}

impl AdapterId {
    #[must_use]
    pub fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }
}

impl fmt::Display for AdapterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "adapter:{}v{}", self.index, self.generation)
    }
}

// ---------------------------------------------------------------------------
// TrancheId
// ---------------------------------------------------------------------------

/// Seniority class index. `TrancheId(0)` is the most senior class ("A").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct TrancheId(pub u8);

impl TrancheId {
    /// The most senior class.
    pub const SENIOR: Self = Self(0);

    /// Letter used in token symbols: A, B, C, ...
    #[must_use]
    pub fn letter(self) -> char {
        char::from(b'A'.saturating_add(self.0))
    }

    /// Position as a slice index.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0)
    }

    /// All tranche ids for a given class count, most senior first.
    pub fn all(count: u8) -> impl Iterator<Item = Self> {
        (0..count).map(Self)
    }
}

impl fmt::Display for TrancheId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tranche:{}", self.letter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_uniqueness() {
        let a = UserId::new();
        let b = UserId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn adapter_id_display() {
        assert_eq!(AdapterId::new(2, 5).to_string(), "adapter:2v5");
    }

    #[test]
    fn adapter_id_generation_distinguishes() {
        assert_ne!(AdapterId::new(0, 0), AdapterId::new(0, 1));
    }

    #[test]
    fn tranche_letters() {
        assert_eq!(TrancheId(0).letter(), 'A');
        assert_eq!(TrancheId(1).letter(), 'B');
        assert_eq!(TrancheId(2).letter(), 'C');
        assert_eq!(TrancheId::SENIOR.to_string(), "tranche:A");
    }

    #[test]
    fn tranche_all_is_seniority_ordered() {
        let ids: Vec<_> = TrancheId::all(3).collect();
        assert_eq!(ids, vec![TrancheId(0), TrancheId(1), TrancheId(2)]);
    }

    #[test]
    fn serde_roundtrips() {
        let uid = UserId::new();
        let json = serde_json::to_string(&uid).unwrap();
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(uid, back);

        let aid = AdapterId::new(1, 2);
        let json = serde_json::to_string(&aid).unwrap();
        let back: AdapterId = serde_json::from_str(&json).unwrap();
        assert_eq!(aid, back);
    }
}
