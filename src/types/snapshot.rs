//! Deterministic snapshot encoding and fingerprints for allocations.
//!
//! The UI re-renders on every drag tick. A fingerprint gives it a cheap,
//! stable identity for an allocation: equal allocations always hash the same,
//! and any change to a count or an amount changes the hash.
//!
//! ## Layout
//!
//! The fingerprint is SHA-256 over the SSZ encoding of an
//! [`AllocationHeader`] followed by one [`LevelRecord`] per level in
//! Base → Mid → Top order. Amounts are encoded as fixed-point u64
//! (scaled by 10^8).

use sha2::{Digest, Sha256};
use ssz_rs::prelude::*;

use crate::error::EngineError;
use crate::types::currency::decimal_to_fixed;
use crate::types::{Allocation, TierKind};

/// Fixed-size header describing the allocation context.
///
/// SSZ size: 8 + 8 + 8 = 24 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct AllocationHeader {
    /// Total number of codes.
    pub total_codes: u64,

    /// Unit price in fixed-point (scaled by 10^8).
    pub unit_price: u64,

    /// Number of level records that follow.
    pub level_count: u64,
}

/// One reward level as a fixed-size record.
///
/// SSZ size: 1 + 8 + 8 + 8 = 25 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default, SimpleSerialize)]
pub struct LevelRecord {
    /// Tier tag as u8 (0=Base, 1=Mid, 2=Top).
    pub tier_raw: u8,

    /// Position inside the tier.
    pub index: u64,

    /// Reward amount in fixed-point (scaled by 10^8).
    pub amount: u64,

    /// Number of codes at this level.
    pub count: u64,
}

impl LevelRecord {
    /// The tier this record belongs to.
    pub fn tier(&self) -> Option<TierKind> {
        TierKind::from_u8(self.tier_raw)
    }
}

fn encode<T: SimpleSerialize>(value: &T) -> crate::error::Result<Vec<u8>> {
    ssz_rs::serialize(value).map_err(|e| EngineError::Snapshot(format!("{:?}", e)))
}

impl Allocation {
    /// Header record for this allocation.
    pub fn snapshot_header(&self) -> crate::error::Result<AllocationHeader> {
        Ok(AllocationHeader {
            total_codes: self.total_codes(),
            unit_price: decimal_to_fixed(self.unit_price()).ok_or(EngineError::Overflow)?,
            level_count: self.iter_levels().count() as u64,
        })
    }

    /// Level records in Base → Mid → Top order.
    pub fn snapshot_levels(&self) -> crate::error::Result<Vec<LevelRecord>> {
        self.iter_levels()
            .map(|(kind, index, level)| {
                Ok(LevelRecord {
                    tier_raw: kind.to_u8(),
                    index: index as u64,
                    amount: decimal_to_fixed(level.amount).ok_or(EngineError::Overflow)?,
                    count: level.count,
                })
            })
            .collect()
    }

    /// Canonical byte encoding: header followed by all level records.
    pub fn snapshot_bytes(&self) -> crate::error::Result<Vec<u8>> {
        let mut bytes = encode(&self.snapshot_header()?)?;
        for record in self.snapshot_levels()? {
            bytes.extend_from_slice(&encode(&record)?);
        }
        Ok(bytes)
    }

    /// SHA-256 of [`Allocation::snapshot_bytes`].
    pub fn fingerprint(&self) -> crate::error::Result<[u8; 32]> {
        let bytes = self.snapshot_bytes()?;
        let mut hasher = Sha256::new();
        hasher.update(&bytes);
        let result = hasher.finalize();

        let mut hash = [0u8; 32];
        hash.copy_from_slice(&result);
        Ok(hash)
    }

    /// Fingerprint as a lowercase hex string.
    pub fn fingerprint_hex(&self) -> crate::error::Result<String> {
        Ok(hex::encode(self.fingerprint()?))
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{RewardLevel, Tier};
    use rust_decimal::Decimal;

    fn sample() -> Allocation {
        Allocation::from_tiers(
            Tier::new(
                TierKind::Base,
                vec![
                    RewardLevel::new(Decimal::new(10, 2), 60),
                    RewardLevel::new(Decimal::new(50, 2), 30),
                ],
            ),
            Tier::new(TierKind::Mid, vec![RewardLevel::new(Decimal::from(5), 9)]),
            Tier::new(TierKind::Top, vec![RewardLevel::new(Decimal::from(30), 1)]),
            Decimal::TEN,
        )
        .unwrap()
    }

    #[test]
    fn test_snapshot_sizes() {
        let alloc = sample();
        let header = ssz_rs::serialize(&alloc.snapshot_header().unwrap()).expect("Failed to serialize");
        assert_eq!(header.len(), 24, "AllocationHeader should serialize to 24 bytes");

        let bytes = alloc.snapshot_bytes().unwrap();
        assert_eq!(bytes.len(), 24 + 4 * 25);
    }

    #[test]
    fn test_level_record_ssz_roundtrip() {
        let record = LevelRecord {
            tier_raw: TierKind::Top.to_u8(),
            index: 2,
            amount: 3_000_000_000,
            count: 7,
        };
        let bytes = ssz_rs::serialize(&record).expect("Failed to serialize");
        let decoded: LevelRecord = ssz_rs::deserialize(&bytes).expect("Failed to deserialize");

        assert_eq!(record, decoded);
        assert_eq!(decoded.tier(), Some(TierKind::Top));
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let a = sample();
        let b = sample();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());

        let hex = a.fingerprint_hex().unwrap();
        assert_eq!(hex.len(), 64);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_tracks_counts_and_amounts() {
        let base = sample();
        let fp = base.fingerprint().unwrap();

        let mut moved = base.clone();
        moved.tier_mut(TierKind::Base).levels[0].count -= 1;
        moved.tier_mut(TierKind::Base).levels[1].count += 1;
        assert_ne!(fp, moved.fingerprint().unwrap());

        let mut repriced = base.clone();
        repriced.tier_mut(TierKind::Top).levels[0].amount = Decimal::from(45);
        assert_ne!(fp, repriced.fingerprint().unwrap());
    }
}
