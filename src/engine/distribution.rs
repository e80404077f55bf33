//! Distribution Calculator: `(unit_price, total_codes)` → initial allocation.
//!
//! ## Scale Buckets
//!
//! The run size selects a bucket. Larger runs push a bigger share into the
//! base tier and spread a larger, richer top tier.
//!
//! | Bucket  | Codes      | Base share | Mid amounts (× price)        | Top amounts (× price) × count |
//! |---------|------------|------------|------------------------------|-------------------------------|
//! | Small   | ≤ 300      | 95%        | 0.5 (2/3), 1 (1/3)           | 3×1                           |
//! | Medium  | ≤ 1,000    | 96%        | 0.5 (1/2), 1 (1/3), 2 (1/6)  | 10×1, 5×2                     |
//! | Large   | ≤ 10,000   | 97%        | 0.5 (1/2), 1 (1/3), 2 (1/6)  | 50×1, 20×1, 10×2              |
//! | Massive | > 10,000   | 98%        | 0.5 (1/2), 1 (1/3), 2 (1/6)  | 100×1, 50×2, 20×3             |
//!
//! The base tier always pays 1%, 5% and 10% of the price in 3:2:1 blocks.
//! The mid tier takes whatever the base and the reserved top slots leave.
//!
//! ## Remainder
//!
//! Every split is an integer floor. The shortfall `total_codes - assigned`
//! is never negative and is folded into the first base level, so the
//! smallest reward is slightly over-represented.

use rust_decimal::Decimal;
use tracing::debug;

use crate::engine::remainder::{assign_remainder, RemainderSlot};
use crate::error::{EngineError, Result};
use crate::types::{Allocation, RewardLevel, Tier, TierKind};

/// Default ceiling on `total_codes`.
pub const DEFAULT_MAX_TOTAL_CODES: u64 = 100_000;

// ============================================================================
// Bucket tables
// ============================================================================

/// A base-tier level: reward as a percent of price, weight in the block ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BaseRow {
    /// Reward as a percent of unit price.
    pub percent: u32,
    /// Blocks of codes per base block.
    pub weight: u64,
}

/// A mid-tier level: reward as a percent of price, share of the mid count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidRow {
    /// Reward as a percent of unit price.
    pub percent: u32,
    /// Share numerator.
    pub num: u64,
    /// Share denominator.
    pub den: u64,
}

/// A top-tier level: reward as a percent of price with a fixed count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopRow {
    /// Reward as a percent of unit price.
    pub percent: u32,
    /// Codes reserved at this level.
    pub count: u64,
}

/// Allocation table for one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BucketTable {
    /// Base share of `total_codes` as `(num, den)`.
    pub base_fraction: (u64, u64),
    /// Base levels.
    pub base: &'static [BaseRow],
    /// Mid levels.
    pub mid: &'static [MidRow],
    /// Top levels.
    pub top: &'static [TopRow],
}

impl BucketTable {
    /// Codes reserved for the top tier.
    pub fn reserved_top(&self) -> u64 {
        self.top.iter().map(|t| t.count).sum()
    }

    /// `floor(total_codes * base_fraction)`.
    pub fn base_count(&self, total_codes: u64) -> u64 {
        let (num, den) = self.base_fraction;
        share_of(total_codes, num, den)
    }
}

const BASE_LEVELS: &[BaseRow] = &[
    BaseRow { percent: 1, weight: 3 },
    BaseRow { percent: 5, weight: 2 },
    BaseRow { percent: 10, weight: 1 },
];

const MID_TWO_WAY: &[MidRow] = &[
    MidRow { percent: 50, num: 2, den: 3 },
    MidRow { percent: 100, num: 1, den: 3 },
];

const MID_THREE_WAY: &[MidRow] = &[
    MidRow { percent: 50, num: 1, den: 2 },
    MidRow { percent: 100, num: 1, den: 3 },
    MidRow { percent: 200, num: 1, den: 6 },
];

const SMALL: BucketTable = BucketTable {
    base_fraction: (95, 100),
    base: BASE_LEVELS,
    mid: MID_TWO_WAY,
    top: &[TopRow { percent: 300, count: 1 }],
};

const MEDIUM: BucketTable = BucketTable {
    base_fraction: (96, 100),
    base: BASE_LEVELS,
    mid: MID_THREE_WAY,
    top: &[
        TopRow { percent: 1_000, count: 1 },
        TopRow { percent: 500, count: 2 },
    ],
};

const LARGE: BucketTable = BucketTable {
    base_fraction: (97, 100),
    base: BASE_LEVELS,
    mid: MID_THREE_WAY,
    top: &[
        TopRow { percent: 5_000, count: 1 },
        TopRow { percent: 2_000, count: 1 },
        TopRow { percent: 1_000, count: 2 },
    ],
};

const MASSIVE: BucketTable = BucketTable {
    base_fraction: (98, 100),
    base: BASE_LEVELS,
    mid: MID_THREE_WAY,
    top: &[
        TopRow { percent: 10_000, count: 1 },
        TopRow { percent: 5_000, count: 2 },
        TopRow { percent: 2_000, count: 3 },
    ],
};

/// Run-size bucket selected by `total_codes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleBucket {
    /// Up to 300 codes.
    Small,
    /// 301 to 1,000 codes.
    Medium,
    /// 1,001 to 10,000 codes.
    Large,
    /// More than 10,000 codes.
    Massive,
}

impl ScaleBucket {
    /// Select the bucket for a run size.
    pub fn for_total(total_codes: u64) -> Self {
        match total_codes {
            0..=300 => ScaleBucket::Small,
            301..=1_000 => ScaleBucket::Medium,
            1_001..=10_000 => ScaleBucket::Large,
            _ => ScaleBucket::Massive,
        }
    }

    /// The bucket's allocation table.
    pub fn table(self) -> &'static BucketTable {
        match self {
            ScaleBucket::Small => &SMALL,
            ScaleBucket::Medium => &MEDIUM,
            ScaleBucket::Large => &LARGE,
            ScaleBucket::Massive => &MASSIVE,
        }
    }
}

// ============================================================================
// Calculator
// ============================================================================

fn percent_of(price: Decimal, percent: u32) -> Result<Decimal> {
    price
        .checked_mul(Decimal::new(i64::from(percent), 2))
        .ok_or(EngineError::Overflow)
}

/// `floor(n * num / den)` without intermediate overflow.
fn share_of(n: u64, num: u64, den: u64) -> u64 {
    (n as u128 * num as u128 / den as u128) as u64
}

/// Build the initial allocation for a product run.
///
/// # Errors
///
/// - [`EngineError::InvalidUnitPrice`] if `unit_price <= 0`
/// - [`EngineError::ZeroCodes`] if `total_codes == 0`
/// - [`EngineError::TooManyCodes`] if `total_codes > max_total_codes`
/// - [`EngineError::BelowReservedMinimum`] if the codes left after the base
///   tier cannot cover the bucket's reserved top slots
/// - [`EngineError::Overflow`] if a level amount does not fit a `Decimal`
///
/// # Example
///
/// ```
/// use qr_rewards::engine::distribution::{compute_initial_allocation, DEFAULT_MAX_TOTAL_CODES};
/// use qr_rewards::types::TierKind;
/// use rust_decimal::Decimal;
///
/// let alloc = compute_initial_allocation(Decimal::TEN, 100, DEFAULT_MAX_TOTAL_CODES).unwrap();
/// assert_eq!(alloc.grand_total(), 100);
/// assert_eq!(alloc.top().levels[0].amount, Decimal::from(30));
/// ```
pub fn compute_initial_allocation(
    unit_price: Decimal,
    total_codes: u64,
    max_total_codes: u64,
) -> Result<Allocation> {
    if unit_price <= Decimal::ZERO {
        return Err(EngineError::InvalidUnitPrice(unit_price));
    }
    if total_codes == 0 {
        return Err(EngineError::ZeroCodes);
    }
    if total_codes > max_total_codes {
        return Err(EngineError::TooManyCodes {
            requested: total_codes,
            max: max_total_codes,
        });
    }

    let bucket = ScaleBucket::for_total(total_codes);
    let table = bucket.table();

    let base_count = table.base_count(total_codes);
    let reserved = table.reserved_top();
    let mid_count = (total_codes - base_count)
        .checked_sub(reserved)
        .ok_or(EngineError::BelowReservedMinimum {
            total_codes,
            reserved,
        })?;

    let weights: u64 = table.base.iter().map(|b| b.weight).sum();
    let block = base_count / weights;
    let mut base: Vec<RewardLevel> = table
        .base
        .iter()
        .map(|b| Ok(RewardLevel::new(percent_of(unit_price, b.percent)?, block * b.weight)))
        .collect::<Result<_>>()?;

    let mid: Vec<RewardLevel> = table
        .mid
        .iter()
        .map(|m| {
            Ok(RewardLevel::new(
                percent_of(unit_price, m.percent)?,
                share_of(mid_count, m.num, m.den),
            ))
        })
        .collect::<Result<_>>()?;

    let top: Vec<RewardLevel> = table
        .top
        .iter()
        .map(|t| Ok(RewardLevel::new(percent_of(unit_price, t.percent)?, t.count)))
        .collect::<Result<_>>()?;

    let assigned: u64 = base.iter().chain(&mid).chain(&top).map(|l| l.count).sum();
    let shortfall = total_codes - assigned;
    // Positive remainders are always absorbed
    assign_remainder(&mut base, shortfall as i64, RemainderSlot::First);

    debug!(
        ?bucket,
        total_codes,
        base_count,
        mid_count,
        reserved,
        shortfall,
        "initial allocation computed"
    );

    Ok(Allocation::from_parts(
        Tier::new(TierKind::Base, base),
        Tier::new(TierKind::Mid, mid),
        Tier::new(TierKind::Top, top),
        total_codes,
        unit_price,
    ))
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(tier: &Tier) -> Vec<u64> {
        tier.levels.iter().map(|l| l.count).collect()
    }

    fn amounts(tier: &Tier) -> Vec<Decimal> {
        tier.levels.iter().map(|l| l.amount).collect()
    }

    fn build(price: Decimal, total: u64) -> Allocation {
        compute_initial_allocation(price, total, DEFAULT_MAX_TOTAL_CODES).unwrap()
    }

    #[test]
    fn test_bucket_selection() {
        assert_eq!(ScaleBucket::for_total(1), ScaleBucket::Small);
        assert_eq!(ScaleBucket::for_total(300), ScaleBucket::Small);
        assert_eq!(ScaleBucket::for_total(301), ScaleBucket::Medium);
        assert_eq!(ScaleBucket::for_total(1_000), ScaleBucket::Medium);
        assert_eq!(ScaleBucket::for_total(1_001), ScaleBucket::Large);
        assert_eq!(ScaleBucket::for_total(10_000), ScaleBucket::Large);
        assert_eq!(ScaleBucket::for_total(10_001), ScaleBucket::Massive);
    }

    #[test]
    fn test_reserved_top_counts() {
        assert_eq!(ScaleBucket::Small.table().reserved_top(), 1);
        assert_eq!(ScaleBucket::Medium.table().reserved_top(), 3);
        assert_eq!(ScaleBucket::Large.table().reserved_top(), 4);
        assert_eq!(ScaleBucket::Massive.table().reserved_top(), 6);
    }

    #[test]
    fn test_small_run_layout() {
        let alloc = build(Decimal::TEN, 100);

        // 95 base codes in blocks of 15; mid gets 4 -> (2, 1); 6 codes short
        assert_eq!(counts(alloc.base()), vec![45 + 6, 30, 15]);
        assert_eq!(counts(alloc.mid()), vec![2, 1]);
        assert_eq!(counts(alloc.top()), vec![1]);

        assert_eq!(
            amounts(alloc.base()),
            vec![Decimal::new(10, 2), Decimal::new(50, 2), Decimal::ONE]
        );
        assert_eq!(amounts(alloc.mid()), vec![Decimal::from(5), Decimal::TEN]);
        assert_eq!(amounts(alloc.top()), vec![Decimal::from(30)]);
        assert_eq!(alloc.grand_total(), 100);
    }

    #[test]
    fn test_massive_run_layout() {
        let alloc = build(Decimal::from(20), 50_000);

        // 49,000 base codes -> block 8,166 (4 dropped)
        assert_eq!(counts(alloc.base())[1..], [16_332, 8_166]);
        // 1,000 left, 6 reserved -> 994 mid
        assert_eq!(counts(alloc.mid()), vec![497, 331, 165]);
        assert_eq!(counts(alloc.top()), vec![1, 2, 3]);
        assert_eq!(
            amounts(alloc.top()),
            vec![Decimal::from(2_000), Decimal::from(1_000), Decimal::from(400)]
        );
        assert_eq!(alloc.grand_total(), 50_000);
    }

    #[test]
    fn test_single_code() {
        let alloc = build(Decimal::ONE, 1);
        assert_eq!(counts(alloc.base()), vec![0, 0, 0]);
        assert_eq!(counts(alloc.mid()), vec![0, 0]);
        assert_eq!(counts(alloc.top()), vec![1]);
        assert!(alloc.check_invariants().is_ok());
    }

    #[test]
    fn test_rejects_invalid_input() {
        assert_eq!(
            compute_initial_allocation(Decimal::ZERO, 100, DEFAULT_MAX_TOTAL_CODES),
            Err(EngineError::InvalidUnitPrice(Decimal::ZERO))
        );
        assert_eq!(
            compute_initial_allocation(Decimal::TEN, 0, DEFAULT_MAX_TOTAL_CODES),
            Err(EngineError::ZeroCodes)
        );
        assert_eq!(
            compute_initial_allocation(Decimal::TEN, 100_001, DEFAULT_MAX_TOTAL_CODES),
            Err(EngineError::TooManyCodes {
                requested: 100_001,
                max: 100_000,
            })
        );
    }

    #[test]
    fn test_huge_price_overflows_instead_of_panicking() {
        let price = Decimal::from_i128_with_scale(10_i128.pow(27), 0);

        // 50x top level: 5e28, fits
        assert!(compute_initial_allocation(price, 10_000, DEFAULT_MAX_TOTAL_CODES).is_ok());
        // 100x does not
        assert_eq!(
            compute_initial_allocation(price, 20_000, DEFAULT_MAX_TOTAL_CODES),
            Err(EngineError::Overflow)
        );
    }

    #[test]
    fn test_base_count_large_totals() {
        let table = ScaleBucket::Massive.table();
        let n = u64::MAX / 2;
        // n = 100q + r  ->  floor(0.98 n) = 98q + floor(98r / 100)
        assert_eq!(table.base_count(n), n / 100 * 98 + n % 100 * 98 / 100);
    }

    #[test]
    fn test_invariant_across_sizes() {
        for total in (1..=2_000).chain([9_999, 10_000, 10_001, 99_999, 100_000]) {
            let alloc = build(Decimal::new(1999, 2), total);
            assert_eq!(alloc.grand_total(), total, "sum broken at {}", total);

            let table = ScaleBucket::for_total(total).table();
            assert!(alloc.tier_total(TierKind::Base) >= table.base_count(total));
            assert_eq!(alloc.tier_total(TierKind::Top), table.reserved_top());
        }
    }
}
