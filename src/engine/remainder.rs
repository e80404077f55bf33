//! Remainder assignment shared by the calculator and the rebalancer.
//!
//! Integer division drops codes. Both the initial distribution and every
//! rebalance push the dropped amount onto one designated level so that the
//! totals come out exact. Counts never go below zero: when a negative
//! remainder is larger than the target level's count, the level is floored at
//! zero and the part it could not absorb is returned to the caller.

use crate::types::RewardLevel;

/// Which level in a slice receives the remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemainderSlot {
    /// The first level.
    First,
    /// The last level in iteration order.
    Last,
    /// A specific index.
    At(usize),
}

impl RemainderSlot {
    fn resolve(self, len: usize) -> Option<usize> {
        match self {
            RemainderSlot::First if len > 0 => Some(0),
            RemainderSlot::Last => len.checked_sub(1),
            RemainderSlot::At(i) if i < len => Some(i),
            _ => None,
        }
    }
}

/// Add `remainder` (which may be negative) to the level selected by `slot`.
///
/// Returns the portion that could not be absorbed: `0` on full success, a
/// negative value when the level bottomed out at zero, or `remainder`
/// untouched when `slot` does not address a level.
///
/// ```
/// use qr_rewards::engine::remainder::{assign_remainder, RemainderSlot};
/// use qr_rewards::types::RewardLevel;
/// use rust_decimal::Decimal;
///
/// let mut levels = vec![RewardLevel::new(Decimal::ONE, 4), RewardLevel::new(Decimal::TEN, 2)];
/// assert_eq!(assign_remainder(&mut levels, 3, RemainderSlot::Last), 0);
/// assert_eq!(levels[1].count, 5);
///
/// // Only 5 can come out of the last level; 2 are handed back
/// assert_eq!(assign_remainder(&mut levels, -7, RemainderSlot::Last), -2);
/// assert_eq!(levels[1].count, 0);
/// ```
pub fn assign_remainder(levels: &mut [RewardLevel], remainder: i64, slot: RemainderSlot) -> i64 {
    if remainder == 0 {
        return 0;
    }
    let Some(index) = slot.resolve(levels.len()) else {
        return remainder;
    };

    let level = &mut levels[index];
    let target = level.count as i128 + remainder as i128;
    if target < 0 {
        level.count = 0;
        target as i64
    } else {
        level.count = u64::try_from(target).unwrap_or(u64::MAX);
        0
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
