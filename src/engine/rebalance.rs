//! Rebalancer: apply one user edit while keeping the total code count fixed.
//!
//! ## Count edits
//!
//! Setting level `i` of a tier to `n` changes it by `delta = n - old`. The
//! other levels of the same tier absorb `-delta` in proportion to their
//! share of the tier's non-edited total (evenly when that total is zero).
//! The last of them in iteration order takes whatever the integer shares
//! left over, so the tier subtotal is preserved exactly.
//!
//! ## Cross-tier correction
//!
//! Intra-tier absorption can fall short: counts floor at zero, and a
//! single-level tier has nobody to absorb anything. The grand-total
//! difference is then routed to a sink level:
//!
//! - edit in Mid or Top: the first Base level
//! - edit in Base: the last Base level, or the second-to-last when the edited
//!   level is itself the last
//!
//! A sink that bottoms out at zero passes the rest along the remaining levels
//! in Base → Mid → Top order, skipping the edited level. Because the edited
//! count is clamped to `[0, total_codes]`, the other levels always hold
//! enough codes to cover the difference.
//!
//! ## Amount edits
//!
//! [`rebalance_amount`] only rewrites one `amount`; counts are untouched.

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::engine::remainder::{assign_remainder, RemainderSlot};
use crate::error::Result;
use crate::types::{Allocation, RewardLevel, TierKind};

/// Set the count of one level and redistribute the difference.
///
/// `new_count` is clamped to `[0, total_codes]`. Calling this with the
/// level's current count returns an allocation equal to the input.
///
/// # Errors
///
/// [`crate::EngineError::LevelOutOfRange`] if `index` does not address a
/// level of `tier`.
///
/// # Example
///
/// ```
/// use qr_rewards::engine::distribution::{compute_initial_allocation, DEFAULT_MAX_TOTAL_CODES};
/// use qr_rewards::engine::rebalance::rebalance;
/// use qr_rewards::types::TierKind;
/// use rust_decimal::Decimal;
///
/// let alloc = compute_initial_allocation(Decimal::TEN, 100, DEFAULT_MAX_TOTAL_CODES).unwrap();
/// let edited = rebalance(&alloc, TierKind::Base, 0, 60).unwrap();
///
/// assert_eq!(edited.base().levels[0].count, 60);
/// assert_eq!(edited.grand_total(), 100);
/// assert_eq!(edited.mid(), alloc.mid());
/// ```
pub fn rebalance(
    alloc: &Allocation,
    tier: TierKind,
    index: usize,
    new_count: i64,
) -> Result<Allocation> {
    let old = alloc.level(tier, index)?.count;
    let total_codes = alloc.total_codes();

    let max = i64::try_from(total_codes).unwrap_or(i64::MAX);
    let clamped = new_count.clamp(0, max);
    if clamped != new_count {
        warn!(?tier, index, requested = new_count, clamped, "edit clamped to valid range");
    }
    let new = clamped as u64;

    if new == old {
        return Ok(alloc.clone());
    }

    let mut next = alloc.clone();
    absorb_within_tier(&mut next.tier_mut(tier).levels, index, new);

    let drift = next.grand_total() as i128 - total_codes as i128;
    if drift != 0 {
        correct_drift(&mut next, tier, index, -(drift as i64));
    }

    debug!(
        ?tier,
        index,
        old,
        new,
        drift = drift as i64,
        "rebalanced allocation"
    );

    Ok(next)
}

/// Replace the reward amount of one level. Counts are not touched.
///
/// Negative amounts are clamped to zero.
///
/// # Errors
///
/// [`crate::EngineError::LevelOutOfRange`] if `index` does not address a
/// level of `tier`.
pub fn rebalance_amount(
    alloc: &Allocation,
    tier: TierKind,
    index: usize,
    new_amount: Decimal,
) -> Result<Allocation> {
    alloc.level(tier, index)?;

    let amount = if new_amount < Decimal::ZERO {
        warn!(?tier, index, requested = %new_amount, "negative amount clamped to zero");
        Decimal::ZERO
    } else {
        new_amount
    };

    let mut next = alloc.clone();
    next.tier_mut(tier).levels[index].amount = amount;
    Ok(next)
}

/// Set `levels[index]` to `new` and spread the opposite delta over the
/// remaining levels of the slice, preserving the slice total whenever the
/// floors at zero allow it.
fn absorb_within_tier(levels: &mut [RewardLevel], index: usize, new: u64) {
    let subtotal: i128 = levels.iter().map(|l| l.count as i128).sum();
    let delta = new as i128 - levels[index].count as i128;
    levels[index].count = new;

    let others: Vec<usize> = (0..levels.len()).filter(|&j| j != index).collect();
    let Some((&last, head)) = others.split_last() else {
        return;
    };
    let others_total: i128 = others.iter().map(|&j| levels[j].count as i128).sum();

    let mut kept = new as i128;
    for &j in head {
        let current = levels[j].count as i128;
        let share = if others_total > 0 {
            delta * current / others_total
        } else {
            delta / others.len() as i128
        };
        let updated = (current - share).max(0);
        levels[j].count = updated as u64;
        kept += updated;
    }

    levels[last].count = (subtotal - kept).max(0) as u64;
}

/// Route a grand-total correction to the sink level, then along the
/// fallback chain until it is fully absorbed.
fn correct_drift(alloc: &mut Allocation, tier: TierKind, index: usize, correction: i64) {
    let base_len = alloc.base().len();
    let sink = match tier {
        TierKind::Mid | TierKind::Top => Some(0).filter(|_| base_len > 0),
        TierKind::Base => {
            let last = base_len.saturating_sub(1);
            if index == last {
                last.checked_sub(1)
            } else {
                Some(last)
            }
        }
    };

    let mut chain: Vec<(TierKind, usize)> = Vec::new();
    if let Some(s) = sink {
        chain.push((TierKind::Base, s));
    }
    for kind in TierKind::ALL {
        for i in 0..alloc.tier(kind).len() {
            let slot = (kind, i);
            if slot != (tier, index) && Some(slot) != sink.map(|s| (TierKind::Base, s)) {
                chain.push(slot);
            }
        }
    }
    // Last resort: only the edited level exists
    chain.push((tier, index));

    let mut residual = correction;
    for (kind, i) in chain {
        if residual == 0 {
            break;
        }
        residual = assign_remainder(&mut alloc.tier_mut(kind).levels, residual, RemainderSlot::At(i));
    }

    if residual != 0 {
        warn!(?tier, index, residual, "drift correction left a residual");
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::distribution::{compute_initial_allocation, DEFAULT_MAX_TOTAL_CODES};
    use crate::types::Tier;

    fn counts(alloc: &Allocation, kind: TierKind) -> Vec<u64> {
        alloc.tier(kind).levels.iter().map(|l| l.count).collect()
    }

    fn scenario() -> Allocation {
        compute_initial_allocation(Decimal::TEN, 100, DEFAULT_MAX_TOTAL_CODES).unwrap()
    }

    fn custom(base: &[u64], mid: &[u64], top: &[u64]) -> Allocation {
        let tier = |kind, cs: &[u64]| {
            Tier::new(
                kind,
                cs.iter().map(|&c| RewardLevel::new(Decimal::ONE, c)).collect(),
            )
        };
        Allocation::from_tiers(
            tier(TierKind::Base, base),
            tier(TierKind::Mid, mid),
            tier(TierKind::Top, top),
            Decimal::TEN,
        )
        .unwrap()
    }

    #[test]
    fn test_noop_edit_returns_equal_allocation() {
        let alloc = scenario();
        for kind in TierKind::ALL {
            for i in 0..alloc.tier(kind).len() {
                let current = alloc.level(kind, i).unwrap().count as i64;
                assert_eq!(rebalance(&alloc, kind, i, current).unwrap(), alloc);
            }
        }
    }

    #[test]
    fn test_increase_first_base_level() {
        let alloc = scenario(); // base (51, 30, 15)
        let edited = rebalance(&alloc, TierKind::Base, 0, 56).unwrap();

        // -5 split 30:15 -> 3 from the middle, the rest from the last
        assert_eq!(counts(&edited, TierKind::Base), vec![56, 27, 13]);
        assert_eq!(edited.mid(), alloc.mid());
        assert_eq!(edited.top(), alloc.top());
        assert_eq!(edited.grand_total(), 100);
    }

    #[test]
    fn test_decrease_spreads_proportionally() {
        let alloc = custom(&[40, 30, 10], &[10, 9], &[1]);
        let edited = rebalance(&alloc, TierKind::Base, 0, 20).unwrap();

        // +20 over 30:10 -> 15 and 5
        assert_eq!(counts(&edited, TierKind::Base), vec![20, 45, 15]);
        assert_eq!(edited.grand_total(), alloc.total_codes());
    }

    #[test]
    fn test_last_level_takes_rounding_remainder() {
        let alloc = custom(&[10, 7, 7, 7], &[0], &[1]);
        let edited = rebalance(&alloc, TierKind::Base, 0, 0).unwrap();

        // +10 over 7:7:7 -> 3, 3 and the last takes 4
        assert_eq!(counts(&edited, TierKind::Base), vec![0, 10, 10, 11]);
        assert_eq!(edited.tier_total(TierKind::Base), 31);
    }

    #[test]
    fn test_zero_others_split_evenly() {
        let alloc = custom(&[5], &[9, 0, 0], &[1]);
        let edited = rebalance(&alloc, TierKind::Mid, 0, 2).unwrap();

        assert_eq!(counts(&edited, TierKind::Mid), vec![2, 3, 4]);
        assert_eq!(counts(&edited, TierKind::Base), vec![5]);
    }

    #[test]
    fn test_single_level_tier_uses_base_sink() {
        let alloc = scenario(); // top (1)
        let up = rebalance(&alloc, TierKind::Top, 0, 5).unwrap();
        assert_eq!(counts(&up, TierKind::Top), vec![5]);
        assert_eq!(up.base().levels[0].count, alloc.base().levels[0].count - 4);
        assert_eq!(up.mid(), alloc.mid());
        assert_eq!(up.grand_total(), 100);

        let down = rebalance(&alloc, TierKind::Top, 0, 0).unwrap();
        assert_eq!(down.base().levels[0].count, alloc.base().levels[0].count + 1);
        assert_eq!(down.grand_total(), 100);
    }

    #[test]
    fn test_base_overflow_drains_other_tiers() {
        let alloc = custom(&[4, 2, 1], &[2, 1], &[1]);
        // Base holds 7; asking 9 for the first level exhausts the rest of base
        let edited = rebalance(&alloc, TierKind::Base, 0, 9).unwrap();

        assert_eq!(counts(&edited, TierKind::Base), vec![9, 0, 0]);
        assert_eq!(counts(&edited, TierKind::Mid), vec![0, 1]);
        assert_eq!(counts(&edited, TierKind::Top), vec![1]);
        assert_eq!(edited.grand_total(), 11);
    }

    #[test]
    fn test_base_sink_second_to_last_when_last_edited() {
        let alloc = custom(&[2, 2], &[3], &[1]);
        // Editing the last base level: its only sibling is also the sink
        let edited = rebalance(&alloc, TierKind::Base, 1, 6).unwrap();

        assert_eq!(counts(&edited, TierKind::Base), vec![0, 6]);
        assert_eq!(counts(&edited, TierKind::Mid), vec![1]);
        assert_eq!(edited.grand_total(), 8);
    }

    #[test]
    fn test_count_clamped() {
        let alloc = scenario();

        let low = rebalance(&alloc, TierKind::Mid, 0, -50).unwrap();
        assert_eq!(low.mid().levels[0].count, 0);
        assert_eq!(low.grand_total(), 100);

        let high = rebalance(&alloc, TierKind::Mid, 1, 1_000).unwrap();
        assert_eq!(high.mid().levels[1].count, 100);
        assert!(high.iter_levels().filter(|(k, i, _)| (*k, *i) != (TierKind::Mid, 1)).all(|(_, _, l)| l.count == 0));
    }

    #[test]
    fn test_out_of_range_index() {
        let alloc = scenario();
        assert!(rebalance(&alloc, TierKind::Top, 1, 3).is_err());
        assert!(rebalance_amount(&alloc, TierKind::Mid, 2, Decimal::ONE).is_err());
    }

    #[test]
    fn test_rebalance_is_pure() {
        let alloc = scenario();
        let a = rebalance(&alloc, TierKind::Mid, 1, 3).unwrap();
        let b = rebalance(&alloc, TierKind::Mid, 1, 3).unwrap();
        assert_eq!(a, b);
        // Input untouched
        assert_eq!(alloc, scenario());
    }

    #[test]
    fn test_rebalance_amount_only_touches_one_field() {
        let alloc = scenario();
        let edited = rebalance_amount(&alloc, TierKind::Top, 0, Decimal::from(45)).unwrap();

        assert_eq!(edited.top().levels[0].amount, Decimal::from(45));
        assert_eq!(edited.top().levels[0].count, alloc.top().levels[0].count);
        assert_eq!(edited.base(), alloc.base());
        assert_eq!(edited.mid(), alloc.mid());

        let clamped = rebalance_amount(&alloc, TierKind::Base, 1, Decimal::NEGATIVE_ONE).unwrap();
        assert_eq!(clamped.base().levels[1].amount, Decimal::ZERO);
    }
}
