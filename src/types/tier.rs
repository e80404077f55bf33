//! Reward levels and tiers.
//!
//! A [`Tier`] is an ordered list of [`RewardLevel`]s tagged with a
//! [`TierKind`]. Order inside a tier only matters for deterministic
//! remainder assignment: the rebalancer hands rounding leftovers to the last
//! level in iteration order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================================================
// TierKind enum
// ============================================================================

/// The three reward classes.
///
/// Represented as u8 for snapshot encoding:
/// - Base = 0
/// - Mid = 1
/// - Top = 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TierKind {
    /// Frequent, small rewards.
    Base,
    /// Occasional, medium rewards.
    Mid,
    /// Rare, large rewards.
    Top,
}

impl TierKind {
    /// All tiers in canonical iteration order.
    pub const ALL: [TierKind; 3] = [TierKind::Base, TierKind::Mid, TierKind::Top];

    /// Convert to u8 for serialization
    pub fn to_u8(self) -> u8 {
        match self {
            TierKind::Base => 0,
            TierKind::Mid => 1,
            TierKind::Top => 2,
        }
    }

    /// Convert from u8 for deserialization
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(TierKind::Base),
            1 => Some(TierKind::Mid),
            2 => Some(TierKind::Top),
            _ => None,
        }
    }
}

// ============================================================================
// RewardLevel
// ============================================================================

/// One discrete reward value within a tier and how many codes carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardLevel {
    /// Fiat reward paid per code at this level (always >= 0).
    pub amount: Decimal,

    /// Number of codes carrying this reward.
    pub count: u64,
}

impl RewardLevel {
    /// Create a new reward level
    pub fn new(amount: Decimal, count: u64) -> Self {
        Self { amount, count }
    }

    /// Total fiat paid out by this level (`amount * count`).
    ///
    /// Returns `None` if the product does not fit a `Decimal`.
    pub fn cost(&self) -> Option<Decimal> {
        self.amount.checked_mul(Decimal::from(self.count))
    }
}

// ============================================================================
// Tier
// ============================================================================

/// An ordered sequence of reward levels belonging to one [`TierKind`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tier {
    /// Which reward class these levels belong to.
    pub kind: TierKind,

    /// Levels in remainder-assignment order.
    pub levels: Vec<RewardLevel>,
}

impl Tier {
    /// Create a tier from its levels
    pub fn new(kind: TierKind, levels: Vec<RewardLevel>) -> Self {
        Self { kind, levels }
    }

    /// Sum of counts across the tier's levels.
    pub fn total_count(&self) -> u64 {
        self.levels.iter().map(|l| l.count).sum()
    }

    /// Sum of `amount * count` across the tier's levels, or `None` on overflow.
    pub fn total_cost(&self) -> Option<Decimal> {
        self.levels
            .iter()
            .try_fold(Decimal::ZERO, |acc, level| acc.checked_add(level.cost()?))
    }

    /// Count-weighted mean reward. `None` when the tier holds no codes.
    ///
    /// When the tier's total cost overflows, the mean is taken over each
    /// level's share of the count instead; it never exceeds the largest amount.
    pub fn average_reward(&self) -> Option<Decimal> {
        let count = self.total_count();
        if count == 0 {
            return None;
        }
        let count = Decimal::from(count);
        match self.total_cost() {
            Some(total) => Some(total / count),
            None => Some(self.levels.iter().fold(Decimal::ZERO, |acc, level| {
                acc.saturating_add(level.amount.saturating_mul(Decimal::from(level.count) / count))
            })),
        }
    }

    /// Largest reward amount in the tier, regardless of count.
    pub fn max_amount(&self) -> Option<Decimal> {
        self.levels.iter().map(|l| l.amount).max()
    }

    /// Number of levels in the tier.
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Check if the tier has no levels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
