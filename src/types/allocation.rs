//! The allocation: three tiers plus the context they were built for.
//!
//! ## Invariants
//!
//! Every `Allocation` handed out by the calculator or the rebalancer
//! satisfies:
//!
//! - the counts of all levels across all tiers sum to `total_codes`
//! - every `amount` is non-negative (counts are `u64`)
//! - each tier keeps its tag; levels never migrate between tiers
//!
//! Allocations are values. Edits produce a new allocation and leave the
//! input untouched; the caller keeps whichever one is current.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::types::{RewardLevel, Tier, TierKind};

/// A complete reward distribution for one product run.
///
/// ## Example
///
/// ```
/// use qr_rewards::types::{Allocation, RewardLevel, Tier, TierKind};
/// use rust_decimal::Decimal;
///
/// let alloc = Allocation::from_tiers(
///     Tier::new(TierKind::Base, vec![RewardLevel::new(Decimal::new(10, 2), 8)]),
///     Tier::new(TierKind::Mid, vec![RewardLevel::new(Decimal::from(5), 1)]),
///     Tier::new(TierKind::Top, vec![RewardLevel::new(Decimal::from(30), 1)]),
///     Decimal::from(10),
/// ).unwrap();
///
/// assert_eq!(alloc.total_codes(), 10);
/// assert!(alloc.check_invariants().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredAllocation")]
pub struct Allocation {
    base: Tier,
    mid: Tier,
    top: Tier,
    total_codes: u64,
    unit_price: Decimal,
}

/// Wire shape of an [`Allocation`]. Deserialized allocations are rebuilt
/// through [`Allocation::from_tiers`] so they carry the same invariants.
#[derive(Deserialize)]
struct StoredAllocation {
    base: Tier,
    mid: Tier,
    top: Tier,
    total_codes: u64,
    unit_price: Decimal,
}

impl TryFrom<StoredAllocation> for Allocation {
    type Error = EngineError;

    fn try_from(stored: StoredAllocation) -> Result<Self> {
        let alloc = Allocation::from_tiers(stored.base, stored.mid, stored.top, stored.unit_price)?;
        if alloc.total_codes != stored.total_codes {
            return Err(EngineError::TotalMismatch {
                declared: stored.total_codes,
                counted: alloc.total_codes,
            });
        }
        Ok(alloc)
    }
}

impl Allocation {
    /// Assemble an allocation from raw parts. Callers inside the crate
    /// guarantee the invariants.
    pub(crate) fn from_parts(
        base: Tier,
        mid: Tier,
        top: Tier,
        total_codes: u64,
        unit_price: Decimal,
    ) -> Self {
        Self {
            base,
            mid,
            top,
            total_codes,
            unit_price,
        }
    }

    /// Build an allocation from caller-supplied tiers.
    ///
    /// `total_codes` is derived from the sum of the level counts, so the sum
    /// invariant holds by construction.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidUnitPrice`] if `unit_price <= 0`
    /// - [`EngineError::TierMismatch`] if a tier carries the wrong tag
    /// - [`EngineError::NegativeAmount`] if any level amount is negative
    /// - [`EngineError::ZeroCodes`] if no level holds any code
    /// - [`EngineError::Overflow`] if the counts do not fit a `u64`
    pub fn from_tiers(base: Tier, mid: Tier, top: Tier, unit_price: Decimal) -> Result<Self> {
        if unit_price <= Decimal::ZERO {
            return Err(EngineError::InvalidUnitPrice(unit_price));
        }
        for (expected, tier) in [(TierKind::Base, &base), (TierKind::Mid, &mid), (TierKind::Top, &top)] {
            if tier.kind != expected {
                return Err(EngineError::TierMismatch {
                    expected,
                    actual: tier.kind,
                });
            }
            if let Some(bad) = tier.levels.iter().find(|l| l.amount < Decimal::ZERO) {
                return Err(EngineError::NegativeAmount(bad.amount));
            }
        }

        let total_codes = [&base, &mid, &top]
            .iter()
            .flat_map(|tier| tier.levels.iter())
            .try_fold(0u64, |acc, level| acc.checked_add(level.count))
            .ok_or(EngineError::Overflow)?;
        if total_codes == 0 {
            return Err(EngineError::ZeroCodes);
        }

        Ok(Self::from_parts(base, mid, top, total_codes, unit_price))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Total number of reward-bearing codes.
    #[inline]
    pub fn total_codes(&self) -> u64 {
        self.total_codes
    }

    /// Retail price of one product unit.
    #[inline]
    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }

    /// The tier with the given tag.
    pub fn tier(&self, kind: TierKind) -> &Tier {
        match kind {
            TierKind::Base => &self.base,
            TierKind::Mid => &self.mid,
            TierKind::Top => &self.top,
        }
    }

    pub(crate) fn tier_mut(&mut self, kind: TierKind) -> &mut Tier {
        match kind {
            TierKind::Base => &mut self.base,
            TierKind::Mid => &mut self.mid,
            TierKind::Top => &mut self.top,
        }
    }

    /// Base tier.
    pub fn base(&self) -> &Tier {
        &self.base
    }

    /// Mid tier.
    pub fn mid(&self) -> &Tier {
        &self.mid
    }

    /// Top tier.
    pub fn top(&self) -> &Tier {
        &self.top
    }

    /// A single level, or `LevelOutOfRange`.
    pub fn level(&self, kind: TierKind, index: usize) -> Result<&RewardLevel> {
        let tier = self.tier(kind);
        tier.levels.get(index).ok_or(EngineError::LevelOutOfRange {
            tier: kind,
            index,
            len: tier.len(),
        })
    }

    /// Sum of counts in one tier.
    pub fn tier_total(&self, kind: TierKind) -> u64 {
        self.tier(kind).total_count()
    }

    /// Sum of counts across all tiers. Equals `total_codes` for any
    /// allocation produced by this crate.
    pub fn grand_total(&self) -> u64 {
        TierKind::ALL.iter().map(|&k| self.tier_total(k)).sum()
    }

    /// All levels in Base → Mid → Top order, tagged with tier and index.
    pub fn iter_levels(&self) -> impl Iterator<Item = (TierKind, usize, &RewardLevel)> + '_ {
        TierKind::ALL.into_iter().flat_map(move |kind| {
            self.tier(kind)
                .levels
                .iter()
                .enumerate()
                .map(move |(i, level)| (kind, i, level))
        })
    }

    /// Verify the structural invariants.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self) -> std::result::Result<(), String> {
        for kind in TierKind::ALL {
            let tier = self.tier(kind);
            if tier.kind != kind {
                return Err(format!("{:?} slot holds a {:?} tier", kind, tier.kind));
            }
            if let Some((i, l)) = tier
                .levels
                .iter()
                .enumerate()
                .find(|(_, l)| l.amount < Decimal::ZERO)
            {
                return Err(format!("{:?}[{}] has negative amount {}", kind, i, l.amount));
            }
        }
        let sum = self.grand_total();
        if sum != self.total_codes {
            return Err(format!("counts sum to {}, expected {}", sum, self.total_codes));
        }
        Ok(())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
