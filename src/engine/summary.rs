//! Order Summary Projector.
//!
//! Folds an allocation into the totals shown on the order page:
//!
//! - `total_cost = Σ amount * count`
//! - `average_per_code = total_cost / total_codes`
//! - `suggested_retail = unit_price + average_per_code`
//! - `suggested_retail_with_margin = unit_price + average_per_code * margin_factor`
//!
//! The margin factor defaults to 1.1 and comes from
//! [`crate::config::EngineConfig`].

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::{EngineError, Result};
use crate::types::currency::to_minor_unit;
use crate::types::{Allocation, TierKind};

/// Default multiplier applied to the per-code reward cost in the margin
/// variant of the suggested retail price.
pub fn default_margin_factor() -> Decimal {
    Decimal::new(11, 1)
}

/// Aggregate totals for one allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    /// Number of codes in the run.
    pub total_codes: u64,
    /// Retail price the allocation was built for.
    pub unit_price: Decimal,
    /// Reward cost of the base tier.
    pub base_cost: Decimal,
    /// Reward cost of the mid tier.
    pub mid_cost: Decimal,
    /// Reward cost of the top tier.
    pub top_cost: Decimal,
    /// Reward cost across all tiers.
    pub total_cost: Decimal,
    /// `total_cost / total_codes`.
    pub average_per_code: Decimal,
    /// `unit_price + average_per_code`.
    pub suggested_retail: Decimal,
    /// `unit_price + average_per_code * margin_factor`.
    pub suggested_retail_with_margin: Decimal,
}

impl OrderSummary {
    /// Total reward cost in sats at the given rate.
    pub fn total_cost_sats(&self, sats_per_usd: Decimal) -> Result<u64> {
        to_minor_unit(self.total_cost, sats_per_usd)
    }

    /// Reward cost of one tier.
    pub fn tier_cost(&self, kind: TierKind) -> Decimal {
        match kind {
            TierKind::Base => self.base_cost,
            TierKind::Mid => self.mid_cost,
            TierKind::Top => self.top_cost,
        }
    }
}

/// Project an allocation into its order summary.
///
/// # Errors
///
/// [`EngineError::Overflow`] if a cost or price does not fit a `Decimal`.
///
/// ```
/// use qr_rewards::engine::distribution::{compute_initial_allocation, DEFAULT_MAX_TOTAL_CODES};
/// use qr_rewards::engine::summary::{project_summary, default_margin_factor};
/// use rust_decimal::Decimal;
///
/// let alloc = compute_initial_allocation(Decimal::TEN, 100, DEFAULT_MAX_TOTAL_CODES).unwrap();
/// let summary = project_summary(&alloc, default_margin_factor()).unwrap();
/// assert!(summary.suggested_retail > alloc.unit_price());
/// ```
pub fn project_summary(alloc: &Allocation, margin_factor: Decimal) -> Result<OrderSummary> {
    let base_cost = alloc.base().total_cost().ok_or(EngineError::Overflow)?;
    let mid_cost = alloc.mid().total_cost().ok_or(EngineError::Overflow)?;
    let top_cost = alloc.top().total_cost().ok_or(EngineError::Overflow)?;
    let total_cost = base_cost
        .checked_add(mid_cost)
        .and_then(|v| v.checked_add(top_cost))
        .ok_or(EngineError::Overflow)?;

    let average_per_code = if alloc.total_codes() == 0 {
        Decimal::ZERO
    } else {
        total_cost / Decimal::from(alloc.total_codes())
    };

    let unit_price = alloc.unit_price();
    let suggested_retail = unit_price
        .checked_add(average_per_code)
        .ok_or(EngineError::Overflow)?;
    let suggested_retail_with_margin = average_per_code
        .checked_mul(margin_factor)
        .and_then(|v| unit_price.checked_add(v))
        .ok_or(EngineError::Overflow)?;

    Ok(OrderSummary {
        total_codes: alloc.total_codes(),
        unit_price,
        base_cost,
        mid_cost,
        top_cost,
        total_cost,
        average_per_code,
        suggested_retail,
        suggested_retail_with_margin,
    })
}

// ============================================================================
// Unit Tests
// ============================================================================
