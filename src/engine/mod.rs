//! Reward engine: allocation, rebalancing, scoring and summaries.
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: every operation takes an allocation by reference and
//!    returns a new one; nothing is mutated in place and nothing is cached
//! 2. **Exact totals**: the sum of all level counts always equals
//!    `total_codes`; integer rounding is absorbed deterministically
//! 3. **Decimal money**: rewards and prices are `rust_decimal::Decimal`
//! 4. **Synchronous**: each call is O(number of levels)
//!
//! ## Example
//!
//! ```
//! use qr_rewards::engine::RewardEngine;
//! use qr_rewards::types::TierKind;
//! use rust_decimal::Decimal;
//!
//! let engine = RewardEngine::default();
//!
//! let alloc = engine.compute_initial_allocation(Decimal::TEN, 100).unwrap();
//! let alloc = engine.rebalance(&alloc, TierKind::Mid, 0, 3).unwrap();
//! assert_eq!(alloc.grand_total(), 100);
//!
//! let card = engine.scores(&alloc);
//! assert!(card.hype.value <= Decimal::ONE_HUNDRED);
//! ```

pub mod distribution;
pub mod rebalance;
pub mod remainder;
pub mod scoring;
pub mod summary;

pub use distribution::{compute_initial_allocation, ScaleBucket};
pub use rebalance::{rebalance, rebalance_amount};
pub use remainder::{assign_remainder, RemainderSlot};
pub use scoring::{score_card, ScoreCard};
pub use summary::{project_summary, OrderSummary};

use rust_decimal::Decimal;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{Allocation, TierKind};

/// Facade binding the pure engine functions to one configuration.
#[derive(Debug, Clone, Default)]
pub struct RewardEngine {
    config: EngineConfig,
}

impl RewardEngine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Initial allocation for a product run.
    ///
    /// Enforces the configured `max_total_codes`.
    pub fn compute_initial_allocation(&self, unit_price: Decimal, total_codes: u64) -> Result<Allocation> {
        distribution::compute_initial_allocation(unit_price, total_codes, self.config.max_total_codes)
    }

    /// Set one level's count; see [`rebalance::rebalance`].
    pub fn rebalance(
        &self,
        alloc: &Allocation,
        tier: TierKind,
        index: usize,
        new_count: i64,
    ) -> Result<Allocation> {
        rebalance::rebalance(alloc, tier, index, new_count)
    }

    /// Set one level's reward amount; see [`rebalance::rebalance_amount`].
    pub fn rebalance_amount(
        &self,
        alloc: &Allocation,
        tier: TierKind,
        index: usize,
        new_amount: Decimal,
    ) -> Result<Allocation> {
        rebalance::rebalance_amount(alloc, tier, index, new_amount)
    }

    /// Trust, excitement and hype scores.
    pub fn scores(&self, alloc: &Allocation) -> ScoreCard {
        scoring::score_card(alloc)
    }

    /// Order summary using the configured margin factor.
    pub fn summary(&self, alloc: &Allocation) -> Result<OrderSummary> {
        summary::project_summary(alloc, self.config.margin_factor)
    }
}
