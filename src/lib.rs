//! # QR Rewards
//!
//! Reward tier allocation and rebalancing engine for bitcoin rewards printed
//! on physical products as QR codes.
//!
//! ## Architecture
//!
//! - **Types**: reward levels, tiers, the [`Allocation`] value and the
//!   fiat/sats converter
//! - **Engine**: Distribution Calculator, Rebalancer, Scoring Engine and
//!   Order Summary Projector
//! - **Feed**: the price-feed seam and last-known-price cache
//!
//! ## Design Principles
//!
//! 1. **Determinism**: identical inputs produce identical allocations
//! 2. **Exact totals**: level counts always sum to `total_codes`
//! 3. **Decimal money**: no floating point in reward math
//! 4. **Caller-owned state**: allocations are immutable values; the caller
//!    replaces the current one after every edit

// ============================================================================
// Module declarations
// ============================================================================

/// Core data types: RewardLevel, Tier, Allocation
pub mod types;

/// Allocation, rebalancing, scoring and summary
pub mod engine;

/// Price feed seam
pub mod feed;

/// TOML configuration
pub mod config;

/// Error types
pub mod error;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::EngineConfig;
pub use engine::{OrderSummary, RewardEngine, ScoreCard};
pub use error::{EngineError, FeedError, Result};
pub use types::{Allocation, RewardLevel, Tier, TierKind};
