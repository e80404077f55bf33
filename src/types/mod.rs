//! Core data types for the reward engine
//!
//! ## Types
//!
//! - [`RewardLevel`]: one `(amount, count)` pair
//! - [`TierKind`]: Base, Mid or Top
//! - [`Tier`]: ordered levels tagged with a [`TierKind`]
//! - [`Allocation`]: all three tiers plus `total_codes` and `unit_price`
//!
//! ## Money
//!
//! Fiat amounts are `rust_decimal::Decimal`. Conversion to sats lives in
//! [`currency`]; fixed-point u64 is only used by the [`snapshot`] encoding.

mod allocation;
mod tier;
pub mod currency;
pub mod snapshot;

// Re-export all types at module level
pub use allocation::Allocation;
pub use snapshot::{AllocationHeader, LevelRecord};
pub use tier::{RewardLevel, Tier, TierKind};
