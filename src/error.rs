//! Error types for the reward engine.
//!
//! [`EngineError`] covers contract violations by the caller (invalid
//! construction input, edits addressing a level that does not exist) and
//! conversion failures. Out-of-range edit *counts* are not errors: the
//! rebalancer clamps them.
//!
//! [`FeedError`] belongs to the price-feed seam and never reaches the
//! allocation functions.

use rust_decimal::Decimal;

use crate::types::TierKind;

/// Errors returned by the allocation, conversion and snapshot functions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Unit price must be strictly positive.
    #[error("unit price must be positive, got {0}")]
    InvalidUnitPrice(Decimal),

    /// At least one code is required.
    #[error("total code count must be positive")]
    ZeroCodes,

    /// Requested code count exceeds the configured maximum.
    #[error("requested {requested} codes, maximum is {max}")]
    TooManyCodes {
        /// Codes requested.
        requested: u64,
        /// Configured ceiling.
        max: u64,
    },

    /// Not enough codes to fill the bucket's reserved top-tier slots.
    #[error("{total_codes} codes cannot cover {reserved} reserved slots")]
    BelowReservedMinimum {
        /// Codes requested.
        total_codes: u64,
        /// Slots reserved by the bucket.
        reserved: u64,
    },

    /// Edit addressed a level index the tier does not have.
    #[error("{tier:?} tier has {len} levels, index {index} is out of range")]
    LevelOutOfRange {
        /// Tier addressed.
        tier: TierKind,
        /// Index requested.
        index: usize,
        /// Number of levels in the tier.
        len: usize,
    },

    /// A tier was supplied under the wrong tag.
    #[error("expected {expected:?} tier, got {actual:?}")]
    TierMismatch {
        /// Slot the tier was supplied for.
        expected: TierKind,
        /// Tag the tier carried.
        actual: TierKind,
    },

    /// Conversion rate must be strictly positive.
    #[error("conversion rate must be positive, got {0}")]
    InvalidRate(Decimal),

    /// Monetary amount must not be negative.
    #[error("amount must not be negative, got {0}")]
    NegativeAmount(Decimal),

    /// Arithmetic overflow.
    #[error("arithmetic overflow")]
    Overflow,

    /// A stored allocation declares a total its level counts do not add up to.
    #[error("declared total_codes {declared} but levels hold {counted}")]
    TotalMismatch {
        /// `total_codes` as stored.
        declared: u64,
        /// Sum of the level counts.
        counted: u64,
    },

    /// SSZ encoding failed.
    #[error("snapshot encoding failed: {0}")]
    Snapshot(String),

    /// Configuration could not be read or is inconsistent.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Price-feed failures. Handled by [`crate::feed::LastKnownPrice`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedError {
    /// The upstream source could not be reached or returned garbage.
    #[error("price feed unavailable: {0}")]
    Unavailable(String),

    /// The upstream source returned zero or a negative price.
    #[error("price feed returned non-positive price {0}")]
    NonPositivePrice(Decimal),
}

/// Convenience result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
