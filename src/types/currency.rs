//! Fiat ↔ sats conversion and fixed-point helpers.
//!
//! ## Overview
//!
//! Reward amounts are priced in fiat (USD) but paid out in sats, the minor
//! unit of bitcoin. The conversion rate is supplied by the caller from a
//! live price feed; this module never fetches anything.
//!
//! ## Rounding
//!
//! [`to_minor_unit`] rounds half away from zero to a whole sat.
//! [`from_minor_unit`] divides back exactly. A round trip
//! `from_minor_unit(to_minor_unit(x))` is therefore **not** bit-exact: it is
//! guaranteed to land within one sat of `x`, and converting the result to sats
//! again yields the same sat count.
//!
//! ## Examples
//!
//! ```
//! use qr_rewards::types::currency::{sats_per_usd, to_minor_unit, from_minor_unit};
//! use rust_decimal::Decimal;
//!
//! // BTC at $50,000 => 2,000 sats per dollar
//! let rate = sats_per_usd(Decimal::from(50_000)).unwrap();
//! assert_eq!(rate, Decimal::from(2_000));
//!
//! let sats = to_minor_unit(Decimal::new(150, 2), rate).unwrap(); // $1.50
//! assert_eq!(sats, 3_000);
//! assert_eq!(from_minor_unit(sats, rate).unwrap(), Decimal::new(15, 1));
//! ```

use rust_decimal::prelude::*;
use rust_decimal::Decimal;

use crate::error::{EngineError, Result};

/// Sats in one bitcoin.
pub const SATS_PER_BTC: u64 = 100_000_000;

/// Scaling factor for fixed-point encoding: 10^8
///
/// Only used by the snapshot encoding; allocation math stays in `Decimal`.
pub const SCALE: u64 = 100_000_000;

// ============================================================================
// Fiat <-> sats
// ============================================================================

/// Sats per one unit of fiat, given the fiat price of one bitcoin.
///
/// # Errors
///
/// [`EngineError::InvalidRate`] if `usd_per_btc` is not positive.
pub fn sats_per_usd(usd_per_btc: Decimal) -> Result<Decimal> {
    if usd_per_btc <= Decimal::ZERO {
        return Err(EngineError::InvalidRate(usd_per_btc));
    }
    Decimal::from(SATS_PER_BTC)
        .checked_div(usd_per_btc)
        .ok_or(EngineError::Overflow)
}

/// Convert a fiat amount to whole sats: `round(amount * sats_per_unit)`.
///
/// # Errors
///
/// - [`EngineError::NegativeAmount`] if `amount < 0`
/// - [`EngineError::InvalidRate`] if `sats_per_unit <= 0`
/// - [`EngineError::Overflow`] if the result does not fit in `u64`
pub fn to_minor_unit(amount: Decimal, sats_per_unit: Decimal) -> Result<u64> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(EngineError::NegativeAmount(amount));
    }
    if sats_per_unit <= Decimal::ZERO {
        return Err(EngineError::InvalidRate(sats_per_unit));
    }

    amount
        .checked_mul(sats_per_unit)
        .ok_or(EngineError::Overflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u64()
        .ok_or(EngineError::Overflow)
}

/// Convert whole sats back to fiat: `sats / sats_per_unit`.
///
/// Inverse of [`to_minor_unit`] only up to rounding (see module docs).
///
/// # Errors
///
/// [`EngineError::InvalidRate`] if `sats_per_unit <= 0`.
pub fn from_minor_unit(sats: u64, sats_per_unit: Decimal) -> Result<Decimal> {
    if sats_per_unit <= Decimal::ZERO {
        return Err(EngineError::InvalidRate(sats_per_unit));
    }
    Decimal::from(sats)
        .checked_div(sats_per_unit)
        .ok_or(EngineError::Overflow)
}

// ============================================================================
// Fixed-point encoding
// ============================================================================

/// Convert a Decimal to fixed-point u64 (scaled by 10^8)
///
/// # Returns
///
/// * `Some(u64)` - The fixed-point representation
/// * `None` - If value is negative or out of range
pub fn decimal_to_fixed(d: Decimal) -> Option<u64> {
    if d.is_sign_negative() && !d.is_zero() {
        return None;
    }

    let scaled = d.checked_mul(Decimal::from(SCALE))?;
    let rounded = scaled.round_dp(0);
    rounded.to_u64()
}

/// Convert fixed-point u64 to a Decimal
pub fn fixed_to_decimal(value: u64) -> Decimal {
    Decimal::from(value) / Decimal::from(SCALE)
}

// ============================================================================
// Unit Tests
// ============================================================================
