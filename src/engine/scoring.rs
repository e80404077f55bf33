//! Scoring Engine: three 0–100 scores, one per tier.
//!
//! | Score      | Tier | Input                                   | Breakpoints          |
//! |------------|------|-----------------------------------------|----------------------|
//! | Trust      | Base | mean reward as % of price               | 2 / 4 / 7 / 10 (%)   |
//! | Excitement | Mid  | mean reward as % of price               | 30 / 60 / 90 / 150 (%) |
//! | Hype       | Top  | largest reward ÷ price                  | 5 / 20 / 50 / 300 (×) |
//!
//! Each curve is piecewise linear and non-decreasing in its input. Past the
//! last breakpoint the final band keeps rising until it reaches 100 (Trust at
//! 20%, Excitement at 300%, Hype at 1000×) and is capped there.
//!
//! Hype is damped by scarcity: the larger the top tier's share of all codes,
//! the closer the score is pulled to half its undamped value.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::types::{Allocation, Tier};

// ============================================================================
// Curves
// ============================================================================

/// `(input, score)` breakpoints.
type Curve = &'static [(i64, i64)];

const TRUST_CURVE: Curve = &[(0, 0), (2, 20), (4, 40), (7, 60), (10, 80), (20, 100)];

const EXCITEMENT_CURVE: Curve = &[(0, 0), (30, 20), (60, 40), (90, 60), (150, 80), (300, 100)];

const HYPE_CURVE: Curve = &[(0, 0), (5, 20), (20, 50), (50, 80), (300, 95), (1_000, 100)];

/// Linear interpolation over `curve`, clamped to its first and last points.
fn piecewise(x: Decimal, curve: Curve) -> Decimal {
    let points: Vec<(Decimal, Decimal)> = curve
        .iter()
        .map(|&(px, py)| (Decimal::from(px), Decimal::from(py)))
        .collect();

    let (first_x, first_y) = points[0];
    if x <= first_x {
        return first_y;
    }
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        if x <= x1 {
            return y0 + (x - x0) * (y1 - y0) / (x1 - x0);
        }
    }
    points[points.len() - 1].1
}

fn clamp_score(v: Decimal) -> Decimal {
    v.max(Decimal::ZERO).min(Decimal::ONE_HUNDRED)
}

/// Band index 0..=4 for a score; each band's upper edge is inclusive.
fn band(score: Decimal) -> usize {
    [20, 40, 60, 80]
        .iter()
        .position(|&edge| score <= Decimal::from(edge))
        .unwrap_or(4)
}

/// `value / unit_price`, saturating at `Decimal::MAX` for huge ratios.
fn ratio_to_price(value: Decimal, unit_price: Decimal) -> Decimal {
    if unit_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    value.checked_div(unit_price).unwrap_or(Decimal::MAX)
}

/// Mean reward of a tier as a percent of the unit price.
fn mean_reward_pct(tier: &Tier, unit_price: Decimal) -> Decimal {
    match tier.average_reward() {
        Some(avg) => ratio_to_price(avg, unit_price).saturating_mul(Decimal::ONE_HUNDRED),
        None => Decimal::ZERO,
    }
}

// ============================================================================
// Named levels
// ============================================================================

/// Base-tier trust band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TrustLevel {
    /// Score up to 20.
    BasicTrust,
    /// Above 20, up to 40.
    GrowingLoyalty,
    /// Above 40, up to 60.
    SolidRelationship,
    /// Above 60, up to 80.
    StrongLoyalty,
    /// Above 80.
    UltimateTrust,
}

impl TrustLevel {
    const BANDS: [TrustLevel; 5] = [
        TrustLevel::BasicTrust,
        TrustLevel::GrowingLoyalty,
        TrustLevel::SolidRelationship,
        TrustLevel::StrongLoyalty,
        TrustLevel::UltimateTrust,
    ];

    /// Band for a score in `[0, 100]`.
    pub fn from_score(score: Decimal) -> Self {
        Self::BANDS[band(score)]
    }

    /// Display name of the band.
    pub fn label(self) -> &'static str {
        match self {
            TrustLevel::BasicTrust => "Basic Trust",
            TrustLevel::GrowingLoyalty => "Growing Loyalty",
            TrustLevel::SolidRelationship => "Solid Relationship",
            TrustLevel::StrongLoyalty => "Strong Loyalty",
            TrustLevel::UltimateTrust => "Ultimate Trust",
        }
    }
}

/// Mid-tier excitement band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExcitementLevel {
    /// Score up to 20.
    InitialInterest,
    /// Above 20, up to 40.
    BuildingExcitement,
    /// Above 40, up to 60.
    BuzzingAnticipation,
    /// Above 60, up to 80.
    ElevatedThrill,
    /// Above 80.
    PeakThrill,
}

impl ExcitementLevel {
    const BANDS: [ExcitementLevel; 5] = [
        ExcitementLevel::InitialInterest,
        ExcitementLevel::BuildingExcitement,
        ExcitementLevel::BuzzingAnticipation,
        ExcitementLevel::ElevatedThrill,
        ExcitementLevel::PeakThrill,
    ];

    /// Band for a score in `[0, 100]`.
    pub fn from_score(score: Decimal) -> Self {
        Self::BANDS[band(score)]
    }

    /// Display name of the band.
    pub fn label(self) -> &'static str {
        match self {
            ExcitementLevel::InitialInterest => "Initial Interest",
            ExcitementLevel::BuildingExcitement => "Building Excitement",
            ExcitementLevel::BuzzingAnticipation => "Buzzing Anticipation",
            ExcitementLevel::ElevatedThrill => "Elevated Thrill",
            ExcitementLevel::PeakThrill => "Peak Thrill",
        }
    }
}

/// Top-tier hype band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum HypeLevel {
    /// Score up to 20.
    MinorBuzz,
    /// Above 20, up to 40.
    RisingHype,
    /// Above 40, up to 60.
    MajorHype,
    /// Above 60, up to 80.
    ViralHype,
    /// Above 80.
    LegendaryHype,
}

impl HypeLevel {
    const BANDS: [HypeLevel; 5] = [
        HypeLevel::MinorBuzz,
        HypeLevel::RisingHype,
        HypeLevel::MajorHype,
        HypeLevel::ViralHype,
        HypeLevel::LegendaryHype,
    ];

    /// Band for a score in `[0, 100]`.
    pub fn from_score(score: Decimal) -> Self {
        Self::BANDS[band(score)]
    }

    /// Display name of the band.
    pub fn label(self) -> &'static str {
        match self {
            HypeLevel::MinorBuzz => "Minor Buzz",
            HypeLevel::RisingHype => "Rising Hype",
            HypeLevel::MajorHype => "Major Hype",
            HypeLevel::ViralHype => "Viral Hype",
            HypeLevel::LegendaryHype => "Legendary Hype",
        }
    }
}

// ============================================================================
// Scores
// ============================================================================

/// A bounded score and its named band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Score<L> {
    /// Value in `[0, 100]`.
    pub value: Decimal,
    /// Named band the value falls in.
    pub level: L,
}

/// All three scores for one allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ScoreCard {
    /// Base-tier score.
    pub trust: Score<TrustLevel>,
    /// Mid-tier score.
    pub excitement: Score<ExcitementLevel>,
    /// Top-tier score, damped by scarcity.
    pub hype: Score<HypeLevel>,
}

/// Trust/loyalty score from the base tier.
pub fn trust_score(alloc: &Allocation) -> Score<TrustLevel> {
    let pct = mean_reward_pct(alloc.base(), alloc.unit_price());
    let value = clamp_score(piecewise(pct, TRUST_CURVE));
    Score {
        value,
        level: TrustLevel::from_score(value),
    }
}

/// Excitement score from the mid tier.
pub fn excitement_score(alloc: &Allocation) -> Score<ExcitementLevel> {
    let pct = mean_reward_pct(alloc.mid(), alloc.unit_price());
    let value = clamp_score(piecewise(pct, EXCITEMENT_CURVE));
    Score {
        value,
        level: ExcitementLevel::from_score(value),
    }
}

/// Undamped hype score for a top-reward-to-price ratio.
pub fn hype_base_score(ratio: Decimal) -> Decimal {
    clamp_score(piecewise(ratio, HYPE_CURVE))
}

/// Share of all codes held by the top tier, capped at 1.
pub fn scarcity(alloc: &Allocation) -> Decimal {
    if alloc.total_codes() == 0 {
        return Decimal::ZERO;
    }
    let share = Decimal::from(alloc.top().total_count()) / Decimal::from(alloc.total_codes());
    share.min(Decimal::ONE)
}

/// Hype score from the top tier, damped by scarcity.
///
/// `final = base * (1 - s) + base * 0.5 * s`
pub fn hype_score(alloc: &Allocation) -> Score<HypeLevel> {
    let ratio = match alloc.top().max_amount() {
        Some(max) => ratio_to_price(max, alloc.unit_price()),
        None => Decimal::ZERO,
    };
    let base = hype_base_score(ratio);
    let s = scarcity(alloc);
    let half = Decimal::new(5, 1);
    let value = clamp_score(base * (Decimal::ONE - s) + base * half * s);
    Score {
        value,
        level: HypeLevel::from_score(value),
    }
}

/// Compute all three scores.
pub fn score_card(alloc: &Allocation) -> ScoreCard {
    ScoreCard {
        trust: trust_score(alloc),
        excitement: excitement_score(alloc),
        hype: hype_score(alloc),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
