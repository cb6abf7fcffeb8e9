//! Realized-spread selection.
//!
//! The maker does not quote at the raw market spread: the policy defines a
//! band `[min_spread_bps, max_spread_bps]` the realized spread is clamped
//! into, and uncertain pricing widens the result by 1.5x. Widening is a
//! warning condition, not a rejection — the quote still goes out, just at a
//! more defensive price. The widened value is deliberately not re-clamped.

/// Confidence below which the clamped spread is widened.
pub const LOW_CONFIDENCE: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpreadDecision {
    pub spread_bps: u32,

    /// True when low confidence widened the clamped spread.
    pub widened: bool,
}

/// Clamp the market spread into the policy band, widening 1.5x under low
/// pricing confidence.
pub fn select_spread(
    market_spread_bps: u32,
    min_bps: u32,
    max_bps: u32,
    confidence: f64,
) -> SpreadDecision {
    let clamped = market_spread_bps.clamp(min_bps, max_bps);

    if confidence < LOW_CONFIDENCE {
        SpreadDecision {
            spread_bps: clamped.saturating_mul(3) / 2,
            widened: true,
        }
    } else {
        SpreadDecision {
            spread_bps: clamped,
            widened: false,
        }
    }
}
