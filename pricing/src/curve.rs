//! Depth-curve evaluator.
//!
//! The price engine publishes liquidity as an ordered sequence of
//! *cumulative* samples: the n-th point states "selling up to
//! `amount_in_raw_n` yields up to `amount_out_raw_n` in aggregate, at
//! `impact_bps_n` realized impact vs mid". Between samples the curve is
//! treated as linear; beyond the last sample it saturates.
//!
//! ## Determinism
//! Evaluation is pure: same curve + same size → same output. Ratio math runs
//! in `f64`, but results are quantized back to integer base units and a
//! request landing exactly on a sample returns that sample's output verbatim
//! through an integer-only path.
//!
//! ## Failure semantics
//! - An empty curve means the provider had nothing usable; callers map this
//!   to a stale-pricing rejection.
//! - A non-monotone curve violates the provider contract and is reported as
//!   an error, never as a quote outcome.

use domain::DepthPoint;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CurveError {
    #[error("depth curve is empty")]
    Empty,

    #[error("depth curve is not strictly increasing at point {index}")]
    NonMonotonic { index: usize },
}

/// Result of evaluating the curve for one input size.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveEval {
    /// Aggregate output for the requested input, base units.
    pub amount_out: u128,

    /// Interpolated realized impact vs mid, basis points.
    pub impact_bps: f64,

    /// Raw execution price `amount_out / amount_in` (diagnostics only; token
    /// decimals are not part of the snapshot contract).
    pub realized_price: f64,

    /// True when the request exceeded the last sample and the curve clamped.
    pub saturated: bool,
}

/// Result of the inverse walk: the input required for a desired output.
#[derive(Debug, Clone, PartialEq)]
pub struct CurveInverse {
    pub amount_in: u128,
    pub impact_bps: f64,
    pub saturated: bool,
}

fn validate(curve: &[DepthPoint]) -> Result<(), CurveError> {
    if curve.is_empty() {
        return Err(CurveError::Empty);
    }

    for (i, pair) in curve.windows(2).enumerate() {
        if pair[1].amount_in_raw <= pair[0].amount_in_raw {
            return Err(CurveError::NonMonotonic { index: i + 1 });
        }
    }

    Ok(())
}

/// Evaluate the achievable output and realized impact for `sell_amount`.
///
/// Walks to the first sample with `amount_in_raw >= sell_amount` and
/// interpolates against the previous sample (or the origin when none).
/// Requests beyond the last sample return that sample unchanged, with
/// `saturated` set.
pub fn evaluate(curve: &[DepthPoint], sell_amount: u128) -> Result<CurveEval, CurveError> {
    validate(curve)?;

    let found = curve.iter().position(|p| p.amount_in_raw >= sell_amount);

    let (amount_out, impact_bps, saturated) = match found {
        Some(idx) => {
            let point = &curve[idx];

            if point.amount_in_raw == sell_amount {
                // Exactly on a sample: integer path, no float round-trip.
                (point.amount_out_raw, point.impact_bps, false)
            } else {
                let (prev_in, prev_out, prev_impact) = if idx == 0 {
                    (0u128, 0u128, 0.0f64)
                } else {
                    let p = &curve[idx - 1];
                    (p.amount_in_raw, p.amount_out_raw, p.impact_bps)
                };

                if point.amount_in_raw == prev_in {
                    // Degenerate segment; take the found sample as-is.
                    (point.amount_out_raw, point.impact_bps, false)
                } else {
                    let t = (sell_amount - prev_in) as f64
                        / (point.amount_in_raw - prev_in) as f64;

                    let out = prev_out as f64
                        + t * (point.amount_out_raw as f64 - prev_out as f64);
                    let impact = prev_impact + t * (point.impact_bps - prev_impact);

                    (out.max(0.0) as u128, impact, false)
                }
            }
        }
        None => {
            // Saturation: the curve cannot absorb more than its last sample.
            let last = curve.last().expect("validated non-empty");
            (last.amount_out_raw, last.impact_bps, true)
        }
    };

    let realized_price = if sell_amount > 0 {
        amount_out as f64 / sell_amount as f64
    } else {
        0.0
    };

    Ok(CurveEval {
        amount_out,
        impact_bps,
        realized_price,
        saturated,
    })
}

/// Inverse walk: the input size needed to obtain `buy_amount` of output.
///
/// Mirrors `evaluate` over the output axis; the required input is rounded
/// *up* so the quoted input never undershoots the curve. Beyond the last
/// sample the curve saturates at the last sample's input.
pub fn evaluate_for_output(
    curve: &[DepthPoint],
    buy_amount: u128,
) -> Result<CurveInverse, CurveError> {
    validate(curve)?;

    let found = curve.iter().position(|p| p.amount_out_raw >= buy_amount);

    let (amount_in, impact_bps, saturated) = match found {
        Some(idx) => {
            let point = &curve[idx];

            if point.amount_out_raw == buy_amount {
                (point.amount_in_raw, point.impact_bps, false)
            } else {
                let (prev_in, prev_out, prev_impact) = if idx == 0 {
                    (0u128, 0u128, 0.0f64)
                } else {
                    let p = &curve[idx - 1];
                    (p.amount_in_raw, p.amount_out_raw, p.impact_bps)
                };

                if point.amount_out_raw == prev_out {
                    (point.amount_in_raw, point.impact_bps, false)
                } else {
                    let t = (buy_amount - prev_out) as f64
                        / (point.amount_out_raw - prev_out) as f64;

                    let input = prev_in as f64
                        + t * (point.amount_in_raw as f64 - prev_in as f64);
                    let impact = prev_impact + t * (point.impact_bps - prev_impact);

                    (input.max(0.0).ceil() as u128, impact, false)
                }
            }
        }
        None => {
            let last = curve.last().expect("validated non-empty");
            (last.amount_in_raw, last.impact_bps, true)
        }
    };

    Ok(CurveInverse {
        amount_in,
        impact_bps,
        saturated,
    })
}
