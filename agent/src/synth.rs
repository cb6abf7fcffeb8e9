//! Intent synthesizer.
//!
//! Turns a validated request plus pricing into a fully-specified draft
//! intent: side-aware amounts with the realized spread applied, TTL and
//! absolute expiry, fee-adjusted `min_out_net`, the target strategy hash
//! and a human-readable rationale. The nonce is left unassigned — the store
//! allocates it at commit time, after the feasibility gate, so rejected
//! quotes never consume one.
//!
//! Amount arithmetic stays in `u128`; `f64` appears only for price ratios
//! (curve interpolation, bid/ask conversion) and is quantized straight back
//! to base units. Rounding always favors the maker: outputs floor, inputs
//! round up.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sha2::{Digest, Sha256};

use domain::{
    ChainSnapshot, MakerPolicy, Pair, PricingSnapshot, QuoteIntent, QuoteRequest, RejectReason,
    Side,
};
use pricing::curve::{self, CurveError};
use pricing::spread::SpreadDecision;

use crate::types::Rejection;

pub const BPS_SCALE: u128 = 10_000;

#[derive(Debug)]
pub enum SynthError {
    /// Business outcome: the request cannot be priced (rejected intent).
    Reject(Rejection),

    /// Provider contract violation (non-monotone curve): transport error.
    Curve(CurveError),
}

/// A draft intent plus how it was priced.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub draft: QuoteIntent,
    pub pricing_source: &'static str,
    pub warnings: Vec<String>,
}

/// Output leg after spread: the taker receives less.
fn apply_spread_down(gross: u128, spread_bps: u32) -> u128 {
    gross.saturating_mul(BPS_SCALE.saturating_sub(spread_bps as u128)) / BPS_SCALE
}

/// Input leg after spread: the taker pays more, rounded up.
fn apply_spread_up(gross: u128, spread_bps: u32) -> u128 {
    gross
        .saturating_mul(BPS_SCALE + spread_bps as u128)
        .div_ceil(BPS_SCALE)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Strategy id for the pair: the maker's mapping (symmetric), else a
/// deterministic default derived from the canonical pair key, so both trade
/// directions land on the same strategy.
fn select_strategy_id(policy: &MakerPolicy, token_in: &str, token_out: &str) -> String {
    if let Some(id) = policy.strategy_for(token_in, token_out) {
        return id.to_string();
    }

    let canonical = Pair::new(token_in, token_out).canonical_key();
    let digest = Sha256::digest(format!("default_strategy:{canonical}").as_bytes());
    let mut id = hex(&digest);
    id.truncate(16);
    id
}

/// Stable digest of the strategy descriptor. The exact scheme is a contract
/// with the downstream signer; what matters here is that the same id always
/// produces the same hash.
pub fn strategy_hash(strategy_id: &str) -> String {
    format!("0x{}", hex(&Sha256::digest(strategy_id.as_bytes())))
}

fn require_positive(price: Option<Decimal>, leg: &str) -> Result<f64, SynthError> {
    match price.and_then(|p| p.to_f64()) {
        Some(p) if p > 0.0 => Ok(p),
        _ => Err(SynthError::Reject(Rejection::new(
            RejectReason::StalePricing,
            format!("no depth curve and no usable {leg} quote"),
        ))),
    }
}

fn map_curve(err: CurveError) -> SynthError {
    match err {
        CurveError::Empty => SynthError::Reject(Rejection::new(
            RejectReason::StalePricing,
            "pricing snapshot carries an empty depth curve",
        )),
        err @ CurveError::NonMonotonic { .. } => SynthError::Curve(err),
    }
}

pub fn synthesize(
    request: &QuoteRequest,
    policy: &MakerPolicy,
    pricing: &PricingSnapshot,
    chain: &ChainSnapshot,
    spread: SpreadDecision,
    idempotency_key: String,
    now_unix: u64,
) -> Result<Synthesis, SynthError> {
    let mut warnings = Vec::new();

    let saturation_warning =
        "requested size exceeds curve depth; quote saturated at the last depth sample";

    let (amount_in, amount_out, impact_bps, pricing_source) = match request.side {
        Side::Sell => {
            let amount_in = request.amount;

            if !pricing.depth.is_empty() {
                let eval = curve::evaluate(&pricing.depth, amount_in).map_err(map_curve)?;
                if eval.saturated {
                    warnings.push(saturation_warning.to_string());
                }
                (
                    amount_in,
                    apply_spread_down(eval.amount_out, spread.spread_bps),
                    Some(eval.impact_bps),
                    "depth_curve",
                )
            } else {
                let bid = require_positive(pricing.bid, "bid")?;
                let gross = (amount_in as f64 / bid).max(0.0) as u128;
                (
                    amount_in,
                    apply_spread_down(gross, spread.spread_bps),
                    None,
                    "bid_ask",
                )
            }
        }
        Side::Buy => {
            let amount_out = request.amount;

            if !pricing.depth.is_empty() {
                let inv =
                    curve::evaluate_for_output(&pricing.depth, amount_out).map_err(map_curve)?;
                if inv.saturated {
                    warnings.push(saturation_warning.to_string());
                }
                (
                    apply_spread_up(inv.amount_in, spread.spread_bps),
                    amount_out,
                    Some(inv.impact_bps),
                    "depth_curve",
                )
            } else {
                let ask = require_positive(pricing.ask, "ask")?;
                let gross = (amount_out as f64 * ask).ceil().max(0.0) as u128;
                (
                    apply_spread_up(gross, spread.spread_bps),
                    amount_out,
                    None,
                    "bid_ask",
                )
            }
        }
    };

    if spread.widened {
        warnings.push(format!(
            "pricing confidence {:.2} is low; spread widened to {}bps",
            pricing.confidence, spread.spread_bps
        ));
    }

    let ttl_sec = policy.default_ttl_sec;
    let expiry = now_unix + ttl_sec;

    let min_out_net =
        amount_out.saturating_mul(BPS_SCALE.saturating_sub(policy.fee_bps as u128)) / BPS_SCALE;

    let strategy_id = select_strategy_id(policy, &request.token_in, &request.token_out);

    let impact_note = match impact_bps {
        Some(impact) => format!(", curve impact {impact:.1}bps"),
        None => String::new(),
    };

    let rationale = format!(
        "{} {}/{} at {}bps spread: mid {}{}, {} {} in, {} {} out, budget headroom {} {}, ttl {}s",
        request.side,
        request.token_in,
        request.token_out,
        spread.spread_bps,
        pricing.mid_price,
        impact_note,
        amount_in,
        request.token_in,
        amount_out,
        request.token_out,
        chain.token_out_budget.saturating_sub(amount_out),
        request.token_out,
        ttl_sec,
    );

    let draft = QuoteIntent {
        maker: policy.maker.clone(),
        token_in: request.token_in.clone(),
        token_out: request.token_out.clone(),
        amount_in,
        amount_out,
        strategy_hash: strategy_hash(&strategy_id),
        nonce: -1, // assigned by the store at commit
        expiry,
        min_out_net,
        ttl_sec,
        idempotency_key,
        spread_bps: spread.spread_bps,
        price_used: pricing.mid_price,
        rationale,
        rejected: false,
        reason: None,
    };

    Ok(Synthesis {
        draft,
        pricing_source,
        warnings,
    })
}
