use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::reject::RejectReason;
use crate::request::QuoteRequest;

/// The deterministic, signable output of the quoting pipeline.
///
/// Accepted intents carry a per-maker monotonic nonce and an absolute
/// expiry; rejected intents zero the amounts, set `nonce = -1` and name a
/// canonical reason. Either way the record is final for its idempotency key
/// until the cache entry expires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteIntent {
    pub maker: String,
    pub token_in: String,
    pub token_out: String,

    #[serde(with = "crate::amount")]
    pub amount_in: u128,

    #[serde(with = "crate::amount")]
    pub amount_out: u128,

    pub strategy_hash: String,

    /// Strictly increasing per maker across accepted intents; -1 on rejection.
    pub nonce: i64,

    /// Absolute Unix seconds; 0 on rejection.
    pub expiry: u64,

    /// `amount_out` minus the maker fee; what the taker gets at worst.
    #[serde(with = "crate::amount")]
    pub min_out_net: u128,

    pub ttl_sec: u64,

    pub idempotency_key: String,

    /// Realized maker spread applied to this quote.
    pub spread_bps: u32,

    pub price_used: Decimal,

    pub rationale: String,

    pub rejected: bool,

    #[serde(default)]
    pub reason: Option<RejectReason>,
}

impl QuoteIntent {
    /// Canonical rejected intent: zeroed amounts, no nonce, no expiry.
    pub fn rejected(
        request: &QuoteRequest,
        maker: &str,
        idempotency_key: String,
        reason: RejectReason,
        rationale: impl Into<String>,
    ) -> Self {
        Self {
            maker: maker.to_string(),
            token_in: request.token_in.clone(),
            token_out: request.token_out.clone(),
            amount_in: 0,
            amount_out: 0,
            strategy_hash: String::new(),
            nonce: -1,
            expiry: 0,
            min_out_net: 0,
            ttl_sec: 0,
            idempotency_key,
            spread_bps: 0,
            price_used: Decimal::ZERO,
            rationale: rationale.into(),
            rejected: true,
            reason: Some(reason),
        }
    }
}

/// Operator-facing account of how a quote decision was reached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explainability {
    pub description: String,
    pub rationale: String,

    /// `depth_curve`, `bid_ask`, `cached` or `none`.
    pub pricing_source: String,

    /// One `NAME: PASS|FAIL` line per gate predicate, in evaluation order.
    pub checks: Vec<String>,

    #[serde(default)]
    pub warnings: Vec<String>,
}
