//! End-to-end pipeline scenarios over a fresh in-memory store.

use std::collections::HashMap;
use std::sync::Arc;

use agent::{AgentConfig, QuotePipeline, RequestBundle};
use domain::{
    ChainSnapshot, DepthPoint, MakerPolicy, Pair, PricingSnapshot, QuoteRequest, RejectReason,
    Side,
};
use state::StateStore;

const NOW: u64 = 1_700_000_000;
const DAY: u64 = 86_400;

fn request(side: Side, amount: u128) -> QuoteRequest {
    QuoteRequest {
        chain_id: 1,
        side,
        token_in: "USDC".into(),
        token_out: "WETH".into(),
        amount,
        taker: "0xtaker".into(),
        recipient: None,
        idempotency_key: None,
    }
}

fn policy() -> MakerPolicy {
    MakerPolicy {
        maker: "0xmaker".into(),
        allowed_pairs: vec![Pair::new("WETH", "USDC")],
        max_trade_size: Some(10_000_000),
        daily_caps: HashMap::new(),
        paused: false,
        min_spread_bps: 10,
        max_spread_bps: 50,
        default_ttl_sec: 60,
        fee_bps: 10,
        min_confidence: 0.0,
        strategies: HashMap::new(),
    }
}

fn pricing() -> PricingSnapshot {
    PricingSnapshot {
        mid_price: "0.00053".parse().unwrap(),
        bid: None,
        ask: None,
        spread_bps: 8,
        depth: vec![
            DepthPoint {
                amount_in_raw: 1_000_000,
                amount_out_raw: 530_000_000_000_000_000,
                impact_bps: 12.0,
            },
            DepthPoint {
                amount_in_raw: 5_000_000,
                amount_out_raw: 2_600_000_000_000_000_000,
                impact_bps: 42.0,
            },
        ],
        as_of_ms: (NOW - 1) * 1_000,
        stale: false,
        confidence: 0.97,
        sources: vec!["price-engine".into()],
    }
}

fn chain() -> ChainSnapshot {
    ChainSnapshot {
        chain_id: 1,
        strategy_id: "strat-1".into(),
        active: true,
        docked: false,
        token_out_budget: 1_000_000_000_000_000_000,
        allowance: 1_000_000_000_000_000_000,
        last_updated_ms: (NOW - 1) * 1_000,
    }
}

fn bundle(side: Side, amount: u128) -> RequestBundle {
    RequestBundle {
        request: request(side, amount),
        policy: policy(),
        pricing: pricing(),
        chain: chain(),
    }
}

fn pipeline() -> (QuotePipeline, Arc<StateStore>) {
    let store = Arc::new(StateStore::new());
    (
        QuotePipeline::new(AgentConfig::default(), store.clone()),
        store,
    )
}

#[test]
fn happy_sell_issues_a_deterministic_intent() {
    let (pipeline, _store) = pipeline();

    let outcome = pipeline.quote(&bundle(Side::Sell, 1_000_000), NOW).unwrap();
    let intent = outcome.intent;

    assert!(!intent.rejected);
    assert_eq!(intent.amount_in, 1_000_000);
    // 530e15 from the curve, minus the 10bps realized spread.
    assert_eq!(intent.amount_out, 529_470_000_000_000_000);
    assert_eq!(intent.nonce, 0);
    assert_eq!(intent.expiry, NOW + 60);
    assert_eq!(intent.ttl_sec, 60);
    assert_eq!(intent.spread_bps, 10);
    assert!(intent.min_out_net <= intent.amount_out);
    assert!(intent.rationale.contains("10bps"));

    assert_eq!(outcome.explain.pricing_source, "depth_curve");
    assert!(
        outcome
            .explain
            .checks
            .iter()
            .all(|line| line.ends_with("PASSED"))
    );
}

#[test]
fn happy_buy_is_cached_byte_identically() {
    let (pipeline, store) = pipeline();

    // 0.05 WETH requested as exact output; the size limit is denominated in
    // the requested token, so it scales with the WETH leg here.
    let mut b = bundle(Side::Buy, 50_000_000_000_000_000);
    b.policy.max_trade_size = Some(100_000_000_000_000_000);
    b.request.idempotency_key = Some("k1".into());

    let first = pipeline.quote(&b, NOW).unwrap();
    assert!(!first.intent.rejected);
    assert_eq!(first.intent.nonce, 0);
    assert_eq!(first.intent.amount_out, 50_000_000_000_000_000);
    let first_amount_in = first.intent.amount_in;
    assert!(first_amount_in > 0);

    // Same key before expiry: the stored intent comes back verbatim.
    let second = pipeline.quote(&b, NOW + 30).unwrap();
    assert_eq!(
        serde_json::to_vec(&second.intent).unwrap(),
        serde_json::to_vec(&first.intent).unwrap()
    );
    assert_eq!(second.intent.amount_in, first_amount_in);
    assert_eq!(second.intent.nonce, 0);
    assert_eq!(second.explain.pricing_source, "cached");
    assert_eq!(second.explain.checks, vec!["IDEMPOTENCY_HIT"]);

    // Only one nonce was ever allocated.
    assert_eq!(store.current_nonce("0xmaker"), 1);
}

#[test]
fn expired_cache_entry_yields_a_fresh_quote() {
    let (pipeline, _store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.request.idempotency_key = Some("k1".into());

    let first = pipeline.quote(&b, NOW).unwrap();
    assert_eq!(first.intent.nonce, 0);

    // Past expiry the entry is dropped and a new nonce is allocated.
    let later = pipeline.quote(&b, NOW + 61).unwrap();
    assert_eq!(later.intent.nonce, 1);
    assert_eq!(later.explain.pricing_source, "depth_curve");
}

#[test]
fn paused_maker_rejects_without_side_effects() {
    let (pipeline, store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.policy.paused = true;

    let outcome = pipeline.quote(&b, NOW).unwrap();
    let intent = outcome.intent;

    assert!(intent.rejected);
    assert_eq!(intent.reason, Some(RejectReason::MakerPaused));
    assert_eq!(intent.nonce, -1);
    assert_eq!(intent.amount_in, 0);
    assert_eq!(intent.amount_out, 0);
    assert_eq!(intent.expiry, 0);

    // No nonce burned, nothing cached: a later clean request starts at 0.
    assert_eq!(store.current_nonce("0xmaker"), 0);
    let clean = pipeline.quote(&bundle(Side::Sell, 1_000_000), NOW).unwrap();
    assert_eq!(clean.intent.nonce, 0);
}

#[test]
fn feasibility_rejection_after_policy_pass_is_not_sticky() {
    let (pipeline, store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.chain.token_out_budget = 529_470_000_000_000_000 - 1;

    let outcome = pipeline.quote(&b, NOW).unwrap();
    assert!(outcome.intent.rejected);
    assert_eq!(outcome.intent.reason, Some(RejectReason::InsufficientBudget));
    assert!(
        outcome
            .explain
            .checks
            .contains(&"BUDGET_CHECK: FAILED".to_string())
    );
    assert_eq!(store.current_nonce("0xmaker"), 0);

    // The chain catches up; the identical request now clears the gate.
    b.chain.token_out_budget = 529_470_000_000_000_000;
    let retry = pipeline.quote(&b, NOW).unwrap();
    assert!(!retry.intent.rejected);
    assert_eq!(retry.intent.nonce, 0);
}

#[test]
fn daily_cap_accrues_and_resets_at_utc_midnight() {
    let (pipeline, _store) = pipeline();

    // 1:1 curve so amount_out == amount_in, zero-width spread band.
    let flat_curve = vec![
        DepthPoint {
            amount_in_raw: 1_000,
            amount_out_raw: 1_000,
            impact_bps: 0.0,
        },
        DepthPoint {
            amount_in_raw: 10_000,
            amount_out_raw: 10_000,
            impact_bps: 0.0,
        },
    ];

    let mut b = bundle(Side::Sell, 800);
    b.pricing.depth = flat_curve;
    b.policy.min_spread_bps = 0;
    b.policy.max_spread_bps = 0;
    b.pricing.spread_bps = 0;
    b.policy.daily_caps.insert("WETH".into(), 1_000);

    let first = pipeline.quote(&b, NOW).unwrap();
    assert!(!first.intent.rejected);
    assert_eq!(first.intent.amount_out, 800);

    // 800 accrued + 300 requested breaches the 1_000 cap.
    let mut second = b.clone();
    second.request.amount = 300;
    let rejected = pipeline.quote(&second, NOW + 1).unwrap();
    assert!(rejected.intent.rejected);
    assert_eq!(rejected.intent.reason, Some(RejectReason::ExceedsDailyCap));

    // Past UTC midnight the counters reset and the same request clears.
    let accepted = pipeline.quote(&second, NOW + DAY).unwrap();
    assert!(!accepted.intent.rejected);
    assert_eq!(accepted.intent.nonce, 1);
}

#[test]
fn unsupported_chain_rejects_with_no_side_effects() {
    let (pipeline, store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.request.chain_id = 999;

    let outcome = pipeline.quote(&b, NOW).unwrap();
    assert!(outcome.intent.rejected);
    assert_eq!(outcome.intent.reason, Some(RejectReason::InvalidChain));
    assert_eq!(outcome.explain.checks, vec!["CHAIN_CHECK: FAILED"]);
    assert_eq!(store.current_nonce("0xmaker"), 0);
}

#[test]
fn stale_pricing_rejects_even_when_everything_else_passes() {
    let (pipeline, _store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.pricing.stale = true;

    let outcome = pipeline.quote(&b, NOW).unwrap();
    assert_eq!(outcome.intent.reason, Some(RejectReason::StalePricing));
}

#[test]
fn non_monotone_curve_is_a_transport_error_not_an_intent() {
    let (pipeline, store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.pricing.depth[1].amount_in_raw = 500_000;

    assert!(pipeline.quote(&b, NOW).is_err());
    assert_eq!(store.current_nonce("0xmaker"), 0);
}

#[test]
fn nonces_increase_strictly_in_emission_order() {
    let (pipeline, _store) = pipeline();

    let mut nonces = Vec::new();
    for i in 0..5u128 {
        let b = bundle(Side::Sell, 1_000_000 + i); // distinct derived keys
        let outcome = pipeline.quote(&b, NOW).unwrap();
        assert!(!outcome.intent.rejected);
        nonces.push(outcome.intent.nonce);
    }

    assert_eq!(nonces, vec![0, 1, 2, 3, 4]);
}

#[test]
fn concurrent_same_key_requests_mint_exactly_one_intent() {
    let store = Arc::new(StateStore::new());
    let pipeline = Arc::new(QuotePipeline::new(AgentConfig::default(), store.clone()));

    let mut b = bundle(Side::Sell, 1_000_000);
    b.request.idempotency_key = Some("k-race".into());

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let pipeline = pipeline.clone();
            let b = b.clone();
            std::thread::spawn(move || pipeline.quote(&b, NOW).unwrap().intent)
        })
        .collect();

    let intents: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Everyone observes the same intent, and only one nonce was allocated.
    for intent in &intents {
        assert_eq!(intent, &intents[0]);
        assert_eq!(intent.nonce, 0);
    }
    assert_eq!(store.current_nonce("0xmaker"), 1);
}

#[test]
fn low_confidence_widens_the_spread_and_warns() {
    let (pipeline, _store) = pipeline();

    let mut b = bundle(Side::Sell, 1_000_000);
    b.pricing.confidence = 0.5;

    let outcome = pipeline.quote(&b, NOW).unwrap();
    assert!(!outcome.intent.rejected);
    // clamp(8, 10, 50) = 10, then widened 1.5x.
    assert_eq!(outcome.intent.spread_bps, 15);
    assert!(
        outcome
            .explain
            .warnings
            .iter()
            .any(|w| w.contains("widened"))
    );
}
