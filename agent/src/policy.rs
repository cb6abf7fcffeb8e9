//! Policy gate: is this request something the maker is willing to quote?
//!
//! Runs as an ordered sequence of predicates; the first failure
//! short-circuits with its canonical rejection. Ordering puts the cheap,
//! highly diagnostic checks first. The gate is pure — it reads only its
//! arguments (the daily-volume figure is a snapshot handed in by the
//! pipeline) and never touches the store.
//!
//! The size and cap predicates need the synthesized amounts, so the gate is
//! split: admission runs before synthesis, limits after.

use domain::{MakerPolicy, PricingSnapshot, QuoteRequest, RejectReason};

use crate::types::{AgentConfig, GateTrace, Rejection};

/// Pre-synthesis predicates: chain, tokens, paused, pair, pricing health.
pub fn check_admission(
    request: &QuoteRequest,
    policy: &MakerPolicy,
    pricing: &PricingSnapshot,
    cfg: &AgentConfig,
    trace: &mut GateTrace,
) -> Result<(), Rejection> {
    if !cfg.supports_chain(request.chain_id) {
        trace.fail("CHAIN_CHECK");
        return Err(Rejection::new(
            RejectReason::InvalidChain,
            format!("chain {} not supported", request.chain_id),
        ));
    }
    trace.pass("CHAIN_CHECK");

    if request.token_in.is_empty()
        || request.token_out.is_empty()
        || request.token_in == request.token_out
    {
        trace.fail("TOKEN_CHECK");
        return Err(Rejection::new(
            RejectReason::InvalidToken,
            format!(
                "token_in {:?} / token_out {:?} do not form a tradable pair",
                request.token_in, request.token_out
            ),
        ));
    }
    trace.pass("TOKEN_CHECK");

    if policy.paused {
        trace.fail("PAUSE_CHECK");
        return Err(Rejection::new(
            RejectReason::MakerPaused,
            "maker has paused quoting",
        ));
    }
    trace.pass("PAUSE_CHECK");

    if !policy.allows_pair(&request.token_in, &request.token_out) {
        trace.fail("PAIR_CHECK");
        return Err(Rejection::new(
            RejectReason::PairNotAllowed,
            format!(
                "pair {}/{} not in the maker's allow-list",
                request.token_in, request.token_out
            ),
        ));
    }
    trace.pass("PAIR_CHECK");

    if pricing.stale {
        trace.fail("PRICING_CHECK");
        return Err(Rejection::new(
            RejectReason::StalePricing,
            format!("pricing snapshot from {}ms is stale", pricing.as_of_ms),
        ));
    }
    if pricing.confidence < policy.min_confidence {
        trace.fail("PRICING_CHECK");
        return Err(Rejection::new(
            RejectReason::StalePricing,
            format!(
                "pricing confidence {:.2} below required {:.2}",
                pricing.confidence, policy.min_confidence
            ),
        ));
    }
    trace.pass("PRICING_CHECK");

    Ok(())
}

/// Post-synthesis predicates: trade size, projected daily cap.
///
/// `max_trade_size` is compared against the taker-denominated leg
/// (`request.amount`): raw base units of two different tokens are not
/// comparable, so the opposite leg is capped by the daily-cap and budget
/// checks in its own unit instead.
pub fn check_limits(
    policy: &MakerPolicy,
    request: &QuoteRequest,
    amount_out: u128,
    daily_volume: u128,
    trace: &mut GateTrace,
) -> Result<(), Rejection> {
    if let Some(max) = policy.max_trade_size {
        if request.amount > max {
            trace.fail("MAX_TRADE_SIZE_CHECK");
            return Err(Rejection::new(
                RejectReason::ExceedsMaxTradeSize,
                format!("requested amount {} exceeds max trade size {max}", request.amount),
            ));
        }
    }
    trace.pass("MAX_TRADE_SIZE_CHECK");

    if let Some(cap) = policy.daily_cap(&request.token_out) {
        if daily_volume.saturating_add(amount_out) > cap {
            trace.fail("DAILY_CAP_CHECK");
            return Err(Rejection::new(
                RejectReason::ExceedsDailyCap,
                format!(
                    "daily cap for {}: {daily_volume} accrued + {amount_out} requested > {cap}",
                    request.token_out
                ),
            ));
        }
    }
    trace.pass("DAILY_CAP_CHECK");

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use domain::{Pair, Side};

    fn request() -> QuoteRequest {
        QuoteRequest {
            chain_id: 1,
            side: Side::Sell,
            token_in: "USDC".into(),
            token_out: "WETH".into(),
            amount: 1_000_000,
            taker: "0xtaker".into(),
            recipient: None,
            idempotency_key: None,
        }
    }

    fn policy() -> MakerPolicy {
        MakerPolicy {
            maker: "0xmaker".into(),
            allowed_pairs: vec![Pair::new("WETH", "USDC")],
            max_trade_size: None,
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
            depth: vec![],
            as_of_ms: 1_000,
            stale: false,
            confidence: 0.97,
            sources: vec![],
        }
    }

    fn admit(req: &QuoteRequest, pol: &MakerPolicy, pr: &PricingSnapshot) -> Result<(), Rejection> {
        check_admission(req, pol, pr, &AgentConfig::default(), &mut GateTrace::default())
    }

    #[test]
    fn clean_request_is_admitted() {
        assert!(admit(&request(), &policy(), &pricing()).is_ok());
    }

    #[test]
    fn unsupported_chain_rejects_first() {
        let mut req = request();
        req.chain_id = 999;

        // Even with a paused policy the chain verdict wins: it runs first.
        let mut pol = policy();
        pol.paused = true;

        let rej = admit(&req, &pol, &pricing()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::InvalidChain);
    }

    #[test]
    fn identical_tokens_reject_as_invalid_token() {
        let mut req = request();
        req.token_out = "USDC".into();

        let rej = admit(&req, &policy(), &pricing()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::InvalidToken);
    }

    #[test]
    fn paused_maker_rejects_regardless_of_feasibility() {
        let mut pol = policy();
        pol.paused = true;

        let rej = admit(&request(), &pol, &pricing()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::MakerPaused);
    }

    #[test]
    fn disallowed_pair_rejects() {
        let mut req = request();
        req.token_in = "USDT".into();

        let rej = admit(&req, &policy(), &pricing()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::PairNotAllowed);
    }

    #[test]
    fn stale_pricing_rejects_even_when_all_else_passes() {
        let mut pr = pricing();
        pr.stale = true;

        let rej = admit(&request(), &policy(), &pr).unwrap_err();
        assert_eq!(rej.reason, RejectReason::StalePricing);
    }

    #[test]
    fn low_confidence_rejects_when_policy_demands_more() {
        let mut pol = policy();
        pol.min_confidence = 0.99;

        let rej = admit(&request(), &pol, &pricing()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::StalePricing);
    }

    #[test]
    fn max_trade_size_bounds_the_requested_amount() {
        let mut pol = policy();
        pol.max_trade_size = Some(1_000);

        let mut req = request();
        req.amount = 1_001;
        let rej =
            check_limits(&pol, &req, 1, 0, &mut GateTrace::default()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::ExceedsMaxTradeSize);

        req.amount = 1_000;
        assert!(check_limits(&pol, &req, 1, 0, &mut GateTrace::default()).is_ok());
    }

    #[test]
    fn daily_cap_projects_current_plus_requested() {
        let mut pol = policy();
        pol.daily_caps.insert("WETH".into(), 1_000);
        let req = request();

        assert!(check_limits(&pol, &req, 200, 800, &mut GateTrace::default()).is_ok());

        let rej = check_limits(&pol, &req, 201, 800, &mut GateTrace::default()).unwrap_err();
        assert_eq!(rej.reason, RejectReason::ExceedsDailyCap);

        // No cap configured for the output token: unlimited.
        let mut other = request();
        other.token_out = "USDT".into();
        assert!(check_limits(&pol, &other, u128::MAX, 0, &mut GateTrace::default()).is_ok());
    }

    #[test]
    fn trace_records_the_failing_gate() {
        let mut pol = policy();
        pol.paused = true;

        let mut trace = GateTrace::default();
        let _ = check_admission(
            &request(),
            &pol,
            &pricing(),
            &AgentConfig::default(),
            &mut trace,
        );

        assert_eq!(
            trace.into_lines(),
            vec![
                "CHAIN_CHECK: PASSED",
                "TOKEN_CHECK: PASSED",
                "PAUSE_CHECK: FAILED"
            ]
        );
    }
}
