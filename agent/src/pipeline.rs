//! The quote pipeline: one request in, one intent + explainability out.
//!
//! Orchestration order per request:
//!   idempotency lookup → admission gate → spread + synthesis → limit gate
//!   → feasibility gate → atomic commit → response.
//!
//! The pipeline is the only writer to the state store, and it writes only
//! at the commit step, only for accepted intents. Every rejection path
//! leaves state untouched and emits a rejected intent (zero amounts,
//! nonce −1) — a business outcome, not an error. The single error variant
//! is a provider contract violation, which the boundary turns into a
//! server-side failure instead of an intent.
//!
//! `now_unix` is always injected by the caller; nothing here reads a clock.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info};

use domain::{Explainability, QuoteIntent, RejectReason};
use pricing::curve::CurveError;
use pricing::spread::select_spread;
use state::{CommitError, CommitOutcome, StateStore};

use crate::feasibility::check_feasibility;
use crate::policy::{check_admission, check_limits};
use crate::synth::{SynthError, synthesize};
use crate::types::{AgentConfig, GateTrace, Rejection, RequestBundle};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("depth curve contract violation: {0}")]
    Pricing(#[from] CurveError),
}

#[derive(Debug, Clone)]
pub struct QuoteOutcome {
    pub intent: QuoteIntent,
    pub explain: Explainability,
}

pub struct QuotePipeline {
    cfg: AgentConfig,
    store: Arc<StateStore>,
}

impl QuotePipeline {
    pub fn new(cfg: AgentConfig, store: Arc<StateStore>) -> Self {
        Self { cfg, store }
    }

    pub fn supported_chains(&self) -> &[u64] {
        &self.cfg.supported_chains
    }

    /// Process one quote request end-to-end.
    pub fn quote(
        &self,
        bundle: &RequestBundle,
        now_unix: u64,
    ) -> Result<QuoteOutcome, PipelineError> {
        let request = &bundle.request;
        let policy = &bundle.policy;

        let key = request.idempotency_key();

        let view = self
            .store
            .snapshot(&policy.maker, &request.token_out, &key, now_unix);

        if let Some(cached) = view.cached {
            debug!(key = %key, "idempotency hit; returning cached intent");
            return Ok(cached_outcome(cached));
        }

        let mut trace = GateTrace::default();

        if let Err(rej) = check_admission(request, policy, &bundle.pricing, &self.cfg, &mut trace)
        {
            return Ok(rejected_outcome(bundle, key, rej, trace, "none", vec![]));
        }

        let spread = select_spread(
            bundle.pricing.spread_bps,
            policy.min_spread_bps,
            policy.max_spread_bps,
            bundle.pricing.confidence,
        );

        let synthesis = match synthesize(
            request,
            policy,
            &bundle.pricing,
            &bundle.chain,
            spread,
            key.clone(),
            now_unix,
        ) {
            Ok(s) => {
                trace.pass("PRICE_BASIS_CHECK");
                s
            }
            Err(SynthError::Reject(rej)) => {
                trace.fail("PRICE_BASIS_CHECK");
                return Ok(rejected_outcome(bundle, key, rej, trace, "none", vec![]));
            }
            Err(SynthError::Curve(err)) => return Err(err.into()),
        };

        let mut warnings = synthesis.warnings;
        let draft = synthesis.draft;
        let pricing_source = synthesis.pricing_source;

        if let Err(rej) = check_limits(
            policy,
            request,
            draft.amount_out,
            view.daily_volume,
            &mut trace,
        ) {
            return Ok(rejected_outcome(bundle, key, rej, trace, pricing_source, warnings));
        }

        if let Err(rej) = check_feasibility(&bundle.chain, draft.amount_out, &mut trace) {
            return Ok(rejected_outcome(bundle, key, rej, trace, pricing_source, warnings));
        }

        if bundle.chain.token_out_budget < draft.amount_out.saturating_mul(2) {
            warnings.push(format!(
                "budget running low: {} {} remaining after this fill",
                bundle.chain.token_out_budget.saturating_sub(draft.amount_out),
                request.token_out
            ));
        }

        let cap = policy.daily_cap(&request.token_out);

        let intent = match self.store.commit(draft, cap, now_unix) {
            Ok(CommitOutcome::Fresh(intent)) => intent,
            Ok(CommitOutcome::Raced(winner)) => {
                debug!(key = %key, "lost idempotency race at commit; returning winner");
                return Ok(cached_outcome(winner));
            }
            Err(CommitError::CapExceeded {
                current,
                cap,
                attempted,
            }) => {
                trace.fail("DAILY_CAP_CHECK");
                let rej = Rejection::new(
                    RejectReason::ExceedsDailyCap,
                    format!(
                        "daily cap {cap} breached at commit: {current} accrued + {attempted} requested"
                    ),
                );
                return Ok(rejected_outcome(bundle, key, rej, trace, pricing_source, warnings));
            }
            Err(CommitError::NonceExhausted) => {
                let rej = Rejection::new(
                    RejectReason::NonceExhausted,
                    "per-maker nonce space exhausted",
                );
                return Ok(rejected_outcome(bundle, key, rej, trace, pricing_source, warnings));
            }
        };

        info!(
            maker = %intent.maker,
            nonce = intent.nonce,
            side = %request.side,
            amount_in = %intent.amount_in,
            amount_out = %intent.amount_out,
            spread_bps = intent.spread_bps,
            "quote intent issued"
        );

        let explain = Explainability {
            description: format!(
                "quote generated for {} {}/{}",
                request.side, request.token_in, request.token_out
            ),
            rationale: intent.rationale.clone(),
            pricing_source: pricing_source.to_string(),
            checks: trace.into_lines(),
            warnings,
        };

        Ok(QuoteOutcome { intent, explain })
    }
}

fn cached_outcome(intent: QuoteIntent) -> QuoteOutcome {
    let explain = Explainability {
        description: "returning cached quote for idempotency key".to_string(),
        rationale: "an identical request was already quoted and has not expired".to_string(),
        pricing_source: "cached".to_string(),
        checks: vec!["IDEMPOTENCY_HIT".to_string()],
        warnings: vec![],
    };

    QuoteOutcome { intent, explain }
}

fn rejected_outcome(
    bundle: &RequestBundle,
    key: String,
    rejection: Rejection,
    trace: GateTrace,
    pricing_source: &str,
    warnings: Vec<String>,
) -> QuoteOutcome {
    info!(
        maker = %bundle.policy.maker,
        reason = %rejection.reason,
        detail = %rejection.detail,
        "quote rejected"
    );

    let intent = QuoteIntent::rejected(
        &bundle.request,
        &bundle.policy.maker,
        key,
        rejection.reason,
        rejection.detail.clone(),
    );

    let explain = Explainability {
        description: format!("quote rejected: {}", rejection.reason),
        rationale: rejection.detail,
        pricing_source: pricing_source.to_string(),
        checks: trace.into_lines(),
        warnings,
    };

    QuoteOutcome { intent, explain }
}
