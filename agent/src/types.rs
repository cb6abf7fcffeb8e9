use serde::{Deserialize, Serialize};

use domain::{ChainSnapshot, MakerPolicy, PricingSnapshot, QuoteRequest, RejectReason};

/// Engine-level configuration, distinct from any single maker's policy.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub supported_chains: Vec<u64>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            // ETH, BSC, Polygon, Arbitrum.
            supported_chains: vec![1, 56, 137, 42_161],
        }
    }
}

impl AgentConfig {
    pub fn supports_chain(&self, chain_id: u64) -> bool {
        self.supported_chains.contains(&chain_id)
    }
}

/// Everything one quote decision consumes: the taker's ask plus the three
/// input snapshots with their different freshness domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestBundle {
    pub request: QuoteRequest,
    pub policy: MakerPolicy,
    pub pricing: PricingSnapshot,
    pub chain: ChainSnapshot,
}

/// A gate verdict: canonical reason plus operator-facing detail.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub reason: RejectReason,
    pub detail: String,
}

impl Rejection {
    pub fn new(reason: RejectReason, detail: impl Into<String>) -> Self {
        Self {
            reason,
            detail: detail.into(),
        }
    }
}

/// Ordered `NAME: PASSED|FAILED` lines, one per gate predicate, accumulated
/// across the pipeline and attached to the explainability payload.
#[derive(Debug, Default, Clone)]
pub struct GateTrace {
    lines: Vec<String>,
}

impl GateTrace {
    pub fn pass(&mut self, name: &str) {
        self.lines.push(format!("{name}: PASSED"));
    }

    pub fn fail(&mut self, name: &str) {
        self.lines.push(format!("{name}: FAILED"));
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}
