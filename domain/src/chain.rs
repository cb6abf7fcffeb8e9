use serde::{Deserialize, Serialize};

/// On-chain state relevant to one prospective trade, read by the boundary
/// before the request enters the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain_id: u64,

    /// Strategy selected for this pair on-chain.
    pub strategy_id: String,

    /// False when the strategy holds zero tokens.
    pub active: bool,

    /// True when the strategy is administratively disabled.
    #[serde(default)]
    pub docked: bool,

    /// token_out available to the strategy, base units.
    #[serde(with = "crate::amount")]
    pub token_out_budget: u128,

    /// maker -> venue allowance for token_out, base units.
    #[serde(with = "crate::amount")]
    pub allowance: u128,

    /// Unix milliseconds.
    pub last_updated_ms: u64,
}

impl ChainSnapshot {
    /// A strategy is usable only when it is funded and not docked.
    pub fn feasible(&self) -> bool {
        self.active && !self.docked
    }
}
