pub mod sqlite;

use serde::{Deserialize, Serialize};

pub use sqlite::SqliteFillLedger;

/// Post-hoc record of a quote that filled on-chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FillRecord {
    pub maker: String,
    pub nonce: i64,
    pub tx_hash: String,

    #[serde(with = "domain::amount")]
    pub actual_out: u128,

    #[serde(default)]
    pub recorded_at_ms: u64,
}

/// Post-hoc record of a quote whose settlement reverted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevertRecord {
    pub maker: String,
    pub nonce: i64,
    pub reason: String,

    #[serde(default)]
    pub recorded_at_ms: u64,
}

/// Durable, append-only sink for fill/revert outcomes, keyed
/// `(maker, nonce)`. Purely diagnostic: the quote pipeline never reads it,
/// and losing it affects nothing but operator visibility.
#[async_trait::async_trait]
pub trait FillLedger: Send + Sync {
    async fn record_fill(&self, rec: &FillRecord) -> anyhow::Result<()>;
    async fn record_revert(&self, rec: &RevertRecord) -> anyhow::Result<()>;
    async fn fills_for_maker(&self, maker: &str) -> anyhow::Result<Vec<FillRecord>>;
    async fn reverts_for_maker(&self, maker: &str) -> anyhow::Result<Vec<RevertRecord>>;
}
