use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pair::Pair;

fn default_fee_bps() -> u32 {
    10
}

fn default_ttl_sec() -> u64 {
    60
}

/// A maker's current quoting rules.
///
/// Authored out-of-band by the maker control plane; the quoting core reads
/// one policy snapshot per request and never mutates it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerPolicy {
    pub maker: String,

    /// Symmetric pair membership. An empty list allows every pair.
    #[serde(default)]
    pub allowed_pairs: Vec<Pair>,

    /// Applies to both legs of a quote, in base units.
    #[serde(with = "crate::amount::opt", default)]
    pub max_trade_size: Option<u128>,

    /// token -> max accepted `amount_out` per UTC day, base units.
    #[serde(with = "crate::amount::map", default)]
    pub daily_caps: HashMap<String, u128>,

    #[serde(default)]
    pub paused: bool,

    pub min_spread_bps: u32,
    pub max_spread_bps: u32,

    #[serde(default = "default_ttl_sec")]
    pub default_ttl_sec: u64,

    /// Maker fee subtracted from `amount_out` to form `min_out_net`.
    #[serde(default = "default_fee_bps")]
    pub fee_bps: u32,

    /// Quotes below this pricing confidence are refused as stale.
    #[serde(default)]
    pub min_confidence: f64,

    /// canonical pair key -> strategy identifier. Looked up symmetrically;
    /// a deterministic default is derived when the pair is absent.
    #[serde(default)]
    pub strategies: HashMap<String, String>,
}

impl MakerPolicy {
    /// Policy record invariants. Violations are input-contract errors.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.maker.is_empty() {
            anyhow::bail!("maker address must not be empty");
        }
        if self.min_spread_bps > self.max_spread_bps {
            anyhow::bail!(
                "spread band inverted: min {} > max {}",
                self.min_spread_bps,
                self.max_spread_bps
            );
        }
        if self.default_ttl_sec == 0 {
            anyhow::bail!("default_ttl_sec must be > 0");
        }
        Ok(())
    }

    /// Symmetric pair membership; an empty allow-list admits every pair.
    pub fn allows_pair(&self, token_in: &str, token_out: &str) -> bool {
        if self.allowed_pairs.is_empty() {
            return true;
        }
        self.allowed_pairs
            .iter()
            .any(|p| p.matches(token_in, token_out))
    }

    /// Strategy id configured for the pair, tried in both directions.
    pub fn strategy_for(&self, token_in: &str, token_out: &str) -> Option<&str> {
        let forward = format!("{token_in}/{token_out}");
        let reverse = format!("{token_out}/{token_in}");

        self.strategies
            .get(&forward)
            .or_else(|| self.strategies.get(&reverse))
            .map(String::as_str)
    }

    pub fn daily_cap(&self, token: &str) -> Option<u128> {
        self.daily_caps.get(token).copied()
    }
}
