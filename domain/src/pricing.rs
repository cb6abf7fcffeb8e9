use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One cumulative sample of the depth curve: selling up to `amount_in_raw`
/// yields up to `amount_out_raw` in aggregate, at `impact_bps` realized
/// impact versus mid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepthPoint {
    #[serde(with = "crate::amount")]
    pub amount_in_raw: u128,

    #[serde(with = "crate::amount")]
    pub amount_out_raw: u128,

    pub impact_bps: f64,
}

/// Off-chain pricing at a point in time, as emitted by the price engine.
///
/// The depth curve, when present, is cumulative and strictly increasing in
/// `amount_in_raw`; discrete `bid`/`ask` back the curve-less case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub mid_price: Decimal,

    #[serde(default)]
    pub bid: Option<Decimal>,

    #[serde(default)]
    pub ask: Option<Decimal>,

    /// Current market spread in basis points.
    pub spread_bps: u32,

    #[serde(default)]
    pub depth: Vec<DepthPoint>,

    /// Source timestamp, Unix milliseconds.
    pub as_of_ms: u64,

    #[serde(default)]
    pub stale: bool,

    /// 0..=1; lower when the provider is uncertain.
    pub confidence: f64,

    #[serde(default)]
    pub sources: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_with_string_amounts() {
        let json = r#"{
            "mid_price": "0.00053",
            "spread_bps": 8,
            "depth": [
                {"amount_in_raw": "1000000", "amount_out_raw": "530000000000000000", "impact_bps": 12.0}
            ],
            "as_of_ms": 1704067200000,
            "confidence": 0.97
        }"#;

        let snap: PricingSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.depth.len(), 1);
        assert_eq!(snap.depth[0].amount_out_raw, 530_000_000_000_000_000);
        assert!(!snap.stale);
        assert!(snap.bid.is_none());

        let back = serde_json::to_value(&snap).unwrap();
        assert_eq!(back["depth"][0]["amount_in_raw"], "1000000");
        assert_eq!(back["mid_price"], "0.00053");
    }
}
