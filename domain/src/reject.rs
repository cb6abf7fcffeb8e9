use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Canonical rejection reasons. This set is closed: downstream consumers
/// (signers, dashboards, the maker control plane) match on it verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    MakerPaused,
    InsufficientBudget,
    StalePricing,
    PairNotAllowed,
    ExceedsMaxTradeSize,
    ExceedsDailyCap,
    StrategyInactive,
    StrategyDocked,
    InsufficientAllowance,
    InvalidChain,
    InvalidToken,
    NonceExhausted,
    InternalError,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MakerPaused => "MAKER_PAUSED",
            RejectReason::InsufficientBudget => "INSUFFICIENT_BUDGET",
            RejectReason::StalePricing => "STALE_PRICING",
            RejectReason::PairNotAllowed => "PAIR_NOT_ALLOWED",
            RejectReason::ExceedsMaxTradeSize => "EXCEEDS_MAX_TRADE_SIZE",
            RejectReason::ExceedsDailyCap => "EXCEEDS_DAILY_CAP",
            RejectReason::StrategyInactive => "STRATEGY_INACTIVE",
            RejectReason::StrategyDocked => "STRATEGY_DOCKED",
            RejectReason::InsufficientAllowance => "INSUFFICIENT_ALLOWANCE",
            RejectReason::InvalidChain => "INVALID_CHAIN",
            RejectReason::InvalidToken => "INVALID_TOKEN",
            RejectReason::NonceExhausted => "NONCE_EXHAUSTED",
            RejectReason::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RejectReason {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MAKER_PAUSED" => Ok(RejectReason::MakerPaused),
            "INSUFFICIENT_BUDGET" => Ok(RejectReason::InsufficientBudget),
            "STALE_PRICING" => Ok(RejectReason::StalePricing),
            "PAIR_NOT_ALLOWED" => Ok(RejectReason::PairNotAllowed),
            "EXCEEDS_MAX_TRADE_SIZE" => Ok(RejectReason::ExceedsMaxTradeSize),
            "EXCEEDS_DAILY_CAP" => Ok(RejectReason::ExceedsDailyCap),
            "STRATEGY_INACTIVE" => Ok(RejectReason::StrategyInactive),
            "STRATEGY_DOCKED" => Ok(RejectReason::StrategyDocked),
            "INSUFFICIENT_ALLOWANCE" => Ok(RejectReason::InsufficientAllowance),
            "INVALID_CHAIN" => Ok(RejectReason::InvalidChain),
            "INVALID_TOKEN" => Ok(RejectReason::InvalidToken),
            "NONCE_EXHAUSTED" => Ok(RejectReason::NonceExhausted),
            "INTERNAL_ERROR" => Ok(RejectReason::InternalError),
            other => Err(anyhow::anyhow!("unknown rejection reason: {}", other)),
        }
    }
}
