use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Trade direction from the taker's point of view.
///
/// `Sell` means `amount` is an exact input (token_in given away);
/// `Buy` means `amount` is an exact output (token_out demanded).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::Buy => "BUY",
            Side::Sell => "SELL",
        })
    }
}

/// A taker's ask: "at what terms will you trade X for Y?".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub chain_id: u64,
    pub side: Side,
    pub token_in: String,
    pub token_out: String,

    /// Base units. Exact input for SELL, exact output for BUY.
    #[serde(with = "crate::amount")]
    pub amount: u128,

    pub taker: String,

    /// Defaults to the taker when absent.
    #[serde(default)]
    pub recipient: Option<String>,

    /// When absent, a deterministic key is derived from the request.
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

impl QuoteRequest {
    /// Structural invariants. Violations are input-contract errors surfaced
    /// at the transport boundary, not rejection outcomes.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.amount == 0 {
            anyhow::bail!("amount must be > 0");
        }
        if self.taker.is_empty() {
            anyhow::bail!("taker must not be empty");
        }
        Ok(())
    }

    /// Effective recipient: explicit recipient, else the taker.
    pub fn recipient(&self) -> &str {
        self.recipient.as_deref().unwrap_or(&self.taker)
    }

    /// Effective idempotency key: the caller's, else a deterministic digest
    /// of the request. No timestamp component, so resubmitting the same
    /// request maps to the same cache slot until the quote expires.
    pub fn idempotency_key(&self) -> String {
        if let Some(key) = &self.idempotency_key {
            return key.clone();
        }

        let mut hasher = Sha256::new();
        hasher.update(
            format!(
                "{}:{}:{}:{}:{}:{}",
                self.chain_id, self.side, self.token_in, self.token_out, self.amount, self.taker
            )
            .as_bytes(),
        );
        let digest = hasher.finalize();

        hex_prefix(&digest, 16)
    }
}

/// First `len` hex characters of a digest.
fn hex_prefix(digest: &[u8], len: usize) -> String {
    let mut out = String::with_capacity(len);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
        if out.len() >= len {
            break;
        }
    }
    out.truncate(len);
    out
}
