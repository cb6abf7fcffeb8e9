//! Process-local mutable state behind the quote pipeline.
//!
//! One store instance is shared by all request handlers and owns three
//! tables: per-maker nonce counters, the idempotency cache, and per-maker
//! per-token daily volumes (plus advisory fill/revert counters). Everything
//! lives behind a single mutex, and the pipeline touches it through exactly
//! two entry points:
//!
//!  - [`StateStore::snapshot`] — rollover + cache lookup + volume read
//!  - [`StateStore::commit`]   — get-or-set cache, cap re-check, nonce
//!    allocation and volume accrual as one atomic step
//!
//! Re-validating the cap and the cache inside `commit` is what keeps two
//! concurrent requests from jointly breaching a cap, or from both minting an
//! intent for the same idempotency key.
//!
//! There is no durability: a restart resets nonces, cache and volumes (the
//! downstream signer reconciles nonces on its side).

use std::collections::HashMap;

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use domain::QuoteIntent;

use crate::ledger::{FillRecord, RevertRecord};

/// UTC calendar day for a Unix-seconds timestamp.
fn utc_day(now_unix: u64) -> NaiveDate {
    chrono::DateTime::from_timestamp(now_unix as i64, 0)
        .map(|dt| dt.date_naive())
        .unwrap_or(NaiveDate::MIN)
}

/// What the pipeline sees before deciding: any cached intent for the key and
/// the maker's accrued volume for the output token today.
#[derive(Debug, Clone)]
pub struct StoreView {
    pub cached: Option<QuoteIntent>,
    pub daily_volume: u128,
}

#[derive(Debug, Clone)]
pub enum CommitOutcome {
    /// This request minted the intent; nonce allocated and state updated.
    Fresh(QuoteIntent),

    /// A concurrent request with the same idempotency key committed first;
    /// its intent is returned and this synthesis is discarded.
    Raced(QuoteIntent),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommitError {
    #[error("daily cap {cap} would be breached: {current} accrued + {attempted} requested")]
    CapExceeded {
        current: u128,
        cap: u128,
        attempted: u128,
    },

    #[error("nonce counter exhausted for maker")]
    NonceExhausted,
}

/// Advisory per-maker statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerStats {
    pub maker: String,

    /// Next unissued nonce (count of accepted intents so far).
    pub current_nonce: u64,

    pub fills: usize,
    pub reverts: usize,
    pub revert_rate: f64,

    #[serde(with = "domain::amount::map")]
    pub daily_volumes: HashMap<String, u128>,
}

#[derive(Default)]
struct Inner {
    nonces: HashMap<String, u64>,
    cache: HashMap<String, QuoteIntent>,
    volumes: HashMap<String, HashMap<String, u128>>,
    volume_day: Option<NaiveDate>,
    fills: HashMap<(String, i64), FillRecord>,
    reverts: HashMap<(String, i64), RevertRecord>,
}

impl Inner {
    /// Global, atomic daily-volume reset at the first request past a UTC
    /// date boundary. Must run before any counter read or write.
    fn rollover(&mut self, now_unix: u64) {
        let today = utc_day(now_unix);
        if self.volume_day != Some(today) {
            if self.volume_day.is_some() {
                tracing::info!(day = %today, "daily volume counters reset");
            }
            self.volumes.clear();
            self.volume_day = Some(today);
        }
    }

    fn daily_volume(&self, maker: &str, token: &str) -> u128 {
        self.volumes
            .get(maker)
            .and_then(|by_token| by_token.get(token))
            .copied()
            .unwrap_or(0)
    }
}

#[derive(Default)]
pub struct StateStore {
    inner: Mutex<Inner>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-side entry point, run before the gates.
    ///
    /// Performs the UTC rollover, drops the cache entry for `key` if it has
    /// expired, and returns the surviving cached intent (if any) together
    /// with the maker's accrued volume for `token_out` today.
    pub fn snapshot(&self, maker: &str, token_out: &str, key: &str, now_unix: u64) -> StoreView {
        let mut g = self.inner.lock();
        g.rollover(now_unix);

        let cached = match g.cache.get(key).cloned() {
            Some(intent) if intent.expiry > now_unix => Some(intent),
            Some(_) => {
                // Expired: evict on access.
                g.cache.remove(key);
                None
            }
            None => None,
        };

        StoreView {
            cached,
            daily_volume: g.daily_volume(maker, token_out),
        }
    }

    /// Write-side entry point, run only for accepted intents.
    ///
    /// Atomically: rollover, expired-entry purge, idempotency get-or-set,
    /// daily-cap re-check, nonce allocation, cache insert, volume accrual.
    /// `draft.nonce` is overwritten with the allocated value. Nothing is
    /// written when the cap check fails, and a lost same-key race returns
    /// the winner's intent instead of minting a second one.
    pub fn commit(
        &self,
        mut draft: QuoteIntent,
        cap: Option<u128>,
        now_unix: u64,
    ) -> Result<CommitOutcome, CommitError> {
        let mut g = self.inner.lock();
        g.rollover(now_unix);
        g.cache.retain(|_, intent| intent.expiry > now_unix);

        if let Some(winner) = g.cache.get(&draft.idempotency_key) {
            return Ok(CommitOutcome::Raced(winner.clone()));
        }

        if let Some(cap) = cap {
            let current = g.daily_volume(&draft.maker, &draft.token_out);
            if current.saturating_add(draft.amount_out) > cap {
                return Err(CommitError::CapExceeded {
                    current,
                    cap,
                    attempted: draft.amount_out,
                });
            }
        }

        let counter = g.nonces.entry(draft.maker.clone()).or_insert(0);
        if *counter > i64::MAX as u64 {
            return Err(CommitError::NonceExhausted);
        }
        draft.nonce = *counter as i64;
        *counter += 1;

        g.cache.insert(draft.idempotency_key.clone(), draft.clone());

        let volume = g
            .volumes
            .entry(draft.maker.clone())
            .or_default()
            .entry(draft.token_out.clone())
            .or_insert(0);
        *volume = volume.saturating_add(draft.amount_out);

        Ok(CommitOutcome::Fresh(draft))
    }

    /// Next unissued nonce for the maker (0 before any accepted intent).
    pub fn current_nonce(&self, maker: &str) -> u64 {
        self.inner.lock().nonces.get(maker).copied().unwrap_or(0)
    }

    /// Accrued volume for (maker, token) today; test and stats helper.
    pub fn daily_volume(&self, maker: &str, token: &str) -> u128 {
        self.inner.lock().daily_volume(maker, token)
    }

    /// Advisory post-hoc fill record; never consulted when quoting.
    pub fn record_fill(&self, rec: FillRecord) {
        let mut g = self.inner.lock();
        g.fills.insert((rec.maker.clone(), rec.nonce), rec);
    }

    /// Advisory post-hoc revert record. A revert after a passed feasibility
    /// gate points at on-chain drift, so it is worth a warning.
    pub fn record_revert(&self, rec: RevertRecord) {
        tracing::warn!(maker = %rec.maker, nonce = rec.nonce, reason = %rec.reason, "revert recorded");
        let mut g = self.inner.lock();
        g.reverts.insert((rec.maker.clone(), rec.nonce), rec);
    }

    pub fn maker_stats(&self, maker: &str) -> MakerStats {
        let g = self.inner.lock();

        let fills = g.fills.keys().filter(|(m, _)| m == maker).count();
        let reverts = g.reverts.keys().filter(|(m, _)| m == maker).count();

        MakerStats {
            maker: maker.to_string(),
            current_nonce: g.nonces.get(maker).copied().unwrap_or(0),
            fills,
            reverts,
            revert_rate: reverts as f64 / (fills + reverts).max(1) as f64,
            daily_volumes: g.volumes.get(maker).cloned().unwrap_or_default(),
        }
    }
}
