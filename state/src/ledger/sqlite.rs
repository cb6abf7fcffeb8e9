//! SQLite-backed fill/revert ledger.
//!
//! Append-only diagnostics storage for settlement outcomes. The first write
//! for a `(maker, nonce)` slot wins; later duplicates are ignored rather
//! than updated, matching the advisory nature of the data.

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

use super::{FillLedger, FillRecord, RevertRecord};

pub struct SqliteFillLedger {
    pool: SqlitePool,
}

impl SqliteFillLedger {
    /// Connect and ensure the schema exists.
    pub async fn new(url: &str) -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;

        Self::with_schema(pool).await
    }

    /// In-memory ledger for tests. A single connection is mandatory:
    /// every new `:memory:` connection would get its own empty database.
    pub async fn in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;

        Self::with_schema(pool).await
    }

    async fn with_schema(pool: SqlitePool) -> anyhow::Result<Self> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS fills (
                maker TEXT NOT NULL,
                nonce INTEGER NOT NULL,
                tx_hash TEXT NOT NULL,
                actual_out TEXT NOT NULL,
                recorded_at_ms INTEGER NOT NULL,
                PRIMARY KEY (maker, nonce)
            );
        "#,
        )
        .execute(&pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reverts (
                maker TEXT NOT NULL,
                nonce INTEGER NOT NULL,
                reason TEXT NOT NULL,
                recorded_at_ms INTEGER NOT NULL,
                PRIMARY KEY (maker, nonce)
            );
        "#,
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl FillLedger for SqliteFillLedger {
    async fn record_fill(&self, rec: &FillRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO fills (maker, nonce, tx_hash, actual_out, recorded_at_ms)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(maker, nonce) DO NOTHING;
        "#,
        )
        .bind(&rec.maker)
        .bind(rec.nonce)
        .bind(&rec.tx_hash)
        .bind(rec.actual_out.to_string())
        .bind(rec.recorded_at_ms as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn record_revert(&self, rec: &RevertRecord) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reverts (maker, nonce, reason, recorded_at_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(maker, nonce) DO NOTHING;
        "#,
        )
        .bind(&rec.maker)
        .bind(rec.nonce)
        .bind(&rec.reason)
        .bind(rec.recorded_at_ms as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn fills_for_maker(&self, maker: &str) -> anyhow::Result<Vec<FillRecord>> {
        let rows = sqlx::query("SELECT * FROM fills WHERE maker = ? ORDER BY nonce")
            .bind(maker)
            .fetch_all(&self.pool)
            .await?;

        let mut fills = Vec::with_capacity(rows.len());
        for row in rows {
            let actual_out: String = row.get("actual_out");

            fills.push(FillRecord {
                maker: row.get("maker"),
                nonce: row.get("nonce"),
                tx_hash: row.get("tx_hash"),
                actual_out: actual_out
                    .parse()
                    .map_err(|_| anyhow::anyhow!("invalid actual_out in ledger: {actual_out}"))?,
                recorded_at_ms: row.get::<i64, _>("recorded_at_ms") as u64,
            });
        }

        Ok(fills)
    }

    async fn reverts_for_maker(&self, maker: &str) -> anyhow::Result<Vec<RevertRecord>> {
        let rows = sqlx::query("SELECT * FROM reverts WHERE maker = ? ORDER BY nonce")
            .bind(maker)
            .fetch_all(&self.pool)
            .await?;

        let mut reverts = Vec::with_capacity(rows.len());
        for row in rows {
            reverts.push(RevertRecord {
                maker: row.get("maker"),
                nonce: row.get("nonce"),
                reason: row.get("reason"),
                recorded_at_ms: row.get::<i64, _>("recorded_at_ms") as u64,
            });
        }

        Ok(reverts)
    }
}
