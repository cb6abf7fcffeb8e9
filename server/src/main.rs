use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use agent::{AgentConfig, QuotePipeline};
use common::logger::init_tracing;
use server::config::AppConfig;
use server::routes::{AppState, router};
use state::{FillLedger, SqliteFillLedger, StateStore};

/// Connect the advisory fill ledger when configured. The quoting core runs
/// identically without it.
async fn init_ledger(cfg: &AppConfig) -> anyhow::Result<Option<Arc<dyn FillLedger>>> {
    let Some(url) = &cfg.ledger_database_url else {
        tracing::info!("fill ledger disabled; keeping in-memory counters only");
        return Ok(None);
    };

    let ledger = SqliteFillLedger::new(url).await?;
    tracing::info!(url = %url, "fill ledger connected");
    Ok(Some(Arc::new(ledger)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env();
    init_tracing("strategy-agent", cfg.json_logs);

    tracing::info!(chains = ?cfg.supported_chains, "starting strategy agent");

    let store = Arc::new(StateStore::new());
    let ledger = init_ledger(&cfg).await?;

    let pipeline = Arc::new(QuotePipeline::new(
        AgentConfig {
            supported_chains: cfg.supported_chains.clone(),
        },
        store.clone(),
    ));

    let app = router(AppState {
        pipeline,
        store,
        ledger,
    })
    .layer(TraceLayer::new_for_http())
    .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr).await?;
    tracing::info!(addr = %cfg.bind_addr, "strategy agent listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    Ok(())
}
