#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Listen address for the HTTP boundary.
    pub bind_addr: String,

    /// Chains the agent will quote on. Requests for anything else are
    /// rejected with INVALID_CHAIN before any other gate runs.
    pub supported_chains: Vec<u64>,

    /// Connection string for the advisory fill/revert ledger. When unset
    /// the ledger is disabled and only in-memory counters are kept.
    pub ledger_database_url: Option<String>,

    /// Structured JSON logs (production) vs pretty logs (development).
    pub json_logs: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr =
            std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        // ETH, BSC, Polygon, Arbitrum unless overridden.
        let supported_chains = std::env::var("SUPPORTED_CHAINS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse::<u64>().ok())
                    .collect::<Vec<_>>()
            })
            .filter(|chains| !chains.is_empty())
            .unwrap_or_else(|| vec![1, 56, 137, 42_161]);

        let ledger_database_url = std::env::var("LEDGER_DATABASE_URL").ok();

        let json_logs = std::env::var("APP_ENV").unwrap_or_default() == "production";

        Self {
            bind_addr,
            supported_chains,
            ledger_database_url,
            json_logs,
        }
    }
}
