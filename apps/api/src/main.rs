mod chat;
mod config;
mod errors;
mod identity;
mod llm_client;
mod metrics;
mod quota;
mod routes;
mod scrape;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::metrics::TracingMetrics;
use crate::quota::QuotaLedger;
use crate::routes::build_router;
use crate::scrape::client::HttpScrapeClient;
use crate::session::verification::VerificationClient;
use crate::session::SessionService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Concierge API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis-backed quota ledger
    let redis = redis::Client::open(config.redis_url.clone())?;
    let quota = QuotaLedger::new(redis);
    info!("Quota ledger initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone());
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize scraping service client
    let scraper = Arc::new(HttpScrapeClient::new(config.scraper_base_url.clone()));
    info!("Scrape client initialized ({})", config.scraper_base_url);

    // Session tokens + optional human-verification provider
    let sessions = SessionService::new(&config.session_secret);
    let verifier = config
        .verification_secret
        .clone()
        .map(|secret| VerificationClient::new(config.verification_url.clone(), secret));
    if verifier.is_none() {
        info!("No verification provider configured");
    }

    // Build app state
    let state = AppState {
        llm,
        scraper,
        quota,
        sessions,
        verifier,
        metrics: Arc::new(TracingMetrics),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // Peer addresses feed identity derivation when no forwarded header is set.
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
