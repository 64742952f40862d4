use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::metrics::Metrics;
use crate::quota::QuotaLedger;
use crate::scrape::client::ScrapeApi;
use crate::session::verification::VerificationClient;
use crate::session::SessionService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Scraping service seam. Trait object so tests can script job lifecycles.
    pub scraper: Arc<dyn ScrapeApi>,
    pub quota: QuotaLedger,
    pub sessions: SessionService,
    /// Present only when a provider secret is configured.
    pub verifier: Option<VerificationClient>,
    /// Injected observability port; counters, not core state.
    pub metrics: Arc<dyn Metrics>,
    pub config: Config,
}
