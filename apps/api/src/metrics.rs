//! Observability port - counters behind an injected trait object.
//!
//! Carried in `AppState` as `Arc<dyn Metrics>`, so instrumentation is a
//! swappable collaborator rather than process-wide globals.

/// Counter sink for orchestration events.
pub trait Metrics: Send + Sync {
    /// A chat request was accepted and classified.
    fn request(&self, intent: &'static str);
    /// A request was rejected by the daily quota ceiling.
    fn quota_rejected(&self);
    /// The ledger backend was unreachable; the request proceeded fail-open.
    fn ledger_unavailable(&self);
    /// A scrape job reached the polling deadline without a terminal status.
    fn scrape_timeout(&self);
    /// An upstream dependency call failed.
    fn upstream_failure(&self, dependency: &'static str);
    /// A grounded flow fell back to default chat generation.
    fn chat_fallback(&self, reason: &'static str);
}

/// Default sink: emits structured tracing events that a log pipeline can
/// count. Keeps the service free of an in-process metrics registry.
pub struct TracingMetrics;

impl Metrics for TracingMetrics {
    fn request(&self, intent: &'static str) {
        tracing::info!(counter = "chat_requests", intent, "request");
    }

    fn quota_rejected(&self) {
        tracing::info!(counter = "quota_rejected", "quota rejection");
    }

    fn ledger_unavailable(&self) {
        tracing::warn!(counter = "ledger_unavailable", "ledger outage (fail-open)");
    }

    fn scrape_timeout(&self) {
        tracing::info!(counter = "scrape_timeouts", "scrape polling deadline reached");
    }

    fn upstream_failure(&self, dependency: &'static str) {
        tracing::warn!(counter = "upstream_failures", dependency, "upstream failure");
    }

    fn chat_fallback(&self, reason: &'static str) {
        tracing::info!(counter = "chat_fallbacks", reason, "fell back to default chat");
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingMetrics;
    use super::*;

    #[test]
    fn test_recording_metrics_captures_events_in_order() {
        let metrics = RecordingMetrics::default();
        metrics.request("default_chat");
        metrics.quota_rejected();
        metrics.chat_fallback("scrape_submit_failed");
        assert_eq!(
            metrics.recorded(),
            vec![
                "request:default_chat",
                "quota_rejected",
                "chat_fallback:scrape_submit_failed"
            ]
        );
    }
}
