//! Axum route handlers for the chat endpoint.
//!
//! Flow: validate -> session gate -> quota gate (fail-open) -> classify ->
//! gather grounding content -> route prompt -> respond. Orchestration
//! failures in grounded flows degrade to default chat rather than failing
//! the request.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::{header, HeaderMap},
    Json,
};
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::chat::intent::{classify, Classification};
use crate::chat::models::{
    clamp_chars, normalize_history, ChatRequest, ChatResponse, ConversationMessage,
    MAX_CONTEXT_CHARS, MAX_MESSAGE_CHARS,
};
use crate::chat::prompts::{CLARIFY_REPLY, SCRAPE_PENDING_REPLY};
use crate::chat::router::{route_chat, route_grounded};
use crate::errors::AppError;
use crate::identity::client_identity;
use crate::quota;
use crate::scrape::assembler::{
    apply_history_fallback, assemble_pasted, assemble_results, AssembledContent,
};
use crate::scrape::client::JobStatus;
use crate::scrape::orchestrator::{await_terminal, PollSchedule};
use crate::state::AppState;

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if request.message.trim().is_empty() {
        return Err(AppError::Validation("message is required".to_string()));
    }

    let message = clamp_chars(request.message.trim().to_string(), MAX_MESSAGE_CHARS);
    let history = normalize_history(request.history);
    let context = request
        .context
        .map(|c| clamp_chars(c, MAX_CONTEXT_CHARS));
    let identity = client_identity(&headers, peer);

    // Session gate. Enforcement state and token check both read the one
    // immutable config snapshot carried in AppState.
    if state.config.gating_enforced() {
        let token = bearer_token(&headers).ok_or(AppError::MissingSession)?;
        state
            .sessions
            .verify(&token)
            .map_err(|_| AppError::InvalidSession)?;
    }

    // Quota gate. Ledger outage is fail-open: availability beats strictness.
    match state.quota.check_and_increment(&identity).await {
        Ok(count) if count > state.config.daily_quota => {
            state.metrics.quota_rejected();
            return Err(AppError::QuotaExceeded {
                retry_after_secs: quota::retry_after_secs(),
            });
        }
        Ok(count) => debug!("Request {count}/{} for {identity}", state.config.daily_quota),
        Err(e) => {
            warn!("Quota ledger unavailable, proceeding fail-open: {e}");
            state.metrics.ledger_unavailable();
        }
    }

    let classification = classify(&message);
    state.metrics.request(classification.intent.as_str());
    info!("Classified message as {:?}", classification.intent);

    let (response, job_id) =
        orchestrate(&state, &classification, &message, &history, context.as_deref()).await?;

    Ok(Json(ChatResponse {
        response,
        job_id,
        timestamp: Utc::now().timestamp_millis(),
    }))
}

/// Gathers grounding content per the classification and routes the prompt.
/// Returns the generated text plus the scrape job id, when one was created.
async fn orchestrate(
    state: &AppState,
    classification: &Classification,
    message: &str,
    history: &[ConversationMessage],
    context: Option<&str>,
) -> Result<(String, Option<String>), AppError> {
    let intent = classification.intent;
    let profile = &state.config.candidate_profile;

    if !intent.needs_content() {
        let text = route_chat(&state.llm, history, message, context, profile).await?;
        return Ok((text, None));
    }

    // Pasted source content: no external fetch needed.
    if let Some(pasted) = &classification.pasted_text {
        let content = apply_history_fallback(assemble_pasted(pasted), history);
        let text = route_grounded(&state.llm, intent, &content.text, profile, message).await?;
        return Ok((text, None));
    }

    let Some(target) = &classification.target_url else {
        // No URL and no pasted text. The history may still hold the source
        // (a job posting pasted a few turns ago); otherwise ask for one.
        let recovered = apply_history_fallback(
            AssembledContent {
                text: String::new(),
                is_thin: true,
            },
            history,
        );
        if recovered.is_thin {
            return Ok((CLARIFY_REPLY.to_string(), None));
        }
        let text = route_grounded(&state.llm, intent, &recovered.text, profile, message).await?;
        return Ok((text, None));
    };

    // Scrape flow. Submission failure is an orchestration failure: fall
    // back to default chat instead of failing the request.
    let job_id = match state.scraper.submit(target).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Scrape submission for {target} failed: {e}; falling back to chat");
            state.metrics.upstream_failure("scraper");
            state.metrics.chat_fallback("scrape_submit_failed");
            let text = route_chat(&state.llm, history, message, context, profile).await?;
            return Ok((text, None));
        }
    };
    info!("Submitted scrape job {job_id} for {target}");

    let schedule = PollSchedule::from_millis(
        state.config.scrape_poll_initial_ms,
        state.config.scrape_poll_max_ms,
        state.config.scrape_deadline_ms,
    );

    match await_terminal(state.scraper.as_ref(), &job_id, schedule).await {
        Some(job) if job.status == JobStatus::Completed => {
            let content = apply_history_fallback(assemble_results(&job.results), history);
            if content.is_thin {
                debug!("Assembled content for job {job_id} is thin; proceeding anyway");
            }
            let text =
                route_grounded(&state.llm, intent, &content.text, profile, message).await?;
            Ok((text, Some(job_id)))
        }
        Some(job) if job.status.is_terminal() => {
            // Failed or Error: the page could not be scraped.
            warn!("Scrape job {job_id} ended as {:?}; falling back to chat", job.status);
            state.metrics.chat_fallback("scrape_job_failed");
            let text = route_chat(&state.llm, history, message, context, profile).await?;
            Ok((text, Some(job_id)))
        }
        _ => {
            // Deadline reached with the job still pending (or never
            // observed). Unknown outcome, not a failure: report the job.
            state.metrics.scrape_timeout();
            Ok((
                SCRAPE_PENDING_REPLY.replace("{job_id}", &job_id),
                Some(job_id),
            ))
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::intent::Intent;
    use crate::config::{Config, Environment};
    use crate::llm_client::LlmClient;
    use crate::metrics::testing::RecordingMetrics;
    use crate::quota::QuotaLedger;
    use crate::scrape::client::{ScrapeApi, ScrapeError, ScrapeJob, ScrapeResult};
    use crate::session::SessionService;
    use async_trait::async_trait;
    use axum::http::HeaderValue;
    use std::sync::Arc;

    struct StubScraper {
        submit_result: Result<String, ()>,
        status: JobStatus,
    }

    #[async_trait]
    impl ScrapeApi for StubScraper {
        async fn submit(&self, _url: &str) -> Result<String, ScrapeError> {
            match &self.submit_result {
                Ok(id) => Ok(id.clone()),
                Err(()) => Err(ScrapeError::Api {
                    status: 503,
                    message: "down".to_string(),
                }),
            }
        }

        async fn status(&self, job_id: &str) -> Result<ScrapeJob, ScrapeError> {
            Ok(ScrapeJob {
                id: job_id.to_string(),
                status: self.status,
                results: vec![ScrapeResult {
                    content: "<p>ok</p>".to_string(),
                    title: None,
                    url: None,
                }],
            })
        }
    }

    fn test_state(scraper: StubScraper) -> (AppState, Arc<RecordingMetrics>) {
        let metrics = Arc::new(RecordingMetrics::default());
        let config = Config {
            anthropic_api_key: "test-key".to_string(),
            redis_url: "redis://127.0.0.1".to_string(),
            scraper_base_url: "http://127.0.0.1:1".to_string(),
            session_secret: "secret".to_string(),
            verification_secret: None,
            verification_url: String::new(),
            environment: Environment::Development,
            require_verification: false,
            daily_quota: 50,
            candidate_profile: "Candidate profile".to_string(),
            scrape_deadline_ms: 100,
            scrape_poll_initial_ms: 10,
            scrape_poll_max_ms: 40,
            port: 0,
            rust_log: "info".to_string(),
        };
        let state = AppState {
            llm: LlmClient::new("test-key".to_string()),
            scraper: Arc::new(scraper),
            quota: QuotaLedger::new(
                redis::Client::open("redis://127.0.0.1").expect("valid test redis url"),
            ),
            sessions: SessionService::new("secret"),
            verifier: None,
            metrics: metrics.clone(),
            config,
        };
        (state, metrics)
    }

    #[test]
    fn test_bearer_token_parses_authorization_header() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes_and_empty() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&headers).is_none());

        assert!(bearer_token(&HeaderMap::new()).is_none());
    }

    #[tokio::test]
    async fn test_ungrounded_fit_intent_gets_clarifying_reply() {
        let (state, _) = test_state(StubScraper {
            submit_result: Ok("job-1".to_string()),
            status: JobStatus::Completed,
        });
        let classification = Classification {
            intent: Intent::FitAssessment,
            target_url: None,
            pasted_text: None,
        };

        let (reply, job_id) = orchestrate(&state, &classification, "good fit?", &[], None)
            .await
            .unwrap();
        assert_eq!(reply, CLARIFY_REPLY);
        assert!(job_id.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_pending_job_at_deadline_reports_job_accepted() {
        let (state, metrics) = test_state(StubScraper {
            submit_result: Ok("job-9".to_string()),
            status: JobStatus::Pending,
        });
        let classification = Classification {
            intent: Intent::ScrapeRequest,
            target_url: Some("https://example.com".to_string()),
            pasted_text: None,
        };

        let (reply, job_id) =
            orchestrate(&state, &classification, "scrape example.com", &[], None)
                .await
                .unwrap();
        assert!(reply.contains("job-9"));
        assert_eq!(job_id.as_deref(), Some("job-9"));
        assert!(metrics.recorded().contains(&"scrape_timeout".to_string()));
    }
}
