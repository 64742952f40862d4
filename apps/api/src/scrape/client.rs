//! HTTP client for the external scraping service.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SUBMIT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Status of a job owned by the scraping service.
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Failed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// One scraped page as returned by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub content: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Last observed snapshot of a scrape job. This service only ever holds the
/// job id and the most recent status observation; the job itself lives in
/// the scraping service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeJob {
    #[serde(default)]
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub results: Vec<ScrapeResult>,
}

/// The scraping service seam. The orchestrator and handlers depend on this
/// trait so tests can drive polling with scripted status sequences.
#[async_trait]
pub trait ScrapeApi: Send + Sync {
    /// Submits a URL for scraping. A failure here is surfaced, not retried.
    async fn submit(&self, url: &str) -> Result<String, ScrapeError>;

    /// Fetches the current status snapshot for a job.
    async fn status(&self, job_id: &str) -> Result<ScrapeJob, ScrapeError>;
}

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

/// Production `ScrapeApi` over HTTP.
#[derive(Clone)]
pub struct HttpScrapeClient {
    client: Client,
    base_url: String,
}

impl HttpScrapeClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(SUBMIT_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn read_error(response: reqwest::Response) -> ScrapeError {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        ScrapeError::Api { status, message }
    }
}

#[async_trait]
impl ScrapeApi for HttpScrapeClient {
    async fn submit(&self, url: &str) -> Result<String, ScrapeError> {
        let response = self
            .client
            .post(format!("{}/v1/jobs", self.base_url))
            .json(&SubmitRequest { url })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        let submitted: SubmitResponse = response.json().await?;
        Ok(submitted.job_id)
    }

    async fn status(&self, job_id: &str) -> Result<ScrapeJob, ScrapeError> {
        let response = self
            .client
            .get(format!("{}/v1/jobs/{job_id}", self.base_url))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_error(response).await);
        }

        Ok(response.json().await?)
    }
}
