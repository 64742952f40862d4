//! Client for the external human-verification provider.
//!
//! The provider is an opaque collaborator: we forward the caller's challenge
//! token together with their address and read back a single success flag.

use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

const VERIFY_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
}

#[derive(Clone)]
pub struct VerificationClient {
    client: Client,
    url: String,
    secret: String,
}

impl VerificationClient {
    pub fn new(url: String, secret: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(VERIFY_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            url,
            secret,
        }
    }

    /// Forwards a challenge token to the provider. Returns the provider's
    /// verdict; transport errors are surfaced for the caller to map.
    pub async fn verify(&self, token: &str, client_ip: &str) -> Result<bool, VerificationError> {
        let response: VerifyResponse = self
            .client
            .post(&self.url)
            .form(&[
                ("secret", self.secret.as_str()),
                ("response", token),
                ("remoteip", client_ip),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.success)
    }
}
