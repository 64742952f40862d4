//! Axum route handlers for session issuance.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::identity::client_identity;
use crate::session::TokenFlags;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SessionRequest {
    #[serde(default)]
    pub verification_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    /// Epoch milliseconds.
    pub expires_at: i64,
}

/// POST /api/v1/session
///
/// Issues a session token for the caller. Three mutually exclusive paths,
/// evaluated in order:
/// (a) gating administratively disabled  -> bypass token
/// (b) non-production, no provider secret -> dev token
/// (c) otherwise                          -> provider-verified plain token
pub async fn handle_issue_session(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    // Body is optional: the bypass and dev paths are commonly hit with an
    // empty POST.
    request: Option<Json<SessionRequest>>,
) -> Result<Json<SessionResponse>, AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let identity = client_identity(&headers, peer);

    let flags = if !state.config.require_verification {
        info!("Issuing bypass session token (gating disabled)");
        TokenFlags::bypass()
    } else if !state.config.is_production() && state.verifier.is_none() {
        info!("Issuing dev session token (non-production, no provider secret)");
        TokenFlags::dev()
    } else {
        let verifier = state.verifier.as_ref().ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "verification required but no provider secret configured"
            ))
        })?;

        let token = request
            .verification_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AppError::VerificationFailed)?;

        let verified = verifier
            .verify(token, &identity)
            .await
            .map_err(|e| AppError::VerificationUpstream(e.to_string()))?;

        if !verified {
            return Err(AppError::VerificationFailed);
        }

        TokenFlags::default()
    };

    let issued = state
        .sessions
        .issue(&identity, flags)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("token issuance failed: {e}")))?;

    Ok(Json(SessionResponse {
        token: issued.token,
        expires_at: issued.expires_at.timestamp_millis(),
    }))
}
