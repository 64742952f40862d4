use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Derives the per-caller identity used for quota and session scoping.
///
/// Takes the first hop of `x-forwarded-for` when present (the client as seen
/// by the outermost proxy), falling back to the raw peer address.
pub fn client_identity(headers: &HeaderMap, peer: SocketAddr) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
        .unwrap_or_else(|| peer.ip().to_string())
}
