//! `ClientMeta` extractor: caller IP and user agent for audit entries.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::HeaderMap;
use axum::http::request::Parts;

use adminguard_auth::ClientInfo;

use crate::state::AppState;

/// Placeholder recorded when no address is known.
const UNKNOWN_IP: &str = "unknown";

/// Client metadata of the current request.
#[derive(Debug, Clone)]
pub struct ClientMeta(pub ClientInfo);

impl ClientMeta {
    /// Returns the inner `ClientInfo`.
    pub fn info(&self) -> &ClientInfo {
        &self.0
    }

    /// Resolves the caller address. The first `x-forwarded-for` hop is used
    /// only when `trust_forwarded` is set; otherwise the socket address.
    pub fn from_parts(
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
        trust_forwarded: bool,
    ) -> ClientInfo {
        let forwarded = headers
            .get("x-forwarded-for")
            .filter(|_| trust_forwarded)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(String::from);

        let ip_address = forwarded
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| UNKNOWN_IP.to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        ClientInfo::new(ip_address, user_agent)
    }
}

impl FromRequestParts<AppState> for ClientMeta {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self(Self::from_parts(
            &parts.headers,
            peer,
            state.config.server.trust_forwarded_for,
        )))
    }
}
