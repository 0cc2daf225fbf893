//! Token check for co-host websocket connections

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, Response, StatusCode, Uri},
    middleware::Next,
    response::IntoResponse,
};
use std::sync::Arc;

use crate::types::Role;
use crate::ws::{parse_role, WsQuery};

/// Co-host authentication configuration
#[derive(Debug, Clone, Default)]
pub struct CohostAuth {
    /// Token the co-host must present (None = auth disabled)
    pub token: Option<String>,
}

impl CohostAuth {
    pub fn new(token: Option<String>) -> Self {
        if token.is_some() {
            tracing::info!("Co-host authentication enabled");
        } else {
            tracing::warn!("Co-host authentication DISABLED - anyone can take over the co-host role!");
        }
        Self { token }
    }

    pub fn is_enabled(&self) -> bool {
        self.token.is_some()
    }

    pub fn validate(&self, token: Option<&str>) -> bool {
        match (&self.token, token) {
            (Some(expected), Some(given)) => constant_time_eq(expected.as_bytes(), given.as_bytes()),
            (Some(_), None) => false,
            (None, _) => true,
        }
    }
}

/// Constant-time byte comparison to prevent timing attacks
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Whether a request may go ahead with the role it asks for.
///
/// The query is decoded with the same extractor the socket handler uses, so
/// both sides always agree on the role and the token.
pub fn ws_request_allowed(auth: &CohostAuth, uri: &Uri) -> bool {
    if uri.path() != "/ws" {
        return true;
    }
    let Ok(Query(params)) = Query::<WsQuery>::try_from_uri(uri) else {
        return false;
    };
    parse_role(params.role.as_deref()) != Role::Cohost || auth.validate(params.token.as_deref())
}

/// Reject co-host websocket upgrades that don't carry the right token
pub async fn cohost_ws_auth_middleware(
    State(auth): State<Arc<CohostAuth>>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    if ws_request_allowed(&auth, request.uri()) {
        return next.run(request).await;
    }

    tracing::warn!("Rejected co-host connection with invalid token");
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}
