use std::convert::Infallible;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::identity::CallerIdentity;
use crate::state::AppState;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request facts handed over by the layers in front of the handler.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub identity: Option<CallerIdentity>,
    pub correlation_id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // An in-process auth middleware wins over the forwarded header.
        let identity = parts
            .extensions
            .get::<CallerIdentity>()
            .cloned()
            .or_else(|| {
                parts
                    .headers
                    .get(&state.identity_header)
                    .and_then(|value| value.to_str().ok())
                    .and_then(CallerIdentity::new)
            });

        Ok(Self {
            identity,
            correlation_id: correlation_id(&parts.headers),
        })
    }
}

/// Request id set by the request-id layer, or a fresh one if it is missing.
pub fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}
