pub mod context;
pub mod response;
pub mod rides;

use std::sync::Arc;

use axum::BoxError;
use axum::Json;
use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde::Serialize;
use tower::ServiceBuilder;
use tower::timeout::TimeoutLayer;
use tower::timeout::error::Elapsed;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::error;

use crate::api::rest::context::correlation_id;
use crate::api::rest::response::ResponseFormatter;
use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let origin = state.formatter.allowed_origin();
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        AllowOrigin::exact(origin.clone())
    };
    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    let formatter = state.formatter.clone();
    let handle_middleware_error = move |headers: HeaderMap, err: BoxError| {
        let formatter = formatter.clone();
        async move { middleware_failure(&formatter, &headers, err) }
    };

    Router::new()
        .merge(rides::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors)
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .layer(TimeoutLayer::new(state.request_timeout)),
        )
        .with_state(state)
}

/// Turns errors raised by the middleware stack into the usual failure body.
fn middleware_failure(
    formatter: &ResponseFormatter,
    headers: &HeaderMap,
    err: BoxError,
) -> Response {
    let correlation_id = correlation_id(headers);
    let app_error = if err.is::<Elapsed>() {
        AppError::Internal("request timed out".to_string())
    } else {
        AppError::Internal(format!("unhandled middleware error: {err}"))
    };

    error!(correlation_id, error = %app_error, "request aborted by middleware");
    formatter.failure(&app_error, &correlation_id)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    fleet_size: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        fleet_size: state.fleet.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
