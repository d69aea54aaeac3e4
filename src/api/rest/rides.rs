use std::sync::Arc;

use axum::Router;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use tracing::warn;

use crate::api::rest::context::RequestContext;
use crate::error::AppError;
use crate::models::ride::RideId;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/ride", post(request_ride))
        .route("/ride/:id", get(get_ride))
}

async fn request_ride(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            let err = match context.identity {
                None => AppError::Unauthenticated,
                Some(_) => AppError::InvalidInput(format!(
                    "unreadable request body: {}",
                    rejection.body_text()
                )),
            };
            warn!(
                correlation_id = %context.correlation_id,
                error = %err,
                "ride request rejected before dispatch"
            );
            return state.formatter.failure(&err, &context.correlation_id);
        }
    };

    match state
        .dispatcher
        .dispatch(context.identity.as_ref(), &body, &context.correlation_id)
        .await
    {
        Ok(ride) => state.formatter.success(StatusCode::CREATED, &ride),
        Err(err) => state.formatter.failure(&err, &context.correlation_id),
    }
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    context: RequestContext,
    Path(id): Path<String>,
) -> Response {
    let ride_id = RideId::new(id);
    match state
        .dispatcher
        .lookup(context.identity.as_ref(), &ride_id, &context.correlation_id)
        .await
    {
        Ok(record) => state.formatter.success(StatusCode::OK, &record),
        Err(err) => state.formatter.failure(&err, &context.correlation_id),
    }
}
