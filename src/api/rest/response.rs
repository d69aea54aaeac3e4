use axum::Json;
use axum::http::header::ACCESS_CONTROL_ALLOW_ORIGIN;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AppError;

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct FailureBody<'a> {
    error: String,
    reference: &'a str,
}

/// Builds every ride response so browsers on the allowed origin can read it.
#[derive(Debug, Clone)]
pub struct ResponseFormatter {
    allowed_origin: HeaderValue,
}

impl ResponseFormatter {
    pub fn new(allowed_origin: HeaderValue) -> Self {
        Self { allowed_origin }
    }

    pub fn allowed_origin(&self) -> &HeaderValue {
        &self.allowed_origin
    }

    pub fn success<T: Serialize>(&self, status: StatusCode, payload: &T) -> Response {
        self.with_origin((status, Json(payload)).into_response())
    }

    pub fn failure(&self, err: &AppError, correlation_id: &str) -> Response {
        let body = FailureBody {
            error: err.public_message(),
            reference: correlation_id,
        };
        self.with_origin((err.status(), Json(body)).into_response())
    }

    fn with_origin(&self, mut response: Response) -> Response {
        response
            .headers_mut()
            .insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.allowed_origin.clone());
        response
    }
}
