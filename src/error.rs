/*
 * Responsibility
 * - Gateway-generated errors (path guard, policy rejections, routing,
 *   upstream failures, transport timeouts)
 * - IntoResponse with the shared JSON error body
 * - Responses relayed from upstreams never pass through here
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("path contains dot segments")]
    InvalidPath,
    #[error("unauthorized")]
    Unauthorized,
    #[error("no route for {path}")]
    NoRoute { path: String },
    #[error("request body too large")]
    PayloadTooLarge,
    #[error("upstream {route} unavailable")]
    BadGateway { route: String },
    #[error("request timed out")]
    GatewayTimeout,
    #[error("internal server error")]
    Internal,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::InvalidPath => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AppError::NoRoute { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::PayloadTooLarge => (StatusCode::PAYLOAD_TOO_LARGE, "PAYLOAD_TOO_LARGE"),
            AppError::BadGateway { .. } => (StatusCode::BAD_GATEWAY, "BAD_GATEWAY"),
            AppError::GatewayTimeout => (StatusCode::GATEWAY_TIMEOUT, "GATEWAY_TIMEOUT"),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code,
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
