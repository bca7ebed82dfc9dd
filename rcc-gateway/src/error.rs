//! Maps domain errors onto the HTTP response envelope (spec §6, §4.3).

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rcc_core::manager::ManagerError;
use rcc_core::orchestrator::OrchestratorError;
use rcc_proto::ApiResponse;

pub struct ApiError {
    status: StatusCode,
    body: ApiResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

impl From<OrchestratorError> for ApiError {
    fn from(e: OrchestratorError) -> Self {
        let status = StatusCode::from_u16(e.code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        ApiError {
            status,
            body: ApiResponse::error(e.code.as_str(), e.message),
        }
    }
}

impl From<ManagerError> for ApiError {
    fn from(e: ManagerError) -> Self {
        match e {
            ManagerError::NotFound => ApiError {
                status: StatusCode::NOT_FOUND,
                body: ApiResponse::error("NOT_FOUND", "radio not found"),
            },
            ManagerError::LoadUnavailable => ApiError {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: ApiResponse::error("UNAVAILABLE", "radio unavailable while loading capabilities"),
            },
        }
    }
}

pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError {
        status: StatusCode::BAD_REQUEST,
        body: ApiResponse::error("INVALID_RANGE", message),
    }
}

/// Unwrap a `Json<T>` extraction result into the envelope of spec §6 rather
/// than axum's plain-text default ("Malformed JSON → HTTP 400 with
/// `INVALID_RANGE`"). Handlers take `Result<Json<T>, JsonRejection>` so a
/// malformed body never reaches axum's own rejection response.
pub fn require_json<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| bad_request(format!("malformed request body: {rejection}")))
}
