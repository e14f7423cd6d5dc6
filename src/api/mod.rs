//! Shared API types: the success envelope and the `crate::Error` -> HTTP
//! mapping (§7).

pub mod fhir;
pub mod rest;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Standard success envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

/// Error body nested under a failed `ApiResponse`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self { success: true, data: Some(data), error: None }
    }
}

/// Wraps `crate::Error` for handlers so `?` can produce a response directly.
/// Each error kind maps to the status and stable code a caller can match on;
/// ambient storage/transport failures are folded into the nearest of the two.
pub struct AppError(pub crate::Error);

impl From<crate::Error> for AppError {
    fn from(err: crate::Error) -> Self {
        AppError(err)
    }
}

/// Literal `{"detail": "..."}` body mandated by §6 for the two
/// well-known-to-callers rejections: empty record and unknown algorithm.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DetailError {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use crate::Error::*;

        let (status, code) = match &self.0 {
            InvalidInput(_) => (StatusCode::BAD_REQUEST, "INVALID_INPUT"),
            EmptyRecord => (StatusCode::UNPROCESSABLE_ENTITY, "EMPTY_RECORD"),
            InvalidAlgorithm(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_ALGORITHM"),
            Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            StorageUnavailable(_) | Database(_) | Pool(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
            Api(_) | Config(_) | Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }

        match &self.0 {
            EmptyRecord => {
                let body = DetailError { detail: self.0.to_string() };
                (status, Json(body)).into_response()
            }
            InvalidAlgorithm(msg) => {
                let body = DetailError { detail: msg.clone() };
                (status, Json(body)).into_response()
            }
            _ => {
                let body: ApiResponse<()> = ApiResponse {
                    success: false,
                    data: None,
                    error: Some(ApiError { code: code.to_string(), message: self.0.to_string() }),
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
