//! REST request handlers: linkage, algorithm management, health.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::{ApiResponse, AppError};
use crate::matching::{self, AlgorithmConfig, LinkResult};
use crate::models::RawPiiRecord;
use crate::pii;

use super::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    responses((status = 200, description = "Service is healthy", body = HealthResponse))
)]
pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: "mpi-linkage".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `POST /api/v1/link` request body (§6).
#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkRequest {
    pub record: RawPiiRecord,
    pub algorithm: Option<String>,
    pub external_patient_id: Option<String>,
    pub external_person_id: Option<String>,
    pub external_person_source: Option<String>,
}

/// Normalizes, cleans, and links one incoming record against the resolved
/// algorithm, per §4.1-§4.7 end to end.
#[utoipa::path(
    post,
    path = "/api/v1/link",
    tag = "linkage",
    request_body = LinkRequest,
    responses(
        (status = 200, description = "Record linked", body = LinkResult),
        (status = 400, description = "Invalid or empty record"),
        (status = 422, description = "Invalid algorithm"),
    )
)]
pub async fn link_patient(
    State(state): State<AppState>,
    Json(payload): Json<LinkRequest>,
) -> Result<Json<ApiResponse<LinkResult>>, AppError> {
    let normalized = pii::normalize(&payload.record)?;

    let label = payload
        .algorithm
        .as_deref()
        .unwrap_or_else(|| state.algorithm_cache.default_label());
    let config = state.algorithm_cache.get(label)?;

    let cleaned = pii::clean_record(&normalized, &config.skip_values);
    if cleaned.is_empty() {
        return Err(AppError(crate::Error::EmptyRecord));
    }

    let result = matching::link(
        state.repository.as_ref(),
        &config,
        &normalized,
        &cleaned,
        payload.external_patient_id,
        payload.external_person_id,
        payload.external_person_source,
    )?;

    if let Some(person_reference_id) = result.person_reference_id {
        let pass_label = result.results.first().map(|r| r.pass_label.as_str());
        state.audit_log.log_link_decision(
            result.patient_reference_id,
            person_reference_id,
            result.match_grade,
            pass_label,
        )?;
    }

    Ok(Json(ApiResponse::success(result)))
}

/// Uploads a brand-new algorithm. Algorithms are immutable (§4.8): a repeat
/// upload of an existing label is a `409 Conflict`.
#[utoipa::path(
    post,
    path = "/api/v1/algorithms",
    tag = "algorithms",
    request_body = AlgorithmConfig,
    responses(
        (status = 201, description = "Algorithm stored"),
        (status = 409, description = "Label already exists"),
        (status = 422, description = "Algorithm failed validation"),
    )
)]
pub async fn upload_algorithm(
    State(state): State<AppState>,
    Json(config): Json<AlgorithmConfig>,
) -> Result<impl IntoResponse, AppError> {
    let label = config.label.clone();
    state.algorithm_cache.insert(config)?;
    Ok((axum::http::StatusCode::CREATED, Json(ApiResponse::success(label))))
}

#[utoipa::path(
    get,
    path = "/api/v1/algorithms/{label}",
    tag = "algorithms",
    params(("label" = String, Path, description = "Algorithm label")),
    responses(
        (status = 200, description = "Algorithm configuration", body = AlgorithmConfig),
        (status = 422, description = "No such algorithm"),
    )
)]
pub async fn get_algorithm(
    State(state): State<AppState>,
    Path(label): Path<String>,
) -> Result<Json<ApiResponse<AlgorithmConfig>>, AppError> {
    let config = state.algorithm_cache.get(&label)?;
    Ok(Json(ApiResponse::success((*config).clone())))
}
