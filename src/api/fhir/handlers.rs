//! FHIR-shaped entry point: accepts a `Patient` resource, converts it with
//! `to_raw_pii_record`, and runs the same linkage path as the REST handler.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::api::rest::AppState;
use crate::api::ApiResponse;
use crate::matching;
use crate::pii;

use super::resources::{FhirOperationOutcome, FhirPatient};
use super::to_raw_pii_record;

#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    pub algorithm: Option<String>,
}

/// Wraps a `crate::Error` as a FHIR `OperationOutcome` rather than the REST
/// path's generic envelope, per the FHIR error convention.
pub struct FhirError(crate::Error);

impl From<crate::Error> for FhirError {
    fn from(err: crate::Error) -> Self {
        FhirError(err)
    }
}

impl IntoResponse for FhirError {
    fn into_response(self) -> Response {
        use crate::Error::*;

        let (status, code) = match &self.0 {
            InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid"),
            EmptyRecord => (StatusCode::UNPROCESSABLE_ENTITY, "invalid"),
            InvalidAlgorithm(_) => (StatusCode::UNPROCESSABLE_ENTITY, "processing"),
            Conflict(_) => (StatusCode::CONFLICT, "duplicate"),
            StorageUnavailable(_) | Database(_) | Pool(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "transient")
            }
            Api(_) | Config(_) | Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "exception"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "fhir request failed");
        } else {
            tracing::warn!(error = %self.0, "fhir request rejected");
        }

        (status, Json(FhirOperationOutcome::error(code, &self.0.to_string()))).into_response()
    }
}

/// `POST /fhir/Patient/$link`: FHIR counterpart of `POST /api/v1/link`.
pub async fn link_fhir_patient(
    State(state): State<AppState>,
    Query(query): Query<LinkQuery>,
    Json(patient): Json<FhirPatient>,
) -> Result<impl IntoResponse, FhirError> {
    let raw = to_raw_pii_record(&patient);
    let normalized = pii::normalize(&raw)?;

    let label = query
        .algorithm
        .as_deref()
        .unwrap_or_else(|| state.algorithm_cache.default_label());
    let config = state.algorithm_cache.get(label)?;
    let cleaned = pii::clean_record(&normalized, &config.skip_values);
    if cleaned.is_empty() {
        return Err(FhirError(crate::Error::EmptyRecord));
    }

    let result = matching::link(
        state.repository.as_ref(),
        &config,
        &normalized,
        &cleaned,
        None,
        None,
        None,
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

    Ok((StatusCode::OK, Json(ApiResponse::success(result))))
}
