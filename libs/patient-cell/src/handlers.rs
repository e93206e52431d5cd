use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};
use tracing::error;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{CreatePatientRequest, PatientError};
use crate::services::PatientService;

#[axum::debug_handler]
pub async fn get_patients(State(state): State<Arc<AppConfig>>) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(&state);

    let patients = service.list_patients().await.map_err(|e| {
        error!("Error fetching patients: {}", e);
        AppError::Internal("Error fetching patients".to_string())
    })?;

    Ok(Json(json!({ "patients": patients })))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = PatientService::new(&state);

    let patient = service.create_patient(request).await.map_err(|e| match e {
        PatientError::Validation(msg) => AppError::BadRequest(msg),
        PatientError::DuplicateEmail(_) => {
            AppError::Conflict("A patient with this email already exists".to_string())
        }
        other => {
            error!("Error creating patient: {}", other);
            AppError::Internal("Error creating patient".to_string())
        }
    })?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "patient": patient })),
    ))
}
