use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;
use shared_utils::dates;

use crate::models::{AvailableTimesQuery, DoctorListQuery};
use crate::services::availability::AvailabilityService;
use crate::services::cache::{ReferenceCache, DOCTORS_TTL, SPECIALTIES_TTL};
use crate::services::doctor::DoctorService;

/// State for the public reference-data routes: config plus the shared
/// TTL cache living for the life of the process.
#[derive(Clone)]
pub struct DoctorState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<ReferenceCache>,
}

#[axum::debug_handler]
pub async fn get_specialties(
    State(state): State<DoctorState>,
) -> Result<Json<Value>, AppError> {
    if let Some(cached) = state.cache.get("specialties").await {
        return Ok(Json(json!({ "specialties": cached })));
    }

    let service = DoctorService::new(&state.config);
    let specialties = service
        .list_specialties()
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let value = json!(specialties);
    state.cache.set("specialties", value.clone(), SPECIALTIES_TTL).await;

    Ok(Json(json!({ "specialties": value })))
}

#[axum::debug_handler]
pub async fn get_doctors(
    State(state): State<DoctorState>,
    Query(params): Query<DoctorListQuery>,
) -> Result<Json<Value>, AppError> {
    let cache_key = match params.specialty_id {
        Some(id) => format!("doctors_{}", id),
        None => "doctors_all".to_string(),
    };

    if let Some(cached) = state.cache.get(&cache_key).await {
        return Ok(Json(json!({ "doctors": cached })));
    }

    let service = DoctorService::new(&state.config);
    let specialty_id = params.specialty_id.map(|id| id.to_string());
    let doctors = service
        .list_active_doctors(specialty_id.as_deref())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let value = json!(doctors);
    state.cache.set(&cache_key, value.clone(), DOCTORS_TTL).await;

    Ok(Json(json!({ "doctors": value })))
}

/// Admin view of a doctor's open slots for one date.
#[axum::debug_handler]
pub async fn get_available_times(
    State(config): State<Arc<AppConfig>>,
    Query(params): Query<AvailableTimesQuery>,
) -> Result<Json<Value>, AppError> {
    let (Some(doctor_id), Some(date)) = (params.doctor_id, params.date) else {
        return Err(AppError::BadRequest(
            "Doctor ID and date are required".to_string(),
        ));
    };

    if !dates::is_valid_date_string(&date) {
        return Err(AppError::BadRequest(format!("Invalid date: {}", date)));
    }

    let service = AvailabilityService::new(&config);
    let available_times = service
        .available_times(&doctor_id, &date)
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(Json(json!({ "availableTimes": available_times })))
}
