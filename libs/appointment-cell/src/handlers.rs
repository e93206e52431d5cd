use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use tracing::error;

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{
    AdminAppointmentsQuery, AdminCreateAppointmentRequest, AdminUpdateAppointmentRequest,
    AppointmentError, BookAppointmentRequest, DeleteAppointmentRequest, UpdateStatusRequest,
};
use crate::services::{AdminAppointmentService, BookingService};

fn map_error(error: AppointmentError) -> AppError {
    match error {
        AppointmentError::SlotTaken => {
            AppError::Conflict("The selected slot is already taken".to_string())
        }
        AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
        AppointmentError::InvalidStatusTransition { .. } => {
            AppError::BadRequest(error.to_string())
        }
        AppointmentError::Validation(msg) => AppError::BadRequest(msg),
        other => {
            error!("Appointment operation failed: {}", other);
            AppError::Internal("Error processing appointment".to_string())
        }
    }
}

/// Public booking endpoint.
#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = BookingService::new(&state);
    let appointment = service.book(request).await.map_err(map_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "appointment": appointment })),
    ))
}

#[axum::debug_handler]
pub async fn get_admin_appointments(
    State(state): State<Arc<AppConfig>>,
    Query(query): Query<AdminAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAppointmentService::new(&state);
    let page = service.search_appointments(query).await.map_err(map_error)?;

    Ok(Json(serde_json::to_value(page).map_err(|e| {
        error!("Failed to serialize appointment page: {}", e);
        AppError::Internal("Error fetching appointments".to_string())
    })?))
}

#[axum::debug_handler]
pub async fn update_appointment_status(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAppointmentService::new(&state);
    let appointment = service
        .update_status(request.appointment_id, request.status)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn create_admin_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AdminCreateAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let service = AdminAppointmentService::new(&state);
    let appointment = service.create_appointment(request).await.map_err(map_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "appointment": appointment })),
    ))
}

#[axum::debug_handler]
pub async fn update_admin_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AdminUpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAppointmentService::new(&state);
    let appointment = service.update_appointment(request).await.map_err(map_error)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn delete_admin_appointment(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<DeleteAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAppointmentService::new(&state);
    let appointment = service
        .delete_appointment(request.appointment_id)
        .await
        .map_err(map_error)?;

    Ok(Json(json!({ "success": true, "appointment": appointment })))
}

#[axum::debug_handler]
pub async fn get_admin_stats(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AdminAppointmentService::new(&state);
    let stats = service.stats().await.map_err(map_error)?;

    Ok(Json(stats))
}
