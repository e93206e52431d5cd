use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use patient_cell::PatientInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Scheduled,
    Completed,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::Scheduled => "scheduled",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", s)
    }
}

/// Raw appointment row. Date and time stay strings on this side of the
/// wire; parsing happens where the values are interpreted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Public booking payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookAppointmentRequest {
    pub doctor_id: Uuid,
    pub appointment_date: String,
    pub appointment_time: String,
    pub patient_info: PatientInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    pub appointment_id: Uuid,
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminCreateAppointmentRequest {
    pub doctor_id: Uuid,
    pub patient_id: Uuid,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUpdateAppointmentRequest {
    pub appointment_id: Uuid,
    pub doctor_id: Option<Uuid>,
    pub patient_id: Option<Uuid>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAppointmentRequest {
    pub appointment_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    Date,
    Doctor,
    Patient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAppointmentsQuery {
    pub search: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub status: Option<String>,
    pub doctor_id: Option<Uuid>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<SortBy>,
    pub sort_order: Option<SortOrder>,
}

/// One page of the admin appointment listing, rows carrying embedded
/// doctor/specialty/patient details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminAppointmentsPage {
    pub appointments: Vec<serde_json::Value>,
    pub total_count: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Error)]
pub enum AppointmentError {
    #[error("The selected slot is already taken")]
    SlotTaken,

    #[error("Appointment not found")]
    NotFound,

    #[error("Cannot change status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Patient error: {0}")]
    Patient(String),

    #[error("Database error: {0}")]
    Database(String),
}
