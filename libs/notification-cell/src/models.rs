use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Appointment data for the confirmation emails, as submitted by the
/// booking flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentEmailRequest {
    pub doctor_name: String,
    pub specialty_name: String,
    pub patient_name: String,
    pub patient_email: String,
    #[serde(default)]
    pub patient_phone: String,
    pub appointment_date: String,
    pub appointment_time: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailSendDetails {
    pub patient_email: Option<String>,
    pub office_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailSendResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<EmailSendDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of the two-recipient send. `Partial` carries per-recipient
/// errors for the 207 response body.
#[derive(Debug)]
pub enum EmailOutcome {
    Sent {
        patient_email: String,
        office_email: String,
    },
    Partial {
        patient_email: Option<String>,
        office_email: Option<String>,
        errors: Vec<String>,
    },
    Failed(String),
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("Email is not configured: {0}")]
    NotConfigured(String),

    #[error("Invalid email request: {0}")]
    Validation(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),
}
