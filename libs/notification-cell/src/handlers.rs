use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use tracing::error;

use shared_config::AppConfig;

use crate::models::{
    AppointmentEmailRequest, EmailError, EmailOutcome, EmailSendDetails, EmailSendResponse,
};
use crate::services::EmailService;

/// POST /api/send-email. Both recipients delivered → 200, partial → 207,
/// nothing delivered or transport misconfigured → 500.
#[axum::debug_handler]
pub async fn send_email(
    State(state): State<Arc<AppConfig>>,
    Json(request): Json<AppointmentEmailRequest>,
) -> (StatusCode, Json<EmailSendResponse>) {
    if let Err(EmailError::Validation(message)) = EmailService::validate(&request) {
        return (
            StatusCode::BAD_REQUEST,
            Json(EmailSendResponse {
                success: false,
                message: message.clone(),
                details: None,
                error: Some(message),
            }),
        );
    }

    let service = match EmailService::new(&state) {
        Ok(service) => service,
        Err(e) => {
            error!("Email transport unavailable: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EmailSendResponse {
                    success: false,
                    message: "Error de configuración del servidor de correo".to_string(),
                    details: None,
                    error: Some("Error de configuración del servidor de correo".to_string()),
                }),
            );
        }
    };

    match service.send_confirmation(&request).await {
        EmailOutcome::Sent {
            patient_email,
            office_email,
        } => (
            StatusCode::OK,
            Json(EmailSendResponse {
                success: true,
                message: "Emails enviados correctamente a paciente y consultorio".to_string(),
                details: Some(EmailSendDetails {
                    patient_email: Some(patient_email),
                    office_email: Some(office_email),
                    errors: None,
                }),
                error: None,
            }),
        ),
        EmailOutcome::Partial {
            patient_email,
            office_email,
            errors,
        } => (
            StatusCode::MULTI_STATUS,
            Json(EmailSendResponse {
                success: true,
                message: format!("Emails enviados parcialmente. Errores: {}", errors.join(", ")),
                details: Some(EmailSendDetails {
                    patient_email,
                    office_email,
                    errors: Some(errors),
                }),
                error: None,
            }),
        ),
        EmailOutcome::Failed(reason) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(EmailSendResponse {
                success: false,
                message: reason,
                details: None,
                error: Some("Error interno del servidor al enviar emails".to_string()),
            }),
        ),
    }
}
