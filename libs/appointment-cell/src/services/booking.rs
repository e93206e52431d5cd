use chrono::NaiveTime;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use notification_cell::models::{AppointmentEmailRequest, EmailOutcome};
use notification_cell::services::EmailService;
use patient_cell::models::CreatePatientRequest;
use patient_cell::services::PatientService;
use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};
use shared_utils::dates;

use crate::models::{AppointmentError, BookAppointmentRequest};

const BOOKING_SELECT: &str = "id,appointment_date,appointment_time,status,created_at,\
doctor:doctors(id,name,email,specialty:specialties(name)),\
patient:patients(id,name,email,phone)";

/// Public booking writer. Uniqueness of the slot is delegated to the
/// partial unique index on appointments
/// `(doctor_id, appointment_date, appointment_time) WHERE status <> 'cancelled'`;
/// the insert goes first and a conflict from the store means the slot was
/// taken, racing writers included.
pub struct BookingService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    pub async fn book(&self, request: BookAppointmentRequest) -> Result<Value, AppointmentError> {
        validate_booking(&request)?;

        let patient_service = PatientService::new(&self.config);
        let patient = patient_service
            .find_or_create(CreatePatientRequest {
                name: request.patient_info.name.clone(),
                email: request.patient_info.email.clone(),
                phone: request.patient_info.phone.clone(),
            })
            .await
            .map_err(|e| match e {
                patient_cell::models::PatientError::Validation(msg) => {
                    AppointmentError::Validation(msg)
                }
                other => AppointmentError::Patient(other.to_string()),
            })?;

        debug!(
            "Booking slot {} {} for doctor {}",
            request.appointment_date, request.appointment_time, request.doctor_id
        );

        let body = json!({
            "doctor_id": request.doctor_id,
            "patient_id": patient.id,
            "appointment_date": request.appointment_date,
            "appointment_time": request.appointment_time,
            "status": "scheduled",
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let path = format!("/rest/v1/appointments?select={}", BOOKING_SELECT);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, &path, Some(body), Some(headers))
            .await
            .map_err(|e| match e {
                SupabaseError::Conflict(_) => AppointmentError::SlotTaken,
                other => AppointmentError::Database(other.to_string()),
            })?;

        let appointment = rows
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Failed to create appointment".to_string()))?;

        info!(
            "Appointment {} booked for patient {}",
            appointment["id"], patient.id
        );

        self.spawn_confirmation_email(&appointment);

        Ok(appointment)
    }

    /// Confirmation emails are best effort: the booking response never
    /// waits on SMTP and a delivery failure is only logged.
    fn spawn_confirmation_email(&self, appointment: &Value) {
        let email_request = AppointmentEmailRequest {
            doctor_name: string_at(appointment, &["doctor", "name"]),
            specialty_name: string_at(appointment, &["doctor", "specialty", "name"]),
            patient_name: string_at(appointment, &["patient", "name"]),
            patient_email: string_at(appointment, &["patient", "email"]),
            patient_phone: string_at(appointment, &["patient", "phone"]),
            appointment_date: string_at(appointment, &["appointment_date"]),
            appointment_time: string_at(appointment, &["appointment_time"]),
        };

        let config = self.config.clone();
        tokio::spawn(async move {
            let service = match EmailService::new(&config) {
                Ok(service) => service,
                Err(e) => {
                    warn!("Skipping confirmation email: {}", e);
                    return;
                }
            };
            if let EmailOutcome::Failed(reason) = service.send_confirmation(&email_request).await {
                warn!("Confirmation email failed: {}", reason);
            }
        });
    }
}

fn validate_booking(request: &BookAppointmentRequest) -> Result<(), AppointmentError> {
    if request.patient_info.name.trim().is_empty() || request.patient_info.email.trim().is_empty()
    {
        return Err(AppointmentError::Validation(
            "Patient name and email are required".to_string(),
        ));
    }
    if !dates::is_valid_date_string(&request.appointment_date) {
        return Err(AppointmentError::Validation(
            "Appointment date must be YYYY-MM-DD".to_string(),
        ));
    }
    if !is_valid_time_string(&request.appointment_time) {
        return Err(AppointmentError::Validation(
            "Appointment time must be HH:MM".to_string(),
        ));
    }
    Ok(())
}

pub fn is_valid_time_string(value: &str) -> bool {
    value.len() == 5 && NaiveTime::parse_from_str(value, "%H:%M").is_ok()
}

fn string_at(value: &Value, path: &[&str]) -> String {
    let mut current = value;
    for key in path {
        current = &current[*key];
    }
    current.as_str().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patient_cell::PatientInfo;
    use uuid::Uuid;

    fn request(date: &str, time: &str) -> BookAppointmentRequest {
        BookAppointmentRequest {
            doctor_id: Uuid::new_v4(),
            appointment_date: date.to_string(),
            appointment_time: time.to_string(),
            patient_info: PatientInfo {
                name: "Juan Pérez".to_string(),
                email: "juan@test.com".to_string(),
                phone: Some("123456".to_string()),
            },
        }
    }

    #[test]
    fn accepts_well_formed_booking() {
        assert!(validate_booking(&request("2024-01-30", "09:30")).is_ok());
    }

    #[test]
    fn rejects_malformed_date_and_time() {
        assert!(validate_booking(&request("30/01/2024", "09:30")).is_err());
        assert!(validate_booking(&request("2024-01-30", "9:30")).is_err());
        assert!(validate_booking(&request("2024-01-30", "09:30:00")).is_err());
        assert!(validate_booking(&request("2024-01-30", "25:00")).is_err());
    }

    #[test]
    fn rejects_blank_patient_details() {
        let mut r = request("2024-01-30", "09:30");
        r.patient_info.email = "  ".to_string();
        assert!(validate_booking(&r).is_err());
    }

    #[test]
    fn extracts_nested_email_fields() {
        let appointment = serde_json::json!({
            "appointment_date": "2024-01-30",
            "doctor": { "name": "García", "specialty": { "name": "Cardiología" } },
            "patient": { "name": "Juan" }
        });
        assert_eq!(string_at(&appointment, &["doctor", "name"]), "García");
        assert_eq!(
            string_at(&appointment, &["doctor", "specialty", "name"]),
            "Cardiología"
        );
        assert_eq!(string_at(&appointment, &["patient", "phone"]), "");
    }
}
