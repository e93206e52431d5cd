use lettre::{
    message::{Mailbox, MultiPart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::{debug, error, info};

use shared_config::AppConfig;
use shared_utils::dates;

use crate::models::{AppointmentEmailRequest, EmailError, EmailOutcome};

/// Sends the booking confirmation to the patient and the office mailbox
/// over SMTP. Plain text alternative included alongside the HTML body.
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    office_email: String,
}

impl EmailService {
    pub fn new(config: &AppConfig) -> Result<Self, EmailError> {
        if !config.is_email_configured() {
            return Err(EmailError::NotConfigured(
                "SMTP credentials are not set".to_string(),
            ));
        }

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
            .map_err(|e| EmailError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_user.clone(),
                config.smtp_password.clone(),
            ))
            .build();

        let from = format!("{} <{}>", config.email_from_name, config.smtp_user)
            .parse::<Mailbox>()
            .map_err(|e| EmailError::NotConfigured(format!("Invalid sender address: {}", e)))?;

        Ok(Self {
            mailer,
            from,
            office_email: config.office_email.clone(),
        })
    }

    pub fn validate(request: &AppointmentEmailRequest) -> Result<(), EmailError> {
        let required = [
            &request.doctor_name,
            &request.patient_name,
            &request.patient_email,
            &request.appointment_date,
            &request.appointment_time,
        ];
        if required.iter().any(|field| field.trim().is_empty()) {
            return Err(EmailError::Validation(
                "Faltan datos requeridos para enviar el email".to_string(),
            ));
        }
        Ok(())
    }

    /// Sends both emails concurrently. One failing recipient does not stop
    /// the other; the outcome reports per-recipient results.
    pub async fn send_confirmation(&self, request: &AppointmentEmailRequest) -> EmailOutcome {
        let formatted_date = dates::parse_ymd(&request.appointment_date)
            .map(dates::format_display_es)
            .unwrap_or_else(|| request.appointment_date.clone());

        let patient_message = match self.build_patient_message(request, &formatted_date) {
            Ok(message) => message,
            Err(e) => return EmailOutcome::Failed(e.to_string()),
        };
        let office_message = match self.build_office_message(request, &formatted_date) {
            Ok(message) => message,
            Err(e) => return EmailOutcome::Failed(e.to_string()),
        };

        debug!(
            "Sending confirmation emails for appointment on {} at {}",
            request.appointment_date, request.appointment_time
        );

        let (patient_result, office_result) = tokio::join!(
            self.mailer.send(patient_message),
            self.mailer.send(office_message)
        );

        match (patient_result, office_result) {
            (Ok(_), Ok(_)) => {
                info!("Confirmation emails sent to patient and office");
                EmailOutcome::Sent {
                    patient_email: request.patient_email.clone(),
                    office_email: self.office_email.clone(),
                }
            }
            (Err(pe), Err(oe)) => {
                error!("Both confirmation emails failed: patient: {}, office: {}", pe, oe);
                EmailOutcome::Failed(format!("Paciente: {}, Consultorio: {}", pe, oe))
            }
            (patient_result, office_result) => {
                let mut errors = Vec::new();
                let patient_email = match patient_result {
                    Ok(_) => Some(request.patient_email.clone()),
                    Err(e) => {
                        error!("Patient confirmation email failed: {}", e);
                        errors.push(format!("Paciente: {}", e));
                        None
                    }
                };
                let office_email = match office_result {
                    Ok(_) => Some(self.office_email.clone()),
                    Err(e) => {
                        error!("Office notification email failed: {}", e);
                        errors.push(format!("Consultorio: {}", e));
                        None
                    }
                };
                EmailOutcome::Partial {
                    patient_email,
                    office_email,
                    errors,
                }
            }
        }
    }

    fn build_patient_message(
        &self,
        request: &AppointmentEmailRequest,
        formatted_date: &str,
    ) -> Result<Message, EmailError> {
        let to = request
            .patient_email
            .parse::<Mailbox>()
            .map_err(|e| EmailError::Validation(format!("Invalid patient email: {}", e)))?;

        let subject = format!(
            "Turno Confirmado - Dr. {} - {} a las {}",
            request.doctor_name, formatted_date, request.appointment_time
        );

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>Turno Confirmado</h1>
    <h2>Hola {patient},</h2>
    <p>Tu turno médico ha sido confirmado exitosamente.</p>
    <div style="border-left: 4px solid #667eea; padding: 10px 20px;">
      <h3>Detalles de tu cita:</h3>
      <p><strong>Médico:</strong> Dr. {doctor}</p>
      <p><strong>Especialidad:</strong> {specialty}</p>
      <p><strong>Fecha:</strong> {date}</p>
      <p><strong>Hora:</strong> {time}</p>
    </div>
    <h3>Recordatorios importantes:</h3>
    <ul>
      <li>Llega 15 minutos antes de tu cita</li>
      <li>Trae tu documento de identidad</li>
      <li>Trae tu obra social (si tienes)</li>
      <li>Si tienes estudios previos, tráelos</li>
    </ul>
    <p>Si necesitas cancelar o reprogramar tu cita, por favor contáctanos con anticipación.</p>
    <p style="color: #888; font-size: 12px;">Sistema de Turnos Médicos</p>
  </div>
</body>
</html>"#,
            patient = request.patient_name,
            doctor = request.doctor_name,
            specialty = request.specialty_name,
            date = formatted_date,
            time = request.appointment_time,
        );

        let text = format!(
            "CONFIRMACIÓN DE TURNO MÉDICO\n\n\
             Hola {},\n\n\
             Tu turno médico ha sido confirmado:\n\n\
             Médico: Dr. {}\n\
             Especialidad: {}\n\
             Fecha: {}\n\
             Hora: {}\n\n\
             RECORDATORIOS:\n\
             - Llega 15 minutos antes\n\
             - Trae tu documento de identidad\n\
             - Trae tu obra social (si tienes)\n\
             - Si tienes estudios previos, tráelos\n\n\
             Sistema de Turnos Médicos\n",
            request.patient_name,
            request.doctor_name,
            request.specialty_name,
            formatted_date,
            request.appointment_time,
        );

        Message::builder()
            .from(self.from.clone())
            .reply_to(to.clone())
            .to(to)
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| EmailError::Transport(e.to_string()))
    }

    fn build_office_message(
        &self,
        request: &AppointmentEmailRequest,
        formatted_date: &str,
    ) -> Result<Message, EmailError> {
        let to = self
            .office_email
            .parse::<Mailbox>()
            .map_err(|e| EmailError::NotConfigured(format!("Invalid office email: {}", e)))?;
        let reply_to = request.patient_email.parse::<Mailbox>().ok();

        let subject = format!(
            "Nuevo Turno - Dr. {} - {} - {} {}",
            request.doctor_name, request.patient_name, formatted_date, request.appointment_time
        );

        let html = format!(
            r#"<!DOCTYPE html>
<html>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
    <h1>Nuevo Turno Reservado</h1>
    <div style="border-left: 4px solid #f093fb; padding: 10px 20px;">
      <h3>Información del Médico:</h3>
      <p><strong>Médico:</strong> Dr. {doctor}</p>
      <p><strong>Especialidad:</strong> {specialty}</p>
      <p><strong>Fecha:</strong> {date}</p>
      <p><strong>Hora:</strong> {time}</p>
    </div>
    <div style="border-left: 4px solid #28a745; padding: 10px 20px;">
      <h3>Información del Paciente:</h3>
      <p><strong>Nombre:</strong> {patient}</p>
      <p><strong>Email:</strong> {patient_email}</p>
      <p><strong>Teléfono:</strong> {phone}</p>
    </div>
    <p style="color: #888; font-size: 12px;">Sistema de Turnos Médicos - Notificación Automática</p>
  </div>
</body>
</html>"#,
            doctor = request.doctor_name,
            specialty = request.specialty_name,
            date = formatted_date,
            time = request.appointment_time,
            patient = request.patient_name,
            patient_email = request.patient_email,
            phone = request.patient_phone,
        );

        let text = format!(
            "NUEVO TURNO RESERVADO\n\n\
             MÉDICO:\n\
             Dr. {}\n\
             Especialidad: {}\n\
             Fecha: {}\n\
             Hora: {}\n\n\
             PACIENTE:\n\
             Nombre: {}\n\
             Email: {}\n\
             Teléfono: {}\n\n\
             Sistema de Turnos Médicos\n",
            request.doctor_name,
            request.specialty_name,
            formatted_date,
            request.appointment_time,
            request.patient_name,
            request.patient_email,
            request.patient_phone,
        );

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject);
        if let Some(reply_to) = reply_to {
            builder = builder.reply_to(reply_to);
        }

        builder
            .multipart(MultiPart::alternative_plain_html(text, html))
            .map_err(|e| EmailError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> AppointmentEmailRequest {
        AppointmentEmailRequest {
            doctor_name: "García".to_string(),
            specialty_name: "Cardiología".to_string(),
            patient_name: "Juan Pérez".to_string(),
            patient_email: "juan@test.com".to_string(),
            patient_phone: "123456".to_string(),
            appointment_date: "2024-01-30".to_string(),
            appointment_time: "09:30".to_string(),
        }
    }

    #[test]
    fn validate_accepts_complete_request() {
        assert!(EmailService::validate(&request()).is_ok());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut incomplete = request();
        incomplete.patient_email = "   ".to_string();
        assert!(matches!(
            EmailService::validate(&incomplete),
            Err(EmailError::Validation(_))
        ));
    }

    #[test]
    fn phone_is_optional_on_the_wire() {
        let parsed: AppointmentEmailRequest = serde_json::from_value(serde_json::json!({
            "doctorName": "García",
            "specialtyName": "Cardiología",
            "patientName": "Juan",
            "patientEmail": "juan@test.com",
            "appointmentDate": "2024-01-30",
            "appointmentTime": "09:30"
        }))
        .unwrap();
        assert_eq!(parsed.patient_phone, "");
    }
}
