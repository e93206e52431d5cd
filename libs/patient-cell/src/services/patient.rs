use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreatePatientRequest, Patient, PatientError};

pub struct PatientService {
    supabase: SupabaseClient,
}

/// Canonical form of a patient email: trimmed and lowercased. Lookups and
/// stored rows both use this form, so `"  Juan@Test.com "` and
/// `"juan@test.com"` resolve to the same patient.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl PatientService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<Patient>, PatientError> {
        let normalized = normalize_email(email);
        debug!("Looking up patient by email: {}", normalized);

        // ilike with no wildcard is a case-insensitive equality match;
        // it also catches rows written before emails were normalized.
        let path = format!(
            "/rest/v1/patients?email=ilike.{}&limit=1",
            urlencoding::encode(&normalized)
        );
        let result: Vec<Patient> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        Ok(result.into_iter().next())
    }

    /// Resolve a patient identity for a booking: reuse the existing row
    /// matched by normalized email, or create one lazily.
    pub async fn find_or_create(
        &self,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        if request.name.trim().is_empty() || request.email.trim().is_empty() {
            return Err(PatientError::Validation(
                "Patient name and email are required".to_string(),
            ));
        }

        if let Some(existing) = self.find_by_email(&request.email).await? {
            debug!("Reusing existing patient {}", existing.id);
            return Ok(existing);
        }

        self.insert_patient(&request).await
    }

    /// Admin-side creation; a duplicate email is a conflict rather than a
    /// silent reuse.
    pub async fn create_patient(
        &self,
        request: CreatePatientRequest,
    ) -> Result<Patient, PatientError> {
        if request.name.trim().is_empty() || request.email.trim().is_empty() {
            return Err(PatientError::Validation(
                "Patient name and email are required".to_string(),
            ));
        }

        let normalized = normalize_email(&request.email);
        if self.find_by_email(&normalized).await?.is_some() {
            return Err(PatientError::DuplicateEmail(normalized));
        }

        self.insert_patient(&request).await
    }

    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        debug!("Fetching patients for admin");

        let path = "/rest/v1/patients?select=id,name,email,phone,created_at&order=name.asc";
        let patients: Vec<Patient> = self
            .supabase
            .request(Method::GET, path, None)
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        Ok(patients)
    }

    async fn insert_patient(&self, request: &CreatePatientRequest) -> Result<Patient, PatientError> {
        let patient_data = json!({
            "name": request.name.trim(),
            "email": normalize_email(&request.email),
            "phone": request.phone.as_deref().unwrap_or(""),
        });

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "Prefer",
            reqwest::header::HeaderValue::from_static("return=representation"),
        );

        let result: Vec<Value> = self
            .supabase
            .request_with_headers(Method::POST, "/rest/v1/patients", Some(patient_data), Some(headers))
            .await
            .map_err(|e| PatientError::Database(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| PatientError::Database("Failed to create patient".to_string()))?;

        let patient: Patient = serde_json::from_value(row)
            .map_err(|e| PatientError::Database(format!("Failed to parse patient: {}", e)))?;

        debug!("Patient created with ID: {}", patient.id);
        Ok(patient)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_whitespace() {
        assert_eq!(normalize_email("  Juan@Test.com "), "juan@test.com");
        assert_eq!(normalize_email("juan@test.com"), "juan@test.com");
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_email("  MiXeD@Case.Org\t");
        assert_eq!(normalize_email(&once), once);
    }
}
