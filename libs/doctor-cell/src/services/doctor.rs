use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{DoctorWithSpecialty, Specialty};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_specialties(&self) -> Result<Vec<Specialty>> {
        debug!("Fetching specialties");

        let path = "/rest/v1/specialties?select=id,name,description&order=name.asc";
        let specialties: Vec<Specialty> = self.supabase.request(Method::GET, path, None).await?;

        Ok(specialties)
    }

    /// Active doctors, optionally narrowed to one specialty, with the
    /// specialty name embedded.
    pub async fn list_active_doctors(
        &self,
        specialty_id: Option<&str>,
    ) -> Result<Vec<DoctorWithSpecialty>> {
        debug!("Fetching active doctors (specialty: {:?})", specialty_id);

        let mut path = String::from(
            "/rest/v1/doctors?select=id,name,email,phone,bio,years_experience,specialty:specialties(name)&is_active=eq.true&order=name.asc",
        );
        if let Some(id) = specialty_id {
            path.push_str(&format!("&specialty_id=eq.{}", id));
        }

        let doctors: Vec<DoctorWithSpecialty> =
            self.supabase.request(Method::GET, &path, None).await?;

        Ok(doctors)
    }

    /// Doctor list for the admin dashboard (id, name, email, specialty).
    pub async fn list_doctors_for_admin(&self) -> Result<Vec<Value>> {
        debug!("Fetching doctors for admin");

        let path = "/rest/v1/doctors?select=id,name,email,specialty:specialties(name)&is_active=eq.true&order=name.asc";
        let doctors: Vec<Value> = self.supabase.request(Method::GET, path, None).await?;

        Ok(doctors)
    }
}
