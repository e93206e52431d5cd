use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::debug;
use uuid::Uuid;

use doctor_cell::services::DoctorService;
use shared_config::AppConfig;
use shared_database::supabase::{SupabaseClient, SupabaseError};
use shared_utils::dates;

use crate::models::{
    AdminAppointmentsPage, AdminAppointmentsQuery, AdminCreateAppointmentRequest,
    AdminUpdateAppointmentRequest, Appointment, AppointmentError, AppointmentStatus, SortBy,
    SortOrder,
};
use crate::services::booking::is_valid_time_string;
use crate::services::lifecycle;

const ADMIN_SELECT: &str = "id,appointment_date,appointment_time,status,notes,created_at,\
doctor:doctors(id,name,email,phone,specialty:specialties(name)),\
patient:patients(id,name,email,phone)";

const DEFAULT_PAGE_SIZE: i64 = 10;

#[derive(Debug, Deserialize)]
struct IdRow {
    id: Uuid,
}

#[derive(Debug, Deserialize)]
struct StatusRow {
    status: AppointmentStatus,
}

pub struct AdminAppointmentService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl AdminAppointmentService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Filtered, sorted, paginated appointment listing for the dashboard.
    /// Free-text search matches patients first; no matching patient means
    /// an empty page without touching the appointments table.
    pub async fn search_appointments(
        &self,
        query: AdminAppointmentsQuery,
    ) -> Result<AdminAppointmentsPage, AppointmentError> {
        let page = query.page.unwrap_or(1).max(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 100);

        let mut filters: Vec<String> = Vec::new();

        if let Some(start) = query.start_date.as_deref().filter(|s| !s.is_empty()) {
            filters.push(format!("appointment_date=gte.{}", start));
        }
        if let Some(end) = query.end_date.as_deref().filter(|s| !s.is_empty()) {
            filters.push(format!("appointment_date=lte.{}", end));
        }
        if let Some(status) = query
            .status
            .as_deref()
            .filter(|s| !s.is_empty() && *s != "all")
        {
            filters.push(format!("status=eq.{}", status));
        }
        if let Some(doctor_id) = query.doctor_id {
            filters.push(format!("doctor_id=eq.{}", doctor_id));
        }

        if let Some(term) = query.search.as_deref().filter(|s| !s.trim().is_empty()) {
            let patient_ids = self.matching_patient_ids(term.trim()).await?;
            if patient_ids.is_empty() {
                return Ok(AdminAppointmentsPage {
                    appointments: Vec::new(),
                    total_count: 0,
                    page,
                    limit,
                    total_pages: 0,
                });
            }
            let ids = patient_ids
                .iter()
                .map(Uuid::to_string)
                .collect::<Vec<_>>()
                .join(",");
            filters.push(format!("patient_id=in.({})", ids));
        }

        let order = match (
            query.sort_by.unwrap_or(SortBy::Date),
            query.sort_order.unwrap_or(SortOrder::Desc),
        ) {
            (SortBy::Date, SortOrder::Asc) => {
                "order=appointment_date.asc,appointment_time.asc".to_string()
            }
            (SortBy::Date, SortOrder::Desc) => {
                "order=appointment_date.desc,appointment_time.desc".to_string()
            }
            (SortBy::Doctor, direction) => format!("order=doctor(name).{}", direction_str(direction)),
            (SortBy::Patient, direction) => {
                format!("order=patient(name).{}", direction_str(direction))
            }
        };

        let filter_string = if filters.is_empty() {
            String::new()
        } else {
            format!("&{}", filters.join("&"))
        };

        let offset = (page - 1) * limit;
        let data_path = format!(
            "/rest/v1/appointments?select={}{}&{}&limit={}&offset={}",
            ADMIN_SELECT, filter_string, order, limit, offset
        );
        let count_path = format!("/rest/v1/appointments?select=id{}", filter_string);

        debug!("Admin appointment listing: page {} limit {}", page, limit);

        let appointments: Vec<Value> = self
            .supabase
            .request(Method::GET, &data_path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;
        let total_count = self
            .supabase
            .count(&count_path)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(AdminAppointmentsPage {
            appointments,
            total_count,
            page,
            limit,
            total_pages: (total_count + limit - 1) / limit,
        })
    }

    async fn matching_patient_ids(&self, term: &str) -> Result<Vec<Uuid>, AppointmentError> {
        let pattern = format!("*{}*", term);
        let or_filter = format!(
            "(name.ilike.{p},email.ilike.{p},phone.ilike.{p})",
            p = pattern
        );
        let path = format!(
            "/rest/v1/patients?select=id&or={}",
            urlencoding::encode(&or_filter)
        );

        let rows: Vec<IdRow> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(|r| r.id).collect())
    }

    /// Status change through the lifecycle rules. Reactivating a cancelled
    /// appointment can collide with a booking made in the meantime; the
    /// unique index reports that as a conflict.
    pub async fn update_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.fetch_status(appointment_id).await?;
        lifecycle::ensure_transition(current, status)?;

        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(json!({ "status": status })),
                Some(representation_headers()),
            )
            .await
            .map_err(map_write_error)?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn create_appointment(
        &self,
        request: AdminCreateAppointmentRequest,
    ) -> Result<Value, AppointmentError> {
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

        let body = json!({
            "doctor_id": request.doctor_id,
            "patient_id": request.patient_id,
            "appointment_date": request.appointment_date,
            "appointment_time": request.appointment_time,
            "status": request.status.unwrap_or(AppointmentStatus::Scheduled),
            "notes": request.notes,
        });

        let path = format!("/rest/v1/appointments?select={}", ADMIN_SELECT);
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::POST,
                &path,
                Some(body),
                Some(representation_headers()),
            )
            .await
            .map_err(map_write_error)?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppointmentError::Database("Failed to create appointment".to_string()))
    }

    /// Partial edit of an appointment. Changing doctor, date or time moves
    /// the row under the unique index again, so a stolen slot surfaces as
    /// a conflict here too.
    pub async fn update_appointment(
        &self,
        request: AdminUpdateAppointmentRequest,
    ) -> Result<Value, AppointmentError> {
        let mut changes = Map::new();
        if let Some(doctor_id) = request.doctor_id {
            changes.insert("doctor_id".to_string(), json!(doctor_id));
        }
        if let Some(patient_id) = request.patient_id {
            changes.insert("patient_id".to_string(), json!(patient_id));
        }
        if let Some(date) = request.appointment_date {
            if !dates::is_valid_date_string(&date) {
                return Err(AppointmentError::Validation(
                    "Appointment date must be YYYY-MM-DD".to_string(),
                ));
            }
            changes.insert("appointment_date".to_string(), json!(date));
        }
        if let Some(time) = request.appointment_time {
            if !is_valid_time_string(&time) {
                return Err(AppointmentError::Validation(
                    "Appointment time must be HH:MM".to_string(),
                ));
            }
            changes.insert("appointment_time".to_string(), json!(time));
        }
        if let Some(status) = request.status {
            changes.insert("status".to_string(), json!(status));
        }
        if let Some(notes) = request.notes {
            changes.insert("notes".to_string(), json!(notes));
        }

        if changes.is_empty() {
            return Err(AppointmentError::Validation(
                "No fields to update".to_string(),
            ));
        }

        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select={}",
            request.appointment_id, ADMIN_SELECT
        );
        let rows: Vec<Value> = self
            .supabase
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(Value::Object(changes)),
                Some(representation_headers()),
            )
            .await
            .map_err(map_write_error)?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?id=eq.{}", appointment_id);
        let rows: Vec<Appointment> = self
            .supabase
            .request_with_headers(Method::DELETE, &path, None, Some(representation_headers()))
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    /// Dashboard stats: overall counts plus the active doctor list. Today
    /// is the server's local date.
    pub async fn stats(&self) -> Result<Value, AppointmentError> {
        let today = dates::today_string();

        let today_path = format!(
            "/rest/v1/appointments?select=id&appointment_date=eq.{}",
            today
        );
        let (total, today_count, scheduled, completed) = tokio::try_join!(
            self.supabase.count("/rest/v1/appointments?select=id"),
            self.supabase.count(&today_path),
            self.supabase
                .count("/rest/v1/appointments?select=id&status=eq.scheduled"),
            self.supabase
                .count("/rest/v1/appointments?select=id&status=eq.completed"),
        )
        .map_err(|e: SupabaseError| AppointmentError::Database(e.to_string()))?;

        let doctor_service = DoctorService::new(&self.config);
        let doctors = doctor_service
            .list_doctors_for_admin()
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        Ok(json!({
            "stats": {
                "total": total,
                "today": today_count,
                "scheduled": scheduled,
                "completed": completed,
            },
            "doctors": doctors,
        }))
    }

    async fn fetch_status(&self, appointment_id: Uuid) -> Result<AppointmentStatus, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?id=eq.{}&select=status",
            appointment_id
        );
        let rows: Vec<StatusRow> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| AppointmentError::Database(e.to_string()))?;

        rows.into_iter()
            .next()
            .map(|r| r.status)
            .ok_or(AppointmentError::NotFound)
    }
}

fn representation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Prefer", HeaderValue::from_static("return=representation"));
    headers
}

fn map_write_error(error: SupabaseError) -> AppointmentError {
    match error {
        SupabaseError::Conflict(_) => AppointmentError::SlotTaken,
        other => AppointmentError::Database(other.to_string()),
    }
}

fn direction_str(direction: SortOrder) -> &'static str {
    match direction {
        SortOrder::Asc => "asc",
        SortOrder::Desc => "desc",
    }
}
