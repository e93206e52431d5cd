use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Specialty {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
}

/// Embedded specialty reference as PostgREST returns it on joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialtyRef {
    pub name: String,
}

/// Doctor row with its specialty name embedded, as served to listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorWithSpecialty {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub years_experience: Option<i32>,
    pub specialty: Option<SpecialtyRef>,
}

/// Weekly recurring availability window. One row per (doctor, weekday)
/// the doctor takes appointments; absence of a row means unavailable.
/// Invariant: start_time < end_time (no midnight-spanning windows).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSchedule {
    pub id: Uuid,
    pub doctor_id: Uuid,
    pub day_of_week: i32,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Minimal projection of a booked appointment used by the slot calculator.
#[derive(Debug, Clone, Deserialize)]
pub struct BookedTime {
    pub appointment_time: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableTimesQuery {
    pub doctor_id: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorListQuery {
    pub specialty_id: Option<Uuid>,
}
