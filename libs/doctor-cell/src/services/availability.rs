use std::collections::HashSet;

use anyhow::Result;
use chrono::{Duration, NaiveTime};
use reqwest::Method;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_utils::dates;

use crate::models::{BookedTime, DoctorSchedule};

/// Appointment slot length. The original clinic books in fixed half-hour
/// increments; slot stepping and the booked-set subtraction both assume it.
const SLOT_MINUTES: i64 = 30;

pub struct AvailabilityService {
    supabase: SupabaseClient,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Bookable times for a doctor on a calendar date, in chronological
    /// order as `HH:MM` strings.
    ///
    /// A doctor with no schedule row for that weekday (or an unknown
    /// doctor id) yields an empty list: absence of availability is a
    /// valid outcome, not a fault.
    pub async fn available_times(&self, doctor_id: &str, date_str: &str) -> Result<Vec<String>> {
        let date = dates::parse_ymd(date_str)
            .ok_or_else(|| anyhow::anyhow!("Invalid date: {}", date_str))?;
        let day_of_week = dates::day_of_week(date);

        debug!(
            "Calculating available times for doctor {} on {} (weekday {})",
            doctor_id, date_str, day_of_week
        );

        let schedule_path = format!(
            "/rest/v1/doctor_schedules?doctor_id=eq.{}&day_of_week=eq.{}&select=id,doctor_id,day_of_week,start_time,end_time",
            doctor_id, day_of_week
        );
        let schedules: Vec<DoctorSchedule> =
            self.supabase.request(Method::GET, &schedule_path, None).await?;

        let Some(schedule) = schedules.into_iter().next() else {
            debug!("Doctor {} has no hours on weekday {}", doctor_id, day_of_week);
            return Ok(vec![]);
        };

        let booked_path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&appointment_date=eq.{}&status=neq.cancelled&select=appointment_time",
            doctor_id, date_str
        );
        let booked_rows: Vec<BookedTime> =
            self.supabase.request(Method::GET, &booked_path, None).await?;

        let booked: HashSet<String> = booked_rows
            .into_iter()
            .filter_map(|row| row.appointment_time.get(0..5).map(str::to_string))
            .collect();

        Ok(generate_slots(
            schedule.start_time,
            schedule.end_time,
            &booked,
        ))
    }
}

/// Step through `[start, end)` in 30-minute increments, skipping booked
/// times. The `end` boundary itself is never offered; inverted or
/// zero-length windows produce no slots.
pub fn generate_slots(start: NaiveTime, end: NaiveTime, booked: &HashSet<String>) -> Vec<String> {
    let mut slots = Vec::new();
    let mut current = start;

    while current < end {
        let slot = current.format("%H:%M").to_string();
        if !booked.contains(&slot) {
            slots.push(slot);
        }

        match current.overflowing_add_signed(Duration::minutes(SLOT_MINUTES)) {
            (next, 0) => current = next,
            // Wrapped past midnight; the window is over.
            _ => break,
        }
    }

    slots
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn one_hour_window_yields_two_slots() {
        let slots = generate_slots(t(9, 0), t(10, 0), &HashSet::new());
        assert_eq!(slots, vec!["09:00", "09:30"]);
    }

    #[test]
    fn booked_slot_is_excluded() {
        let booked: HashSet<String> = ["09:30".to_string()].into();
        let slots = generate_slots(t(9, 0), t(10, 0), &booked);
        assert_eq!(slots, vec!["09:00"]);
    }

    #[test]
    fn end_boundary_is_never_offered() {
        let slots = generate_slots(t(9, 0), t(10, 30), &HashSet::new());
        assert_eq!(slots, vec!["09:00", "09:30", "10:00"]);
        assert!(!slots.contains(&"10:30".to_string()));
    }

    #[test]
    fn inverted_window_yields_no_slots() {
        assert!(generate_slots(t(17, 0), t(9, 0), &HashSet::new()).is_empty());
    }

    #[test]
    fn zero_length_window_yields_no_slots() {
        assert!(generate_slots(t(9, 0), t(9, 0), &HashSet::new()).is_empty());
    }

    #[test]
    fn fully_booked_day_yields_no_slots() {
        let booked: HashSet<String> = ["09:00".to_string(), "09:30".to_string()].into();
        assert!(generate_slots(t(9, 0), t(10, 0), &booked).is_empty());
    }

    #[test]
    fn slots_stay_in_chronological_order() {
        let booked: HashSet<String> = ["10:00".to_string()].into();
        let slots = generate_slots(t(9, 0), t(11, 0), &booked);
        assert_eq!(slots, vec!["09:00", "09:30", "10:30"]);
    }
}
