use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    AdminAppointmentsQuery, AppointmentError, AppointmentStatus,
};
use appointment_cell::services::AdminAppointmentService;
use shared_utils::dates;
use shared_utils::test_utils::TestConfig;

fn service_for(mock_server: &MockServer) -> AdminAppointmentService {
    AdminAppointmentService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config())
}

fn empty_query() -> AdminAppointmentsQuery {
    AdminAppointmentsQuery {
        search: None,
        start_date: None,
        end_date: None,
        status: None,
        doctor_id: None,
        page: None,
        limit: None,
        sort_by: None,
        sort_order: None,
    }
}

#[tokio::test]
async fn search_with_no_matching_patient_returns_an_empty_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;
    // No appointments mock: the listing must not be queried at all.

    let mut query = empty_query();
    query.search = Some("nobody".to_string());

    let page = service_for(&mock_server)
        .search_appointments(query)
        .await
        .unwrap();

    assert_eq!(page.total_count, 0);
    assert!(page.appointments.is_empty());
    assert_eq!(page.total_pages, 0);
}

#[tokio::test]
async fn listing_paginates_and_reports_totals() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("limit", "10"))
        .and(query_param("offset", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "appointment_date": "2024-01-30", "appointment_time": "09:00", "status": "scheduled" }
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id"))
        .respond_with(
            ResponseTemplate::new(206)
                .insert_header("content-range", "0-0/21")
                .set_body_json(json!([])),
        )
        .mount(&mock_server)
        .await;

    let mut query = empty_query();
    query.page = Some(2);

    let page = service_for(&mock_server)
        .search_appointments(query)
        .await
        .unwrap();

    assert_eq!(page.page, 2);
    assert_eq!(page.total_count, 21);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.appointments.len(), 1);
}

#[tokio::test]
async fn completed_appointments_cannot_change_status() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "status": "completed" }])),
        )
        .mount(&mock_server)
        .await;
    // No PATCH mock: the write must never happen.

    let result = service_for(&mock_server)
        .update_status(appointment_id, AppointmentStatus::Cancelled)
        .await;

    assert_matches!(
        result,
        Err(AppointmentError::InvalidStatusTransition { .. })
    );
}

#[tokio::test]
async fn cancelled_appointments_can_be_reactivated() {
    let mock_server = MockServer::start().await;
    let appointment_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{ "status": "cancelled" }])),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", format!("eq.{}", appointment_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": appointment_id,
            "doctor_id": Uuid::new_v4(),
            "patient_id": Uuid::new_v4(),
            "appointment_date": "2024-01-30",
            "appointment_time": "09:30",
            "status": "scheduled",
            "notes": null,
            "created_at": "2024-01-15T10:00:00Z"
        }])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let appointment = service_for(&mock_server)
        .update_status(appointment_id, AppointmentStatus::Scheduled)
        .await
        .unwrap();

    assert_eq!(appointment.status, AppointmentStatus::Scheduled);
}

#[tokio::test]
async fn stats_counts_and_doctor_list() {
    let mock_server = MockServer::start().await;
    let today = dates::today_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("appointment_date", format!("eq.{}", today)))
        .respond_with(count_response(2))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.scheduled"))
        .respond_with(count_response(5))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.completed"))
        .respond_with(count_response(3))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(count_response(10))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": Uuid::new_v4(), "name": "García", "email": "garcia@clinic.test", "specialty": { "name": "Cardiología" } }
        ])))
        .mount(&mock_server)
        .await;

    let stats = service_for(&mock_server).stats().await.unwrap();

    assert_eq!(stats["stats"]["total"], json!(10));
    assert_eq!(stats["stats"]["today"], json!(2));
    assert_eq!(stats["stats"]["scheduled"], json!(5));
    assert_eq!(stats["stats"]["completed"], json!(3));
    assert_eq!(stats["doctors"].as_array().unwrap().len(), 1);
}

fn count_response(total: i64) -> ResponseTemplate {
    ResponseTemplate::new(206)
        .insert_header("content-range", format!("0-0/{}", total).as_str())
        .set_body_json(json!([]))
}
