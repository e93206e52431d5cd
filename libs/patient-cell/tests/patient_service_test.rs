use assert_matches::assert_matches;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use patient_cell::models::{CreatePatientRequest, PatientError};
use patient_cell::services::PatientService;
use shared_utils::test_utils::TestConfig;

fn patient_row(id: Uuid, email: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "Juan Pérez",
        "email": email,
        "phone": "123456",
        "created_at": "2024-01-15T10:00:00Z"
    })
}

fn service_for(mock_server: &MockServer) -> PatientService {
    PatientService::new(&TestConfig::with_supabase_url(&mock_server.uri()).to_app_config())
}

#[tokio::test]
async fn lookup_is_case_and_whitespace_insensitive() {
    let mock_server = MockServer::start().await;
    let existing_id = Uuid::new_v4();

    // The service must query with the normalized form of the email.
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("email", "ilike.juan@test.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([patient_row(existing_id, "juan@test.com")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let found = service_for(&mock_server)
        .find_by_email("  Juan@Test.com ")
        .await
        .unwrap();

    assert_eq!(found.unwrap().id, existing_id);
}

#[tokio::test]
async fn find_or_create_reuses_the_existing_patient() {
    let mock_server = MockServer::start().await;
    let existing_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([patient_row(existing_id, "juan@test.com")])),
        )
        .mount(&mock_server)
        .await;
    // No POST mock: an insert attempt would fail the test.

    let patient = service_for(&mock_server)
        .find_or_create(CreatePatientRequest {
            name: "Juan Pérez".to_string(),
            email: "  Juan@Test.com ".to_string(),
            phone: None,
        })
        .await
        .unwrap();

    assert_eq!(patient.id, existing_id);
}

#[tokio::test]
async fn find_or_create_inserts_normalized_email() {
    let mock_server = MockServer::start().await;
    let new_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([patient_row(new_id, "juan@test.com")])),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let patient = service_for(&mock_server)
        .find_or_create(CreatePatientRequest {
            name: "Juan Pérez".to_string(),
            email: "  Juan@Test.com ".to_string(),
            phone: Some("123456".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(patient.id, new_id);
    assert_eq!(patient.email, "juan@test.com");
}

#[tokio::test]
async fn admin_create_rejects_duplicates() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([patient_row(Uuid::new_v4(), "juan@test.com")])),
        )
        .mount(&mock_server)
        .await;

    let result = service_for(&mock_server)
        .create_patient(CreatePatientRequest {
            name: "Juan Pérez".to_string(),
            email: "Juan@Test.com".to_string(),
            phone: None,
        })
        .await;

    assert_matches!(result, Err(PatientError::DuplicateEmail(_)));
}

#[tokio::test]
async fn blank_fields_are_rejected_before_any_request() {
    let mock_server = MockServer::start().await;

    let result = service_for(&mock_server)
        .find_or_create(CreatePatientRequest {
            name: "  ".to_string(),
            email: "juan@test.com".to_string(),
            phone: None,
        })
        .await;

    assert_matches!(result, Err(PatientError::Validation(_)));
}
