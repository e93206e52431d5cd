use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use axum::extract::State;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;
use axum::Json;

use auth_cell::handlers::{login, logout};
use auth_cell::models::{AuthState, LoginRequest};
use auth_cell::services::rate_limit::InMemoryAttemptCounter;
use shared_models::auth::SESSION_COOKIE;
use shared_models::error::AppError;
use shared_utils::jwt::validate_token;
use shared_utils::test_utils::TestConfig;

fn auth_state() -> AuthState {
    AuthState {
        config: TestConfig::default().to_arc(),
        limiter: Arc::new(InMemoryAttemptCounter::new()),
    }
}

fn forwarded_for(ip: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", ip.parse().unwrap());
    headers
}

fn credentials(email: &str, password: &str) -> Json<LoginRequest> {
    Json(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

async fn attempt(
    state: &AuthState,
    ip: &str,
    email: &str,
    password: &str,
) -> Result<(CookieJar, Json<serde_json::Value>), AppError> {
    login(
        State(state.clone()),
        forwarded_for(ip),
        CookieJar::new(),
        credentials(email, password),
    )
    .await
}

#[tokio::test]
async fn valid_login_sets_a_verifiable_session_cookie() {
    let state = auth_state();

    let (jar, Json(body)) = attempt(&state, "1.2.3.4", "admin@hospital.com", "admin123")
        .await
        .unwrap();

    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["user"]["role"], serde_json::json!("admin"));

    let cookie = jar.get(SESSION_COOKIE).expect("session cookie set");
    assert!(cookie.http_only().unwrap_or(false));
    let admin = validate_token(cookie.value(), &state.config.jwt_secret).unwrap();
    assert_eq!(admin.email, "admin@hospital.com");
}

#[tokio::test]
async fn wrong_credentials_are_unauthorized() {
    let state = auth_state();

    let result = attempt(&state, "1.2.3.4", "admin@hospital.com", "nope").await;
    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn sixth_attempt_is_limited_even_with_valid_credentials() {
    let state = auth_state();

    for _ in 0..5 {
        let result = attempt(&state, "9.9.9.9", "admin@hospital.com", "wrong").await;
        assert_matches!(result, Err(AppError::Auth(_)));
    }

    let result = attempt(&state, "9.9.9.9", "admin@hospital.com", "admin123").await;
    assert_matches!(result, Err(AppError::RateLimited(_)));
}

#[tokio::test]
async fn other_clients_are_not_limited() {
    let state = auth_state();

    for _ in 0..5 {
        let _ = attempt(&state, "9.9.9.9", "admin@hospital.com", "wrong").await;
    }

    let result = attempt(&state, "8.8.8.8", "admin@hospital.com", "admin123").await;
    assert!(result.is_ok());
}

#[tokio::test]
async fn missing_fields_count_as_failures() {
    let state = auth_state();

    for _ in 0..5 {
        let result = attempt(&state, "9.9.9.9", "", "").await;
        assert_matches!(result, Err(AppError::BadRequest(_)));
    }

    let result = attempt(&state, "9.9.9.9", "admin@hospital.com", "admin123").await;
    assert_matches!(result, Err(AppError::RateLimited(_)));
}

#[tokio::test]
async fn window_expiry_allows_login_again() {
    let state = AuthState {
        config: TestConfig::default().to_arc(),
        limiter: Arc::new(InMemoryAttemptCounter::with_limits(
            2,
            Duration::from_millis(20),
        )),
    };

    for _ in 0..2 {
        let _ = attempt(&state, "9.9.9.9", "admin@hospital.com", "wrong").await;
    }
    assert_matches!(
        attempt(&state, "9.9.9.9", "admin@hospital.com", "admin123").await,
        Err(AppError::RateLimited(_))
    );

    tokio::time::sleep(Duration::from_millis(40)).await;

    assert!(attempt(&state, "9.9.9.9", "admin@hospital.com", "admin123")
        .await
        .is_ok());
}

#[tokio::test]
async fn successful_login_resets_the_counter() {
    let state = auth_state();

    for _ in 0..4 {
        let _ = attempt(&state, "9.9.9.9", "admin@hospital.com", "wrong").await;
    }
    assert!(attempt(&state, "9.9.9.9", "admin@hospital.com", "admin123")
        .await
        .is_ok());

    // Counter cleared: the next bad attempt is failure number one again.
    let result = attempt(&state, "9.9.9.9", "admin@hospital.com", "wrong").await;
    assert_matches!(result, Err(AppError::Auth(_)));
}

#[tokio::test]
async fn logout_clears_the_session_cookie() {
    use axum::response::IntoResponse;

    let (jar, Json(body)) = logout(CookieJar::new()).await;
    assert_eq!(body["success"], serde_json::json!(true));

    // Removal is expressed as a Set-Cookie with an immediate expiry.
    let response = (jar, "").into_response();
    let set_cookie = response
        .headers()
        .get("set-cookie")
        .expect("removal cookie")
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with(&format!("{}=", SESSION_COOKIE)));
}
