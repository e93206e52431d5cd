use axum::{extract::State, http::HeaderMap, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde_json::{json, Value};
use time::Duration;
use tracing::{info, warn};

use shared_models::auth::{SESSION_COOKIE, SESSION_MAX_AGE_SECS};
use shared_models::error::AppError;
use shared_utils::jwt::sign_token;

use crate::models::{AuthState, LoginRequest, LoginUser};
use crate::services::session::verify_credentials;

/// Best-effort client key for rate limiting: first x-forwarded-for hop,
/// or "unknown" when the proxy strips it.
fn client_key(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn session_cookie(token: String, production: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(Duration::seconds(SESSION_MAX_AGE_SECS))
        .secure(production)
        .build()
}

/// POST /api/admin/login. The rate limit gate runs before any credential
/// work, so a limited client gets 429 even with valid credentials.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AuthState>,
    headers: HeaderMap,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), AppError> {
    let key = client_key(&headers);

    if state.limiter.is_limited(&key).await {
        warn!("Login rate limit hit for {}", key);
        return Err(AppError::RateLimited(
            "Too many login attempts. Try again in 15 minutes.".to_string(),
        ));
    }

    if request.email.is_empty() || request.password.is_empty() {
        state.limiter.record_failure(&key).await;
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    if !verify_credentials(&state.config, &request.email, &request.password) {
        state.limiter.record_failure(&key).await;
        return Err(AppError::Auth("Invalid credentials".to_string()));
    }

    state.limiter.clear(&key).await;

    let token = sign_token(&request.email, &state.config.jwt_secret)
        .map_err(AppError::Internal)?;
    let jar = jar.add(session_cookie(token, state.config.production));

    info!("Admin login for {}", request.email);

    Ok((
        jar,
        Json(json!({
            "success": true,
            "message": "Login successful",
            "user": LoginUser {
                email: request.email,
                role: "admin".to_string(),
            },
        })),
    ))
}

/// POST /api/admin/logout. Clearing is unconditional; an expired or
/// missing session still gets a success response.
#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(Cookie::build((SESSION_COOKIE, "")).path("/").build());

    (
        jar,
        Json(json!({ "success": true, "message": "Logout successful" })),
    )
}
