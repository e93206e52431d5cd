use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use shared_config::AppConfig;
use shared_models::auth::SESSION_COOKIE;
use shared_models::error::AppError;

use crate::jwt::validate_token;

/// Pull the session token out of the Cookie header, if present.
fn session_token_from_cookies(request: &Request<Body>) -> Option<String> {
    let cookie_header = request.headers().get("cookie")?.to_str().ok()?;

    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

/// Middleware protecting the admin API routes. Requires a valid
/// `admin-session` cookie; the admin identity is inserted into request
/// extensions for downstream handlers.
pub async fn admin_session_middleware(
    State(config): State<Arc<AppConfig>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token_from_cookies(&request)
        .ok_or_else(|| AppError::Auth("Missing admin session".to_string()))?;

    let admin = validate_token(&token, &config.jwt_secret).map_err(AppError::Auth)?;

    request.extensions_mut().insert(admin);

    Ok(next.run(request).await)
}
