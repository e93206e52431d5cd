use std::sync::Arc;

use axum::{routing::post, Router};

use shared_config::AppConfig;

use crate::handlers;
use crate::models::AuthState;
use crate::services::InMemoryAttemptCounter;

/// Login/logout routes, mounted under `/api/admin` without the session
/// middleware. The attempt counter is created here and lives for the
/// process lifetime.
pub fn auth_routes(config: Arc<AppConfig>) -> Router {
    let state = AuthState {
        config,
        limiter: Arc::new(InMemoryAttemptCounter::new()),
    };

    Router::new()
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .with_state(state)
}
