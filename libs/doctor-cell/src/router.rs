use std::sync::Arc;

use axum::{middleware, routing::get, Router};

use shared_config::AppConfig;
use shared_utils::extractor::admin_session_middleware;

use crate::handlers::{self, DoctorState};
use crate::services::cache::ReferenceCache;

/// Public reference-data routes, served through the TTL cache.
pub fn doctor_routes(config: Arc<AppConfig>) -> Router {
    let state = DoctorState {
        config,
        cache: Arc::new(ReferenceCache::new()),
    };

    Router::new()
        .route("/specialties", get(handlers::get_specialties))
        .route("/doctors", get(handlers::get_doctors))
        .with_state(state)
}

/// Session-protected slot lookup for the admin dashboard.
pub fn admin_availability_routes(config: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/available-times", get(handlers::get_available_times))
        .layer(middleware::from_fn_with_state(
            config.clone(),
            admin_session_middleware,
        ))
        .with_state(config)
}
