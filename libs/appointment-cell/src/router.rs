use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_session_middleware;

use crate::handlers;

/// Public booking surface, mounted under `/api`.
pub fn appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route("/appointments", post(handlers::book_appointment))
        .with_state(state)
}

/// Admin appointment management, mounted under `/api/admin`.
pub fn admin_appointment_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/appointments",
            get(handlers::get_admin_appointments)
                .patch(handlers::update_appointment_status)
                .post(handlers::create_admin_appointment)
                .put(handlers::update_admin_appointment)
                .delete(handlers::delete_admin_appointment),
        )
        .route("/stats", get(handlers::get_admin_stats))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_session_middleware,
        ))
        .with_state(state)
}
