use std::sync::Arc;

use axum::{
    middleware,
    routing::get,
    Router,
};

use shared_config::AppConfig;
use shared_utils::extractor::admin_session_middleware;

use crate::handlers;

/// Admin-only patient routes, mounted under `/api/admin`.
pub fn admin_patient_routes(state: Arc<AppConfig>) -> Router {
    Router::new()
        .route(
            "/patients",
            get(handlers::get_patients).post(handlers::create_patient),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_session_middleware,
        ))
        .with_state(state)
}
