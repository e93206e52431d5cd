use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::{admin_appointment_routes, appointment_routes};
use auth_cell::router::auth_routes;
use doctor_cell::router::{admin_availability_routes, doctor_routes};
use notification_cell::router::notification_routes;
use patient_cell::router::admin_patient_routes;
use shared_config::AppConfig;

/// Public surface under `/api`, admin surface under `/api/admin`. Only
/// login/logout skip the session middleware; every other admin route is
/// behind it inside its cell router.
pub fn create_router(state: Arc<AppConfig>) -> Router {
    let public = Router::new()
        .merge(doctor_routes(state.clone()))
        .merge(appointment_routes(state.clone()))
        .merge(notification_routes(state.clone()));

    let admin = Router::new()
        .merge(auth_routes(state.clone()))
        .merge(admin_appointment_routes(state.clone()))
        .merge(admin_patient_routes(state.clone()))
        .merge(admin_availability_routes(state.clone()));

    Router::new()
        .route("/", get(|| async { "Turnos API is running!" }))
        .nest("/api", public)
        .nest("/api/admin", admin)
}
