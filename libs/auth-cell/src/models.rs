use std::sync::Arc;

use serde::{Deserialize, Serialize};

use shared_config::AppConfig;

use crate::services::rate_limit::AttemptCounter;

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub email: String,
    pub role: String,
}

/// Router state for the auth surface. The attempt counter lives here so
/// it survives across requests; swapping in a shared implementation (for
/// multi-instance deployments) only changes construction.
#[derive(Clone)]
pub struct AuthState {
    pub config: Arc<AppConfig>,
    pub limiter: Arc<dyn AttemptCounter>,
}
