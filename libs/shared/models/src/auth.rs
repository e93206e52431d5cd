use serde::{Deserialize, Serialize};

/// Name of the HTTP-only session cookie set on successful admin login.
pub const SESSION_COOKIE: &str = "admin-session";

/// Session lifetime in seconds (24 hours).
pub const SESSION_MAX_AGE_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct AdminClaims {
    pub email: String,
    pub role: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub email: String,
    pub role: String,
}
