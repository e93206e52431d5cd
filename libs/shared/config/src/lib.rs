use std::env;

use anyhow::{bail, Result};
use tracing::warn;

/// Fallback signing secret for local development only. Production startup
/// refuses to run without an explicit JWT_SECRET.
const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub jwt_secret: String,
    pub admin_email: String,
    pub admin_password: String,
    pub admin_password_hash: Option<String>,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: String,
    pub smtp_password: String,
    pub office_email: String,
    pub email_from_name: String,
    pub production: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let production = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => secret,
            _ if production => bail!("JWT_SECRET must be set in production"),
            _ => {
                warn!("JWT_SECRET not set, using development secret");
                DEV_JWT_SECRET.to_string()
            }
        };

        let config = Self {
            supabase_url: env::var("SUPABASE_URL").unwrap_or_else(|_| {
                warn!("SUPABASE_URL not set, using empty value");
                String::new()
            }),
            supabase_service_key: env::var("SUPABASE_SERVICE_ROLE_KEY").unwrap_or_else(|_| {
                warn!("SUPABASE_SERVICE_ROLE_KEY not set, using empty value");
                String::new()
            }),
            jwt_secret,
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@hospital.com".to_string()),
            admin_password: env::var("ADMIN_PASSWORD")
                .unwrap_or_else(|_| "admin123".to_string()),
            admin_password_hash: env::var("ADMIN_PASSWORD_HASH").ok().filter(|h| !h.is_empty()),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(465),
            smtp_user: env::var("SMTP_USER").unwrap_or_else(|_| {
                warn!("SMTP_USER not set, email sending will fail");
                String::new()
            }),
            smtp_password: env::var("SMTP_PASSWORD").unwrap_or_else(|_| String::new()),
            office_email: env::var("OFFICE_EMAIL").unwrap_or_else(|_| {
                warn!("OFFICE_EMAIL not set, using empty value");
                String::new()
            }),
            email_from_name: env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Sistema de Turnos".to_string()),
            production,
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        Ok(config)
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty() && !self.supabase_service_key.is_empty()
    }

    pub fn is_email_configured(&self) -> bool {
        !self.smtp_user.is_empty() && !self.smtp_password.is_empty()
    }
}
