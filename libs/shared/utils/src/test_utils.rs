use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use shared_config::AppConfig;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
        }
    }
}

impl TestConfig {
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            jwt_secret: self.jwt_secret.clone(),
            admin_email: "admin@hospital.com".to_string(),
            admin_password: "admin123".to_string(),
            admin_password_hash: None,
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_user: "test@example.com".to_string(),
            smtp_password: "test-password".to_string(),
            office_email: "office@example.com".to_string(),
            email_from_name: "Test Clinic".to_string(),
            production: false,
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    /// Mint an admin session token directly, bypassing the login flow.
    /// A negative `exp_offset_hours` produces an already-expired token.
    pub fn create_admin_token(email: &str, secret: &str, exp_offset_hours: i64) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_offset_hours);

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "email": email,
            "role": "admin",
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    /// Cookie header value carrying the session token, for handler tests.
    pub fn session_cookie_header(token: &str) -> String {
        format!("admin-session={}", token)
    }
}
