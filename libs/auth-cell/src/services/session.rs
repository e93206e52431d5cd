use argon2::{Argon2, PasswordHash, PasswordVerifier};
use tracing::warn;

use shared_config::AppConfig;

/// Check admin credentials against the configured identity. Production
/// requires an argon2 hash; the plain-text password comparison only
/// exists for local development.
pub fn verify_credentials(config: &AppConfig, email: &str, password: &str) -> bool {
    if email != config.admin_email {
        return false;
    }

    if let Some(hash) = &config.admin_password_hash {
        return PasswordHash::new(hash)
            .map(|parsed| {
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or_else(|e| {
                warn!("Invalid ADMIN_PASSWORD_HASH: {}", e);
                false
            });
    }

    if config.production {
        warn!("ADMIN_PASSWORD_HASH not set in production, rejecting login");
        return false;
    }

    password == config.admin_password
}
