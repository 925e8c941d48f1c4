//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from environment variables. It provides
//! thread-safe access and mutation for testing or overrides in runtime environments.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub reset_token_expiry_minutes: u64,
    pub verification_token_expiry_minutes: u64,
    pub max_password_reset_requests_per_hour: u32,
    pub import_require_birth_date: bool,
    pub smtp_username: String,
    pub smtp_app_password: String,
    pub email_from_name: String,
    pub frontend_url: String,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(v) => v == "true" || v == "1",
        Err(_) => default,
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Every key has a development fallback so that test runs and fresh
    /// checkouts work without a `.env`; production deployments are expected
    /// to set at least `DATABASE_PATH` and `JWT_SECRET`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME")
                .unwrap_or_else(|_| "smart-presence-api".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "api=info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "api.log".into()),
            log_to_stdout: env_bool("LOG_TO_STDOUT", false),
            database_path: env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/smart_presence.db".into()),
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".into()),
            port: env_parsed("PORT", 3000),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into()),
            jwt_duration_minutes: env_parsed("JWT_DURATION_MINUTES", 60),
            reset_token_expiry_minutes: env_parsed("RESET_TOKEN_EXPIRY_MINUTES", 15),
            verification_token_expiry_minutes: env_parsed(
                "VERIFICATION_TOKEN_EXPIRY_MINUTES",
                24 * 60,
            ),
            max_password_reset_requests_per_hour: env_parsed(
                "MAX_PASSWORD_RESET_REQUESTS_PER_HOUR",
                3,
            ),
            import_require_birth_date: env_bool("IMPORT_REQUIRE_BIRTH_DATE", true),
            smtp_username: env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_app_password: env::var("SMTP_APP_PASSWORD").unwrap_or_default(),
            email_from_name: env::var("EMAIL_FROM_NAME")
                .unwrap_or_else(|_| "Smart Presence".into()),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock cannot be acquired.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    /// Generic internal setter for any field in the config.
    ///
    /// Used by public per-field setter methods.
    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_env(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.env = value.into());
    }

    pub fn set_project_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.project_name = value.into());
    }

    pub fn set_log_level(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_level = value.into());
    }

    pub fn set_log_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.log_file = value.into());
    }

    pub fn set_log_to_stdout(value: bool) {
        AppConfig::set_field(|cfg| cfg.log_to_stdout = value);
    }

    pub fn set_database_path(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.database_path = value.into());
    }

    pub fn set_host(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.host = value.into());
    }

    pub fn set_port(value: u16) {
        AppConfig::set_field(|cfg| cfg.port = value);
    }

    pub fn set_jwt_secret(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.jwt_secret = value.into());
    }

    pub fn set_jwt_duration_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.jwt_duration_minutes = value.into());
    }

    pub fn set_reset_token_expiry_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.reset_token_expiry_minutes = value.into());
    }

    pub fn set_verification_token_expiry_minutes(value: impl Into<u64>) {
        AppConfig::set_field(|cfg| cfg.verification_token_expiry_minutes = value.into());
    }

    pub fn set_max_password_reset_requests_per_hour(value: impl Into<u32>) {
        AppConfig::set_field(|cfg| cfg.max_password_reset_requests_per_hour = value.into());
    }

    pub fn set_import_require_birth_date(value: bool) {
        AppConfig::set_field(|cfg| cfg.import_require_birth_date = value);
    }

    pub fn set_smtp_username(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.smtp_username = value.into());
    }

    pub fn set_smtp_app_password(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.smtp_app_password = value.into());
    }

    pub fn set_email_from_name(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.email_from_name = value.into());
    }

    pub fn set_frontend_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.frontend_url = value.into());
    }
}

// --- Free-function accessors ---
//
// Call sites read single values far more often than they need the whole
// struct; these wrappers keep the lock scope to one field read.

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}

pub fn jwt_secret() -> String {
    AppConfig::global().jwt_secret.clone()
}

pub fn jwt_duration_minutes() -> u64 {
    AppConfig::global().jwt_duration_minutes
}

pub fn reset_token_expiry_minutes() -> u64 {
    AppConfig::global().reset_token_expiry_minutes
}

pub fn verification_token_expiry_minutes() -> u64 {
    AppConfig::global().verification_token_expiry_minutes
}

pub fn max_password_reset_requests_per_hour() -> u32 {
    AppConfig::global().max_password_reset_requests_per_hour
}

pub fn import_require_birth_date() -> bool {
    AppConfig::global().import_require_birth_date
}

pub fn smtp_username() -> String {
    AppConfig::global().smtp_username.clone()
}

pub fn smtp_app_password() -> String {
    AppConfig::global().smtp_app_password.clone()
}

pub fn email_from_name() -> String {
    AppConfig::global().email_from_name.clone()
}

pub fn frontend_url() -> String {
    AppConfig::global().frontend_url.clone()
}
