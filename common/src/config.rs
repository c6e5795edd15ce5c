//! Application configuration.
//!
//! `AppConfig` is a lazily initialized singleton loaded from environment
//! variables, with thread-safe access and per-field setters for overrides in
//! tests. The backend wire literals (ticket status values, role tags) live
//! here so the rest of the workspace references them symbolically instead of
//! repeating string constants at call sites.

use std::env;
use std::sync::{OnceLock, RwLock};

/// Runtime configuration values, one field per environment variable.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub api_base_url: String,
    pub request_timeout_seconds: u64,
    pub session_file: String,
    pub status_open: String,
    pub status_closed: String,
    pub role_admin: String,
    pub role_agent: String,
    pub role_client: String,
}

static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

impl AppConfig {
    /// Reads `.env` plus the process environment, applying defaults for
    /// anything unset.
    ///
    /// # Panics
    /// Panics if a numeric variable is present but unparsable.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: env::var("APP_ENV").unwrap_or_else(|_| "development".into()),
            project_name: env::var("PROJECT_NAME").unwrap_or_else(|_| "helpdesk".into()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_file: env::var("LOG_FILE").unwrap_or_else(|_| "helpdesk.log".into()),
            log_to_stdout: env::var("LOG_TO_STDOUT").unwrap_or_else(|_| "false".into()) == "true",
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000/api".into()),
            request_timeout_seconds: env::var("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "30".into())
                .parse()
                .unwrap(),
            session_file: env::var("SESSION_FILE")
                .unwrap_or_else(|_| ".helpdesk_session.json".into()),
            status_open: env::var("STATUS_OPEN").unwrap_or_else(|_| "ABIERTO".into()),
            status_closed: env::var("STATUS_CLOSED").unwrap_or_else(|_| "CERRADO".into()),
            role_admin: env::var("ROLE_ADMIN").unwrap_or_else(|_| "ADMIN".into()),
            role_agent: env::var("ROLE_AGENT").unwrap_or_else(|_| "AGENT".into()),
            role_client: env::var("ROLE_CLIENT").unwrap_or_else(|_| "CLIENT".into()),
        }
    }

    /// Read guard on the global configuration, initializing it on first use.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Reloads from the environment, discarding any setter overrides. Tests
    /// call this to restore a known state.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock.write().expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    // Shared write path behind the public per-field setters.
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

    // --- Test and override setters ---

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

    pub fn set_api_base_url(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.api_base_url = value.into());
    }

    pub fn set_request_timeout_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.request_timeout_seconds = value);
    }

    pub fn set_session_file(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.session_file = value.into());
    }

    pub fn set_status_open(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.status_open = value.into());
    }

    pub fn set_status_closed(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.status_closed = value.into());
    }

    pub fn set_role_admin(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.role_admin = value.into());
    }

    pub fn set_role_agent(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.role_agent = value.into());
    }

    pub fn set_role_client(value: impl Into<String>) {
        AppConfig::set_field(|cfg| cfg.role_client = value.into());
    }
}

// --- Free accessor functions ---
//
// Call sites read `config::status_open()` etc. instead of holding the guard.

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

pub fn api_base_url() -> String {
    AppConfig::global().api_base_url.clone()
}

pub fn request_timeout_seconds() -> u64 {
    AppConfig::global().request_timeout_seconds
}

pub fn session_file() -> String {
    AppConfig::global().session_file.clone()
}

pub fn status_open() -> String {
    AppConfig::global().status_open.clone()
}

pub fn status_closed() -> String {
    AppConfig::global().status_closed.clone()
}

pub fn role_admin() -> String {
    AppConfig::global().role_admin.clone()
}

pub fn role_agent() -> String {
    AppConfig::global().role_agent.clone()
}

pub fn role_client() -> String {
    AppConfig::global().role_client.clone()
}
