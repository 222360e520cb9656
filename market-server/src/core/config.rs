use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use super::{Result, ServerError};

/// Server configuration
///
/// # Environment
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | HTTP_PORT | 8080 | listen port |
/// | DATA_DIR | ./data | redb file directory |
/// | DEMO_MODE | false | in-memory store instead of redb |
/// | ENVIRONMENT | development | `production` forbids demo mode |
/// | STORE_TIMEOUT_MS | 5000 | per-call persistence deadline |
/// | JWT_SECRET | generated in development | HS256 secret |
/// | NOTIFICATION_POLL_MS | 5000 | notification subscription poll |
/// | ORDER_POLL_MS | 3000 | order watch poll |
/// | RESERVATION_HOLD_HOURS | 24 | default reservation expiry |
/// | REQUEST_TIMEOUT_MS | 30000 | HTTP request timeout |
/// | SHUTDOWN_TIMEOUT_MS | 10000 | graceful shutdown window |
/// | LOG_LEVEL | info | overridden by RUST_LOG |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | unset | daily rolling log files |
#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub data_dir: String,
    pub demo_mode: bool,
    /// development | staging | production
    pub environment: String,
    pub store_timeout_ms: u64,
    pub jwt_secret: Option<String>,
    pub notification_poll_ms: u64,
    pub order_poll_ms: u64,
    pub reservation_hold_hours: u64,
    pub request_timeout_ms: u64,
    pub shutdown_timeout_ms: u64,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_port: 8080,
            data_dir: "./data".to_string(),
            demo_mode: false,
            environment: "development".to_string(),
            store_timeout_ms: 5000,
            jwt_secret: None,
            notification_poll_ms: 5000,
            order_poll_ms: 3000,
            reservation_hold_hours: 24,
            request_timeout_ms: 30000,
            shutdown_timeout_ms: 10000,
            log_level: "info".to_string(),
            log_json: false,
            log_dir: None,
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load from the environment; unset or unparsable values keep their default
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            http_port: env_or("HTTP_PORT", d.http_port),
            data_dir: env_opt("DATA_DIR").unwrap_or(d.data_dir),
            demo_mode: env_or("DEMO_MODE", d.demo_mode),
            environment: env_opt("ENVIRONMENT").unwrap_or(d.environment),
            store_timeout_ms: env_or("STORE_TIMEOUT_MS", d.store_timeout_ms),
            jwt_secret: env_opt("JWT_SECRET"),
            notification_poll_ms: env_or("NOTIFICATION_POLL_MS", d.notification_poll_ms),
            order_poll_ms: env_or("ORDER_POLL_MS", d.order_poll_ms),
            reservation_hold_hours: env_or("RESERVATION_HOLD_HOURS", d.reservation_hold_hours),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", d.request_timeout_ms),
            shutdown_timeout_ms: env_or("SHUTDOWN_TIMEOUT_MS", d.shutdown_timeout_ms),
            log_level: env_opt("LOG_LEVEL").unwrap_or(d.log_level),
            log_json: env_or("LOG_JSON", d.log_json),
            log_dir: env_opt("LOG_DIR"),
        }
    }

    /// In-memory demo configuration, used by tests
    pub fn demo() -> Self {
        Self {
            demo_mode: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.demo_mode && self.is_production() {
            return Err(ServerError::Config(
                "DEMO_MODE is not allowed when ENVIRONMENT=production".to_string(),
            ));
        }
        if self.is_production() && self.jwt_secret.is_none() {
            return Err(ServerError::Config(
                "JWT_SECRET must be set in production".to_string(),
            ));
        }
        for (name, value) in [
            ("STORE_TIMEOUT_MS", self.store_timeout_ms),
            ("NOTIFICATION_POLL_MS", self.notification_poll_ms),
            ("ORDER_POLL_MS", self.order_poll_ms),
            ("REQUEST_TIMEOUT_MS", self.request_timeout_ms),
        ] {
            if value == 0 {
                return Err(ServerError::Config(format!("{name} must be greater than zero")));
            }
        }
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.data_dir).join("market.redb")
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }

    pub fn notification_poll_interval(&self) -> Duration {
        Duration::from_millis(self.notification_poll_ms)
    }

    pub fn order_poll_interval(&self) -> Duration {
        Duration::from_millis(self.order_poll_ms)
    }

    pub fn reservation_hold(&self) -> Duration {
        Duration::from_secs(self.reservation_hold_hours * 3600)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}
