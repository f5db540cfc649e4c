use std::env;
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

pub mod departments;

pub use departments::Departments;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub departments_path: PathBuf,
    pub busy_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("HABMS_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match var("HABMS_PORT") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("HABMS_PORT is not a valid port ({}), using 9000", raw);
                9000
            }),
            None => 9000,
        };

        let database_path = var("HABMS_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                warn!("HABMS_DATABASE not set, using habms.db");
                PathBuf::from("habms.db")
            });

        let departments_path = var("HABMS_DEPARTMENTS")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("department.json"));

        let busy_timeout_ms = match var("HABMS_BUSY_TIMEOUT_MS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                warn!("HABMS_BUSY_TIMEOUT_MS is not a number ({}), using 5000", raw);
                5000
            }),
            None => 5000,
        };

        Self {
            host,
            port,
            database_path,
            departments_path,
            busy_timeout: Duration::from_millis(busy_timeout_ms),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
