use serde_json::{json, Value};
use thiserror::Error;

/// Every failure a request can end in. Each variant becomes an `err` response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Auth(String),

    #[error("Business rule violated: {0}")]
    Conflict(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn not_logged_in() -> Self {
        AppError::Auth("not logged in".to_string())
    }

    pub fn not_admin() -> Self {
        AppError::Auth("not admin".to_string())
    }

    pub fn required(field: &str) -> Self {
        AppError::Validation(format!("{} required", field))
    }

    /// Message sent to the client. Store and internal failures stay generic.
    pub fn err_info(&self) -> String {
        match self {
            AppError::Protocol(msg)
            | AppError::Validation(msg)
            | AppError::Auth(msg)
            | AppError::Conflict(msg)
            | AppError::NotFound(msg) => msg.clone(),
            AppError::Database(_) => "database error".to_string(),
            AppError::Internal(_) => "internal error".to_string(),
        }
    }

    pub fn to_payload(&self) -> Value {
        match self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!("{}", self);
            }
            _ => {
                tracing::debug!("{}", self);
            }
        }

        json!({ "err_info": self.err_info() })
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::Internal(format!("serialization failed: {}", e))
    }
}
