use serde::{Deserialize, Serialize};

use shared_database::DatabaseError;
use shared_models::request::non_blank;
use shared_models::{AppError, AppointmentStatus, Validate};

// ==============================================================================
// REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateAppointmentRequest {
    pub did: String,
    pub sid: i64,
}

impl Validate for CreateAppointmentRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.did, "did")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CancelAppointmentRequest {
    pub apid: String,
}

impl Validate for CancelAppointmentRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.apid, "apid")
    }
}

/// `serialNumber` is the last serial already called; absent or `null` means
/// none yet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallNextRequest {
    pub sid: i64,
    #[serde(default)]
    pub serial_number: Option<i64>,
}

impl CallNextRequest {
    /// The serial to search after; every real serial is greater.
    pub fn last_called(&self) -> i64 {
        self.serial_number.unwrap_or(-1)
    }
}

impl Validate for CallNextRequest {}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("sid not exists")]
    SlotNotFound,

    #[error("did and sid not match")]
    DoctorMismatch,

    #[error("capacity is zero")]
    NoCapacity,

    #[error("apid not exists")]
    NotFound,

    #[error("aid and apid not match")]
    NotOwner,

    #[error("appointment already {0}")]
    AlreadyFinal(AppointmentStatus),

    #[error("no next appointment")]
    NoNextAppointment,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::SlotNotFound | AppointmentError::NotFound => {
                AppError::NotFound(e.to_string())
            }
            AppointmentError::DoctorMismatch | AppointmentError::NotOwner => {
                AppError::Auth(e.to_string())
            }
            AppointmentError::NoCapacity
            | AppointmentError::AlreadyFinal(_)
            | AppointmentError::NoNextAppointment => AppError::Conflict(e.to_string()),
            AppointmentError::Database(db) => db.into(),
        }
    }
}
