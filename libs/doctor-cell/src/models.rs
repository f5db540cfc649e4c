use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use shared_models::request::{non_blank, present};
use shared_models::{time, AppError, Validate};

// ==============================================================================
// SESSION AND LOOKUP REQUESTS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorLoginRequest {
    pub name: String,
    pub department: String,
    pub password_hex: String,
}

impl Validate for DoctorLoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.name, "name")?;
        non_blank(&self.department, "department")?;
        non_blank(&self.password_hex, "passwordHex")
    }
}

/// Lookup by id or name, or else every doctor of a department.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorQueryRequest {
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl Validate for DoctorQueryRequest {
    fn validate(&self) -> Result<(), AppError> {
        if present(&self.did).is_none()
            && present(&self.name).is_none()
            && present(&self.department).is_none()
        {
            return Err(AppError::Validation("department/name/did required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleByDoctorRequest {
    pub did: String,
}

impl Validate for ScheduleByDoctorRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.did, "did")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleByTimeRequest {
    #[serde(with = "time::wire")]
    pub time: NaiveDateTime,
    pub department: String,
}

impl Validate for ScheduleByTimeRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.department, "department")
    }
}

// ==============================================================================
// ADMINISTRATIVE DRAFTS
// ==============================================================================

/// A proposed slot. The doctor is named by `did`, or else by name and department.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleDraft {
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(with = "time::wire")]
    pub start_time: NaiveDateTime,
    #[serde(with = "time::wire")]
    pub end_time: NaiveDateTime,
    pub capacity: i64,
}

impl Validate for ScheduleDraft {
    fn validate(&self) -> Result<(), AppError> {
        if present(&self.did).is_none() {
            if present(&self.name).is_none() {
                return Err(AppError::required("name"));
            }
            if present(&self.department).is_none() {
                return Err(AppError::required("department"));
            }
        }
        if self.capacity < 1 {
            return Err(AppError::Validation("capacity must be at least 1".to_string()));
        }
        if self.end_time < self.start_time {
            return Err(AppError::Validation(
                "endTime must not be before startTime".to_string(),
            ));
        }
        Ok(())
    }
}

/// A doctor to create, or to update when `did` names an existing one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DoctorDraft {
    #[serde(default)]
    pub did: Option<String>,
    pub name: String,
    #[serde(default)]
    pub password_hex: Option<String>,
    #[serde(default)]
    pub admin: bool,
    pub department: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for DoctorDraft {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.name, "name")?;
        non_blank(&self.department, "department")
    }
}

/// Capacity change for one slot. The other fields, when present, must repeat
/// the stored values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CapacityUpdate {
    pub sid: i64,
    #[serde(default)]
    pub did: Option<String>,
    #[serde(default, with = "time::wire_opt")]
    pub start_time: Option<NaiveDateTime>,
    #[serde(default, with = "time::wire_opt")]
    pub end_time: Option<NaiveDateTime>,
    pub capacity: i64,
}

impl Validate for CapacityUpdate {
    fn validate(&self) -> Result<(), AppError> {
        if self.capacity < 1 {
            return Err(AppError::Validation("capacity must be at least 1".to_string()));
        }
        Ok(())
    }
}
