use serde::{Deserialize, Serialize};

use doctor_cell::models::{CapacityUpdate, DoctorDraft, ScheduleDraft};
use shared_models::{AppError, AppointmentView, DoctorView, ScheduleView, Validate};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddSchedulesRequest {
    #[serde(default)]
    pub schedules: Option<Vec<ScheduleDraft>>,
}

impl AddSchedulesRequest {
    pub fn into_drafts(self) -> Vec<ScheduleDraft> {
        self.schedules.unwrap_or_default()
    }
}

impl Validate for AddSchedulesRequest {
    fn validate(&self) -> Result<(), AppError> {
        let drafts = self
            .schedules
            .as_ref()
            .ok_or_else(|| AppError::required("schedules array"))?;
        drafts.iter().try_for_each(Validate::validate)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddDoctorsRequest {
    #[serde(default)]
    pub doctors: Option<Vec<DoctorDraft>>,
}

impl AddDoctorsRequest {
    pub fn into_drafts(self) -> Vec<DoctorDraft> {
        self.doctors.unwrap_or_default()
    }
}

impl Validate for AddDoctorsRequest {
    fn validate(&self) -> Result<(), AppError> {
        let drafts = self
            .doctors
            .as_ref()
            .ok_or_else(|| AppError::required("doctors array"))?;
        drafts.iter().try_for_each(Validate::validate)
    }
}

pub type UpdateScheduleRequest = CapacityUpdate;

/// Snapshot of doctors, their slots and every appointment. The three lists
/// are read separately and may be slightly out of step with each other.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub doctors: Vec<DoctorView>,
    pub schedules: Vec<ScheduleView>,
    pub appointments: Vec<AppointmentView>,
}
