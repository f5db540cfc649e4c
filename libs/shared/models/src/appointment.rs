use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Wire and store names keep the legacy spellings `Ok`, `Abandon` and `Done`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    #[serde(rename = "Ok")]
    Booked,
    #[serde(rename = "Abandon")]
    Cancelled,
    #[serde(rename = "Done")]
    Completed,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Booked,
        AppointmentStatus::Cancelled,
        AppointmentStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Booked => "Ok",
            AppointmentStatus::Cancelled => "Abandon",
            AppointmentStatus::Completed => "Done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }

    /// Only a booked appointment moves, and only to a terminal status.
    pub fn can_transition_to(&self, target: &AppointmentStatus) -> bool {
        !self.is_terminal() && target.is_terminal()
    }

    /// Whether the transition hands one unit of capacity back to the slot.
    pub fn restores_capacity(&self, target: &AppointmentStatus) -> bool {
        matches!(
            (self, target),
            (AppointmentStatus::Booked, AppointmentStatus::Cancelled)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Booked => write!(f, "booked"),
            AppointmentStatus::Cancelled => write!(f, "cancelled"),
            AppointmentStatus::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ok" => Ok(AppointmentStatus::Booked),
            "Abandon" => Ok(AppointmentStatus::Cancelled),
            "Done" => Ok(AppointmentStatus::Completed),
            other => Err(format!("unknown appointment status: {}", other)),
        }
    }
}

/// A booking. Slot times and doctor name/department are denormalised for reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub serial_number: i64,
    pub apid: String,
    pub aid: String,
    pub did: String,
    pub sid: i64,
    pub status: AppointmentStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
}

impl Appointment {
    pub fn view(&self) -> AppointmentView {
        AppointmentView {
            serial_number: self.serial_number,
            apid: self.apid.clone(),
            aid: self.aid.clone(),
            did: self.did.clone(),
            doctor_name: self.doctor_name.clone(),
            department: self.department.clone(),
            sid: self.sid,
            status: self.status,
            start_time: self.start_time,
            end_time: self.end_time,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentView {
    pub serial_number: i64,
    pub apid: String,
    pub aid: String,
    pub did: String,
    pub doctor_name: Option<String>,
    pub department: Option<String>,
    pub sid: i64,
    pub status: AppointmentStatus,
    #[serde(with = "crate::time::wire")]
    pub start_time: NaiveDateTime,
    #[serde(with = "crate::time::wire")]
    pub end_time: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_booked_appointments_transition() {
        use AppointmentStatus::*;
        assert!(Booked.can_transition_to(&Cancelled));
        assert!(Booked.can_transition_to(&Completed));
        assert!(!Cancelled.can_transition_to(&Completed));
        assert!(!Completed.can_transition_to(&Cancelled));
        assert!(!Cancelled.can_transition_to(&Cancelled));
        assert!(!Booked.can_transition_to(&Booked));
    }

    #[test]
    fn only_cancellation_restores_capacity() {
        use AppointmentStatus::*;
        assert!(Booked.restores_capacity(&Cancelled));
        assert!(!Booked.restores_capacity(&Completed));
    }

    #[test]
    fn legacy_names_round_trip() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>(), Ok(status));
            assert_eq!(
                serde_json::to_value(status).unwrap(),
                serde_json::Value::String(status.as_str().to_string())
            );
        }
    }
}
