use serde::de::DeserializeOwned;
use serde_json::Value;

use admin_cell::{AddDoctorsRequest, AddSchedulesRequest, UpdateScheduleRequest};
use appointment_cell::{CallNextRequest, CancelAppointmentRequest, CreateAppointmentRequest};
use doctor_cell::{
    DoctorLoginRequest, DoctorQueryRequest, ScheduleByDoctorRequest, ScheduleByTimeRequest,
};
use patient_cell::{
    DeleteAccountRequest, LoginRequest, LogoutRequest, RegisterRequest, UpdateAccountRequest,
};
use shared_models::{AppError, Validate};

use crate::codec::{ProtocolError, Request};

/// One decoded and validated client request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    AccountRegister(RegisterRequest),
    AccountLogin(LoginRequest),
    AccountLogout(LogoutRequest),
    AccountDelete(DeleteAccountRequest),
    AccountUpdate(UpdateAccountRequest),
    DepartmentList,
    DoctorQuery(DoctorQueryRequest),
    ScheduleByDoctor(ScheduleByDoctorRequest),
    ScheduleByTime(ScheduleByTimeRequest),
    AppointmentCreate(CreateAppointmentRequest),
    AppointmentCancel(CancelAppointmentRequest),
    AppointmentList,
    DoctorLogin(DoctorLoginRequest),
    DoctorLogout,
    DoctorSchedules,
    DoctorAppointments,
    DoctorCallNext(CallNextRequest),
    AdminAddSchedules(AddSchedulesRequest),
    AdminUpdateSchedule(UpdateScheduleRequest),
    AdminAllAppointments,
    AdminReport,
    AdminAddDoctors(AddDoctorsRequest),
}

impl Command {
    pub fn from_request(request: Request) -> Result<Self, AppError> {
        let kind = request.kind().ok_or(ProtocolError::MissingType)?.to_string();
        Self::parse(&kind, request.into_data())
    }

    /// Builds the command for `kind` from its payload and validates it.
    pub fn parse(kind: &str, data: Value) -> Result<Self, AppError> {
        let command = match kind {
            "account_register" => Command::AccountRegister(payload(data)?),
            "account_login" => Command::AccountLogin(payload(data)?),
            "account_logout" => Command::AccountLogout(payload(data)?),
            "account_delete" => Command::AccountDelete(payload(data)?),
            "account_update" => Command::AccountUpdate(payload(data)?),
            "department_list" => Command::DepartmentList,
            "doctor_query" => Command::DoctorQuery(payload(data)?),
            "schedule_by_doctor" => Command::ScheduleByDoctor(payload(data)?),
            "schedule_by_time" => Command::ScheduleByTime(payload(data)?),
            "appointment_create" => Command::AppointmentCreate(payload(data)?),
            "appointment_cancel" => Command::AppointmentCancel(payload(data)?),
            "appointment_list" => Command::AppointmentList,
            "doctor_login" => Command::DoctorLogin(payload(data)?),
            "doctor_logout" => Command::DoctorLogout,
            "doctor_schedules" => Command::DoctorSchedules,
            "doctor_appointments" => Command::DoctorAppointments,
            "doctor_call_next" => Command::DoctorCallNext(payload(data)?),
            "admin_add_schedules" => Command::AdminAddSchedules(payload(data)?),
            "admin_update_schedule" => Command::AdminUpdateSchedule(payload(data)?),
            "admin_all_appointments" => Command::AdminAllAppointments,
            "admin_report" => Command::AdminReport,
            "admin_add_doctors" => Command::AdminAddDoctors(payload(data)?),
            other => return Err(ProtocolError::UnknownType(other.to_string()).into()),
        };

        command.validate()?;
        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::AccountRegister(_) => "account_register",
            Command::AccountLogin(_) => "account_login",
            Command::AccountLogout(_) => "account_logout",
            Command::AccountDelete(_) => "account_delete",
            Command::AccountUpdate(_) => "account_update",
            Command::DepartmentList => "department_list",
            Command::DoctorQuery(_) => "doctor_query",
            Command::ScheduleByDoctor(_) => "schedule_by_doctor",
            Command::ScheduleByTime(_) => "schedule_by_time",
            Command::AppointmentCreate(_) => "appointment_create",
            Command::AppointmentCancel(_) => "appointment_cancel",
            Command::AppointmentList => "appointment_list",
            Command::DoctorLogin(_) => "doctor_login",
            Command::DoctorLogout => "doctor_logout",
            Command::DoctorSchedules => "doctor_schedules",
            Command::DoctorAppointments => "doctor_appointments",
            Command::DoctorCallNext(_) => "doctor_call_next",
            Command::AdminAddSchedules(_) => "admin_add_schedules",
            Command::AdminUpdateSchedule(_) => "admin_update_schedule",
            Command::AdminAllAppointments => "admin_all_appointments",
            Command::AdminReport => "admin_report",
            Command::AdminAddDoctors(_) => "admin_add_doctors",
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        match self {
            Command::AccountRegister(request) => request.validate(),
            Command::AccountLogin(request) => request.validate(),
            Command::AccountLogout(request) => request.validate(),
            Command::AccountDelete(request) => request.validate(),
            Command::AccountUpdate(request) => request.validate(),
            Command::DoctorQuery(request) => request.validate(),
            Command::ScheduleByDoctor(request) => request.validate(),
            Command::ScheduleByTime(request) => request.validate(),
            Command::AppointmentCreate(request) => request.validate(),
            Command::AppointmentCancel(request) => request.validate(),
            Command::DoctorLogin(request) => request.validate(),
            Command::DoctorCallNext(request) => request.validate(),
            Command::AdminAddSchedules(request) => request.validate(),
            Command::AdminUpdateSchedule(request) => request.validate(),
            Command::AdminAddDoctors(request) => request.validate(),
            Command::DepartmentList
            | Command::AppointmentList
            | Command::DoctorLogout
            | Command::DoctorSchedules
            | Command::DoctorAppointments
            | Command::AdminAllAppointments
            | Command::AdminReport => Ok(()),
        }
    }
}

/// Decodes a payload. Errors name the offending field, e.g. `sid` or
/// `schedules[1].startTime`.
fn payload<T: DeserializeOwned>(data: Value) -> Result<T, AppError> {
    serde_path_to_error::deserialize(data).map_err(|e| {
        let path = e.path().to_string();
        let message = e.into_inner().to_string();
        if let Some(field) = missing_field(&message) {
            return AppError::required(field);
        }
        match path.as_str() {
            "" | "." => AppError::Validation(format!("invalid request: {}", message)),
            field => AppError::Validation(format!("{}: {}", field, message)),
        }
    })
}

fn missing_field(message: &str) -> Option<&str> {
    message.strip_prefix("missing field `")?.split('`').next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn known_types_carry_typed_payloads() {
        let command = Command::parse("appointment_create", json!({ "did": "10000001", "sid": 7 }))
            .unwrap();
        assert_matches!(&command, Command::AppointmentCreate(request) if request.sid == 7);
        assert_eq!(command.name(), "appointment_create");

        assert_eq!(Command::parse("admin_report", json!({})).unwrap(), Command::AdminReport);
    }

    #[test]
    fn call_next_defaults_to_the_start() {
        let command = Command::parse("doctor_call_next", json!({ "sid": 7 })).unwrap();
        assert_matches!(command, Command::DoctorCallNext(request) if request.last_called() == -1);

        let command =
            Command::parse("doctor_call_next", json!({ "sid": 7, "serialNumber": null })).unwrap();
        assert_matches!(command, Command::DoctorCallNext(request) if request.last_called() == -1);
    }

    #[test]
    fn missing_fields_are_named() {
        let err = Command::parse("appointment_cancel", json!({})).unwrap_err();
        assert_eq!(err, AppError::required("apid"));

        let err = Command::parse("doctor_login", json!({ "name": "Dr Wang" })).unwrap_err();
        assert_eq!(err.err_info(), "department required");
    }

    #[test]
    fn unparseable_fields_are_named() {
        let err = Command::parse("appointment_create", json!({ "did": "1", "sid": "seven" }))
            .unwrap_err();
        assert_matches!(&err, AppError::Validation(msg) if msg.starts_with("sid: invalid type"));

        let err = Command::parse(
            "schedule_by_time",
            json!({ "time": "tomorrow", "department": "Cardiology" }),
        )
        .unwrap_err();
        assert_eq!(err.err_info(), "time: invalid date-time: tomorrow");

        let err = Command::parse(
            "account_register",
            json!({
                "name": "Li Wei",
                "pid": "P1",
                "phone": "555-1",
                "passwordHex": "ab",
                "sex": "X"
            }),
        )
        .unwrap_err();
        assert_matches!(
            &err,
            AppError::Validation(msg) if msg.starts_with("sex: unknown variant `X`")
        );
    }

    #[test]
    fn nested_fields_carry_their_position() {
        let err = Command::parse(
            "admin_add_schedules",
            json!({ "schedules": [
                { "did": "10000001", "startTime": "2025-03-01T09:00",
                  "endTime": "2025-03-01T10:00", "capacity": 3 },
                { "did": "10000001", "startTime": "noon",
                  "endTime": "2025-03-01T12:00", "capacity": 3 }
            ]}),
        )
        .unwrap_err();
        assert_eq!(err.err_info(), "schedules[1].startTime: invalid date-time: noon");
    }

    #[test]
    fn non_object_payloads_are_invalid() {
        let err = Command::parse("appointment_cancel", json!([1, 2])).unwrap_err();
        assert_matches!(err, AppError::Validation(msg) if msg.starts_with("invalid request"));
    }

    #[test]
    fn payloads_are_validated() {
        let err = Command::parse("account_delete", json!({ "aid": "   " })).unwrap_err();
        assert_eq!(err, AppError::required("aid"));
    }

    #[test]
    fn unknown_and_missing_types() {
        let err = Command::parse("account_fly", json!({})).unwrap_err();
        assert_eq!(err.err_info(), "unknown type: account_fly");

        let err = Command::from_request(Request::default()).unwrap_err();
        assert_eq!(err.err_info(), "type missing");
    }
}
