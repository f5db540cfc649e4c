use serde_json::Value;

use shared_database::Database;
use shared_models::{Appointment, AppError, AppointmentView, Session};

use crate::models::{CallNextRequest, CancelAppointmentRequest, CreateAppointmentRequest};
use crate::services::{AppointmentLifecycleService, BookingService};

pub fn appointment_views(appointments: &[Appointment]) -> Vec<AppointmentView> {
    appointments.iter().map(|a| a.view()).collect()
}

// ==============================================================================
// PATIENT SESSION HANDLERS
// ==============================================================================

pub fn appointment_create(
    db: &Database,
    session: &Session,
    request: CreateAppointmentRequest,
) -> Result<Value, AppError> {
    let account = session.require_patient()?;

    let appointment = BookingService::new(db).book(account, &request.did, request.sid)?;
    Ok(serde_json::to_value(appointment.view())?)
}

pub fn appointment_cancel(
    db: &Database,
    session: &Session,
    request: CancelAppointmentRequest,
) -> Result<Value, AppError> {
    let account = session.require_patient()?;

    let appointment = BookingService::new(db).cancel(account, &request.apid)?;
    Ok(serde_json::to_value(appointment.view())?)
}

pub fn appointment_list(db: &Database, session: &Session) -> Result<Value, AppError> {
    let account = session.require_patient()?;

    let appointments = BookingService::new(db).for_account(&account.aid)?;
    Ok(serde_json::to_value(appointment_views(&appointments))?)
}

// ==============================================================================
// DOCTOR SESSION HANDLERS
// ==============================================================================

pub fn doctor_appointments(db: &Database, session: &Session) -> Result<Value, AppError> {
    let doctor = session.require_doctor()?;

    let appointments = BookingService::new(db).for_doctor(&doctor.did)?;
    Ok(serde_json::to_value(appointment_views(&appointments))?)
}

pub fn doctor_call_next(
    db: &Database,
    session: &Session,
    request: CallNextRequest,
) -> Result<Value, AppError> {
    let doctor = session.require_doctor()?;

    let appointment = AppointmentLifecycleService::new(db).call_next(
        doctor,
        request.sid,
        request.last_called(),
    )?;
    Ok(serde_json::to_value(appointment.view())?)
}
