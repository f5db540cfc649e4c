use serde_json::{json, Value};
use tracing::debug;

use shared_config::Departments;
use shared_database::Database;
use shared_models::{AppError, DoctorView, ScheduleSlot, ScheduleView, Session};

use crate::models::{
    DoctorLoginRequest, DoctorQueryRequest, ScheduleByDoctorRequest, ScheduleByTimeRequest,
};
use crate::services::{DoctorService, SchedulingService};

pub fn schedule_views(slots: &[ScheduleSlot]) -> Vec<ScheduleView> {
    slots.iter().map(|slot| slot.view()).collect()
}

// ==============================================================================
// PUBLIC HANDLERS (NO SESSION REQUIRED)
// ==============================================================================

pub fn department_list(departments: &Departments) -> Result<Value, AppError> {
    Ok(json!(departments.names()))
}

pub fn doctor_login(
    db: &Database,
    session: &mut Session,
    request: DoctorLoginRequest,
) -> Result<Value, AppError> {
    let doctor = DoctorService::new(db).login(&request)?;
    let view = serde_json::to_value(doctor.view())?;
    session.login_doctor(doctor);
    Ok(view)
}

// ==============================================================================
// ANY SESSION
// ==============================================================================

pub fn doctor_query(
    db: &Database,
    session: &Session,
    departments: &Departments,
    request: DoctorQueryRequest,
) -> Result<Value, AppError> {
    session.require_authenticated()?;

    let doctors = DoctorService::new(db).query(&request, departments)?;
    debug!("Doctor query matched {} doctors", doctors.len());
    let views: Vec<DoctorView> = doctors.iter().map(|d| d.view()).collect();
    Ok(serde_json::to_value(views)?)
}

pub fn schedule_by_doctor(
    db: &Database,
    session: &Session,
    request: ScheduleByDoctorRequest,
) -> Result<Value, AppError> {
    session.require_authenticated()?;

    let slots = SchedulingService::new(db).by_doctor(&request.did)?;
    Ok(serde_json::to_value(schedule_views(&slots))?)
}

pub fn schedule_by_time(
    db: &Database,
    session: &Session,
    departments: &Departments,
    request: ScheduleByTimeRequest,
) -> Result<Value, AppError> {
    session.require_authenticated()?;

    let slots = SchedulingService::new(db).by_time(request.time, &request.department, departments)?;
    Ok(serde_json::to_value(schedule_views(&slots))?)
}

// ==============================================================================
// DOCTOR SESSION HANDLERS
// ==============================================================================

pub fn doctor_logout(session: &mut Session) -> Result<Value, AppError> {
    session.require_doctor()?;
    session.logout();
    Ok(json!({}))
}

pub fn doctor_schedules(db: &Database, session: &Session) -> Result<Value, AppError> {
    let doctor = session.require_doctor()?;

    let slots = SchedulingService::new(db).by_doctor(&doctor.did)?;
    Ok(serde_json::to_value(schedule_views(&slots))?)
}
