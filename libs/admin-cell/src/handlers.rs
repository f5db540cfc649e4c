use serde_json::Value;
use tracing::info;

use appointment_cell::handlers::appointment_views;
use doctor_cell::handlers::schedule_views;
use doctor_cell::{DoctorService, SchedulingService};
use shared_config::Departments;
use shared_database::Database;
use shared_models::{AppError, DoctorView, Session};

use crate::models::{AddDoctorsRequest, AddSchedulesRequest, UpdateScheduleRequest};
use crate::services::ReportService;

// ==============================================================================
// ADMIN HANDLERS (DOCTOR SESSION WITH ADMIN FLAG)
// ==============================================================================

pub fn admin_add_schedules(
    db: &Database,
    session: &Session,
    request: AddSchedulesRequest,
) -> Result<Value, AppError> {
    let admin = session.require_admin()?;

    let added = SchedulingService::new(db).add_schedules(request.into_drafts())?;
    info!("Admin {} added {} schedules", admin.did, added.len());
    Ok(serde_json::to_value(schedule_views(&added))?)
}

pub fn admin_update_schedule(
    db: &Database,
    session: &Session,
    request: UpdateScheduleRequest,
) -> Result<Value, AppError> {
    session.require_admin()?;

    let updated = SchedulingService::new(db).update_capacity(request)?;
    Ok(serde_json::to_value(updated.view())?)
}

pub fn admin_add_doctors(
    db: &Database,
    session: &Session,
    departments: &Departments,
    request: AddDoctorsRequest,
) -> Result<Value, AppError> {
    let admin = session.require_admin()?;

    let saved = DoctorService::new(db).upsert(request.into_drafts(), departments)?;
    info!("Admin {} saved {} doctors", admin.did, saved.len());
    let views: Vec<DoctorView> = saved.iter().map(|d| d.view()).collect();
    Ok(serde_json::to_value(views)?)
}

pub fn admin_all_appointments(db: &Database, session: &Session) -> Result<Value, AppError> {
    session.require_admin()?;

    let all = ReportService::new(db).all_appointments()?;
    Ok(serde_json::to_value(appointment_views(&all))?)
}

pub fn admin_report(
    db: &Database,
    session: &Session,
    departments: &Departments,
) -> Result<Value, AppError> {
    session.require_admin()?;

    let report = ReportService::new(db).build(departments)?;
    Ok(serde_json::to_value(report)?)
}
