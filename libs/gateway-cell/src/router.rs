use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use admin_cell::handlers as admin;
use appointment_cell::handlers as appointment;
use doctor_cell::handlers as doctor;
use patient_cell::handlers as patient;
use shared_config::Departments;
use shared_database::Database;
use shared_models::{AppError, Session};

use crate::codec::{Request, Response};
use crate::command::Command;

/// Routes decoded commands to the cell handlers. Cheap to clone; one clone per
/// connection. Each handler checks its own session precondition.
#[derive(Clone)]
pub struct Dispatcher {
    db: Database,
    departments: Arc<Departments>,
}

impl Dispatcher {
    pub fn new(db: &Database, departments: Arc<Departments>) -> Self {
        Self {
            db: db.clone(),
            departments,
        }
    }

    /// Decodes, dispatches and answers one request line. Always yields a response.
    pub fn handle_line(&self, session: &mut Session, line: &str) -> Response {
        match self.decode_and_dispatch(session, line) {
            Ok(data) => Response::ok(data),
            Err(e) => Response::err(&e),
        }
    }

    fn decode_and_dispatch(&self, session: &mut Session, line: &str) -> Result<Value, AppError> {
        let request = Request::decode(line)?;
        let command = Command::from_request(request)?;
        debug!(command = command.name(), "Dispatching request");
        self.dispatch(session, command)
    }

    pub fn dispatch(&self, session: &mut Session, command: Command) -> Result<Value, AppError> {
        let db = &self.db;
        let departments = self.departments.as_ref();

        match command {
            // Patient accounts
            Command::AccountRegister(request) => patient::account_register(db, session, request),
            Command::AccountLogin(request) => patient::account_login(db, session, request),
            Command::AccountLogout(request) => patient::account_logout(session, request),
            Command::AccountDelete(request) => patient::account_delete(db, session, request),
            Command::AccountUpdate(request) => patient::account_update(db, session, request),

            // Directory lookups
            Command::DepartmentList => doctor::department_list(departments),
            Command::DoctorQuery(request) => {
                doctor::doctor_query(db, session, departments, request)
            }
            Command::ScheduleByDoctor(request) => doctor::schedule_by_doctor(db, session, request),
            Command::ScheduleByTime(request) => {
                doctor::schedule_by_time(db, session, departments, request)
            }

            // Patient bookings
            Command::AppointmentCreate(request) => {
                appointment::appointment_create(db, session, request)
            }
            Command::AppointmentCancel(request) => {
                appointment::appointment_cancel(db, session, request)
            }
            Command::AppointmentList => appointment::appointment_list(db, session),

            // Doctor sessions
            Command::DoctorLogin(request) => doctor::doctor_login(db, session, request),
            Command::DoctorLogout => doctor::doctor_logout(session),
            Command::DoctorSchedules => doctor::doctor_schedules(db, session),
            Command::DoctorAppointments => appointment::doctor_appointments(db, session),
            Command::DoctorCallNext(request) => appointment::doctor_call_next(db, session, request),

            // Administration
            Command::AdminAddSchedules(request) => admin::admin_add_schedules(db, session, request),
            Command::AdminUpdateSchedule(request) => {
                admin::admin_update_schedule(db, session, request)
            }
            Command::AdminAllAppointments => admin::admin_all_appointments(db, session),
            Command::AdminReport => admin::admin_report(db, session, departments),
            Command::AdminAddDoctors(request) => {
                admin::admin_add_doctors(db, session, departments, request)
            }
        }
    }
}
