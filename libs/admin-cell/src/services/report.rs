use std::collections::HashSet;

use tracing::debug;

use appointment_cell::handlers::appointment_views;
use doctor_cell::handlers::schedule_views;
use shared_config::Departments;
use shared_database::{appointments, doctors, schedules, Database};
use shared_models::{Appointment, AppError, AppointmentStatus, DoctorAccount};

use crate::models::Report;

pub struct ReportService {
    db: Database,
}

impl ReportService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Every appointment in every status, each listed once.
    pub fn all_appointments(&self) -> Result<Vec<Appointment>, AppError> {
        let mut seen = HashSet::new();
        let mut all = Vec::new();

        for status in AppointmentStatus::ALL {
            let batch = self
                .db
                .with_connection(|conn| appointments::find_appointments_by_status(conn, status))?;
            for appointment in batch {
                if seen.insert(appointment.apid.clone()) {
                    all.push(appointment);
                }
            }
        }

        Ok(all)
    }

    /// Doctors of the configured departments (all doctors when none are
    /// configured), their slots, and all appointments.
    pub fn build(&self, departments: &Departments) -> Result<Report, AppError> {
        let doctor_list = self.doctors(departments)?;

        let mut slots = Vec::new();
        for doctor in &doctor_list {
            let owned = self
                .db
                .with_connection(|conn| schedules::find_schedules_by_doctor(conn, &doctor.did))?;
            slots.extend(owned);
        }

        let appointment_list = self.all_appointments()?;
        debug!(
            "Report: {} doctors, {} schedules, {} appointments",
            doctor_list.len(),
            slots.len(),
            appointment_list.len()
        );

        Ok(Report {
            doctors: doctor_list.iter().map(|d| d.view()).collect(),
            schedules: schedule_views(&slots),
            appointments: appointment_views(&appointment_list),
        })
    }

    fn doctors(&self, departments: &Departments) -> Result<Vec<DoctorAccount>, AppError> {
        if departments.is_empty() {
            return Ok(self.db.with_connection(doctors::list_doctors)?);
        }

        let mut found = Vec::new();
        for department in departments.names() {
            let members = self
                .db
                .with_connection(|conn| doctors::find_doctors_by_department(conn, department))?;
            found.extend(members);
        }
        Ok(found)
    }
}
