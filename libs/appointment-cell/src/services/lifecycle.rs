use tracing::{debug, info, instrument};

use shared_database::{appointments, Database, StatusChange};
use shared_models::{Appointment, AppointmentStatus, DoctorAccount};

use crate::models::AppointmentError;

pub struct AppointmentLifecycleService {
    db: Database,
}

impl AppointmentLifecycleService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Call the next waiting patient of a slot.
    ///
    /// Picks the doctor's booked appointment with the smallest serial above
    /// `after_serial` and completes it. Status is read fresh on every attempt;
    /// if the pick was cancelled in between, the next one is tried.
    #[instrument(skip(self, doctor), fields(did = %doctor.did))]
    pub fn call_next(
        &self,
        doctor: &DoctorAccount,
        sid: i64,
        after_serial: i64,
    ) -> Result<Appointment, AppointmentError> {
        loop {
            let candidate = self
                .db
                .with_connection(|conn| {
                    appointments::next_booked_on_schedule(conn, sid, &doctor.did, after_serial)
                })?
                .ok_or(AppointmentError::NoNextAppointment)?;

            match self
                .db
                .change_appointment_status(&candidate.apid, AppointmentStatus::Completed)?
            {
                StatusChange::Applied { .. } => {
                    info!(
                        "Called serial {} ({}) on slot {}",
                        candidate.serial_number, candidate.apid, sid
                    );
                    return self
                        .db
                        .with_connection(|conn| appointments::find_appointment(conn, &candidate.apid))?
                        .ok_or(AppointmentError::NotFound);
                }
                StatusChange::Rejected { current } => {
                    debug!("Appointment {} became {} before it was called", candidate.apid, current);
                }
                StatusChange::NotFound => {
                    debug!("Appointment {} vanished before it was called", candidate.apid);
                }
            }
        }
    }
}
