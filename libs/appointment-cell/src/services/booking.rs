use tracing::{debug, info, instrument, warn};

use shared_database::{appointments, schedules, Database, StatusChange};
use shared_models::{Appointment, AppointmentStatus, PatientAccount};

use crate::models::AppointmentError;

pub struct BookingService {
    db: Database,
}

impl BookingService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Book one place on a slot for the patient.
    ///
    /// The slot must belong to `did`; a mismatch is refused before any capacity
    /// is touched.
    #[instrument(skip(self, account), fields(aid = %account.aid))]
    pub fn book(
        &self,
        account: &PatientAccount,
        did: &str,
        sid: i64,
    ) -> Result<Appointment, AppointmentError> {
        let slot = self
            .db
            .with_connection(|conn| schedules::find_schedule(conn, sid))?
            .ok_or(AppointmentError::SlotNotFound)?;

        if slot.did != did {
            warn!("Slot {} belongs to {}, not {}", sid, slot.did, did);
            return Err(AppointmentError::DoctorMismatch);
        }

        match self.db.try_appointment(&account.aid, sid)? {
            Some(appointment) => Ok(appointment),
            None => {
                debug!("Slot {} is full", sid);
                Err(AppointmentError::NoCapacity)
            }
        }
    }

    /// Cancel one of the patient's own appointments and return its new state.
    #[instrument(skip(self, account), fields(aid = %account.aid))]
    pub fn cancel(&self, account: &PatientAccount, apid: &str) -> Result<Appointment, AppointmentError> {
        let appointment = self.find(apid)?;
        if appointment.aid != account.aid {
            warn!("Account {} tried to cancel {}", account.aid, apid);
            return Err(AppointmentError::NotOwner);
        }

        match self.db.change_appointment_status(apid, AppointmentStatus::Cancelled)? {
            StatusChange::Applied { restored, .. } => {
                info!("Appointment {} cancelled (capacity restored: {})", apid, restored);
                self.find(apid)
            }
            StatusChange::Rejected { current } => Err(AppointmentError::AlreadyFinal(current)),
            StatusChange::NotFound => Err(AppointmentError::NotFound),
        }
    }

    pub fn find(&self, apid: &str) -> Result<Appointment, AppointmentError> {
        self.db
            .with_connection(|conn| appointments::find_appointment(conn, apid))?
            .ok_or(AppointmentError::NotFound)
    }

    pub fn for_account(&self, aid: &str) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .db
            .with_connection(|conn| appointments::find_appointments_by_account(conn, aid))?)
    }

    pub fn for_doctor(&self, did: &str) -> Result<Vec<Appointment>, AppointmentError> {
        Ok(self
            .db
            .with_connection(|conn| appointments::find_appointments_by_doctor(conn, did))?)
    }
}
