//! The two operations that move slot capacity, each a single unit of work.

use tracing::{debug, info, instrument, warn};

use shared_models::{Appointment, AppointmentStatus};

use crate::error::DatabaseError;
use crate::store::Database;
use crate::{appointments, ids, schedules};

const APID_ATTEMPTS: usize = 5;

/// Outcome of a status change request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusChange {
    NotFound,
    /// The current status does not allow the move; nothing was written.
    Rejected { current: AppointmentStatus },
    Applied {
        previous: AppointmentStatus,
        restored: bool,
    },
}

impl Database {
    /// Books one unit on `sid` for `aid`.
    ///
    /// Returns `Ok(None)` when no unit is left (or the slot does not exist).
    /// The decrement is a single guarded statement, so at most `capacity`
    /// callers can ever get past it; everything after it rolls back together.
    #[instrument(skip(self))]
    pub fn try_appointment(&self, aid: &str, sid: i64) -> Result<Option<Appointment>, DatabaseError> {
        self.unit_of_work(|tx| {
            if schedules::decrement_remaining(tx, sid)? == 0 {
                debug!("No capacity left on slot {}", sid);
                return Ok(None);
            }

            let slot = schedules::find_schedule(tx, sid)?
                .ok_or_else(|| DatabaseError::corrupt("schedules", format!("slot {} vanished", sid)))?;

            let mut attempt = 0;
            let apid = loop {
                attempt += 1;
                let apid = ids::new_apid();
                match appointments::insert_appointment(
                    tx,
                    &apid,
                    aid,
                    &slot.did,
                    sid,
                    AppointmentStatus::Booked,
                ) {
                    Ok(_) => break apid,
                    Err(e) if e.is_unique_violation() && attempt < APID_ATTEMPTS => {
                        warn!("Appointment id {} collided, retrying", apid);
                    }
                    Err(e) => return Err(e),
                }
            };

            let appointment = appointments::find_appointment(tx, &apid)?
                .ok_or_else(|| DatabaseError::corrupt("appointments", format!("{} not readable after insert", apid)))?;

            info!(
                "Booked appointment {} (serial {}) on slot {}",
                appointment.apid, appointment.serial_number, sid
            );
            Ok(Some(appointment))
        })
    }

    /// Moves an appointment to `target`, handing a unit back to the slot when
    /// a booking is cancelled. Status and capacity change in one transaction.
    #[instrument(skip(self))]
    pub fn change_appointment_status(
        &self,
        apid: &str,
        target: AppointmentStatus,
    ) -> Result<StatusChange, DatabaseError> {
        self.unit_of_work(|tx| {
            let Some((current, sid)) = appointments::status_and_slot(tx, apid)? else {
                return Ok(StatusChange::NotFound);
            };

            if !current.can_transition_to(&target) {
                debug!("Appointment {} is {}, refusing move to {}", apid, current, target);
                return Ok(StatusChange::Rejected { current });
            }

            let restored = current.restores_capacity(&target);
            if restored && schedules::restore_remaining(tx, sid)? == 0 {
                return Err(DatabaseError::corrupt(
                    "schedules",
                    format!("slot {} already at full capacity", sid),
                ));
            }
            appointments::update_status(tx, apid, target)?;

            info!("Appointment {} moved {} -> {}", apid, current, target);
            Ok(StatusChange::Applied { previous: current, restored })
        })
    }

    /// Removes an appointment outright. A still-booked one gives its unit back.
    #[instrument(skip(self))]
    pub fn remove_appointment(&self, apid: &str) -> Result<bool, DatabaseError> {
        self.unit_of_work(|tx| {
            let Some((current, sid)) = appointments::status_and_slot(tx, apid)? else {
                return Ok(false);
            };
            if current == AppointmentStatus::Booked {
                schedules::restore_remaining(tx, sid)?;
            }
            appointments::delete_appointment(tx, apid)?;
            Ok(true)
        })
    }

    /// Inserts a batch of slots: all become visible or none do.
    pub fn insert_schedules(&self, slots: &[shared_models::ScheduleSlot]) -> Result<(), DatabaseError> {
        self.unit_of_work(|tx| schedules::insert_schedules(tx, slots))
    }
}
