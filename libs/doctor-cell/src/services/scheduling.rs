use std::collections::HashSet;

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use shared_config::Departments;
use shared_database::{doctors, ids, schedules, Connection, Database};
use shared_models::request::present;
use shared_models::{AppError, ScheduleSlot};

use crate::models::{CapacityUpdate, ScheduleDraft};
use crate::services::doctor::ensure_department;

pub struct SchedulingService {
    db: Database,
}

impl SchedulingService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    pub fn by_doctor(&self, did: &str) -> Result<Vec<ScheduleSlot>, AppError> {
        Ok(self
            .db
            .with_connection(|conn| schedules::find_schedules_by_doctor(conn, did))?)
    }

    /// Slots of a department whose window contains `at`.
    pub fn by_time(
        &self,
        at: NaiveDateTime,
        department: &str,
        departments: &Departments,
    ) -> Result<Vec<ScheduleSlot>, AppError> {
        ensure_department(departments, department)?;
        Ok(self.db.with_connection(|conn| {
            schedules::find_schedules_by_time_in_department(conn, at, department)
        })?)
    }

    /// Create a batch of slots, all or none.
    ///
    /// Every proposed slot is checked against the doctor's stored slots and
    /// against the other proposals for the same doctor. The check and the
    /// inserts share one transaction, so concurrent batches cannot interleave.
    pub fn add_schedules(&self, drafts: Vec<ScheduleDraft>) -> Result<Vec<ScheduleSlot>, AppError> {
        debug!("Adding {} schedules", drafts.len());

        self.db.unit_of_work(|tx| {
            let mut taken = HashSet::new();
            let mut proposed = Vec::with_capacity(drafts.len());

            for draft in &drafts {
                let did = resolve_doctor(tx, draft)?;
                let sid = fresh_sid(tx, &mut taken)?;
                proposed.push(ScheduleSlot {
                    sid,
                    did,
                    start_time: draft.start_time,
                    end_time: draft.end_time,
                    capacity: draft.capacity,
                    res: draft.capacity,
                });
            }

            for (i, slot) in proposed.iter().enumerate() {
                let existing = schedules::find_schedules_by_doctor(tx, &slot.did)?;
                if existing.iter().any(|stored| stored.overlaps(slot)) {
                    warn!("Rejected batch: slot overlaps a stored slot of {}", slot.did);
                    return Err(AppError::Conflict(format!("schedule overlap for did {}", slot.did)));
                }

                let clash = proposed
                    .iter()
                    .enumerate()
                    .any(|(j, other)| i != j && other.did == slot.did && other.overlaps(slot));
                if clash {
                    warn!("Rejected batch: proposals overlap for {}", slot.did);
                    return Err(AppError::Conflict(format!(
                        "new schedule overlap for did {}",
                        slot.did
                    )));
                }
            }

            schedules::insert_schedules(tx, &proposed)?;
            info!("Inserted {} schedules", proposed.len());
            Ok(proposed)
        })
    }

    /// Set a slot's total capacity. The difference is applied to the remaining
    /// count too, and is refused if that would go below zero.
    pub fn update_capacity(&self, update: CapacityUpdate) -> Result<ScheduleSlot, AppError> {
        self.db.unit_of_work(|tx| {
            let existing = schedules::find_schedule(tx, update.sid)?
                .ok_or_else(|| AppError::NotFound("sid not exists".to_string()))?;

            if matches!(present(&update.did), Some(did) if did != existing.did) {
                return Err(AppError::Conflict("immutable did changed".to_string()));
            }
            if matches!(update.start_time, Some(start) if start != existing.start_time) {
                return Err(AppError::Conflict("immutable startTime changed".to_string()));
            }
            if matches!(update.end_time, Some(end) if end != existing.end_time) {
                return Err(AppError::Conflict("immutable endTime changed".to_string()));
            }

            let delta = update.capacity - existing.capacity;
            if schedules::change_schedule_capacity(tx, update.sid, delta)? == 0 {
                return Err(AppError::Conflict(format!(
                    "capacity below booked count ({})",
                    existing.booked()
                )));
            }

            let updated = schedules::find_schedule(tx, update.sid)?
                .ok_or_else(|| AppError::NotFound("sid not exists".to_string()))?;
            info!(
                "Slot {} capacity {} -> {} (remaining {})",
                updated.sid, existing.capacity, updated.capacity, updated.res
            );
            Ok(updated)
        })
    }
}

fn resolve_doctor(conn: &Connection, draft: &ScheduleDraft) -> Result<String, AppError> {
    let doctor = match present(&draft.did) {
        Some(did) => doctors::find_doctor(conn, Some(did), None)?.filter(|d| d.did == did),
        None => {
            let name = present(&draft.name).ok_or_else(|| AppError::required("name"))?;
            let department =
                present(&draft.department).ok_or_else(|| AppError::required("department"))?;
            doctors::find_doctor_in_department(conn, name, department)?
        }
    };

    doctor
        .map(|d| d.did)
        .ok_or_else(|| AppError::NotFound("doctor not exists".to_string()))
}

/// A slot id unused both in the store and earlier in this batch.
fn fresh_sid(conn: &Connection, taken: &mut HashSet<i64>) -> Result<i64, AppError> {
    loop {
        let sid = ids::new_sid();
        if !taken.contains(&sid) && schedules::find_schedule(conn, sid)?.is_none() {
            taken.insert(sid);
            return Ok(sid);
        }
    }
}
