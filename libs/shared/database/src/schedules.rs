use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Row};

use shared_models::{time, ScheduleSlot};

use crate::error::DatabaseError;

const SELECT: &str = "SELECT sid, did, start_time, end_time, capacity, res FROM schedules";

struct ScheduleRow {
    sid: i64,
    did: String,
    start_time: String,
    end_time: String,
    capacity: i64,
    res: i64,
}

impl ScheduleRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            sid: row.get(0)?,
            did: row.get(1)?,
            start_time: row.get(2)?,
            end_time: row.get(3)?,
            capacity: row.get(4)?,
            res: row.get(5)?,
        })
    }

    fn into_slot(self) -> Result<ScheduleSlot, DatabaseError> {
        Ok(ScheduleSlot {
            sid: self.sid,
            did: self.did,
            start_time: stored_time(&self.start_time)?,
            end_time: stored_time(&self.end_time)?,
            capacity: self.capacity,
            res: self.res,
        })
    }
}

pub(crate) fn stored_time(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    time::parse(raw).ok_or_else(|| DatabaseError::corrupt("schedules", format!("bad timestamp {}", raw)))
}

fn query_slots<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<Vec<ScheduleSlot>, DatabaseError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, ScheduleRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(ScheduleRow::into_slot).collect()
}

pub fn insert_schedule(conn: &Connection, slot: &ScheduleSlot) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO schedules (sid, did, start_time, end_time, capacity, res) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            slot.sid,
            slot.did,
            time::format(&slot.start_time),
            time::format(&slot.end_time),
            slot.capacity,
            slot.res,
        ],
    )?;
    Ok(())
}

/// Inserts every slot on the given connection. Callers wanting all-or-nothing
/// pass a transaction.
pub fn insert_schedules(conn: &Connection, slots: &[ScheduleSlot]) -> Result<(), DatabaseError> {
    for slot in slots {
        insert_schedule(conn, slot)?;
    }
    Ok(())
}

pub fn find_schedule(conn: &Connection, sid: i64) -> Result<Option<ScheduleSlot>, DatabaseError> {
    let sql = format!("{} WHERE sid = ?1", SELECT);
    let row = conn.query_row(&sql, params![sid], ScheduleRow::from_row).optional()?;
    row.map(ScheduleRow::into_slot).transpose()
}

pub fn find_schedules_by_doctor(conn: &Connection, did: &str) -> Result<Vec<ScheduleSlot>, DatabaseError> {
    query_slots(conn, &format!("{} WHERE did = ?1 ORDER BY start_time, sid", SELECT), params![did])
}

/// Slots whose closed window contains `at`.
pub fn find_schedules_by_time(conn: &Connection, at: NaiveDateTime) -> Result<Vec<ScheduleSlot>, DatabaseError> {
    let at = time::format(&at);
    query_slots(
        conn,
        &format!("{} WHERE start_time <= ?1 AND end_time >= ?1 ORDER BY start_time, sid", SELECT),
        params![at],
    )
}

pub fn find_schedules_by_time_in_department(
    conn: &Connection,
    at: NaiveDateTime,
    department: &str,
) -> Result<Vec<ScheduleSlot>, DatabaseError> {
    let at = time::format(&at);
    let sql = "SELECT s.sid, s.did, s.start_time, s.end_time, s.capacity, s.res \
               FROM schedules s JOIN doctors d ON d.did = s.did \
               WHERE s.start_time <= ?1 AND s.end_time >= ?1 AND d.department = ?2 \
               ORDER BY s.start_time, s.sid";
    query_slots(conn, sql, params![at, department])
}

/// Adds `delta` to both capacity and remaining. Returns 0 rows when the slot is
/// missing or the change would push remaining below zero.
pub fn change_schedule_capacity(conn: &Connection, sid: i64, delta: i64) -> Result<usize, DatabaseError> {
    let changed = conn.execute(
        "UPDATE schedules SET capacity = capacity + ?2, res = res + ?2 WHERE sid = ?1 AND res + ?2 >= 0",
        params![sid, delta],
    )?;
    Ok(changed)
}

/// The booking gate: takes one unit only while some remain. 1 row means the
/// unit is ours.
pub fn decrement_remaining(conn: &Connection, sid: i64) -> Result<usize, DatabaseError> {
    Ok(conn.execute(
        "UPDATE schedules SET res = res - 1 WHERE sid = ?1 AND res > 0",
        params![sid],
    )?)
}

pub fn restore_remaining(conn: &Connection, sid: i64) -> Result<usize, DatabaseError> {
    Ok(conn.execute(
        "UPDATE schedules SET res = res + 1 WHERE sid = ?1 AND res < capacity",
        params![sid],
    )?)
}

pub fn delete_schedule(conn: &Connection, sid: i64) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM schedules WHERE sid = ?1", params![sid])?)
}
