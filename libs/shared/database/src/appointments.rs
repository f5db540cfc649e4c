use rusqlite::{params, Connection, OptionalExtension, Row};

use shared_models::{Appointment, AppointmentStatus};

use crate::error::DatabaseError;
use crate::schedules::stored_time;

// Slot times come from the schedule; doctor name and department are best-effort.
const SELECT: &str = "SELECT a.serial_number, a.apid, a.aid, a.did, a.sid, a.status, \
                      s.start_time, s.end_time, d.name, d.department \
                      FROM appointments a \
                      JOIN schedules s ON s.sid = a.sid \
                      LEFT JOIN doctors d ON d.did = a.did";

struct AppointmentRow {
    serial_number: i64,
    apid: String,
    aid: String,
    did: String,
    sid: i64,
    status: String,
    start_time: String,
    end_time: String,
    doctor_name: Option<String>,
    department: Option<String>,
}

impl AppointmentRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            serial_number: row.get(0)?,
            apid: row.get(1)?,
            aid: row.get(2)?,
            did: row.get(3)?,
            sid: row.get(4)?,
            status: row.get(5)?,
            start_time: row.get(6)?,
            end_time: row.get(7)?,
            doctor_name: row.get(8)?,
            department: row.get(9)?,
        })
    }

    fn into_appointment(self) -> Result<Appointment, DatabaseError> {
        let status: AppointmentStatus = self
            .status
            .parse()
            .map_err(|e: String| DatabaseError::corrupt("appointments", e))?;
        Ok(Appointment {
            serial_number: self.serial_number,
            apid: self.apid,
            aid: self.aid,
            did: self.did,
            sid: self.sid,
            status,
            start_time: stored_time(&self.start_time)?,
            end_time: stored_time(&self.end_time)?,
            doctor_name: self.doctor_name,
            department: self.department,
        })
    }
}

fn query_appointments<P: rusqlite::Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<Appointment>, DatabaseError> {
    let sql = format!("{} {} ORDER BY a.serial_number", SELECT, filter);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params, AppointmentRow::from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(AppointmentRow::into_appointment).collect()
}

/// Inserts a new appointment and returns the serial number the store assigned.
pub fn insert_appointment(
    conn: &Connection,
    apid: &str,
    aid: &str,
    did: &str,
    sid: i64,
    status: AppointmentStatus,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO appointments (apid, aid, did, sid, status) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![apid, aid, did, sid, status.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_appointment(conn: &Connection, apid: &str) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!("{} WHERE a.apid = ?1", SELECT);
    let row = conn
        .query_row(&sql, params![apid], AppointmentRow::from_row)
        .optional()?;
    row.map(AppointmentRow::into_appointment).transpose()
}

pub fn find_appointments_by_account(conn: &Connection, aid: &str) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(conn, "WHERE a.aid = ?1", params![aid])
}

pub fn find_appointments_by_doctor(conn: &Connection, did: &str) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(conn, "WHERE a.did = ?1", params![did])
}

pub fn find_appointments_by_schedule(conn: &Connection, sid: i64) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(conn, "WHERE a.sid = ?1", params![sid])
}

pub fn find_appointments_by_status(
    conn: &Connection,
    status: AppointmentStatus,
) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(conn, "WHERE a.status = ?1", params![status.as_str()])
}

pub fn list_appointments(conn: &Connection) -> Result<Vec<Appointment>, DatabaseError> {
    query_appointments(conn, "", [])
}

/// Current status and slot of an appointment, read on the caller's connection
/// so that inside a unit of work it is consistent with the following write.
pub fn status_and_slot(
    conn: &Connection,
    apid: &str,
) -> Result<Option<(AppointmentStatus, i64)>, DatabaseError> {
    let row: Option<(String, i64)> = conn
        .query_row(
            "SELECT status, sid FROM appointments WHERE apid = ?1",
            params![apid],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .optional()?;

    match row {
        Some((status, sid)) => {
            let status = status
                .parse()
                .map_err(|e: String| DatabaseError::corrupt("appointments", e))?;
            Ok(Some((status, sid)))
        }
        None => Ok(None),
    }
}

pub fn update_status(conn: &Connection, apid: &str, status: AppointmentStatus) -> Result<usize, DatabaseError> {
    Ok(conn.execute(
        "UPDATE appointments SET status = ?1 WHERE apid = ?2",
        params![status.as_str(), apid],
    )?)
}

/// The booked appointment with the smallest serial above `after_serial` on the
/// slot, restricted to the doctor's own appointments.
pub fn next_booked_on_schedule(
    conn: &Connection,
    sid: i64,
    did: &str,
    after_serial: i64,
) -> Result<Option<Appointment>, DatabaseError> {
    let sql = format!(
        "{} WHERE a.sid = ?1 AND a.did = ?2 AND a.status = ?3 AND a.serial_number > ?4 \
         ORDER BY a.serial_number LIMIT 1",
        SELECT
    );
    let row = conn
        .query_row(
            &sql,
            params![sid, did, AppointmentStatus::Booked.as_str(), after_serial],
            AppointmentRow::from_row,
        )
        .optional()?;
    row.map(AppointmentRow::into_appointment).transpose()
}

pub fn count_booked_on_schedule(conn: &Connection, sid: i64) -> Result<i64, DatabaseError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM appointments WHERE sid = ?1 AND status = ?2",
        params![sid, AppointmentStatus::Booked.as_str()],
        |row| row.get(0),
    )?)
}

pub fn delete_appointment(conn: &Connection, apid: &str) -> Result<usize, DatabaseError> {
    Ok(conn.execute("DELETE FROM appointments WHERE apid = ?1", params![apid])?)
}
