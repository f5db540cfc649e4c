use rusqlite::Connection;

use crate::error::DatabaseError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS accounts (
    aid          TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    password_hex TEXT NOT NULL,
    pid          TEXT NOT NULL UNIQUE,
    phone        TEXT NOT NULL UNIQUE,
    sex          TEXT NOT NULL CHECK (sex IN ('M', 'F'))
);

CREATE TABLE IF NOT EXISTS doctors (
    did          TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    password_hex TEXT NOT NULL,
    admin        INTEGER NOT NULL DEFAULT 0,
    department   TEXT NOT NULL,
    description  TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_doctors_department ON doctors (department, name);

CREATE TABLE IF NOT EXISTS schedules (
    sid        INTEGER PRIMARY KEY,
    did        TEXT NOT NULL REFERENCES doctors (did),
    start_time TEXT NOT NULL,
    end_time   TEXT NOT NULL,
    capacity   INTEGER NOT NULL,
    res        INTEGER NOT NULL,
    CHECK (end_time >= start_time),
    CHECK (res >= 0 AND res <= capacity)
);

CREATE INDEX IF NOT EXISTS idx_schedules_did ON schedules (did);
CREATE INDEX IF NOT EXISTS idx_schedules_window ON schedules (start_time, end_time);

CREATE TABLE IF NOT EXISTS appointments (
    serial_number INTEGER PRIMARY KEY AUTOINCREMENT,
    apid          TEXT NOT NULL UNIQUE,
    aid           TEXT NOT NULL,
    did           TEXT NOT NULL,
    sid           INTEGER NOT NULL REFERENCES schedules (sid),
    status        TEXT NOT NULL CHECK (status IN ('Ok', 'Abandon', 'Done'))
);

CREATE INDEX IF NOT EXISTS idx_appointments_sid_status ON appointments (sid, status);
CREATE INDEX IF NOT EXISTS idx_appointments_aid ON appointments (aid);
CREATE INDEX IF NOT EXISTS idx_appointments_did ON appointments (did);
"#;

pub fn migrate(conn: &Connection) -> Result<(), DatabaseError> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}
