use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

use shared_config::Departments;
use shared_database::{accounts, doctors, ids, schedules, Database};
use shared_models::{DoctorAccount, PatientAccount, ScheduleSlot, Sex};

pub const DEFAULT_PASSWORD: &str = "secret";

/// A store living in its own temporary directory. The directory (and the file)
/// goes away when this is dropped, so keep it alive for the whole test.
pub struct TestDatabase {
    _dir: TempDir,
    pub db: Database,
}

impl TestDatabase {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let db = Database::open(dir.path().join("habms-test.db"), Duration::from_secs(10))
            .expect("open test database");
        Self { _dir: dir, db }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

/// Hex SHA-256, the form clients send credentials in.
pub fn password_hex(plain: &str) -> String {
    Sha256::digest(plain.as_bytes())
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

/// A time on the fixture day, 2025-03-01.
pub fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("valid fixture time")
}

pub fn departments() -> Arc<Departments> {
    Arc::new(Departments::new(["Cardiology", "Neurology", "Pediatrics"]))
}

pub fn seed_patient(db: &Database, pid: &str, phone: &str) -> PatientAccount {
    let account = PatientAccount {
        aid: ids::new_aid(),
        name: format!("Patient {}", pid),
        password_hex: password_hex(DEFAULT_PASSWORD),
        pid: pid.to_string(),
        phone: phone.to_string(),
        sex: Sex::F,
    };
    db.with_connection(|conn| accounts::insert_account(conn, &account))
        .expect("seed patient");
    account
}

pub fn seed_doctor(db: &Database, name: &str, department: &str, admin: bool) -> DoctorAccount {
    let doctor = DoctorAccount {
        did: ids::new_did(),
        name: name.to_string(),
        password_hex: password_hex(DEFAULT_PASSWORD),
        admin,
        department: department.to_string(),
        description: String::new(),
    };
    db.with_connection(|conn| doctors::insert_doctor(conn, &doctor))
        .expect("seed doctor");
    doctor
}

pub fn seed_slot(
    db: &Database,
    did: &str,
    start_time: NaiveDateTime,
    end_time: NaiveDateTime,
    capacity: i64,
) -> ScheduleSlot {
    let slot = ScheduleSlot {
        sid: ids::new_sid(),
        did: did.to_string(),
        start_time,
        end_time,
        capacity,
        res: capacity,
    };
    db.with_connection(|conn| schedules::insert_schedule(conn, &slot))
        .expect("seed slot");
    slot
}

pub fn remaining(db: &Database, sid: i64) -> i64 {
    db.with_connection(|conn| schedules::find_schedule(conn, sid))
        .expect("read slot")
        .map(|slot| slot.res)
        .expect("slot exists")
}
