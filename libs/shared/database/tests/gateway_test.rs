use std::sync::Arc;
use std::thread;
use std::time::Duration;

use assert_matches::assert_matches;
use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use shared_database::{accounts, appointments, doctors, ids, schedules};
use shared_database::{Database, DatabaseError, StatusChange};
use shared_models::{AppointmentStatus, DoctorAccount, PatientAccount, ScheduleSlot, Sex};

fn open() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let db = Database::open(dir.path().join("habms.db"), Duration::from_secs(10)).unwrap();
    (dir, db)
}

fn at(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(h, m, 0).unwrap()
}

fn patient(aid: &str, pid: &str, phone: &str) -> PatientAccount {
    PatientAccount {
        aid: aid.to_string(),
        name: "Li Lei".to_string(),
        password_hex: "aa".repeat(32),
        pid: pid.to_string(),
        phone: phone.to_string(),
        sex: Sex::M,
    }
}

fn doctor(did: &str, name: &str) -> DoctorAccount {
    DoctorAccount {
        did: did.to_string(),
        name: name.to_string(),
        password_hex: "bb".repeat(32),
        admin: false,
        department: "Cardiology".to_string(),
        description: String::new(),
    }
}

fn seed_slot(db: &Database, did: &str, capacity: i64) -> ScheduleSlot {
    let slot = ScheduleSlot {
        sid: ids::new_sid(),
        did: did.to_string(),
        start_time: at(9, 0),
        end_time: at(10, 0),
        capacity,
        res: capacity,
    };
    db.with_connection(|conn| {
        doctors::insert_doctor(conn, &doctor(did, "Dr Wang")).or_else(|e| {
            if e.is_unique_violation() {
                Ok(())
            } else {
                Err(e)
            }
        })?;
        schedules::insert_schedule(conn, &slot)
    })
    .unwrap();
    slot
}

fn remaining(db: &Database, sid: i64) -> i64 {
    db.with_connection(|conn| schedules::find_schedule(conn, sid))
        .unwrap()
        .unwrap()
        .res
}

#[test]
fn account_lookup_matches_any_identifier() {
    let (_dir, db) = open();
    db.with_connection(|conn| accounts::insert_account(conn, &patient("0000000001", "P1", "555-1")))
        .unwrap();

    db.with_connection(|conn| {
        let by_pid = accounts::find_account(conn, None, Some("P1"), Some(""))?;
        let by_phone = accounts::find_account(conn, Some(""), None, Some("555-1"))?;
        let by_aid = accounts::find_account(conn, Some("0000000001"), Some("nope"), None)?;
        let none = accounts::find_account(conn, Some(""), Some(" "), None)?;

        assert_eq!(by_pid.map(|a| a.aid).as_deref(), Some("0000000001"));
        assert_eq!(by_phone.map(|a| a.pid).as_deref(), Some("P1"));
        assert!(by_aid.is_some());
        assert!(none.is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn duplicate_national_id_is_a_unique_violation() {
    let (_dir, db) = open();
    db.with_connection(|conn| accounts::insert_account(conn, &patient("0000000001", "P1", "555-1")))
        .unwrap();

    let err = db
        .with_connection(|conn| accounts::insert_account(conn, &patient("0000000002", "P1", "555-2")))
        .unwrap_err();

    assert!(err.is_unique_violation());
    assert!(err.detail().unwrap_or_default().contains("accounts.pid"));
}

#[test]
fn account_update_keeps_national_id() {
    let (_dir, db) = open();
    let mut account = patient("0000000001", "P1", "555-1");
    db.with_connection(|conn| accounts::insert_account(conn, &account)).unwrap();

    account.name = "Han Meimei".to_string();
    account.sex = Sex::F;
    account.pid = "changed".to_string();
    let changed = db
        .with_connection(|conn| accounts::update_account_info(conn, &account))
        .unwrap();
    assert_eq!(changed, 1);

    let stored = db
        .with_connection(|conn| accounts::find_account(conn, Some("0000000001"), None, None))
        .unwrap()
        .unwrap();
    assert_eq!(stored.name, "Han Meimei");
    assert_eq!(stored.sex, Sex::F);
    assert_eq!(stored.pid, "P1");
}

#[test]
fn schedules_found_by_time_window_and_department() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 2);

    db.with_connection(|conn| {
        assert_eq!(schedules::find_schedules_by_time(conn, at(9, 0))?.len(), 1);
        assert_eq!(schedules::find_schedules_by_time(conn, at(10, 0))?.len(), 1);
        assert!(schedules::find_schedules_by_time(conn, at(10, 1))?.is_empty());

        let cardiology = schedules::find_schedules_by_time_in_department(conn, at(9, 30), "Cardiology")?;
        assert_eq!(cardiology, vec![slot.clone()]);
        assert!(schedules::find_schedules_by_time_in_department(conn, at(9, 30), "Surgery")?.is_empty());
        Ok(())
    })
    .unwrap();
}

#[test]
fn capacity_change_never_drives_remaining_negative() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 2);
    db.try_appointment("0000000001", slot.sid).unwrap().unwrap();

    let rejected = db
        .with_connection(|conn| schedules::change_schedule_capacity(conn, slot.sid, -2))
        .unwrap();
    assert_eq!(rejected, 0);

    let applied = db
        .with_connection(|conn| schedules::change_schedule_capacity(conn, slot.sid, 3))
        .unwrap();
    assert_eq!(applied, 1);

    let stored = db.with_connection(|conn| schedules::find_schedule(conn, slot.sid)).unwrap().unwrap();
    assert_eq!((stored.capacity, stored.res), (5, 4));
}

#[test]
fn booking_fills_slot_and_assigns_increasing_serials() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 2);

    let first = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();
    let second = db.try_appointment("0000000002", slot.sid).unwrap().unwrap();
    let third = db.try_appointment("0000000003", slot.sid).unwrap();

    assert!(second.serial_number > first.serial_number);
    assert_eq!(first.status, AppointmentStatus::Booked);
    assert_eq!(first.did, "10000001");
    assert_eq!(first.start_time, at(9, 0));
    assert_eq!(first.doctor_name.as_deref(), Some("Dr Wang"));
    assert!(third.is_none());
    assert_eq!(remaining(&db, slot.sid), 0);
}

#[test]
fn concurrent_bookings_never_oversell() {
    let (_dir, db) = open();
    let capacity = 5;
    let extra = 7;
    let slot = seed_slot(&db, "10000001", capacity);
    let db = Arc::new(db);

    let handles: Vec<_> = (0..capacity + extra)
        .map(|i| {
            let db = Arc::clone(&db);
            let sid = slot.sid;
            thread::spawn(move || db.try_appointment(&format!("{:010}", i), sid).unwrap())
        })
        .collect();

    let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    let booked = results.iter().filter(|r| r.is_some()).count() as i64;

    assert_eq!(booked, capacity);
    assert_eq!(results.len() as i64 - booked, extra);
    assert_eq!(remaining(&db, slot.sid), 0);
    let count = db
        .with_connection(|conn| appointments::count_booked_on_schedule(conn, slot.sid))
        .unwrap();
    assert_eq!(count, capacity);
}

#[test]
fn cancel_restores_exactly_one_unit_once() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 3);
    let booked = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();
    assert_eq!(remaining(&db, slot.sid), 2);

    let first = db
        .change_appointment_status(&booked.apid, AppointmentStatus::Cancelled)
        .unwrap();
    assert_eq!(
        first,
        StatusChange::Applied { previous: AppointmentStatus::Booked, restored: true }
    );
    assert_eq!(remaining(&db, slot.sid), 3);

    let second = db
        .change_appointment_status(&booked.apid, AppointmentStatus::Cancelled)
        .unwrap();
    assert_eq!(second, StatusChange::Rejected { current: AppointmentStatus::Cancelled });
    assert_eq!(remaining(&db, slot.sid), 3);
}

#[test]
fn completing_leaves_capacity_alone() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 3);
    let booked = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();

    let change = db
        .change_appointment_status(&booked.apid, AppointmentStatus::Completed)
        .unwrap();
    assert_eq!(
        change,
        StatusChange::Applied { previous: AppointmentStatus::Booked, restored: false }
    );
    assert_eq!(remaining(&db, slot.sid), 2);

    let cancel = db
        .change_appointment_status(&booked.apid, AppointmentStatus::Cancelled)
        .unwrap();
    assert_eq!(cancel, StatusChange::Rejected { current: AppointmentStatus::Completed });
}

#[test]
fn unknown_appointment_is_not_found() {
    let (_dir, db) = open();
    let change = db
        .change_appointment_status("250301000000", AppointmentStatus::Cancelled)
        .unwrap();
    assert_eq!(change, StatusChange::NotFound);
}

#[test]
fn removing_a_booked_appointment_returns_its_unit() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 1);
    let booked = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();

    assert!(db.remove_appointment(&booked.apid).unwrap());
    assert!(!db.remove_appointment(&booked.apid).unwrap());
    assert_eq!(remaining(&db, slot.sid), 1);
}

#[test]
fn next_booked_skips_called_and_cancelled() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 3);
    let a = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();
    let b = db.try_appointment("0000000002", slot.sid).unwrap().unwrap();
    let c = db.try_appointment("0000000003", slot.sid).unwrap().unwrap();
    db.change_appointment_status(&b.apid, AppointmentStatus::Cancelled).unwrap();

    db.with_connection(|conn| {
        let next = appointments::next_booked_on_schedule(conn, slot.sid, "10000001", -1)?;
        assert_eq!(next.map(|n| n.apid), Some(a.apid.clone()));

        let next = appointments::next_booked_on_schedule(conn, slot.sid, "10000001", a.serial_number)?;
        assert_eq!(next.map(|n| n.apid), Some(c.apid.clone()));

        assert!(appointments::next_booked_on_schedule(conn, slot.sid, "10000002", -1)?.is_none());
        assert!(appointments::next_booked_on_schedule(conn, slot.sid, "10000001", c.serial_number)?.is_none());
        Ok(())
    })
    .unwrap();
}

#[test]
fn unit_of_work_rolls_back_on_error() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 3);

    let result: Result<(), DatabaseError> = db.unit_of_work(|tx| {
        schedules::decrement_remaining(tx, slot.sid)?;
        Err(DatabaseError::corrupt("schedules", "forced"))
    });

    assert_matches!(result, Err(DatabaseError::Corrupt { table: "schedules", .. }));
    assert_eq!(remaining(&db, slot.sid), 3);
}

#[test]
fn batch_insert_is_all_or_nothing() {
    let (_dir, db) = open();
    let existing = seed_slot(&db, "10000001", 1);
    let fresh = ScheduleSlot { sid: existing.sid + 1, ..existing.clone() };

    // Second entry reuses an existing sid, so the first must not survive either.
    let err = db.insert_schedules(&[fresh.clone(), existing.clone()]).unwrap_err();
    assert!(err.is_unique_violation());

    let found = db.with_connection(|conn| schedules::find_schedule(conn, fresh.sid)).unwrap();
    assert!(found.is_none());
}

#[test]
fn appointments_listed_by_status() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 3);
    let a = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();
    db.try_appointment("0000000002", slot.sid).unwrap().unwrap();
    db.change_appointment_status(&a.apid, AppointmentStatus::Completed).unwrap();

    db.with_connection(|conn| {
        assert_eq!(appointments::find_appointments_by_status(conn, AppointmentStatus::Booked)?.len(), 1);
        assert_eq!(appointments::find_appointments_by_status(conn, AppointmentStatus::Completed)?.len(), 1);
        assert!(appointments::find_appointments_by_status(conn, AppointmentStatus::Cancelled)?.is_empty());
        assert_eq!(appointments::find_appointments_by_account(conn, "0000000001")?.len(), 1);
        assert_eq!(appointments::find_appointments_by_doctor(conn, "10000001")?.len(), 2);
        assert_eq!(appointments::list_appointments(conn)?.len(), 2);
        Ok(())
    })
    .unwrap();
}

#[test]
fn deletes_respect_references() {
    let (_dir, db) = open();
    let slot = seed_slot(&db, "10000001", 2);
    let booked = db.try_appointment("0000000001", slot.sid).unwrap().unwrap();

    db.with_connection(|conn| {
        assert_eq!(doctors::find_doctors_by_name(conn, "Dr Wang")?.len(), 1);
        assert_eq!(appointments::find_appointments_by_schedule(conn, slot.sid)?.len(), 1);
        // A slot with appointments and a doctor with slots stay put.
        assert!(schedules::delete_schedule(conn, slot.sid).is_err());
        assert!(doctors::delete_doctor(conn, "10000001").is_err());
        Ok(())
    })
    .unwrap();

    assert!(db.remove_appointment(&booked.apid).unwrap());
    db.with_connection(|conn| {
        assert!(appointments::find_appointments_by_schedule(conn, slot.sid)?.is_empty());
        assert_eq!(schedules::delete_schedule(conn, slot.sid)?, 1);
        assert_eq!(doctors::delete_doctor(conn, "10000001")?, 1);
        assert!(doctors::find_doctors_by_name(conn, "Dr Wang")?.is_empty());
        Ok(())
    })
    .unwrap();
}
