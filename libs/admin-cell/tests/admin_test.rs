use assert_matches::assert_matches;
use serde_json::json;

use admin_cell::handlers::*;
use admin_cell::{AddDoctorsRequest, AddSchedulesRequest, UpdateScheduleRequest};
use appointment_cell::BookingService;
use shared_config::Departments;
use shared_models::{AppError, AppointmentStatus, Session};
use shared_utils::test_utils::{
    at, departments, password_hex, seed_doctor, seed_patient, seed_slot, TestDatabase,
};

fn admin_session(test_db: &TestDatabase) -> Session {
    Session::Doctor(seed_doctor(test_db.db(), "Dr Admin", "Cardiology", true))
}

fn schedules_request(value: serde_json::Value) -> AddSchedulesRequest {
    serde_json::from_value(value).unwrap()
}

#[test]
fn admin_operations_reject_patients_and_plain_doctors() {
    let test_db = TestDatabase::new();
    let patient = Session::Patient(seed_patient(test_db.db(), "P1", "555-1"));
    let doctor = Session::Doctor(seed_doctor(test_db.db(), "Dr Wang", "Cardiology", false));
    let departments = departments();

    for session in [&patient, &doctor, &Session::Anonymous] {
        assert_eq!(
            admin_report(test_db.db(), session, &departments).unwrap_err(),
            AppError::not_admin()
        );
        assert_eq!(
            admin_all_appointments(test_db.db(), session).unwrap_err(),
            AppError::not_admin()
        );
        assert_matches!(
            admin_add_schedules(test_db.db(), session, AddSchedulesRequest::default()),
            Err(AppError::Auth(_))
        );
        assert_matches!(
            admin_add_doctors(test_db.db(), session, &departments, AddDoctorsRequest::default()),
            Err(AppError::Auth(_))
        );
    }
}

#[test]
fn add_schedules_returns_views_with_full_remaining() {
    let test_db = TestDatabase::new();
    let session = admin_session(&test_db);
    let wang = seed_doctor(test_db.db(), "Dr Wang", "Cardiology", false);

    let request = schedules_request(json!({
        "schedules": [
            { "did": wang.did, "startTime": "2025-03-01T09:00:00", "endTime": "2025-03-01T10:00:00", "capacity": 5 },
            { "name": "Dr Wang", "department": "Cardiology", "startTime": "2025-03-01T14:00", "endTime": "2025-03-01T15:00", "capacity": 2 }
        ]
    }));
    let added = admin_add_schedules(test_db.db(), &session, request).unwrap();

    let list = added.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["did"], json!(wang.did));
    assert_eq!(list[0]["res"], 5);
    assert_eq!(list[1]["startTime"], "2025-03-01T14:00:00");
    assert_eq!(list[1]["capacity"], 2);
}

#[test]
fn add_schedules_for_unknown_doctor() {
    let test_db = TestDatabase::new();
    let session = admin_session(&test_db);

    let request = schedules_request(json!({
        "schedules": [
            { "did": "00000000", "startTime": "2025-03-01T09:00:00", "endTime": "2025-03-01T10:00:00", "capacity": 5 }
        ]
    }));
    let err = admin_add_schedules(test_db.db(), &session, request).unwrap_err();
    assert_eq!(err.err_info(), "doctor not exists");
}

#[test]
fn update_schedule_returns_new_counts() {
    let test_db = TestDatabase::new();
    let session = admin_session(&test_db);
    let wang = seed_doctor(test_db.db(), "Dr Wang", "Cardiology", false);
    let slot = seed_slot(test_db.db(), &wang.did, at(9, 0), at(10, 0), 2);

    // A slot view is itself a valid update payload.
    let mut request: UpdateScheduleRequest = serde_json::from_value(json!(slot.view())).unwrap();
    request.capacity = 6;
    let updated = admin_update_schedule(test_db.db(), &session, request).unwrap();

    assert_eq!(updated["capacity"], 6);
    assert_eq!(updated["res"], 6);
    assert_eq!(updated["sid"], slot.sid);
}

#[test]
fn add_doctors_upserts_and_hides_credentials() {
    let test_db = TestDatabase::new();
    let session = admin_session(&test_db);
    let departments = departments();

    let request: AddDoctorsRequest = serde_json::from_value(json!({
        "doctors": [
            { "name": "Dr Li", "passwordHex": password_hex("pw"), "department": "Pediatrics" },
            { "name": "Dr Chen", "passwordHex": password_hex("pw"), "department": "Neurology", "admin": true, "description": "Head" }
        ]
    }))
    .unwrap();
    let saved = admin_add_doctors(test_db.db(), &session, &departments, request).unwrap();
    let list = saved.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["description"], "");
    assert_eq!(list[1]["admin"], true);
    assert!(list[0].get("passwordHex").is_none());
    assert!(list[0].get("password_hex").is_none());

    // Feeding a returned view back updates the same doctor.
    let mut view = list[0].clone();
    view["description"] = json!("Night shift");
    let request: AddDoctorsRequest = serde_json::from_value(json!({ "doctors": [view] })).unwrap();
    let saved = admin_add_doctors(test_db.db(), &session, &departments, request).unwrap();
    assert_eq!(saved[0]["did"], list[0]["did"]);
    assert_eq!(saved[0]["description"], "Night shift");
}

#[test]
fn all_appointments_lists_every_status_once() {
    let test_db = TestDatabase::new();
    let session = admin_session(&test_db);
    let wang = seed_doctor(test_db.db(), "Dr Wang", "Cardiology", false);
    let slot = seed_slot(test_db.db(), &wang.did, at(9, 0), at(10, 0), 3);
    let p1 = seed_patient(test_db.db(), "P1", "555-1");
    let p2 = seed_patient(test_db.db(), "P2", "555-2");
    let booking = BookingService::new(test_db.db());
    let first = booking.book(&p1, &wang.did, slot.sid).unwrap();
    booking.book(&p2, &wang.did, slot.sid).unwrap();
    booking.cancel(&p1, &first.apid).unwrap();

    let all = admin_all_appointments(test_db.db(), &session).unwrap();
    let list = all.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Booked appointments are listed before cancelled ones.
    assert_eq!(list[0]["status"], AppointmentStatus::Booked.as_str());
    assert_eq!(list[1]["status"], AppointmentStatus::Cancelled.as_str());
}

#[test]
fn report_covers_configured_departments() {
    let test_db = TestDatabase::new();
    let session = admin_session(&test_db);
    let wang = seed_doctor(test_db.db(), "Dr Wang", "Cardiology", false);
    let outsider = seed_doctor(test_db.db(), "Dr Xu", "Dermatology", false);
    let slot = seed_slot(test_db.db(), &wang.did, at(9, 0), at(10, 0), 3);
    seed_slot(test_db.db(), &outsider.did, at(9, 0), at(10, 0), 3);
    let patient = seed_patient(test_db.db(), "P1", "555-1");
    BookingService::new(test_db.db()).book(&patient, &wang.did, slot.sid).unwrap();

    let report = admin_report(test_db.db(), &session, &departments()).unwrap();
    // The admin and Dr Wang are in Cardiology; Dermatology is not configured.
    assert_eq!(report["doctors"].as_array().map(Vec::len), Some(2));
    assert_eq!(report["schedules"].as_array().map(Vec::len), Some(1));
    assert_eq!(report["appointments"].as_array().map(Vec::len), Some(1));

    let everything = admin_report(test_db.db(), &session, &Departments::default()).unwrap();
    assert_eq!(everything["doctors"].as_array().map(Vec::len), Some(3));
    assert_eq!(everything["schedules"].as_array().map(Vec::len), Some(2));
}
