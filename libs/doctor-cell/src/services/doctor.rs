use tracing::{debug, info, warn};

use shared_config::Departments;
use shared_database::{doctors, ids, Connection, Database};
use shared_models::request::present;
use shared_models::{AppError, DoctorAccount};

use crate::models::{DoctorDraft, DoctorLoginRequest, DoctorQueryRequest};

const DID_ATTEMPTS: usize = 5;

pub struct DoctorService {
    db: Database,
}

impl DoctorService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Authenticate a doctor by name within a department
    pub fn login(&self, request: &DoctorLoginRequest) -> Result<DoctorAccount, AppError> {
        let doctor = self
            .db
            .with_connection(|conn| {
                doctors::find_doctor_in_department(conn, &request.name, &request.department)
            })?
            .ok_or_else(|| AppError::NotFound("doctor not found".to_string()))?;

        if doctor.password_hex != request.password_hex {
            warn!("Password mismatch for doctor {}", doctor.did);
            return Err(AppError::Auth("password mismatch".to_string()));
        }

        info!("Doctor {} logged in (admin={})", doctor.did, doctor.admin);
        Ok(doctor)
    }

    /// Id or name lookups yield at most one doctor; otherwise the whole department.
    pub fn query(
        &self,
        request: &DoctorQueryRequest,
        departments: &Departments,
    ) -> Result<Vec<DoctorAccount>, AppError> {
        let did = present(&request.did);
        let name = present(&request.name);

        if did.is_some() || name.is_some() {
            let found = self
                .db
                .with_connection(|conn| doctors::find_doctor(conn, did, name))?;
            return Ok(found.into_iter().collect());
        }

        let department = present(&request.department)
            .ok_or_else(|| AppError::Validation("department/name/did required".to_string()))?;
        ensure_department(departments, department)?;

        Ok(self
            .db
            .with_connection(|conn| doctors::find_doctors_by_department(conn, department))?)
    }

    /// Create or update a batch of doctors as one unit.
    ///
    /// A draft whose `did` exists updates that doctor and keeps its password
    /// unless a new one is given. Any other draft creates a doctor and must
    /// carry a password.
    pub fn upsert(
        &self,
        drafts: Vec<DoctorDraft>,
        departments: &Departments,
    ) -> Result<Vec<DoctorAccount>, AppError> {
        debug!("Upserting {} doctors", drafts.len());

        for draft in &drafts {
            ensure_department(departments, &draft.department)?;
        }

        self.db.unit_of_work(|tx| {
            let mut saved = Vec::with_capacity(drafts.len());

            for draft in drafts {
                let password = draft.password_hex.clone().filter(|p| !p.is_empty());
                let description = draft.description.clone().unwrap_or_default();
                let existing = match present(&draft.did) {
                    Some(did) => doctors::find_doctor(tx, Some(did), None)?
                        .filter(|doctor| doctor.did == did),
                    None => None,
                };

                let doctor = match existing {
                    Some(existing) => {
                        let updated = DoctorAccount {
                            did: existing.did.clone(),
                            name: draft.name,
                            password_hex: password.unwrap_or(existing.password_hex),
                            admin: draft.admin,
                            department: draft.department,
                            description,
                        };
                        doctors::update_doctor(tx, &updated)?;
                        debug!("Updated doctor {}", updated.did);
                        updated
                    }
                    None => {
                        let password_hex = password.ok_or_else(|| {
                            AppError::Validation("password required for new doctor".to_string())
                        })?;
                        let mut doctor = DoctorAccount {
                            did: present(&draft.did).map(str::to_string).unwrap_or_else(ids::new_did),
                            name: draft.name,
                            password_hex,
                            admin: draft.admin,
                            department: draft.department,
                            description,
                        };
                        insert_with_fresh_did(tx, &mut doctor, present(&draft.did).is_none())?;
                        info!("Created doctor {} in {}", doctor.did, doctor.department);
                        doctor
                    }
                };
                saved.push(doctor);
            }

            Ok(saved)
        })
    }
}

pub(crate) fn ensure_department(departments: &Departments, department: &str) -> Result<(), AppError> {
    if departments.accepts(department) {
        Ok(())
    } else {
        Err(AppError::NotFound("department not exists".to_string()))
    }
}

/// Inserts the doctor, drawing a new id on collision when the id was generated here.
fn insert_with_fresh_did(
    conn: &Connection,
    doctor: &mut DoctorAccount,
    generated: bool,
) -> Result<(), AppError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match doctors::insert_doctor(conn, doctor) {
            Ok(()) => return Ok(()),
            Err(e) if e.is_unique_violation() && generated && attempt < DID_ATTEMPTS => {
                warn!("Doctor id {} collided, retrying", doctor.did);
                doctor.did = ids::new_did();
            }
            Err(e) if e.is_unique_violation() => {
                return Err(AppError::Conflict(format!("did {} already exists", doctor.did)));
            }
            Err(e) => return Err(e.into()),
        }
    }
}
