use tracing::{debug, info, warn};

use shared_database::{accounts, ids, Database, DatabaseError};
use shared_models::{AppError, PatientAccount};

use crate::models::{LoginRequest, RegisterRequest, UpdateAccountRequest};

const AID_ATTEMPTS: usize = 5;

pub struct AccountService {
    db: Database,
}

impl AccountService {
    pub fn new(db: &Database) -> Self {
        Self { db: db.clone() }
    }

    /// Create a patient account. National id and phone must both be unused.
    pub fn register(&self, request: RegisterRequest) -> Result<PatientAccount, AppError> {
        debug!("Registering account for pid {}", request.pid);

        self.db.with_connection(|conn| {
            if accounts::find_account(conn, None, Some(&request.pid), None)?.is_some() {
                return Ok(Err(AppError::Conflict("PID already exists".to_string())));
            }
            if accounts::find_account(conn, None, None, Some(&request.phone))?.is_some() {
                return Ok(Err(AppError::Conflict("phone already exists".to_string())));
            }

            let mut attempt = 0;
            loop {
                attempt += 1;
                let account = PatientAccount {
                    aid: ids::new_aid(),
                    name: request.name.clone(),
                    password_hex: request.password_hex.clone(),
                    pid: request.pid.clone(),
                    phone: request.phone.clone(),
                    sex: request.sex,
                };

                match accounts::insert_account(conn, &account) {
                    Ok(()) => {
                        info!("Registered account {}", account.aid);
                        return Ok(Ok(account));
                    }
                    Err(e) if e.is_unique_violation() => match duplicate_of(&e) {
                        Some(conflict) => return Ok(Err(conflict)),
                        None if attempt < AID_ATTEMPTS => {
                            warn!("Account id {} collided, retrying", account.aid);
                        }
                        None => return Err(e),
                    },
                    Err(e) => return Err(e),
                }
            }
        })?
    }

    pub fn login(&self, request: &LoginRequest) -> Result<PatientAccount, AppError> {
        let account = self
            .db
            .with_connection(|conn| accounts::find_account(conn, None, request.pid(), request.phone()))?
            .ok_or_else(|| AppError::NotFound("account not found".to_string()))?;

        if account.password_hex != request.password_hex {
            warn!("Password mismatch for account {}", account.aid);
            return Err(AppError::Auth("password mismatch".to_string()));
        }

        info!("Account {} logged in", account.aid);
        Ok(account)
    }

    /// Replace the mutable profile of `current`. Returns the stored result.
    pub fn update(
        &self,
        current: &PatientAccount,
        request: UpdateAccountRequest,
    ) -> Result<PatientAccount, AppError> {
        if request.aid != current.aid {
            return Err(AppError::Auth("aid mismatch".to_string()));
        }
        if request.pid != current.pid || request.phone != current.phone {
            return Err(AppError::Conflict("immutable field changed (pid/phone)".to_string()));
        }

        let updated = PatientAccount {
            aid: current.aid.clone(),
            name: request.name,
            password_hex: request
                .password_hex
                .unwrap_or_else(|| current.password_hex.clone()),
            pid: current.pid.clone(),
            phone: current.phone.clone(),
            sex: request.sex,
        };

        let changed = self
            .db
            .with_connection(|conn| accounts::update_account_info(conn, &updated))?;
        if changed == 0 {
            return Err(AppError::NotFound("account not found".to_string()));
        }

        debug!("Updated account {}", updated.aid);
        Ok(updated)
    }

    pub fn delete(&self, current: &PatientAccount, aid: &str) -> Result<(), AppError> {
        if aid != current.aid {
            return Err(AppError::Auth("aid mismatch".to_string()));
        }
        self.db.with_connection(|conn| accounts::delete_account(conn, aid))?;
        info!("Deleted account {}", aid);
        Ok(())
    }
}

/// Maps a unique violation on national id or phone to its client error.
/// Anything else (an account id collision) is `None`.
fn duplicate_of(e: &DatabaseError) -> Option<AppError> {
    let detail = e.detail()?;
    if detail.contains("accounts.pid") {
        Some(AppError::Conflict("PID already exists".to_string()))
    } else if detail.contains("accounts.phone") {
        Some(AppError::Conflict("phone already exists".to_string()))
    } else {
        None
    }
}
