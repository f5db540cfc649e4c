use serde_json::{json, Value};

use shared_database::Database;
use shared_models::{AppError, Session};

use crate::models::{
    DeleteAccountRequest, LoginRequest, LogoutRequest, RegisterRequest, UpdateAccountRequest,
};
use crate::services::AccountService;

// ==============================================================================
// PUBLIC HANDLERS (NO SESSION REQUIRED)
// ==============================================================================

/// Registers and logs the new account in on this connection.
pub fn account_register(
    db: &Database,
    session: &mut Session,
    request: RegisterRequest,
) -> Result<Value, AppError> {
    let account = AccountService::new(db).register(request)?;
    let view = serde_json::to_value(account.view())?;
    session.login_patient(account);
    Ok(view)
}

pub fn account_login(
    db: &Database,
    session: &mut Session,
    request: LoginRequest,
) -> Result<Value, AppError> {
    let account = AccountService::new(db).login(&request)?;
    let view = serde_json::to_value(account.view())?;
    session.login_patient(account);
    Ok(view)
}

// ==============================================================================
// PATIENT SESSION HANDLERS
// ==============================================================================

pub fn account_logout(session: &mut Session, request: LogoutRequest) -> Result<Value, AppError> {
    let account = session.require_patient()?;
    if let Some(aid) = request.aid.as_deref() {
        if aid != account.aid {
            return Err(AppError::Auth("aid mismatch".to_string()));
        }
    }
    session.logout();
    Ok(json!({}))
}

pub fn account_delete(
    db: &Database,
    session: &mut Session,
    request: DeleteAccountRequest,
) -> Result<Value, AppError> {
    let account = session.require_patient()?;
    AccountService::new(db).delete(account, &request.aid)?;
    session.logout();
    Ok(json!({}))
}

pub fn account_update(
    db: &Database,
    session: &mut Session,
    request: UpdateAccountRequest,
) -> Result<Value, AppError> {
    let account = session.require_patient()?;
    let updated = AccountService::new(db).update(account, request)?;
    let view = serde_json::to_value(updated.view())?;
    session.login_patient(updated);
    Ok(view)
}
