use serde::{Deserialize, Serialize};

use shared_models::request::{non_blank, present};
use shared_models::{AppError, Sex, Validate};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub password_hex: String,
    pub pid: String,
    pub phone: String,
    #[serde(default)]
    pub sex: Sex,
}

impl Validate for RegisterRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.name, "name")?;
        non_blank(&self.password_hex, "passwordHex")?;
        non_blank(&self.pid, "pid")?;
        non_blank(&self.phone, "phone")
    }
}

/// Login by national id or by phone.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub pid: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    pub password_hex: String,
}

impl LoginRequest {
    pub fn pid(&self) -> Option<&str> {
        present(&self.pid)
    }

    pub fn phone(&self) -> Option<&str> {
        present(&self.phone)
    }
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.password_hex, "passwordHex")?;
        if self.pid().is_none() && self.phone().is_none() {
            return Err(AppError::Validation("pid or phone required".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogoutRequest {
    #[serde(default)]
    pub aid: Option<String>,
}

impl Validate for LogoutRequest {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteAccountRequest {
    pub aid: String,
}

impl Validate for DeleteAccountRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.aid, "aid")
    }
}

/// Full replacement of the mutable profile. `pid` and `phone` must repeat the
/// stored values; an absent `passwordHex` keeps the current credential.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountRequest {
    pub aid: String,
    pub name: String,
    #[serde(default)]
    pub password_hex: Option<String>,
    pub pid: String,
    pub phone: String,
    #[serde(default)]
    pub sex: Sex,
}

impl Validate for UpdateAccountRequest {
    fn validate(&self) -> Result<(), AppError> {
        non_blank(&self.aid, "aid")?;
        non_blank(&self.name, "name")?;
        non_blank(&self.pid, "pid")?;
        non_blank(&self.phone, "phone")?;
        if let Some(password_hex) = &self.password_hex {
            non_blank(password_hex, "passwordHex")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_defaults_sex_to_m() {
        let request: RegisterRequest = serde_json::from_value(json!({
            "name": "Li Lei",
            "passwordHex": "ab",
            "pid": "P1",
            "phone": "555"
        }))
        .unwrap();
        assert_eq!(request.sex, Sex::M);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn login_needs_pid_or_phone() {
        let request: LoginRequest =
            serde_json::from_value(json!({ "passwordHex": "ab", "pid": "" })).unwrap();
        assert_eq!(
            request.validate(),
            Err(AppError::Validation("pid or phone required".to_string()))
        );
    }
}
