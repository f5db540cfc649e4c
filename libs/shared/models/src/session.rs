use crate::account::PatientAccount;
use crate::doctor::DoctorAccount;
use crate::error::AppError;

/// Authentication state of one connection. Patient and doctor roles are exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Session {
    #[default]
    Anonymous,
    Patient(PatientAccount),
    Doctor(DoctorAccount),
}

impl Session {
    pub fn login_patient(&mut self, account: PatientAccount) {
        *self = Session::Patient(account);
    }

    pub fn login_doctor(&mut self, doctor: DoctorAccount) {
        *self = Session::Doctor(doctor);
    }

    pub fn logout(&mut self) {
        *self = Session::Anonymous;
    }

    pub fn is_authenticated(&self) -> bool {
        !matches!(self, Session::Anonymous)
    }

    pub fn patient(&self) -> Option<&PatientAccount> {
        match self {
            Session::Patient(account) => Some(account),
            _ => None,
        }
    }

    pub fn doctor(&self) -> Option<&DoctorAccount> {
        match self {
            Session::Doctor(doctor) => Some(doctor),
            _ => None,
        }
    }

    pub fn require_authenticated(&self) -> Result<(), AppError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AppError::not_logged_in())
        }
    }

    pub fn require_patient(&self) -> Result<&PatientAccount, AppError> {
        self.patient().ok_or_else(AppError::not_logged_in)
    }

    pub fn require_doctor(&self) -> Result<&DoctorAccount, AppError> {
        self.doctor().ok_or_else(AppError::not_logged_in)
    }

    pub fn require_admin(&self) -> Result<&DoctorAccount, AppError> {
        match self.doctor() {
            Some(doctor) if doctor.admin => Ok(doctor),
            _ => Err(AppError::not_admin()),
        }
    }
}
