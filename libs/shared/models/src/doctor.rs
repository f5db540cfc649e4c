use serde::{Deserialize, Serialize};

/// A doctor. `admin` is a capability flag, not a separate account type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorAccount {
    pub did: String,
    pub name: String,
    pub password_hex: String,
    pub admin: bool,
    pub department: String,
    pub description: String,
}

impl DoctorAccount {
    pub fn view(&self) -> DoctorView {
        DoctorView {
            did: self.did.clone(),
            name: self.name.clone(),
            admin: self.admin,
            department: self.department.clone(),
            description: self.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DoctorView {
    pub did: String,
    pub name: String,
    pub admin: bool,
    pub department: String,
    pub description: String,
}
