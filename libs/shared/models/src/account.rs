use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Sex {
    #[default]
    M,
    F,
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sex::M => write!(f, "M"),
            Sex::F => write!(f, "F"),
        }
    }
}

impl FromStr for Sex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "M" => Ok(Sex::M),
            "F" => Ok(Sex::F),
            other => Err(format!("unknown sex: {}", other)),
        }
    }
}

/// A registered patient. `pid` is the national id and never changes once set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientAccount {
    pub aid: String,
    pub name: String,
    pub password_hex: String,
    pub pid: String,
    pub phone: String,
    pub sex: Sex,
}

impl PatientAccount {
    pub fn view(&self) -> AccountView {
        AccountView {
            aid: self.aid.clone(),
            name: self.name.clone(),
            pid: self.pid.clone(),
            phone: self.phone.clone(),
            sex: self.sex,
        }
    }
}

/// Outgoing account shape. The credential hash is never included.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountView {
    pub aid: String,
    pub name: String,
    pub pid: String,
    pub phone: String,
    pub sex: Sex,
}
