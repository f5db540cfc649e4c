use std::fs;
use std::path::Path;

use tracing::{info, warn};

/// Configured department names, in file order.
///
/// An empty list disables department validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Departments {
    names: Vec<String>,
}

impl Departments {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for name in names {
            let name = name.into().trim().to_string();
            if !name.is_empty() && !list.contains(&name) {
                list.push(name);
            }
        }
        Self { names: list }
    }

    /// Reads a JSON array of names. A missing or malformed file yields an empty list.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to read departments from {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(names) => {
                let departments = Self::new(names);
                info!("Loaded {} departments from {}", departments.len(), path.display());
                departments
            }
            Err(e) => {
                warn!("Departments file {} is not a JSON string array: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// True when validation is disabled or the name is configured.
    pub fn accepts(&self, department: &str) -> bool {
        self.names.is_empty() || self.names.iter().any(|d| d == department)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
