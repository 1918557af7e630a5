//! Patient models.

use serde::{Deserialize, Serialize};

/// A registered patient, keyed by hospital UHID.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Unique hospital identification number
    pub uhid: String,
    /// Full name as printed on the bill
    pub full_name: String,
    /// Age in years
    pub age: Option<u32>,
    /// Gender as recorded at registration
    pub gender: Option<String>,
    /// Registration timestamp
    pub created_at: String,
}

impl Patient {
    /// Create a new patient with required fields.
    pub fn new(uhid: String, full_name: String) -> Self {
        Self {
            uhid,
            full_name,
            age: None,
            gender: None,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Display name, falling back to the UHID when no name was captured.
    pub fn display_name(&self) -> &str {
        let name = self.full_name.trim();
        if name.is_empty() {
            &self.uhid
        } else {
            name
        }
    }
}
