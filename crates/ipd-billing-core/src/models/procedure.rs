//! Procedure entries and the procedure rate catalog.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One ordered course of a named procedure during a stay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcedureEntry {
    /// Unique entry ID
    pub id: String,
    /// IPD number of the stay
    pub ipd_no: String,
    /// Procedure name, joined against the rate catalog by exact match
    pub procedure_name: String,
    /// First day of the course
    pub start_date: NaiveDate,
    /// Last day of the course
    pub end_date: NaiveDate,
}

impl ProcedureEntry {
    /// Create a new procedure entry.
    pub fn new(ipd_no: String, procedure_name: String, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            ipd_no,
            procedure_name,
            start_date,
            end_date,
        }
    }
}

/// Daily charge for a named procedure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcedureRate {
    /// Procedure name (catalog key, case-sensitive)
    pub procedure_name: String,
    /// Charge per session day
    pub charges_per_day: Decimal,
}

impl ProcedureRate {
    /// Create a new rate entry.
    pub fn new(procedure_name: String, charges_per_day: Decimal) -> Self {
        Self {
            procedure_name,
            charges_per_day,
        }
    }
}
