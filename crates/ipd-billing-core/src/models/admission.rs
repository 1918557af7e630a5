//! Inpatient (IPD) admission models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Admission lifecycle status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdmissionStatus {
    /// Patient is currently admitted
    Active,
    /// Discharge summary recorded
    Discharged,
}

impl AdmissionStatus {
    /// Storage representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AdmissionStatus::Active => "active",
            AdmissionStatus::Discharged => "discharged",
        }
    }

    /// Parse the storage representation.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(AdmissionStatus::Active),
            "discharged" => Some(AdmissionStatus::Discharged),
            _ => None,
        }
    }
}

/// A single inpatient stay, from intake to discharge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Admission {
    /// IPD number (unique per stay)
    pub ipd_no: String,
    /// Patient UHID
    pub uhid: String,
    /// OPD visit that led to the admission
    pub opd_no: Option<String>,
    /// Calendar date of admission
    pub admission_date: NaiveDate,
    /// Calendar date of discharge, set once from the discharge summary
    pub discharge_date: Option<NaiveDate>,
    /// Ward name
    pub ward: String,
    /// Bed number within the ward
    pub bed_number: String,
    /// Reason recorded at intake
    pub admission_reason: Option<String>,
    /// Amount pre-paid at admission
    pub deposit_amount: Decimal,
    /// Lifecycle status
    pub status: AdmissionStatus,
}

impl Admission {
    /// Create a new active admission with a generated IPD number.
    pub fn new(uhid: String, admission_date: NaiveDate, ward: String, bed_number: String) -> Self {
        Self {
            ipd_no: generate_ipd_no(),
            uhid,
            opd_no: None,
            admission_date,
            discharge_date: None,
            ward,
            bed_number,
            admission_reason: None,
            deposit_amount: Decimal::ZERO,
            status: AdmissionStatus::Active,
        }
    }

    /// Check if the discharge date has been recorded.
    pub fn is_discharged(&self) -> bool {
        self.discharge_date.is_some()
    }

    /// "Ward / Bed" label used on printed bills.
    pub fn ward_and_bed(&self) -> String {
        format!("{} / {}", self.ward, self.bed_number)
    }
}

/// Generate an IPD number: `IPD-<unix millis>-<random suffix>`.
pub fn generate_ipd_no() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("IPD-{}-{}", millis, &suffix[..6])
}
