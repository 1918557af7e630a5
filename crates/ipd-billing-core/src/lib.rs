//! IPD Billing Core Library
//!
//! Inpatient stay billing over a local SQLite store.
//!
//! # Architecture
//!
//! ```text
//!   Admission + Discharge        Procedure Entries        Rate Catalog
//!            │                           │                     │
//!            ▼                           └──────────┬──────────┘
//!     Stay Duration                                 ▼
//!            │                          Procedure Cost Aggregator
//!            ▼                                      │  (rate misses → warnings)
//!   Service Charges (bed, diet, doctor, nursing)    │
//!            │                                      │
//!            └─────────────────┬────────────────────┘
//!                              ▼
//!                Totals & Deposit Reconciliation
//!                              │
//!                              ▼
//!                 BillDocument (JSON / CSV / HTML)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite store for patients, admissions, procedures and rates
//! - [`models`]: Domain types (Patient, Admission, ProcedureEntry, BillCalculation, etc.)
//! - [`billing`]: The stay bill calculation
//! - [`config`]: Billing policy (currency, rounding, rate misses, timeouts)
//! - [`export`]: Bill documents with JSON and CSV export

pub mod billing;
pub mod config;
pub mod db;
pub mod export;
pub mod models;

// Re-export commonly used types
pub use billing::{
    calculate_stay_bill, AdmissionReader, BillingError, BillingInput, ProcedureReader, RateLookup,
    StayBiller,
};
pub use config::{BillingPolicy, CurrencyPolicy, RateMissPolicy, RoundingMode};
pub use db::Database;
pub use export::{BillDocument, BillExporter};
pub use models::{
    Admission, AdmissionStatus, BillCalculation, BillCharges, BillingWarning, ChargeSheet,
    Patient, ProcedureDetail, ProcedureEntry, ProcedureRate, RoomType, StayBill,
};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::str::FromStr;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use rust_decimal::Decimal;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum IpdBillingError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<db::DbError> for IpdBillingError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::NotFound(what) => IpdBillingError::NotFound(what),
            db::DbError::InvalidAmount(what) => IpdBillingError::InvalidInput(what),
            e => IpdBillingError::DatabaseError(e.to_string()),
        }
    }
}

impl From<BillingError> for IpdBillingError {
    fn from(e: BillingError) -> Self {
        match e {
            BillingError::InvalidDateRange(what) => IpdBillingError::InvalidDateRange(what),
            BillingError::InvalidAmount(what) => IpdBillingError::InvalidInput(what),
            BillingError::NotFound(what) => IpdBillingError::NotFound(what),
            BillingError::UpstreamUnavailable(what) => IpdBillingError::UpstreamUnavailable(what),
            BillingError::Integrity(what) => IpdBillingError::DatabaseError(what),
        }
    }
}

impl From<export::ExportError> for IpdBillingError {
    fn from(e: export::ExportError) -> Self {
        match e {
            export::ExportError::Billing(e) => e.into(),
            export::ExportError::Serialization(e) => e.into(),
        }
    }
}

impl From<config::ConfigError> for IpdBillingError {
    fn from(e: config::ConfigError) -> Self {
        IpdBillingError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for IpdBillingError {
    fn from(e: serde_json::Error) -> Self {
        IpdBillingError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for IpdBillingError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        IpdBillingError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path with the default policy.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<IpdBillingCore>, IpdBillingError> {
    open_with_policy(&path, BillingPolicy::default())
}

/// Open or create a database at the given path with a JSON billing policy.
#[uniffi::export]
pub fn open_database_with_policy(
    path: String,
    policy_json: String,
) -> Result<Arc<IpdBillingCore>, IpdBillingError> {
    let policy = BillingPolicy::from_json_str(&policy_json)?;
    open_with_policy(&path, policy)
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<IpdBillingCore>, IpdBillingError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(IpdBillingCore {
        db: Arc::new(Mutex::new(db)),
        policy: BillingPolicy::default(),
    }))
}

fn open_with_policy(path: &str, policy: BillingPolicy) -> Result<Arc<IpdBillingCore>, IpdBillingError> {
    let db = Database::open_with_timeout(path, policy.lookup_timeout())?;
    tracing::info!(path, hospital = %policy.hospital_name, "opened billing database");
    Ok(Arc::new(IpdBillingCore {
        db: Arc::new(Mutex::new(db)),
        policy,
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct IpdBillingCore {
    db: Arc<Mutex<Database>>,
    policy: BillingPolicy,
}

#[uniffi::export]
impl IpdBillingCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn register_patient(&self, patient: FfiPatient) -> Result<(), IpdBillingError> {
        let db = self.db.lock()?;
        db.insert_patient(&patient.into())?;
        Ok(())
    }

    /// Get a patient by UHID.
    pub fn get_patient(&self, uhid: String) -> Result<Option<FfiPatient>, IpdBillingError> {
        let db = self.db.lock()?;
        Ok(db.get_patient(&uhid)?.map(|p| p.into()))
    }

    /// Search patients by name or UHID.
    pub fn search_patients(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiPatient>, IpdBillingError> {
        let db = self.db.lock()?;
        let patients = db.search_patients(&query, limit as usize)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    // =========================================================================
    // Admission Operations
    // =========================================================================

    /// Admit a patient. The admission date defaults to today.
    pub fn admit_patient(&self, request: FfiAdmissionRequest) -> Result<FfiAdmission, IpdBillingError> {
        let admission_date = match request.admission_date.as_deref() {
            Some(date) => parse_date("admission_date", date)?,
            None => chrono::Local::now().date_naive(),
        };

        let mut admission =
            Admission::new(request.uhid, admission_date, request.ward, request.bed_number);
        admission.opd_no = request.opd_no;
        admission.admission_reason = request.admission_reason;
        admission.deposit_amount = parse_amount("deposit_amount", &request.deposit_amount)?;

        let db = self.db.lock()?;
        db.insert_admission(&admission)?;
        tracing::info!(ipd_no = %admission.ipd_no, uhid = %admission.uhid, "admitted patient");
        Ok(admission.into())
    }

    /// Get an admission by IPD number.
    pub fn get_admission(&self, ipd_no: String) -> Result<Option<FfiAdmission>, IpdBillingError> {
        let db = self.db.lock()?;
        Ok(db.get_admission(&ipd_no)?.map(|a| a.into()))
    }

    /// Search admissions by IPD number prefix.
    pub fn search_admissions(
        &self,
        query: String,
        limit: u32,
    ) -> Result<Vec<FfiAdmission>, IpdBillingError> {
        let db = self.db.lock()?;
        let admissions = db.search_admissions(&query, limit as usize)?;
        Ok(admissions.into_iter().map(|a| a.into()).collect())
    }

    /// List admissions not yet discharged.
    pub fn list_active_admissions(&self) -> Result<Vec<FfiAdmission>, IpdBillingError> {
        let db = self.db.lock()?;
        let admissions = db.list_active_admissions()?;
        Ok(admissions.into_iter().map(|a| a.into()).collect())
    }

    /// Record the discharge date for a stay. Can only be done once.
    pub fn record_discharge(
        &self,
        ipd_no: String,
        date_of_discharge: String,
    ) -> Result<FfiAdmission, IpdBillingError> {
        let date = parse_date("date_of_discharge", &date_of_discharge)?;

        let db = self.db.lock()?;
        let admission = db
            .get_admission(&ipd_no)?
            .ok_or_else(|| IpdBillingError::NotFound(format!("admission {}", ipd_no)))?;
        if date < admission.admission_date {
            return Err(IpdBillingError::InvalidDateRange(format!(
                "discharge {} is before admission {}",
                date, admission.admission_date
            )));
        }

        db.record_discharge(&ipd_no, date)?;
        let admission = db
            .get_admission(&ipd_no)?
            .ok_or_else(|| IpdBillingError::NotFound(format!("admission {}", ipd_no)))?;
        Ok(admission.into())
    }

    // =========================================================================
    // Procedure Operations
    // =========================================================================

    /// Add a procedure course to a stay.
    pub fn add_procedure_entry(
        &self,
        ipd_no: String,
        procedure_name: String,
        start_date: String,
        end_date: String,
    ) -> Result<FfiProcedureEntry, IpdBillingError> {
        let start = parse_date("start_date", &start_date)?;
        let end = parse_date("end_date", &end_date)?;
        if end < start {
            return Err(IpdBillingError::InvalidDateRange(format!(
                "procedure '{}' ends {} before it starts {}",
                procedure_name, end, start
            )));
        }

        let entry = ProcedureEntry::new(ipd_no, procedure_name, start, end);
        let db = self.db.lock()?;
        db.insert_procedure_entry(&entry)?;
        Ok(entry.into())
    }

    /// List procedure courses for a stay.
    pub fn list_procedure_entries(
        &self,
        ipd_no: String,
    ) -> Result<Vec<FfiProcedureEntry>, IpdBillingError> {
        let db = self.db.lock()?;
        let entries = db.list_procedure_entries(&ipd_no)?;
        Ok(entries.into_iter().map(|e| e.into()).collect())
    }

    /// Remove a procedure course. Returns false if it did not exist.
    pub fn delete_procedure_entry(&self, id: String) -> Result<bool, IpdBillingError> {
        let db = self.db.lock()?;
        Ok(db.delete_procedure_entry(&id)?)
    }

    /// Add or update a procedure's daily rate.
    pub fn upsert_procedure_rate(
        &self,
        procedure_name: String,
        charges_per_day: String,
    ) -> Result<(), IpdBillingError> {
        let rate = ProcedureRate::new(
            procedure_name,
            parse_amount("charges_per_day", &charges_per_day)?,
        );
        let db = self.db.lock()?;
        db.upsert_procedure_rate(&rate)?;
        Ok(())
    }

    /// List the procedure rate catalog.
    pub fn list_procedure_rates(&self) -> Result<Vec<FfiProcedureRate>, IpdBillingError> {
        let db = self.db.lock()?;
        let rates = db.list_procedure_rates()?;
        Ok(rates.into_iter().map(|r| r.into()).collect())
    }

    // =========================================================================
    // Billing Operations
    // =========================================================================

    /// Calculate the final bill for a discharged stay.
    pub fn calculate_bill(
        &self,
        ipd_no: String,
        charges: FfiBillCharges,
    ) -> Result<FfiStayBill, IpdBillingError> {
        let charges = BillCharges::try_from(charges)?;
        let db = self.db.lock()?;
        let bill = StayBiller::new(&*db, &self.policy).calculate(&ipd_no, &charges)?;
        Ok(bill.into())
    }

    /// Export the final bill document as JSON.
    pub fn export_bill_json(
        &self,
        ipd_no: String,
        charges: FfiBillCharges,
    ) -> Result<String, IpdBillingError> {
        let charges = BillCharges::try_from(charges)?;
        let db = self.db.lock()?;
        let document = BillExporter::new(&db, &self.policy).export(&ipd_no, &charges)?;
        Ok(document.to_json()?)
    }

    /// Export the final bill document as CSV.
    pub fn export_bill_csv(
        &self,
        ipd_no: String,
        charges: FfiBillCharges,
    ) -> Result<String, IpdBillingError> {
        let charges = BillCharges::try_from(charges)?;
        let db = self.db.lock()?;
        let document = BillExporter::new(&db, &self.policy).export(&ipd_no, &charges)?;
        Ok(document.to_csv())
    }
}

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, IpdBillingError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| {
        IpdBillingError::InvalidInput(format!("{} '{}' is not YYYY-MM-DD: {}", field, value, e))
    })
}

/// Blank amounts are zero, as on the billing form.
fn parse_amount(field: &str, value: &str) -> Result<Decimal, IpdBillingError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(Decimal::ZERO);
    }
    let amount = Decimal::from_str(value).map_err(|e| {
        IpdBillingError::InvalidInput(format!("{} '{}' is not a number: {}", field, value, e))
    })?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(IpdBillingError::InvalidInput(format!(
            "{} must not be negative: {}",
            field, amount
        )));
    }
    Ok(amount)
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub uhid: String,
    pub full_name: String,
    pub age: Option<u32>,
    pub gender: Option<String>,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            uhid: patient.uhid,
            full_name: patient.full_name,
            age: patient.age,
            gender: patient.gender,
        }
    }
}

impl From<FfiPatient> for Patient {
    fn from(patient: FfiPatient) -> Self {
        let mut p = Patient::new(patient.uhid, patient.full_name);
        p.age = patient.age;
        p.gender = patient.gender;
        p
    }
}

/// FFI-safe admission intake request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdmissionRequest {
    pub uhid: String,
    /// YYYY-MM-DD, today when absent
    pub admission_date: Option<String>,
    pub ward: String,
    pub bed_number: String,
    pub opd_no: Option<String>,
    pub admission_reason: Option<String>,
    pub deposit_amount: String,
}

/// FFI-safe admission.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAdmission {
    pub ipd_no: String,
    pub uhid: String,
    pub opd_no: Option<String>,
    pub admission_date: String,
    pub discharge_date: Option<String>,
    pub ward: String,
    pub bed_number: String,
    pub admission_reason: Option<String>,
    pub deposit_amount: String,
    pub status: String,
}

impl From<Admission> for FfiAdmission {
    fn from(admission: Admission) -> Self {
        Self {
            ipd_no: admission.ipd_no,
            uhid: admission.uhid,
            opd_no: admission.opd_no,
            admission_date: admission.admission_date.to_string(),
            discharge_date: admission.discharge_date.map(|d| d.to_string()),
            ward: admission.ward,
            bed_number: admission.bed_number,
            admission_reason: admission.admission_reason,
            deposit_amount: admission.deposit_amount.to_string(),
            status: admission.status.as_str().to_string(),
        }
    }
}

/// FFI-safe procedure entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProcedureEntry {
    pub id: String,
    pub ipd_no: String,
    pub procedure_name: String,
    pub start_date: String,
    pub end_date: String,
}

impl From<ProcedureEntry> for FfiProcedureEntry {
    fn from(entry: ProcedureEntry) -> Self {
        Self {
            id: entry.id,
            ipd_no: entry.ipd_no,
            procedure_name: entry.procedure_name,
            start_date: entry.start_date.to_string(),
            end_date: entry.end_date.to_string(),
        }
    }
}

/// FFI-safe procedure rate.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProcedureRate {
    pub procedure_name: String,
    pub charges_per_day: String,
}

impl From<ProcedureRate> for FfiProcedureRate {
    fn from(rate: ProcedureRate) -> Self {
        Self {
            procedure_name: rate.procedure_name,
            charges_per_day: rate.charges_per_day.to_string(),
        }
    }
}

/// FFI-safe per-day charges entered at billing time.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiBillCharges {
    /// "AC" or "Non-AC"
    pub room_type: String,
    pub diet_per_day: String,
    pub doctor_per_day: String,
    pub nursing_per_day: String,
}

impl TryFrom<FfiBillCharges> for BillCharges {
    type Error = IpdBillingError;

    fn try_from(charges: FfiBillCharges) -> Result<Self, Self::Error> {
        Ok(BillCharges {
            room_type: charges
                .room_type
                .parse::<RoomType>()
                .map_err(IpdBillingError::InvalidInput)?,
            diet_per_day: parse_amount("diet_per_day", &charges.diet_per_day)?,
            doctor_per_day: parse_amount("doctor_per_day", &charges.doctor_per_day)?,
            nursing_per_day: parse_amount("nursing_per_day", &charges.nursing_per_day)?,
        })
    }
}

/// FFI-safe procedure cost line.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiProcedureDetail {
    pub procedure_name: String,
    pub start_date: String,
    pub end_date: String,
    pub days: u32,
    pub rate_per_day: String,
    pub total_cost: String,
}

impl From<ProcedureDetail> for FfiProcedureDetail {
    fn from(detail: ProcedureDetail) -> Self {
        Self {
            procedure_name: detail.procedure_name,
            start_date: detail.start_date.to_string(),
            end_date: detail.end_date.to_string(),
            days: detail.days,
            rate_per_day: detail.rate_per_day.to_string(),
            total_cost: detail.total_cost.to_string(),
        }
    }
}

/// FFI-safe bill calculation with warnings.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiStayBill {
    pub total_days: u32,
    pub bed_charges: String,
    pub procedure_charges: String,
    pub diet_charges: String,
    pub doctor_charges: String,
    pub nursing_charges: String,
    pub total_amount: String,
    pub procedure_details: Vec<FfiProcedureDetail>,
    pub deposit_amount: String,
    pub returnable_amount: String,
    pub additional_cost: String,
    pub warnings: Vec<String>,
}

impl From<StayBill> for FfiStayBill {
    fn from(bill: StayBill) -> Self {
        let calc = bill.calculation;
        Self {
            total_days: calc.total_days,
            bed_charges: calc.bed_charges.to_string(),
            procedure_charges: calc.procedure_charges.to_string(),
            diet_charges: calc.diet_charges.to_string(),
            doctor_charges: calc.doctor_charges.to_string(),
            nursing_charges: calc.nursing_charges.to_string(),
            total_amount: calc.total_amount.to_string(),
            procedure_details: calc.procedure_details.into_iter().map(|d| d.into()).collect(),
            deposit_amount: calc.deposit_amount.to_string(),
            returnable_amount: calc.returnable_amount.to_string(),
            additional_cost: calc.additional_cost.to_string(),
            warnings: bill.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }
}
