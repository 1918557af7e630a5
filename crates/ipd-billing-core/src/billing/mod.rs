//! Inpatient stay billing.
//!
//! Pipeline: Stay Duration → Service Charges → Procedure Costs → Totals & Deposit
//!
//! The calculation itself is a pure function of a [`BillingInput`], a
//! [`RateLookup`] and a [`BillingPolicy`]. [`StayBiller`] loads the input from
//! a store first.

mod charges;
mod duration;
mod procedures;
mod totals;

pub use charges::*;
pub use duration::*;
pub use procedures::*;
pub use totals::*;

use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::config::BillingPolicy;
use crate::db::{Database, DbError};
use crate::models::{Admission, BillCalculation, BillCharges, ProcedureEntry, StayBill};

/// Billing errors.
#[derive(Error, Debug)]
pub enum BillingError {
    #[error("Invalid date range: {0}")]
    InvalidDateRange(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("Stored data rejected: {0}")]
    Integrity(String),
}

impl BillingError {
    /// Check if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BillingError::UpstreamUnavailable(_))
    }
}

impl From<DbError> for BillingError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(what) => BillingError::NotFound(what),
            DbError::InvalidAmount(what) => BillingError::InvalidAmount(what),
            DbError::Constraint(what) => BillingError::Integrity(what),
            err if err.is_busy() => {
                BillingError::UpstreamUnavailable(format!("database busy: {}", err))
            }
            err => BillingError::UpstreamUnavailable(err.to_string()),
        }
    }
}

pub type BillingResult<T> = Result<T, BillingError>;

/// Reads admissions by IPD number.
pub trait AdmissionReader {
    /// Fails with [`BillingError::NotFound`] for an unknown stay.
    fn get_admission(&self, ipd_no: &str) -> BillingResult<Admission>;
}

/// Reads the procedure courses of a stay.
pub trait ProcedureReader: RateLookup {
    /// Entries for the stay, earliest start first. May be empty.
    fn list_procedures(&self, ipd_no: &str) -> BillingResult<Vec<ProcedureEntry>>;
}

/// Procedure rate catalog.
pub trait RateLookup {
    /// Daily rate for an exact procedure name.
    fn procedure_rate(&self, procedure_name: &str) -> BillingResult<Option<Decimal>>;

    /// All catalog names, used to suggest a match after a miss.
    fn known_procedures(&self) -> BillingResult<Vec<String>> {
        Ok(Vec::new())
    }
}

impl AdmissionReader for Database {
    fn get_admission(&self, ipd_no: &str) -> BillingResult<Admission> {
        Database::get_admission(self, ipd_no)?
            .ok_or_else(|| BillingError::NotFound(format!("admission {}", ipd_no)))
    }
}

impl ProcedureReader for Database {
    fn list_procedures(&self, ipd_no: &str) -> BillingResult<Vec<ProcedureEntry>> {
        Ok(self.list_procedure_entries(ipd_no)?)
    }
}

impl RateLookup for Database {
    fn procedure_rate(&self, procedure_name: &str) -> BillingResult<Option<Decimal>> {
        Ok(self
            .get_procedure_rate(procedure_name)?
            .map(|rate| rate.charges_per_day))
    }

    fn known_procedures(&self) -> BillingResult<Vec<String>> {
        Ok(self
            .list_procedure_rates()?
            .into_iter()
            .map(|rate| rate.procedure_name)
            .collect())
    }
}

impl RateLookup for HashMap<String, Decimal> {
    fn procedure_rate(&self, procedure_name: &str) -> BillingResult<Option<Decimal>> {
        Ok(self.get(procedure_name).copied())
    }

    fn known_procedures(&self) -> BillingResult<Vec<String>> {
        let mut names: Vec<String> = self.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Everything a bill is calculated from, fixed before calculation starts.
#[derive(Debug, Clone, PartialEq)]
pub struct BillingInput {
    pub admission: Admission,
    pub procedures: Vec<ProcedureEntry>,
    pub charges: BillCharges,
}

impl BillingInput {
    /// Calculate the bill for this input.
    pub fn calculate<R: RateLookup + ?Sized>(
        &self,
        rates: &R,
        policy: &BillingPolicy,
    ) -> BillingResult<StayBill> {
        calculate_stay_bill(&self.admission, &self.procedures, rates, &self.charges, policy)
    }
}

/// Calculate the final bill for a discharged stay.
///
/// Fails without a partial result on an invalid date range, a negative
/// rate or deposit, or a rate lookup failure. Rate misses bill at zero and
/// are returned as warnings under [`RateMissPolicy::Warn`](crate::config::RateMissPolicy).
pub fn calculate_stay_bill<R: RateLookup + ?Sized>(
    admission: &Admission,
    procedures: &[ProcedureEntry],
    rates: &R,
    charges: &BillCharges,
    policy: &BillingPolicy,
) -> BillingResult<StayBill> {
    let currency = &policy.currency;

    let total_days = stay_days(admission)?;
    let service = ServiceCharges::accumulate(total_days, charges, currency)?;
    let procedure_charges = aggregate_procedures(procedures, rates, policy)?;
    let totals = totalize(
        &service,
        procedure_charges.total,
        admission.deposit_amount,
        currency,
    )?;

    let calculation = BillCalculation {
        total_days,
        bed_charges: service.bed,
        procedure_charges: procedure_charges.total,
        diet_charges: service.diet,
        doctor_charges: service.doctor,
        nursing_charges: service.nursing,
        total_amount: totals.total_amount,
        procedure_details: procedure_charges.details,
        deposit_amount: totals.deposit_amount,
        returnable_amount: totals.returnable_amount,
        additional_cost: totals.additional_cost,
    };

    Ok(StayBill {
        calculation,
        warnings: procedure_charges.warnings,
    })
}

/// Loads a stay from a store and bills it.
pub struct StayBiller<'a, S: ?Sized> {
    store: &'a S,
    policy: &'a BillingPolicy,
}

impl<'a, S> StayBiller<'a, S>
where
    S: AdmissionReader + ProcedureReader + ?Sized,
{
    /// Create a new biller.
    pub fn new(store: &'a S, policy: &'a BillingPolicy) -> Self {
        Self { store, policy }
    }

    /// Read the admission and its procedures into a fixed input.
    pub fn load_input(&self, ipd_no: &str, charges: &BillCharges) -> BillingResult<BillingInput> {
        let admission = self.store.get_admission(ipd_no)?;
        let procedures = self.store.list_procedures(ipd_no)?;

        Ok(BillingInput {
            admission,
            procedures,
            charges: charges.clone(),
        })
    }

    /// Load and bill a stay.
    pub fn calculate(&self, ipd_no: &str, charges: &BillCharges) -> BillingResult<StayBill> {
        let input = self.load_input(ipd_no, charges)?;
        self.calculate_input(&input)
    }

    /// Bill an already loaded input, pricing procedures from the store.
    pub fn calculate_input(&self, input: &BillingInput) -> BillingResult<StayBill> {
        let bill = input.calculate(self.store, self.policy)?;

        tracing::info!(
            ipd_no = %input.admission.ipd_no,
            total_days = bill.calculation.total_days,
            procedures = bill.calculation.procedure_details.len(),
            total = %bill.calculation.total_amount,
            warnings = bill.warnings.len(),
            "calculated stay bill"
        );

        Ok(bill)
    }

}

/// Overflow-checked sum of currency amounts.
pub(crate) fn checked_sum<I>(label: &str, amounts: I) -> BillingResult<Decimal>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount))
        .ok_or_else(|| BillingError::InvalidAmount(format!("{} charges overflow", label)))
}
