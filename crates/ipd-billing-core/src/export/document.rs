//! Final bill document for printing and export.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{ExportError, ExportResult};
use crate::billing::{BillingError, StayBiller};
use crate::config::{BillingPolicy, CurrencyPolicy};
use crate::db::Database;
use crate::models::{
    Admission, BillCalculation, BillCharges, BillingWarning, Patient, ProcedureDetail, Settlement,
    StayBill,
};

/// Printable final bill for one stay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillDocument {
    /// Document metadata
    pub metadata: DocumentMetadata,
    /// Hospital name for the header
    pub hospital_name: String,
    /// Currency amounts are expressed in
    pub currency: CurrencyPolicy,
    /// Patient and stay details
    pub patient: PatientSection,
    /// Procedure breakdown
    pub procedures: Vec<ProcedureDetail>,
    /// Bill summary lines, in print order
    pub summary: Vec<SummaryLine>,
    pub total_days: u32,
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub returnable_amount: Decimal,
    pub additional_cost: Decimal,
    /// Rate misses the bill was produced with
    pub warnings: Vec<BillingWarning>,
}

/// Bill document metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMetadata {
    pub document_id: String,
    pub generated_at: String,
    /// SHA-256 of the canonical calculation JSON
    pub calculation_fingerprint: String,
}

/// Patient and stay details printed in the header block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatientSection {
    pub full_name: String,
    pub uhid: String,
    pub ipd_no: String,
    pub opd_no: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Ward and bed, e.g. `Male Ward / 14`
    pub ward_bed: String,
    pub room_type: String,
    pub admission_date: NaiveDate,
    pub discharge_date: Option<NaiveDate>,
}

/// One row of the bill summary table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryLine {
    pub description: String,
    /// Days billed, absent for lump sums
    pub days: Option<u32>,
    /// Daily rate, absent for lump sums
    pub rate_per_day: Option<Decimal>,
    pub amount: Decimal,
}

impl BillDocument {
    /// Build a document from a calculated bill.
    pub fn from_bill(
        patient: &Patient,
        admission: &Admission,
        charges: &BillCharges,
        bill: &StayBill,
        policy: &BillingPolicy,
    ) -> ExportResult<Self> {
        let calc = &bill.calculation;
        let days = Some(calc.total_days);

        let summary = vec![
            SummaryLine {
                description: format!("Bed Charges ({})", charges.room_type),
                days,
                rate_per_day: Some(charges.room_type.daily_rate()),
                amount: calc.bed_charges,
            },
            SummaryLine {
                description: "Procedure Charges".into(),
                days: None,
                rate_per_day: None,
                amount: calc.procedure_charges,
            },
            SummaryLine {
                description: "Diet Charges".into(),
                days,
                rate_per_day: Some(charges.diet_per_day.normalize()),
                amount: calc.diet_charges,
            },
            SummaryLine {
                description: "Doctor Charges".into(),
                days,
                rate_per_day: Some(charges.doctor_per_day.normalize()),
                amount: calc.doctor_charges,
            },
            SummaryLine {
                description: "Nursing Charges".into(),
                days,
                rate_per_day: Some(charges.nursing_per_day.normalize()),
                amount: calc.nursing_charges,
            },
        ];

        Ok(Self {
            metadata: DocumentMetadata {
                document_id: uuid::Uuid::new_v4().to_string(),
                generated_at: chrono::Utc::now().to_rfc3339(),
                calculation_fingerprint: fingerprint(calc)?,
            },
            hospital_name: policy.hospital_name.clone(),
            currency: policy.currency.clone(),
            patient: PatientSection {
                full_name: patient.display_name().to_string(),
                uhid: patient.uhid.clone(),
                ipd_no: admission.ipd_no.clone(),
                opd_no: admission.opd_no.clone(),
                age: patient.age,
                gender: patient.gender.clone(),
                ward_bed: admission.ward_and_bed(),
                room_type: charges.room_type.to_string(),
                admission_date: admission.admission_date,
                discharge_date: admission.discharge_date,
            },
            procedures: calc.procedure_details.clone(),
            summary,
            total_days: calc.total_days,
            total_amount: calc.total_amount,
            deposit_amount: calc.deposit_amount,
            returnable_amount: calc.returnable_amount,
            additional_cost: calc.additional_cost,
            warnings: bill.warnings.clone(),
        })
    }

    /// Settlement of the deposit against the total.
    pub fn settlement(&self) -> Settlement {
        Settlement::from_balance(self.returnable_amount, self.additional_cost)
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        let ipd_no = escape_csv(&self.patient.ipd_no);
        let uhid = escape_csv(&self.patient.uhid);

        // Header
        csv.push_str("ipd_no,uhid,category,description,days,rate_per_day,amount\n");

        for proc in &self.procedures {
            csv.push_str(&format!(
                "{},{},procedure,{},{},{},{}\n",
                ipd_no,
                uhid,
                escape_csv(&proc.procedure_name),
                proc.days,
                proc.rate_per_day,
                proc.total_cost,
            ));
        }

        for line in &self.summary {
            csv.push_str(&format!(
                "{},{},charge,{},{},{},{}\n",
                ipd_no,
                uhid,
                escape_csv(&line.description),
                line.days.map(|d| d.to_string()).unwrap_or_default(),
                line.rate_per_day.map(|r| r.to_string()).unwrap_or_default(),
                line.amount,
            ));
        }

        for (category, amount) in [
            ("total", self.total_amount),
            ("deposit", self.deposit_amount),
            ("returnable", self.returnable_amount),
            ("additional", self.additional_cost),
        ] {
            csv.push_str(&format!("{},{},{},,,,{}\n", ipd_no, uhid, category, amount));
        }

        csv
    }
}

/// SHA-256 fingerprint of a calculation, stable across identical inputs.
pub fn fingerprint(calculation: &BillCalculation) -> Result<String, serde_json::Error> {
    let canonical = calculation.to_canonical_json()?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Builds bill documents from the store.
pub struct BillExporter<'a> {
    db: &'a Database,
    policy: &'a BillingPolicy,
}

impl<'a> BillExporter<'a> {
    /// Create a new bill exporter.
    pub fn new(db: &'a Database, policy: &'a BillingPolicy) -> Self {
        Self { db, policy }
    }

    /// Calculate a stay's bill and wrap it in a document.
    pub fn export(&self, ipd_no: &str, charges: &BillCharges) -> ExportResult<BillDocument> {
        let biller = StayBiller::new(self.db, self.policy);
        let input = biller.load_input(ipd_no, charges)?;
        let bill = biller.calculate_input(&input)?;

        let patient = self
            .db
            .get_patient(&input.admission.uhid)
            .map_err(BillingError::from)?
            .ok_or_else(|| {
                ExportError::Billing(BillingError::NotFound(format!(
                    "patient {}",
                    input.admission.uhid
                )))
            })?;

        let document =
            BillDocument::from_bill(&patient, &input.admission, charges, &bill, self.policy)?;
        tracing::debug!(
            ipd_no,
            document_id = %document.metadata.document_id,
            fingerprint = %document.metadata.calculation_fingerprint,
            "exported bill document"
        );

        Ok(document)
    }
}

/// Escape a string for CSV output.
fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
