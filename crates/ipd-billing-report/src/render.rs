//! Rendering bill documents to printable HTML.

use handlebars::Handlebars;
use ipd_billing_core::config::CurrencyPolicy;
use ipd_billing_core::export::BillDocument;
use ipd_billing_core::models::{ChargeSheet, Settlement};
use serde::Serialize;
use thiserror::Error;

use crate::templates::{CHARGE_SHEET, CHARGE_SHEET_TEMPLATE, FINAL_BILL, FINAL_BILL_TEMPLATE};

/// Rendering errors.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("Render error: {0}")]
    Render(#[from] handlebars::RenderError),

    #[error("Invalid amount: {0}")]
    InvalidAmount(&'static str),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Placeholder for values the bill does not have.
const BLANK: &str = "-";

/// Renders bills with the built-in (or overridden) templates.
pub struct BillRenderer {
    registry: Handlebars<'static>,
}

impl BillRenderer {
    /// Create a renderer with the built-in templates.
    pub fn new() -> RenderResult<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_template_string(FINAL_BILL, FINAL_BILL_TEMPLATE)?;
        registry.register_template_string(CHARGE_SHEET, CHARGE_SHEET_TEMPLATE)?;
        Ok(Self { registry })
    }

    /// Replace a template, e.g. with a hospital's own letterhead.
    ///
    /// Use [`FINAL_BILL`] or [`CHARGE_SHEET`] as the name.
    pub fn register_template(&mut self, name: &str, source: &str) -> RenderResult<()> {
        self.registry.register_template_string(name, source)?;
        Ok(())
    }

    /// Render the final bill.
    pub fn render_final_bill(&self, document: &BillDocument) -> RenderResult<String> {
        let view = FinalBillView::from_document(document);
        let html = self.registry.render(FINAL_BILL, &view)?;
        tracing::debug!(
            ipd_no = %document.patient.ipd_no,
            bytes = html.len(),
            "rendered final bill"
        );
        Ok(html)
    }

    /// Render the quick charge-sheet receipt.
    pub fn render_charge_sheet(
        &self,
        sheet: &ChargeSheet,
        currency: &CurrencyPolicy,
    ) -> RenderResult<String> {
        let view = ChargeSheetView {
            lines: sheet
                .lines()
                .into_iter()
                .map(|(label, amount)| ChargeLineView {
                    label,
                    amount: currency.format(amount),
                })
                .collect(),
            total: currency.format(sheet.total().ok_or(RenderError::InvalidAmount(
                "charge sheet total overflows",
            ))?),
        };
        Ok(self.registry.render(CHARGE_SHEET, &view)?)
    }
}

#[derive(Serialize)]
struct FinalBillView {
    hospital_name: String,
    patient: PatientView,
    total_days: u32,
    has_procedures: bool,
    procedures: Vec<ProcedureView>,
    summary: Vec<SummaryView>,
    total_amount: String,
    deposit_amount: String,
    returnable_amount: String,
    additional_cost: String,
    is_refund: bool,
    is_due: bool,
    is_settled: bool,
    has_warnings: bool,
    warnings: Vec<String>,
    document_id: String,
    generated_at: String,
    fingerprint: String,
}

#[derive(Serialize)]
struct PatientView {
    full_name: String,
    ipd_no: String,
    uhid: String,
    age: String,
    gender: String,
    ward_bed: String,
    admission_date: String,
    discharge_date: String,
    room_type: String,
}

#[derive(Serialize)]
struct ProcedureView {
    name: String,
    start_date: String,
    end_date: String,
    days: u32,
    rate: String,
    total: String,
}

#[derive(Serialize)]
struct SummaryView {
    description: String,
    days: String,
    rate: String,
    amount: String,
}

#[derive(Serialize)]
struct ChargeSheetView {
    lines: Vec<ChargeLineView>,
    total: String,
}

#[derive(Serialize)]
struct ChargeLineView {
    label: &'static str,
    amount: String,
}

impl FinalBillView {
    fn from_document(document: &BillDocument) -> Self {
        let currency = &document.currency;
        let patient = &document.patient;
        let settlement = document.settlement();

        Self {
            hospital_name: document.hospital_name.clone(),
            patient: PatientView {
                full_name: patient.full_name.clone(),
                ipd_no: patient.ipd_no.clone(),
                uhid: patient.uhid.clone(),
                age: patient.age.map(|a| a.to_string()).unwrap_or_else(|| BLANK.into()),
                gender: patient.gender.clone().unwrap_or_else(|| BLANK.into()),
                ward_bed: patient.ward_bed.clone(),
                admission_date: patient.admission_date.to_string(),
                discharge_date: patient
                    .discharge_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| BLANK.into()),
                room_type: patient.room_type.clone(),
            },
            total_days: document.total_days,
            has_procedures: !document.procedures.is_empty(),
            procedures: document
                .procedures
                .iter()
                .map(|p| ProcedureView {
                    name: p.procedure_name.clone(),
                    start_date: p.start_date.to_string(),
                    end_date: p.end_date.to_string(),
                    days: p.days,
                    rate: currency.format(p.rate_per_day),
                    total: currency.format(p.total_cost),
                })
                .collect(),
            summary: document
                .summary
                .iter()
                .map(|line| SummaryView {
                    description: line.description.clone(),
                    days: line.days.map(|d| d.to_string()).unwrap_or_else(|| BLANK.into()),
                    rate: line
                        .rate_per_day
                        .map(|r| currency.format(r))
                        .unwrap_or_else(|| BLANK.into()),
                    amount: currency.format(line.amount),
                })
                .collect(),
            total_amount: currency.format(document.total_amount),
            deposit_amount: currency.format(document.deposit_amount),
            returnable_amount: currency.format(document.returnable_amount),
            additional_cost: currency.format(document.additional_cost),
            is_refund: matches!(settlement, Settlement::Refund(_)),
            is_due: matches!(settlement, Settlement::Due(_)),
            is_settled: matches!(settlement, Settlement::Settled),
            has_warnings: !document.warnings.is_empty(),
            warnings: document.warnings.iter().map(|w| w.to_string()).collect(),
            document_id: document.metadata.document_id.clone(),
            generated_at: document.metadata.generated_at.clone(),
            fingerprint: document.metadata.calculation_fingerprint.clone(),
        }
    }
}
