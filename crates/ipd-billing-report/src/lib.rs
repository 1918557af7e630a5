//! Printable HTML for IPD bills.
//!
//! This crate renders [`BillDocument`](ipd_billing_core::export::BillDocument)s
//! and quick charge sheets with Handlebars templates. Amounts are formatted
//! with the document's currency policy before they reach a template.

pub mod render;
pub mod templates;

pub use render::*;
pub use templates::{CHARGE_SHEET, FINAL_BILL};
