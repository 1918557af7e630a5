//! Bill documents and their JSON/CSV export.

mod document;

pub use document::*;

use thiserror::Error;

use crate::billing::BillingError;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Billing error: {0}")]
    Billing(#[from] BillingError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;
