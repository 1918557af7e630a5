//! Domain models for IPD billing.

mod admission;
mod bill;
mod patient;
mod procedure;

pub use admission::*;
pub use bill::*;
pub use patient::*;
pub use procedure::*;
