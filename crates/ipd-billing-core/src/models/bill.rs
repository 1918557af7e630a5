//! Bill inputs and derived bill values.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Room category, which fixes the daily bed rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum RoomType {
    #[serde(rename = "AC")]
    Ac,
    #[default]
    #[serde(rename = "Non-AC")]
    NonAc,
}

impl RoomType {
    /// Daily bed charge for this room type.
    pub fn daily_rate(&self) -> Decimal {
        match self {
            RoomType::Ac => Decimal::from(750),
            RoomType::NonAc => Decimal::from(500),
        }
    }

    /// Label as printed on bills.
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::Ac => "AC",
            RoomType::NonAc => "Non-AC",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for RoomType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ac" => Ok(RoomType::Ac),
            "non-ac" | "nonac" | "non ac" => Ok(RoomType::NonAc),
            other => Err(format!("unknown room type: {}", other)),
        }
    }
}

/// Per-day charges entered at billing time (not persisted).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BillCharges {
    pub room_type: RoomType,
    pub diet_per_day: Decimal,
    pub doctor_per_day: Decimal,
    pub nursing_per_day: Decimal,
}

impl BillCharges {
    /// Charges with only a room type and zero per-day rates.
    pub fn for_room(room_type: RoomType) -> Self {
        Self {
            room_type,
            ..Self::default()
        }
    }
}

/// Cost breakdown for one procedure entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcedureDetail {
    pub procedure_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Inclusive session-day count
    pub days: u32,
    /// Catalog rate, zero when the name had no match
    pub rate_per_day: Decimal,
    pub total_cost: Decimal,
}

/// Final bill for a stay.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BillCalculation {
    pub total_days: u32,
    pub bed_charges: Decimal,
    pub procedure_charges: Decimal,
    pub diet_charges: Decimal,
    pub doctor_charges: Decimal,
    pub nursing_charges: Decimal,
    pub total_amount: Decimal,
    pub procedure_details: Vec<ProcedureDetail>,
    pub deposit_amount: Decimal,
    pub returnable_amount: Decimal,
    pub additional_cost: Decimal,
}

/// How the deposit settles against the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Deposit exceeds the bill; the difference is returned
    Refund(Decimal),
    /// Bill exceeds the deposit; the difference is still owed
    Due(Decimal),
    /// Deposit covers the bill exactly
    Settled,
}

impl Settlement {
    /// Classify a reconciled balance.
    pub fn from_balance(returnable_amount: Decimal, additional_cost: Decimal) -> Self {
        if returnable_amount > Decimal::ZERO {
            Settlement::Refund(returnable_amount)
        } else if additional_cost > Decimal::ZERO {
            Settlement::Due(additional_cost)
        } else {
            Settlement::Settled
        }
    }
}

impl BillCalculation {
    /// Sum of the five charge categories.
    pub fn component_sum(&self) -> Decimal {
        self.bed_charges
            + self.procedure_charges
            + self.diet_charges
            + self.doctor_charges
            + self.nursing_charges
    }

    /// Settlement of the deposit against the total.
    pub fn settlement(&self) -> Settlement {
        Settlement::from_balance(self.returnable_amount, self.additional_cost)
    }

    /// Serialize to canonical JSON for fingerprinting.
    pub fn to_canonical_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Non-fatal findings raised while calculating a bill.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BillingWarning {
    /// A procedure had no catalog rate and was billed at zero.
    RateLookupMiss {
        procedure_name: String,
        /// Closest catalog name, when one is similar enough
        suggestion: Option<String>,
    },
}

impl fmt::Display for BillingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BillingWarning::RateLookupMiss {
                procedure_name,
                suggestion: Some(suggestion),
            } => write!(
                f,
                "No rate found for procedure '{}' (billed at 0); did you mean '{}'?",
                procedure_name, suggestion
            ),
            BillingWarning::RateLookupMiss {
                procedure_name,
                suggestion: None,
            } => write!(f, "No rate found for procedure '{}' (billed at 0)", procedure_name),
        }
    }
}

/// Calculation result plus its warnings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StayBill {
    pub calculation: BillCalculation,
    pub warnings: Vec<BillingWarning>,
}

impl StayBill {
    /// Check if the bill may be under-billed due to rate misses.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Itemised quick bill entered by hand at the billing counter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChargeSheet {
    pub bed_charge: Decimal,
    pub nursing_charge: Decimal,
    pub doctor_charge: Decimal,
    pub procedure_charge: Decimal,
    pub surgery_charge: Decimal,
    pub other_charges: Decimal,
}

impl ChargeSheet {
    /// Labelled line items in print order.
    pub fn lines(&self) -> [(&'static str, Decimal); 6] {
        [
            ("Bed Charge", self.bed_charge),
            ("Nursing Charge", self.nursing_charge),
            ("Doctor Charge", self.doctor_charge),
            ("Procedure Charge", self.procedure_charge),
            ("Surgery Charge", self.surgery_charge),
            ("Other Charges", self.other_charges),
        ]
    }

    /// Sum of all lines, or `None` if it overflows.
    pub fn total(&self) -> Option<Decimal> {
        self.lines()
            .iter()
            .try_fold(Decimal::ZERO, |acc, (_, amount)| acc.checked_add(*amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_rates() {
        assert_eq!(RoomType::Ac.daily_rate(), Decimal::from(750));
        assert_eq!(RoomType::NonAc.daily_rate(), Decimal::from(500));
        assert_eq!(RoomType::default(), RoomType::NonAc);
    }

    #[test]
    fn test_room_type_parse_and_serde() {
        assert_eq!("AC".parse::<RoomType>().unwrap(), RoomType::Ac);
        assert_eq!("Non-AC".parse::<RoomType>().unwrap(), RoomType::NonAc);
        assert!("Deluxe".parse::<RoomType>().is_err());

        let json = serde_json::to_string(&RoomType::NonAc).unwrap();
        assert_eq!(json, "\"Non-AC\"");
        let parsed: RoomType = serde_json::from_str("\"AC\"").unwrap();
        assert_eq!(parsed, RoomType::Ac);
    }

    #[test]
    fn test_warning_display() {
        let warning = BillingWarning::RateLookupMiss {
            procedure_name: "Abyanga".into(),
            suggestion: Some("Abhyanga".into()),
        };
        assert!(warning.to_string().contains("did you mean 'Abhyanga'"));
    }

    #[test]
    fn test_charge_sheet_total() {
        let sheet = ChargeSheet {
            bed_charge: Decimal::from(1500),
            nursing_charge: Decimal::from(300),
            doctor_charge: Decimal::from(500),
            procedure_charge: Decimal::new(125050, 2),
            surgery_charge: Decimal::ZERO,
            other_charges: Decimal::new(4950, 2),
        };
        assert_eq!(sheet.total(), Some(Decimal::new(360000, 2)));
    }

    #[test]
    fn test_charge_sheet_total_overflow() {
        let sheet = ChargeSheet {
            bed_charge: Decimal::MAX,
            other_charges: Decimal::MAX,
            ..ChargeSheet::default()
        };
        assert_eq!(sheet.total(), None);
    }

    #[test]
    fn test_settlement_from_balance() {
        assert_eq!(
            Settlement::from_balance(Decimal::from(5), Decimal::ZERO),
            Settlement::Refund(Decimal::from(5))
        );
        assert_eq!(
            Settlement::from_balance(Decimal::ZERO, Decimal::from(7)),
            Settlement::Due(Decimal::from(7))
        );
        assert_eq!(
            Settlement::from_balance(Decimal::ZERO, Decimal::ZERO),
            Settlement::Settled
        );
    }
}
