//! Stay duration: inclusive whole-day counts.

use chrono::NaiveDate;

use super::{BillingError, BillingResult};
use crate::models::Admission;

/// Inclusive day count between two dates; both endpoints are billable.
///
/// Same-day ranges count as one day. A range that ends before it starts is
/// rejected with [`BillingError::InvalidDateRange`].
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> BillingResult<u32> {
    let elapsed = end.signed_duration_since(start).num_days();
    if elapsed < 0 {
        return Err(BillingError::InvalidDateRange(format!(
            "{} is before {}",
            end, start
        )));
    }

    u32::try_from(elapsed + 1).map_err(|_| {
        BillingError::InvalidDateRange(format!("range {} to {} is too long", start, end))
    })
}

/// Billable days for a stay. The stay must have a discharge date.
pub fn stay_days(admission: &Admission) -> BillingResult<u32> {
    let discharge = admission.discharge_date.ok_or_else(|| {
        BillingError::InvalidDateRange(format!(
            "admission {} has no discharge date",
            admission.ipd_no
        ))
    })?;

    inclusive_days(admission.admission_date, discharge).map_err(|_| {
        BillingError::InvalidDateRange(format!(
            "admission {}: discharge {} is before admission {}",
            admission.ipd_no, discharge, admission.admission_date
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn admission(admitted: NaiveDate, discharged: Option<NaiveDate>) -> Admission {
        let mut admission = Admission::new("UHID-1".into(), admitted, "General".into(), "4".into());
        admission.discharge_date = discharged;
        admission
    }

    #[test]
    fn test_same_day_is_one() {
        assert_eq!(inclusive_days(date(2024, 1, 1), date(2024, 1, 1)).unwrap(), 1);
    }

    #[test]
    fn test_inclusive_count() {
        assert_eq!(inclusive_days(date(2024, 1, 1), date(2024, 1, 5)).unwrap(), 5);
        assert_eq!(inclusive_days(date(2024, 1, 2), date(2024, 1, 3)).unwrap(), 2);
    }

    #[test]
    fn test_crosses_month_and_leap_day() {
        assert_eq!(inclusive_days(date(2024, 2, 28), date(2024, 3, 1)).unwrap(), 3);
        assert_eq!(inclusive_days(date(2023, 12, 31), date(2024, 1, 1)).unwrap(), 2);
    }

    #[test]
    fn test_reversed_range_rejected() {
        let result = inclusive_days(date(2024, 1, 5), date(2024, 1, 1));
        assert!(matches!(result, Err(BillingError::InvalidDateRange(_))));
    }

    #[test]
    fn test_stay_days() {
        let stay = admission(date(2024, 1, 1), Some(date(2024, 1, 5)));
        assert_eq!(stay_days(&stay).unwrap(), 5);
    }

    #[test]
    fn test_stay_without_discharge_rejected() {
        let stay = admission(date(2024, 1, 1), None);
        let err = stay_days(&stay).unwrap_err();
        assert!(matches!(err, BillingError::InvalidDateRange(_)));
        assert!(err.to_string().contains("no discharge date"));
    }

    #[test]
    fn test_discharge_before_admission_rejected() {
        let stay = admission(date(2024, 1, 5), Some(date(2024, 1, 4)));
        assert!(matches!(stay_days(&stay), Err(BillingError::InvalidDateRange(_))));
    }
}
