//! Per-day service charges: bed, diet, doctor and nursing.

use rust_decimal::Decimal;

use super::{BillingError, BillingResult};
use crate::config::CurrencyPolicy;
use crate::models::BillCharges;

/// Service charges for a whole stay, already rounded to currency precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServiceCharges {
    pub bed: Decimal,
    pub diet: Decimal,
    pub doctor: Decimal,
    pub nursing: Decimal,
}

impl ServiceCharges {
    /// Multiply each per-day rate by the stay length.
    pub fn accumulate(
        total_days: u32,
        charges: &BillCharges,
        currency: &CurrencyPolicy,
    ) -> BillingResult<Self> {
        Ok(Self {
            bed: line_amount("bed", total_days, charges.room_type.daily_rate(), currency)?,
            diet: line_amount("diet", total_days, charges.diet_per_day, currency)?,
            doctor: line_amount("doctor", total_days, charges.doctor_per_day, currency)?,
            nursing: line_amount("nursing", total_days, charges.nursing_per_day, currency)?,
        })
    }
}

/// `days * rate`, rounded. Negative rates and overflow are rejected.
pub(crate) fn line_amount(
    label: &str,
    days: u32,
    rate: Decimal,
    currency: &CurrencyPolicy,
) -> BillingResult<Decimal> {
    if rate.is_sign_negative() && !rate.is_zero() {
        return Err(BillingError::InvalidAmount(format!(
            "{} rate is negative: {}",
            label, rate
        )));
    }

    let amount = Decimal::from(days).checked_mul(rate).ok_or_else(|| {
        BillingError::InvalidAmount(format!("{} charges overflow: {} x {}", label, days, rate))
    })?;

    Ok(currency.round(amount))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RoomType;

    #[test]
    fn test_ac_bed_charges() {
        let charges = BillCharges::for_room(RoomType::Ac);
        let service = ServiceCharges::accumulate(5, &charges, &CurrencyPolicy::default()).unwrap();
        assert_eq!(service.bed, Decimal::from(3750));
        assert_eq!(service.diet, Decimal::ZERO);
    }

    #[test]
    fn test_non_ac_with_daily_rates() {
        let charges = BillCharges {
            room_type: RoomType::NonAc,
            diet_per_day: Decimal::from(150),
            doctor_per_day: Decimal::from(300),
            nursing_per_day: Decimal::new(9999, 2),
        };
        let service = ServiceCharges::accumulate(3, &charges, &CurrencyPolicy::default()).unwrap();
        assert_eq!(service.bed, Decimal::from(1500));
        assert_eq!(service.diet, Decimal::from(450));
        assert_eq!(service.doctor, Decimal::from(900));
        assert_eq!(service.nursing, Decimal::new(29997, 2));
    }

    #[test]
    fn test_sub_cent_rates_rounded_half_up() {
        let charges = BillCharges {
            diet_per_day: Decimal::new(1005, 3), // 1.005
            ..BillCharges::default()
        };
        let service = ServiceCharges::accumulate(1, &charges, &CurrencyPolicy::default()).unwrap();
        assert_eq!(service.diet, Decimal::new(101, 2));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let charges = BillCharges {
            doctor_per_day: Decimal::from(-1),
            ..BillCharges::default()
        };
        let result = ServiceCharges::accumulate(2, &charges, &CurrencyPolicy::default());
        assert!(matches!(result, Err(BillingError::InvalidAmount(_))));
    }

    #[test]
    fn test_overflow_rejected() {
        let result = line_amount("diet", u32::MAX, Decimal::MAX, &CurrencyPolicy::default());
        assert!(matches!(result, Err(BillingError::InvalidAmount(_))));
    }
}
