//! Bill totals and deposit reconciliation.

use rust_decimal::Decimal;

use super::charges::ServiceCharges;
use super::{checked_sum, BillingError, BillingResult};
use crate::config::CurrencyPolicy;

/// Bill total reconciled against the deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Totals {
    pub total_amount: Decimal,
    pub deposit_amount: Decimal,
    pub returnable_amount: Decimal,
    pub additional_cost: Decimal,
}

/// Sum the five charge categories and settle the deposit against them.
///
/// At most one of `returnable_amount` and `additional_cost` is nonzero;
/// both are zero when the deposit equals the total.
pub fn totalize(
    service: &ServiceCharges,
    procedure_charges: Decimal,
    deposit: Decimal,
    currency: &CurrencyPolicy,
) -> BillingResult<Totals> {
    if deposit.is_sign_negative() && !deposit.is_zero() {
        return Err(BillingError::InvalidAmount(format!(
            "deposit is negative: {}",
            deposit
        )));
    }

    let total_amount = currency.round(checked_sum(
        "total",
        [
            service.bed,
            procedure_charges,
            service.diet,
            service.doctor,
            service.nursing,
        ],
    )?);
    let deposit_amount = currency.round(deposit);

    let (returnable_amount, additional_cost) = if deposit_amount >= total_amount {
        (deposit_amount - total_amount, Decimal::ZERO)
    } else {
        (Decimal::ZERO, total_amount - deposit_amount)
    };
    let returnable_amount = currency.round(returnable_amount);
    let additional_cost = currency.round(additional_cost);

    Ok(Totals {
        total_amount,
        deposit_amount,
        returnable_amount,
        additional_cost,
    })
}
