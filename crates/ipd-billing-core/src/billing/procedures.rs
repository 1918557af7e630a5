//! Procedure cost aggregation.
//!
//! Rates are joined to entries by exact, case-sensitive procedure name. A
//! name with no catalog rate is billed at zero and, unless the policy is
//! silent, reported as a [`BillingWarning::RateLookupMiss`] with the closest
//! catalog name as a suggestion.

use rust_decimal::Decimal;
use strsim::{jaro_winkler, normalized_levenshtein};

use super::charges::line_amount;
use super::duration::inclusive_days;
use super::{checked_sum, BillingError, BillingResult, RateLookup};
use crate::config::{BillingPolicy, RateMissPolicy};
use crate::models::{BillingWarning, ProcedureDetail, ProcedureEntry};

/// Minimum similarity for a catalog name to be offered as a suggestion.
pub const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Aggregated procedure charges for a stay.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcedureCharges {
    pub details: Vec<ProcedureDetail>,
    pub total: Decimal,
    pub warnings: Vec<BillingWarning>,
}

/// Price every entry and sum the costs, in entry order.
pub fn aggregate_procedures<R: RateLookup + ?Sized>(
    entries: &[ProcedureEntry],
    rates: &R,
    policy: &BillingPolicy,
) -> BillingResult<ProcedureCharges> {
    let mut details = Vec::with_capacity(entries.len());
    let mut warnings = Vec::new();
    // Fetched on the first miss only
    let mut known: Option<Vec<String>> = None;

    for entry in entries {
        let days = inclusive_days(entry.start_date, entry.end_date).map_err(|_| {
            BillingError::InvalidDateRange(format!(
                "procedure '{}' ends {} before it starts {}",
                entry.procedure_name, entry.end_date, entry.start_date
            ))
        })?;

        let rate = match rates.procedure_rate(&entry.procedure_name)? {
            Some(rate) => rate,
            None => {
                if policy.rate_miss == RateMissPolicy::Warn {
                    if known.is_none() {
                        known = Some(rates.known_procedures()?);
                    }
                    let suggestion = known
                        .as_deref()
                        .and_then(|names| suggest_procedure(&entry.procedure_name, names));

                    tracing::warn!(
                        procedure = %entry.procedure_name,
                        suggestion = ?suggestion,
                        "no rate for procedure, billed at zero"
                    );
                    warnings.push(BillingWarning::RateLookupMiss {
                        procedure_name: entry.procedure_name.clone(),
                        suggestion,
                    });
                }
                Decimal::ZERO
            }
        };

        let total_cost = line_amount(&entry.procedure_name, days, rate, &policy.currency)?;
        tracing::debug!(
            procedure = %entry.procedure_name,
            days,
            rate = %rate,
            cost = %total_cost,
            "priced procedure"
        );

        details.push(ProcedureDetail {
            procedure_name: entry.procedure_name.clone(),
            start_date: entry.start_date,
            end_date: entry.end_date,
            days,
            rate_per_day: rate.normalize(),
            total_cost,
        });
    }

    let total = policy
        .currency
        .round(checked_sum("procedure", details.iter().map(|d| d.total_cost))?);

    Ok(ProcedureCharges {
        details,
        total,
        warnings,
    })
}

/// Closest catalog name to a missed procedure name, if similar enough.
pub fn suggest_procedure(name: &str, known: &[String]) -> Option<String> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    known
        .iter()
        .map(|candidate| (candidate, fuzzy_match(&needle, &candidate.to_lowercase())))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(candidate, _)| candidate.clone())
}

/// Fuzzy string similarity in `[0, 1]`.
fn fuzzy_match(a: &str, b: &str) -> f64 {
    // Jaro-Winkler favours shared prefixes, Levenshtein overall edits
    let jw = jaro_winkler(a, b);
    let lev = normalized_levenshtein(a, b);

    jw * 0.6 + lev * 0.4
}
