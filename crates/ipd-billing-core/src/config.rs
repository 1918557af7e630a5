//! Billing policy: currency precision, rounding, rate-miss handling and store timeouts.
//!
//! Policies are plain serde structs with sensible defaults and can be loaded
//! from a JSON file:
//!
//! ```json
//! {
//!   "hospital_name": "City Ayurveda Hospital",
//!   "currency": { "code": "INR", "symbol": "₹", "decimal_places": 2, "rounding": "half_up" },
//!   "rate_miss": "warn",
//!   "lookup_timeout_ms": 5000
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum supported currency precision.
pub const MAX_DECIMAL_PLACES: u32 = 4;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse policy: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid policy: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Rounding applied to derived currency amounts.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoundingMode {
    /// Midpoint away from zero (2.345 → 2.35)
    #[default]
    HalfUp,
    /// Banker's rounding (2.345 → 2.34)
    HalfEven,
    /// Truncate toward zero
    TowardZero,
}

impl RoundingMode {
    fn strategy(&self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::TowardZero => RoundingStrategy::ToZero,
        }
    }
}

/// Currency used on bills.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CurrencyPolicy {
    pub code: String,
    pub symbol: String,
    pub decimal_places: u32,
    pub rounding: RoundingMode,
}

impl Default for CurrencyPolicy {
    fn default() -> Self {
        Self {
            code: "INR".to_string(),
            symbol: "₹".to_string(),
            decimal_places: 2,
            rounding: RoundingMode::HalfUp,
        }
    }
}

impl CurrencyPolicy {
    /// Round an amount to the currency precision.
    ///
    /// The result always carries exactly `decimal_places` digits of scale,
    /// so equal amounts serialize identically.
    pub fn round(&self, amount: Decimal) -> Decimal {
        let mut rounded = amount.round_dp_with_strategy(self.decimal_places, self.rounding.strategy());
        rounded.rescale(self.decimal_places);
        rounded
    }

    /// Format an amount for display, e.g. `₹12,345.50`.
    pub fn format(&self, amount: Decimal) -> String {
        let rounded = self.round(amount);
        let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
            "-"
        } else {
            ""
        };
        let plain = format!("{:.*}", self.decimal_places as usize, rounded.abs());
        let (integer, fraction) = match plain.split_once('.') {
            Some((integer, fraction)) => (integer, Some(fraction)),
            None => (plain.as_str(), None),
        };

        let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
        for (i, ch) in integer.chars().enumerate() {
            if i > 0 && (integer.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        match fraction {
            Some(fraction) => format!("{}{}{}.{}", sign, self.symbol, grouped, fraction),
            None => format!("{}{}{}", sign, self.symbol, grouped),
        }
    }
}

/// What to do when a procedure has no catalog rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RateMissPolicy {
    /// Bill at zero and report a warning with the bill
    #[default]
    Warn,
    /// Bill at zero without reporting anything
    Silent,
}

/// Complete billing policy.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BillingPolicy {
    /// Name printed in the bill header
    pub hospital_name: String,
    pub currency: CurrencyPolicy,
    pub rate_miss: RateMissPolicy,
    /// How long a store read may wait on a locked database
    pub lookup_timeout_ms: u64,
}

impl Default for BillingPolicy {
    fn default() -> Self {
        Self {
            hospital_name: "Hospital".to_string(),
            currency: CurrencyPolicy::default(),
            rate_miss: RateMissPolicy::Warn,
            lookup_timeout_ms: 5_000,
        }
    }
}

impl BillingPolicy {
    /// Parse and validate a policy from JSON.
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let policy: BillingPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load and validate a policy from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check policy values are usable.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.currency.decimal_places > MAX_DECIMAL_PLACES {
            return Err(ConfigError::Invalid(format!(
                "decimal_places must be at most {}, got {}",
                MAX_DECIMAL_PLACES, self.currency.decimal_places
            )));
        }
        if self.currency.code.trim().is_empty() {
            return Err(ConfigError::Invalid("currency code is empty".into()));
        }
        if self.lookup_timeout_ms == 0 {
            return Err(ConfigError::Invalid("lookup_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    /// Store lookup timeout as a [`Duration`].
    pub fn lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.lookup_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let policy = BillingPolicy::default();
        assert_eq!(policy.currency.code, "INR");
        assert_eq!(policy.currency.decimal_places, 2);
        assert_eq!(policy.rate_miss, RateMissPolicy::Warn);
        assert_eq!(policy.lookup_timeout(), Duration::from_secs(5));
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let policy = BillingPolicy::from_json_str(
            r#"{ "hospital_name": "City Hospital", "rate_miss": "silent" }"#,
        )
        .unwrap();
        assert_eq!(policy.hospital_name, "City Hospital");
        assert_eq!(policy.rate_miss, RateMissPolicy::Silent);
        assert_eq!(policy.currency, CurrencyPolicy::default());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let result = BillingPolicy::from_json_str(r#"{ "currency": { "decimal_places": 9 } }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = BillingPolicy::from_json_str(r#"{ "lookup_timeout_ms": 0 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = BillingPolicy::from_json_str("not json");
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.json");
        std::fs::write(&path, r#"{ "currency": { "rounding": "half_even" } }"#).unwrap();

        let policy = BillingPolicy::load(&path).unwrap();
        assert_eq!(policy.currency.rounding, RoundingMode::HalfEven);

        let missing = BillingPolicy::load(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_rounding_modes() {
        let mut currency = CurrencyPolicy::default();
        let amount = Decimal::new(2345, 3); // 2.345

        assert_eq!(currency.round(amount), Decimal::new(235, 2));

        currency.rounding = RoundingMode::HalfEven;
        assert_eq!(currency.round(amount), Decimal::new(234, 2));

        currency.rounding = RoundingMode::TowardZero;
        assert_eq!(currency.round(Decimal::new(2349, 3)), Decimal::new(234, 2));
    }

    #[test]
    fn test_round_fixes_scale() {
        let currency = CurrencyPolicy::default();
        assert_eq!(currency.round(Decimal::from(3750)).to_string(), "3750.00");
        assert_eq!(currency.round(Decimal::new(1005, 1)).to_string(), "100.50");
        assert_eq!(currency.round(Decimal::ZERO).to_string(), "0.00");
        assert_eq!(
            currency.round(Decimal::from(100)).to_string(),
            currency.round(Decimal::new(10000, 2)).to_string()
        );
    }

    #[test]
    fn test_format_amount() {
        let currency = CurrencyPolicy::default();
        assert_eq!(currency.format(Decimal::from(3750)), "₹3,750.00");
        assert_eq!(currency.format(Decimal::new(123456789, 2)), "₹1,234,567.89");
        assert_eq!(currency.format(Decimal::ZERO), "₹0.00");
        assert_eq!(currency.format(Decimal::from(-500)), "-₹500.00");
        assert_eq!(currency.format(Decimal::from(999)), "₹999.00");
    }

    #[test]
    fn test_format_without_fraction() {
        let currency = CurrencyPolicy {
            decimal_places: 0,
            ..CurrencyPolicy::default()
        };
        assert_eq!(currency.format(Decimal::new(12345, 1)), "₹1,235");
    }
}
