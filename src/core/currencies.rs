//! Currency rounding and conversion to company currency.
//!
//! Conversion itself belongs to the host: it supplies rates through the
//! [`CurrencyConverter`] trait. [`RateTable`] is a simple in-memory
//! implementation keyed by currency and effective date.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::error::PerceptionError;

/// Check whether `code` is a known ISO 4217 currency code.
pub fn is_known_currency_code(code: &str) -> bool {
    CURRENCY_CODES.binary_search(&code).is_ok()
}

/// Sorted list of common ISO 4217 currency codes.
/// Sorted for binary search.
static CURRENCY_CODES: &[&str] = &[
    "ARS", // Argentine Peso
    "AUD", // Australian Dollar
    "BOB", // Boliviano
    "BRL", // Brazilian Real
    "CAD", // Canadian Dollar
    "CHF", // Swiss Franc
    "CLP", // Chilean Peso
    "CNY", // Chinese Yuan
    "COP", // Colombian Peso
    "EUR", // Euro
    "GBP", // Pound Sterling
    "JPY", // Japanese Yen
    "MXN", // Mexican Peso
    "PEN", // Peruvian Sol
    "PYG", // Paraguayan Guarani
    "USD", // US Dollar
    "UYU", // Uruguayan Peso
];

/// Currencies whose minor unit is 0 (no decimals).
static ZERO_DECIMAL_CODES: &[&str] = &["CLP", "JPY", "PYG"];

/// A currency with its rounding rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Currency {
    /// ISO 4217 code (e.g. "ARS").
    pub code: String,
    /// Number of decimal places amounts are rounded to.
    pub decimal_places: u32,
}

impl Currency {
    /// Currency with the ISO 4217 minor unit for `code` (2 unless listed as zero-decimal).
    pub fn new(code: impl Into<String>) -> Self {
        let code = code.into();
        let decimal_places = if ZERO_DECIMAL_CODES.contains(&code.as_str()) {
            0
        } else {
            2
        };
        Self {
            code,
            decimal_places,
        }
    }

    /// Currency with an explicit number of decimal places.
    pub fn with_decimal_places(code: impl Into<String>, decimal_places: u32) -> Self {
        Self {
            code: code.into(),
            decimal_places,
        }
    }

    /// Round `value` with this currency's rule (half away from zero).
    pub fn round(&self, value: Decimal) -> Decimal {
        value.round_dp_with_strategy(self.decimal_places, RoundingStrategy::MidpointAwayFromZero)
    }
}

/// Source of conversion rates, supplied by the host.
///
/// A rate is the amount of `currency` worth one unit of the converter's base
/// currency on the given date.
pub trait CurrencyConverter {
    /// Rate of `currency` effective on `date`.
    fn rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal, PerceptionError>;

    /// Convert `amount` from one currency to another at the rates of `date`.
    ///
    /// With `round = false` the raw converted value is returned so callers
    /// can accumulate before rounding once.
    fn compute(
        &self,
        amount: Decimal,
        from: &Currency,
        to: &Currency,
        date: NaiveDate,
        round: bool,
    ) -> Result<Decimal, PerceptionError> {
        let converted = if from.code == to.code {
            amount
        } else {
            let from_rate = self.rate(&from.code, date)?;
            let to_rate = self.rate(&to.code, date)?;
            if from_rate <= Decimal::ZERO || to_rate <= Decimal::ZERO {
                return Err(PerceptionError::Currency(format!(
                    "non-positive rate converting {} to {} on {date}",
                    from.code, to.code
                )));
            }
            amount * to_rate / from_rate
        };
        tracing::trace!(%amount, from = %from.code, to = %to.code, %converted, "currency conversion");
        Ok(if round { to.round(converted) } else { converted })
    }
}

/// In-memory rate history. The base currency always has rate 1.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RateTable {
    base: String,
    rates: HashMap<String, BTreeMap<NaiveDate, Decimal>>,
}

impl RateTable {
    /// Create an empty table for the given base currency.
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            rates: HashMap::new(),
        }
    }

    /// Add a rate effective from `date` onwards.
    pub fn with_rate(mut self, currency: impl Into<String>, date: NaiveDate, rate: Decimal) -> Self {
        self.insert(currency, date, rate);
        self
    }

    /// Add or replace a rate effective from `date` onwards.
    pub fn insert(&mut self, currency: impl Into<String>, date: NaiveDate, rate: Decimal) {
        self.rates
            .entry(currency.into())
            .or_default()
            .insert(date, rate);
    }
}

impl CurrencyConverter for RateTable {
    fn rate(&self, currency: &str, date: NaiveDate) -> Result<Decimal, PerceptionError> {
        if currency == self.base {
            return Ok(Decimal::ONE);
        }
        self.rates
            .get(currency)
            .and_then(|history| history.range(..=date).next_back())
            .map(|(_, rate)| *rate)
            .ok_or_else(|| PerceptionError::MissingRate {
                currency: currency.to_string(),
                date,
            })
    }
}
