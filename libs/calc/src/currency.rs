//! Currency collaborator: code/symbol lookup and conversion

use crate::error::EvalError;
use phf::phf_map;
use std::collections::HashMap;
use std::fmt;

/// Currency lookups and conversion used by the evaluator.
pub trait CurrencyService: fmt::Debug {
    /// ISO code for a symbol (`$`) or code (`eur`), if known.
    fn code_for(&self, token: &str) -> Option<String>;

    /// Convert `amount` from one currency to another. Both sides accept a
    /// symbol or a code.
    fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, EvalError>;

    fn is_currency(&self, token: &str) -> bool {
        self.code_for(token).is_some()
    }
}

/// Units of each currency per US dollar.
static USD_RATES: phf::Map<&'static str, f64> = phf_map! {
    "USD" => 1.0,
    "EUR" => 0.92,
    "GBP" => 0.79,
    "JPY" => 149.5,
    "INR" => 83.1,
    "CHF" => 0.88,
    "CAD" => 1.36,
    "AUD" => 1.52,
    "NZD" => 1.64,
    "CNY" => 7.24,
    "SEK" => 10.4,
    "NOK" => 10.6,
    "DKK" => 6.87,
    "PLN" => 3.98,
    "MXN" => 17.1,
    "BRL" => 4.97,
    "ZAR" => 18.6,
    "SGD" => 1.34,
    "HKD" => 7.82,
    "KRW" => 1330.0,
};

/// "pound" is deliberately absent: it would clash with the mass unit.
static SYMBOLS: phf::Map<&'static str, &'static str> = phf_map! {
    "$" => "USD",
    "€" => "EUR",
    "£" => "GBP",
    "¥" => "JPY",
    "₹" => "INR",
};

/// Display symbol for an ISO code, if it has one.
pub fn symbol_for(code: &str) -> Option<&'static str> {
    SYMBOLS
        .entries()
        .find(|(_, c)| **c == code)
        .map(|(symbol, _)| *symbol)
}

/// Fixed USD-based exchange rates, with optional per-session overrides.
#[derive(Debug, Clone, Default)]
pub struct StaticRates {
    overrides: HashMap<String, f64>,
}

impl StaticRates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set (or add) the rate of `code` in units per US dollar.
    pub fn with_rate(mut self, code: &str, per_usd: f64) -> Self {
        self.overrides.insert(code.to_ascii_uppercase(), per_usd);
        self
    }

    fn rate(&self, code: &str) -> Option<f64> {
        self.overrides
            .get(code)
            .copied()
            .or_else(|| USD_RATES.get(code).copied())
    }
}

impl CurrencyService for StaticRates {
    fn code_for(&self, token: &str) -> Option<String> {
        let token = token.trim();
        if let Some(code) = SYMBOLS.get(token) {
            return Some((*code).to_string());
        }
        if token.chars().count() != 3 {
            return None;
        }
        let code = token.to_ascii_uppercase();
        self.rate(&code).map(|_| code)
    }

    fn convert(&self, amount: f64, from: &str, to: &str) -> Result<f64, EvalError> {
        let from = self
            .code_for(from)
            .ok_or_else(|| EvalError::UnknownCurrency(from.to_string()))?;
        let to = self
            .code_for(to)
            .ok_or_else(|| EvalError::UnknownCurrency(to.to_string()))?;
        if from == to {
            return Ok(amount);
        }
        let from_rate = self
            .rate(&from)
            .ok_or_else(|| EvalError::UnknownCurrency(from.clone()))?;
        let to_rate = self
            .rate(&to)
            .ok_or_else(|| EvalError::UnknownCurrency(to.clone()))?;
        Ok(amount / from_rate * to_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbols_and_codes() {
        let rates = StaticRates::new();
        assert_eq!(rates.code_for("$").as_deref(), Some("USD"));
        assert_eq!(rates.code_for("eur").as_deref(), Some("EUR"));
        assert!(rates.is_currency("£"));
        assert!(!rates.is_currency("pound"));
        assert!(!rates.is_currency("XYZ"));
        assert_eq!(symbol_for("EUR"), Some("€"));
        assert_eq!(symbol_for("CHF"), None);
    }

    #[test]
    fn test_conversion_goes_through_usd() {
        let rates = StaticRates::new().with_rate("EUR", 0.5);
        assert_eq!(rates.convert(10.0, "$", "EUR").unwrap(), 5.0);
        assert_eq!(rates.convert(5.0, "€", "usd").unwrap(), 10.0);
        assert_eq!(rates.convert(7.0, "GBP", "£").unwrap(), 7.0);
        assert!(matches!(
            rates.convert(1.0, "USD", "ABC"),
            Err(EvalError::UnknownCurrency(_))
        ));
    }
}
