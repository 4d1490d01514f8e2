//! Evaluation results

use crate::currency::symbol_for;
use crate::error::Error;
use chrono::{NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;

/// A typed calculator value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Number(f64),
    /// Amount tagged with an ISO currency code
    Currency { amount: f64, code: String },
    /// Amount tagged with a canonical unit name (`km`, `km/h`)
    Unit { amount: f64, unit: String },
    Date(NaiveDateTime),
    /// `20%` is stored as `20.0`
    Percent(f64),
    Text(String),
}

impl Value {
    pub fn currency(amount: f64, code: impl Into<String>) -> Self {
        Value::Currency {
            amount,
            code: code.into(),
        }
    }

    pub fn unit(amount: f64, unit: impl Into<String>) -> Self {
        Value::Unit {
            amount,
            unit: unit.into(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Currency { .. } => "currency",
            Value::Unit { .. } => "unit",
            Value::Date(_) => "date",
            Value::Percent(_) => "percentage",
            Value::Text(_) => "text",
        }
    }

    /// The scalar part of a numeric value.
    pub fn amount(&self) -> Option<f64> {
        match self {
            Value::Number(n) | Value::Percent(n) => Some(*n),
            Value::Currency { amount, .. } | Value::Unit { amount, .. } => Some(*amount),
            Value::Date(_) | Value::Text(_) => None,
        }
    }

    /// The same tag with a new scalar part. `None` for dates and text.
    pub fn with_amount(&self, amount: f64) -> Option<Value> {
        match self {
            Value::Number(_) => Some(Value::Number(amount)),
            Value::Percent(_) => Some(Value::Percent(amount)),
            Value::Currency { code, .. } => Some(Value::currency(amount, code.clone())),
            Value::Unit { unit, .. } => Some(Value::unit(amount, unit.clone())),
            Value::Date(_) | Value::Text(_) => None,
        }
    }

    /// Render with `precision` digits after the decimal point.
    pub fn render(&self, precision: usize) -> String {
        match self {
            Value::Number(n) => format_number(*n, precision),
            Value::Percent(p) => format!("{}%", format_number(*p, precision)),
            Value::Unit { amount, unit } => {
                let amount = format_number(*amount, precision);
                if unit.starts_with('°') {
                    format!("{amount}{unit}")
                } else {
                    format!("{amount} {unit}")
                }
            }
            Value::Currency { amount, code } => match symbol_for(code) {
                Some(symbol) if *amount < 0.0 => {
                    format!("-{symbol}{}", format_number(-amount, precision))
                }
                Some(symbol) => format!("{symbol}{}", format_number(*amount, precision)),
                None => format!("{} {code}", format_number(*amount, precision)),
            },
            Value::Date(at) if at.time() == NaiveTime::MIN => at.format("%Y-%m-%d").to_string(),
            Value::Date(at) => at.format("%Y-%m-%d %H:%M").to_string(),
            Value::Text(text) => text.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(2))
    }
}

fn format_number(n: f64, precision: usize) -> String {
    let text = format!("{n:.precision$}");
    // -0.00 reads as zero
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// Result of handling one line.
///
/// `Silent` is the "nothing to display" outcome of comments, commands and
/// quiet assignments; it is not a failure and must not be printed.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success(Value),
    Silent,
    Failure(Error),
}

impl Outcome {
    /// Set for both failures and silent outcomes; check [`Outcome::message`]
    /// to tell them apart.
    pub fn is_error(&self) -> bool {
        !matches!(self, Outcome::Success(_))
    }

    /// Failure message, empty for everything else.
    pub fn message(&self) -> String {
        match self {
            Outcome::Failure(err) => err.to_string(),
            _ => String::new(),
        }
    }

    pub fn is_silent(&self) -> bool {
        matches!(self, Outcome::Silent)
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    /// Display text, or `None` when nothing should be printed.
    pub fn render(&self, precision: usize) -> Option<String> {
        match self {
            Outcome::Success(value) => Some(value.render(precision)),
            Outcome::Silent => None,
            Outcome::Failure(err) => Some(format!("Error: {err}")),
        }
    }
}

impl From<std::result::Result<Value, Error>> for Outcome {
    fn from(result: std::result::Result<Value, Error>) -> Self {
        match result {
            Ok(value) => Outcome::Success(value),
            Err(err) => Outcome::Failure(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalError;
    use chrono::NaiveDate;

    #[test]
    fn test_render() {
        assert_eq!(Value::Number(20.0).render(2), "20.00");
        assert_eq!(Value::Number(-0.001).render(2), "0.00");
        assert_eq!(Value::currency(150.0, "USD").render(2), "$150.00");
        assert_eq!(Value::currency(-5.0, "EUR").render(1), "-€5.0");
        assert_eq!(Value::currency(3.0, "CHF").render(2), "3.00 CHF");
        assert_eq!(Value::unit(5.0, "km").render(0), "5 km");
        assert_eq!(Value::unit(20.0, "°C").render(1), "20.0°C");
        assert_eq!(Value::Percent(12.5).render(1), "12.5%");

        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(Value::Date(date.and_hms_opt(0, 0, 0).unwrap()).render(2), "2024-03-01");
        assert_eq!(
            Value::Date(date.and_hms_opt(9, 5, 0).unwrap()).render(2),
            "2024-03-01 09:05"
        );
    }

    #[test]
    fn test_outcome_convention() {
        let silent = Outcome::Silent;
        assert!(silent.is_error());
        assert!(silent.message().is_empty());
        assert_eq!(silent.render(2), None);

        let failure = Outcome::Failure(EvalError::DivisionByZero.into());
        assert!(failure.is_error());
        assert!(!failure.message().is_empty());
        assert_eq!(failure.render(2).as_deref(), Some("Error: division by zero"));

        assert!(!Outcome::Success(Value::Number(1.0)).is_error());
    }

    #[test]
    fn test_serializes_with_type_tag() {
        let json = serde_json::to_value(Value::currency(1.5, "USD")).unwrap();
        assert_eq!(json["type"], "currency");
        assert_eq!(json["value"]["code"], "USD");
    }
}
