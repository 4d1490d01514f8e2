//! Tree-walking evaluator
//!
//! Binary operations dispatch on the pair of operand types. Units go through
//! the environment's [`UnitEngine`](tally_units::UnitEngine), currencies
//! through the [`CurrencyService`], keyword dates through the [`Clock`].

use crate::ast::{BinaryOperator, Expression, PreviousReference, UnaryOperator};
use crate::currency::CurrencyService;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::functions::{self, Builtin};
use crate::history::LineHistory;
use crate::temporal::{self, Clock};
use crate::value::Value;
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;

type Result<T> = std::result::Result<T, EvalError>;

const MAX_RECURSION_DEPTH: usize = 200;
const SECONDS_PER_DAY: f64 = 86_400.0;
const SECONDS_PER_HOUR: f64 = 3_600.0;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder regex must compile")
});

/// Evaluates the expression of one line.
///
/// Records which earlier lines and which variables it read so the caller
/// can maintain the line dependency graph.
pub struct Evaluator<'a> {
    env: &'a mut Environment,
    history: &'a LineHistory,
    currency: &'a dyn CurrencyService,
    clock: &'a dyn Clock,
    /// ID the line being evaluated will receive
    current_line: u64,
    precision: usize,
    lines_read: Vec<u64>,
    variables_read: Vec<String>,
    recursion_depth: usize,
}

impl<'a> Evaluator<'a> {
    pub fn new(
        env: &'a mut Environment,
        history: &'a LineHistory,
        currency: &'a dyn CurrencyService,
        clock: &'a dyn Clock,
        current_line: u64,
    ) -> Self {
        Self {
            env,
            history,
            currency,
            clock,
            current_line,
            precision: 2,
            lines_read: Vec::new(),
            variables_read: Vec::new(),
            recursion_depth: 0,
        }
    }

    /// Precision used when `print` formats values.
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Earlier lines read through `prev` references.
    pub fn lines_read(&self) -> &[u64] {
        &self.lines_read
    }

    /// Variables read, in reading order.
    pub fn variables_read(&self) -> &[String] {
        &self.variables_read
    }

    pub fn evaluate(&mut self, expr: &Expression) -> Result<Value> {
        self.recursion_depth += 1;
        if self.recursion_depth > MAX_RECURSION_DEPTH {
            return Err(EvalError::InvalidOperation(
                "expression too deeply nested".to_string(),
            ));
        }
        let result = self.evaluate_node(expr);
        self.recursion_depth -= 1;
        result
    }

    fn evaluate_node(&mut self, expr: &Expression) -> Result<Value> {
        match expr {
            Expression::NumberLiteral(n) => Ok(Value::Number(*n)),
            Expression::UnitLiteral { value, unit } => self.unit_literal(*value, unit),
            Expression::CurrencyLiteral { value, code } => {
                let code = self
                    .currency
                    .code_for(code)
                    .ok_or_else(|| EvalError::UnknownCurrency(code.clone()))?;
                Ok(Value::currency(*value, code))
            }
            Expression::DateLiteral(spec) => Ok(Value::Date(temporal::resolve(*spec, self.clock))),
            Expression::TimeLiteral(time) => {
                Ok(Value::Date(self.clock.now().date().and_time(*time)))
            }
            Expression::TextLiteral(text) => Ok(Value::Text(text.clone())),
            Expression::Identifier(name) => self.variable(name),
            Expression::Assignment { name, expression } => {
                let value = self.evaluate(expression)?;
                self.env.set(name.clone(), value.clone());
                Ok(value)
            }
            Expression::Binary { .. } => self.binary_chain(expr),
            Expression::Unary {
                operator,
                expression,
            } => {
                let value = self.evaluate(expression)?;
                Self::unary(*operator, &value)
            }
            Expression::FunctionCall { name, arguments } => self.call(name, arguments),
            Expression::Conversion { expression, target } => {
                let value = self.evaluate(expression)?;
                self.convert(&value, target)
            }
            Expression::PreviousReference(reference) => self.previous(*reference),
            Expression::Command { name, .. } => Err(EvalError::InvalidOperation(format!(
                "':{name}' is a command, not an expression"
            ))),
            Expression::NoOp => Err(EvalError::InvalidOperation(
                "nothing to evaluate".to_string(),
            )),
        }
    }

    /// Evaluate `a + b - c ...` along its left spine without recursing, so
    /// that only parenthesised and unary nesting counts towards the depth
    /// limit.
    fn binary_chain(&mut self, expr: &Expression) -> Result<Value> {
        let mut spine = Vec::new();
        let mut node = expr;
        while let Expression::Binary {
            operator,
            left,
            right,
        } = node
        {
            spine.push((*operator, right.as_ref()));
            node = left.as_ref();
        }

        let mut accumulated = self.evaluate(node)?;
        for (operator, right) in spine.into_iter().rev() {
            let right = self.evaluate(right)?;
            accumulated = self.binary(operator, &accumulated, &right)?;
        }
        Ok(accumulated)
    }

    fn variable(&mut self, name: &str) -> Result<Value> {
        let value = self
            .env
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable(name.to_string()))?;
        self.variables_read.push(name.to_string());
        Ok(value)
    }

    /// `5 km`: a unit, then a currency code, then a variable (`3 x` = 3 * x).
    fn unit_literal(&mut self, value: f64, name: &str) -> Result<Value> {
        let units = self.env.units();
        if units.is_unit(name) {
            return Ok(Value::unit(value, units.canonical_name(name)?));
        }
        if let Some(code) = self.currency.code_for(name) {
            return Ok(Value::currency(value, code));
        }
        if self.env.contains(name) {
            let bound = self.variable(name)?;
            return self.binary(BinaryOperator::Multiply, &Value::Number(value), &bound);
        }
        Err(EvalError::UnknownUnit(name.to_string()))
    }

    fn previous(&mut self, reference: PreviousReference) -> Result<Value> {
        let current = self.current_line;
        let id = match reference {
            PreviousReference::Latest => self
                .history
                .last()
                .map(|line| line.id)
                .ok_or_else(|| {
                    EvalError::PreviousReferenceOutOfRange("no previous result".to_string())
                })?,
            PreviousReference::RelativeBack(back) => back
                .checked_add(1)
                .and_then(|distance| current.checked_sub(distance))
                .filter(|id| *id >= 1)
                .ok_or_else(|| {
                    EvalError::PreviousReferenceOutOfRange(format!(
                        "prev~{back} reaches before the first line"
                    ))
                })?,
            PreviousReference::AbsoluteLine(id) => {
                if id >= current {
                    return Err(EvalError::PreviousReferenceOutOfRange(format!(
                        "line {id} does not exist yet"
                    )));
                }
                id
            }
        };

        let line = self.history.get(id).ok_or_else(|| {
            EvalError::PreviousReferenceOutOfRange(format!("line {id} does not exist"))
        })?;
        self.lines_read.push(id);
        line.value
            .clone()
            .ok_or_else(|| EvalError::InvalidOperation(format!("line {id} has no result")))
    }

    fn unary(operator: UnaryOperator, value: &Value) -> Result<Value> {
        match (operator, value.amount()) {
            (UnaryOperator::Negate, Some(amount)) => value
                .with_amount(-amount)
                .ok_or_else(|| Self::cannot_negate(value)),
            (UnaryOperator::Plus, Some(_)) => Ok(value.clone()),
            (UnaryOperator::Percent, _) => match value {
                Value::Number(n) => Ok(Value::Percent(*n)),
                other => Err(EvalError::InvalidOperation(format!(
                    "cannot take a {} as a percentage",
                    other.kind()
                ))),
            },
            (_, None) => Err(Self::cannot_negate(value)),
        }
    }

    fn cannot_negate(value: &Value) -> EvalError {
        EvalError::InvalidOperation(format!("cannot apply a sign to a {}", value.kind()))
    }

    /// Type-directed binary arithmetic, checked left to right.
    pub fn binary(&self, operator: BinaryOperator, left: &Value, right: &Value) -> Result<Value> {
        use BinaryOperator::*;
        use Value::*;

        match (left, right) {
            (Number(a), Number(b)) => Self::arithmetic(operator, *a, *b).map(Number),

            (Text(_), _) | (_, Text(_)) => Err(Self::mismatch(operator, left, right)),

            // Percentages
            (Percent(a), Percent(b)) => match operator {
                Add => Ok(Percent(a + b)),
                Subtract => Ok(Percent(a - b)),
                _ => Err(Self::mismatch(operator, left, right)),
            },
            (Percent(p), whole @ (Number(_) | Unit { .. } | Currency { .. }))
                if operator == Remainder =>
            {
                Self::rescale(whole, |x| x * p / 100.0)
            }
            (Percent(p), Number(n)) => match operator {
                Multiply => Ok(Percent(p * n)),
                Divide if *n == 0.0 => Err(EvalError::DivisionByZero),
                Divide => Ok(Percent(p / n)),
                _ => Err(Self::mismatch(operator, left, right)),
            },
            (base @ (Number(_) | Unit { .. } | Currency { .. }), Percent(p)) => match operator {
                Add => Self::rescale(base, |x| x + x * p / 100.0),
                Subtract => Self::rescale(base, |x| x - x * p / 100.0),
                Multiply => Self::rescale(base, |x| x * p / 100.0),
                Divide if *p == 0.0 => Err(EvalError::DivisionByZero),
                Divide => Self::rescale(base, |x| x * 100.0 / p),
                Remainder => Err(Self::mismatch(operator, left, right)),
            },

            // Units
            (Number(a), Unit { amount, unit }) => match operator {
                Multiply => Ok(Value::unit(a * amount, unit.clone())),
                Divide if *amount == 0.0 => Err(EvalError::DivisionByZero),
                Divide => Ok(Value::unit(a / amount, unit.clone())),
                Add | Subtract => Err(EvalError::InvalidOperation(format!(
                    "cannot {} a plain number and '{unit}'",
                    Self::verb(operator)
                ))),
                Remainder => Err(Self::mismatch(operator, left, right)),
            },
            (Unit { amount, unit }, Number(b)) => match operator {
                Multiply => Ok(Value::unit(amount * b, unit.clone())),
                Divide if *b == 0.0 => Err(EvalError::DivisionByZero),
                Divide => Ok(Value::unit(amount / b, unit.clone())),
                Add | Subtract => Err(EvalError::InvalidOperation(format!(
                    "cannot {} '{unit}' and a plain number",
                    Self::verb(operator)
                ))),
                Remainder => Err(Self::mismatch(operator, left, right)),
            },
            (
                Unit { amount: a, unit: u },
                Unit { amount: b, unit: v },
            ) => self.unit_binary(operator, *a, u, *b, v),

            // Currencies
            (
                Currency { amount: a, code: c },
                Currency { amount: b, code: d },
            ) => {
                let b = self.currency.convert(*b, d, c)?;
                match operator {
                    Add => Ok(Value::currency(a + b, c.clone())),
                    Subtract => Ok(Value::currency(a - b, c.clone())),
                    Divide if b == 0.0 => Err(EvalError::DivisionByZero),
                    Divide => Ok(Number(a / b)),
                    _ => Err(Self::mismatch(operator, left, right)),
                }
            }
            (Currency { amount, code }, Number(b)) => match operator {
                Multiply => Ok(Value::currency(amount * b, code.clone())),
                Divide if *b == 0.0 => Err(EvalError::DivisionByZero),
                Divide => Ok(Value::currency(amount / b, code.clone())),
                _ => Err(Self::mismatch(operator, left, right)),
            },
            (Number(a), Currency { amount, code }) if operator == Multiply => {
                Ok(Value::currency(a * amount, code.clone()))
            }

            // Dates
            (Date(at), Unit { amount, unit }) if matches!(operator, Add | Subtract) => {
                self.shift_date(operator, *at, *amount, unit)
            }
            (Unit { amount, unit }, Date(at)) if operator == Add => {
                self.shift_date(operator, *at, *amount, unit)
            }
            (Date(later), Date(earlier)) if operator == Subtract => {
                let seconds = temporal::seconds_between(*later, *earlier);
                if seconds % SECONDS_PER_DAY == 0.0 {
                    Ok(Value::unit(seconds / SECONDS_PER_DAY, "day"))
                } else {
                    Ok(Value::unit(seconds / SECONDS_PER_HOUR, "h"))
                }
            }

            _ => Err(Self::mismatch(operator, left, right)),
        }
    }

    fn arithmetic(operator: BinaryOperator, a: f64, b: f64) -> Result<f64> {
        match operator {
            BinaryOperator::Add => Ok(a + b),
            BinaryOperator::Subtract => Ok(a - b),
            BinaryOperator::Multiply => Ok(a * b),
            BinaryOperator::Divide | BinaryOperator::Remainder if b == 0.0 => {
                Err(EvalError::DivisionByZero)
            }
            BinaryOperator::Divide => Ok(a / b),
            BinaryOperator::Remainder => Ok(a % b),
        }
    }

    fn rescale(value: &Value, f: impl Fn(f64) -> f64) -> Result<Value> {
        value
            .amount()
            .and_then(|amount| value.with_amount(f(amount)))
            .ok_or_else(|| {
                EvalError::InvalidOperation(format!("cannot scale a {}", value.kind()))
            })
    }

    fn unit_binary(
        &self,
        operator: BinaryOperator,
        a: f64,
        u: &str,
        b: f64,
        v: &str,
    ) -> Result<Value> {
        let units = self.env.units();
        match operator {
            BinaryOperator::Add | BinaryOperator::Subtract => {
                let b = units.convert(b, v, u)?;
                let amount = if operator == BinaryOperator::Add {
                    a + b
                } else {
                    a - b
                };
                Ok(Value::unit(amount, u))
            }
            BinaryOperator::Divide => match units.convert(b, v, u) {
                Ok(b) if b == 0.0 => Err(EvalError::DivisionByZero),
                Ok(b) => Ok(Value::Number(a / b)),
                // 100 km / 2 h -> 50 km/h
                Err(err) => {
                    if b == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    let ratio = format!("{u}/{v}");
                    match units.canonical_name(&ratio) {
                        Ok(name) => Ok(Value::unit(a / b, name)),
                        Err(_) => Err(err.into()),
                    }
                }
            },
            // 60 km/h * 2 h -> 120 km; named rates land in base units
            // (50 kph * 2 h -> 100000 m)
            BinaryOperator::Multiply => {
                for (rate, r, quantity, q) in [(a, u, b, v), (b, v, a, u)] {
                    let Ok((numerator, denominator)) = units.rate_units(r) else {
                        continue;
                    };
                    let Ok(quantity) = units.convert(quantity, q, &denominator) else {
                        continue;
                    };
                    let ratio = format!("{numerator}/{denominator}");
                    let rate = if ratio == r {
                        rate
                    } else {
                        units.convert(rate, r, &ratio)?
                    };
                    return Ok(Value::unit(rate * quantity, numerator));
                }
                Err(EvalError::InvalidOperation(format!(
                    "cannot multiply '{u}' by '{v}'"
                )))
            }
            BinaryOperator::Remainder => Err(EvalError::InvalidOperation(format!(
                "cannot take the remainder of '{u}' and '{v}'"
            ))),
        }
    }

    fn shift_date(
        &self,
        operator: BinaryOperator,
        at: NaiveDateTime,
        amount: f64,
        unit: &str,
    ) -> Result<Value> {
        let seconds = self
            .env
            .units()
            .convert(amount, unit, "s")
            .map_err(|_| EvalError::IncompatibleUnits(format!("'{unit}' is not a duration")))?;
        let seconds = if operator == BinaryOperator::Subtract {
            -seconds
        } else {
            seconds
        };
        Ok(Value::Date(temporal::shift(at, seconds)?))
    }

    fn verb(operator: BinaryOperator) -> &'static str {
        match operator {
            BinaryOperator::Add => "add",
            BinaryOperator::Subtract => "subtract",
            BinaryOperator::Multiply => "multiply",
            BinaryOperator::Divide => "divide",
            BinaryOperator::Remainder => "take the remainder of",
        }
    }

    fn mismatch(operator: BinaryOperator, left: &Value, right: &Value) -> EvalError {
        EvalError::InvalidOperation(format!(
            "cannot {} {} and {}",
            Self::verb(operator),
            left.kind(),
            right.kind()
        ))
    }

    /// `value in target`
    fn convert(&self, value: &Value, target: &str) -> Result<Value> {
        match value {
            Value::Unit { amount, unit } => {
                let units = self.env.units();
                let converted = units.convert(*amount, unit, target)?;
                Ok(Value::unit(converted, units.canonical_name(target)?))
            }
            Value::Currency { amount, code } => {
                let to = self
                    .currency
                    .code_for(target)
                    .ok_or_else(|| EvalError::UnknownCurrency(target.to_string()))?;
                let converted = self.currency.convert(*amount, code, &to)?;
                Ok(Value::currency(converted, to))
            }
            other => Err(EvalError::InvalidOperation(format!(
                "a {} has no unit to convert to '{target}'",
                other.kind()
            ))),
        }
    }

    fn call(&mut self, name: &str, arguments: &[Expression]) -> Result<Value> {
        let metadata = functions::lookup(name)?;
        functions::validate_args(metadata, arguments.len())?;

        if metadata.builtin == Builtin::Print {
            return self.print(&arguments[0]);
        }

        let values = arguments
            .iter()
            .map(|arg| self.evaluate(arg))
            .collect::<Result<Vec<_>>>()?;

        match metadata.builtin {
            Builtin::Sum => self.sum(values),
            Builtin::Average => {
                let count = values.len() as f64;
                let total = self.sum(values)?;
                self.binary(BinaryOperator::Divide, &total, &Value::Number(count))
            }
            Builtin::Min => self.extreme(metadata.name, values, false),
            Builtin::Max => self.extreme(metadata.name, values, true),
            Builtin::Sqrt => map_amount(metadata.name, &values[0], |x| {
                if x < 0.0 {
                    Err(EvalError::InvalidArguments(
                        "sqrt() of a negative value".to_string(),
                    ))
                } else {
                    Ok(x.sqrt())
                }
            }),
            Builtin::Abs => map_amount(metadata.name, &values[0], |x| Ok(x.abs())),
            Builtin::Floor => map_amount(metadata.name, &values[0], |x| Ok(x.floor())),
            Builtin::Ceil => map_amount(metadata.name, &values[0], |x| Ok(x.ceil())),
            Builtin::Round => {
                let digits = match values.get(1) {
                    None => 0,
                    Some(Value::Number(d)) if d.fract() == 0.0 && d.abs() <= 15.0 => *d as i32,
                    Some(_) => {
                        return Err(EvalError::InvalidArguments(
                            "round() digits must be a whole number".to_string(),
                        ))
                    }
                };
                map_amount(metadata.name, &values[0], |x| Ok(functions::round_to(x, digits)))
            }
            // Handled above, before its argument is evaluated
            Builtin::Print => Err(EvalError::InvalidOperation(
                "print() expects a template".to_string(),
            )),
        }
    }

    fn sum(&self, values: Vec<Value>) -> Result<Value> {
        let mut values = values.into_iter();
        let first = values
            .next()
            .ok_or_else(|| EvalError::InvalidArguments("nothing to sum".to_string()))?;
        values.try_fold(first, |total, value| {
            self.binary(BinaryOperator::Add, &total, &value)
        })
    }

    fn extreme(&self, name: &str, values: Vec<Value>, largest: bool) -> Result<Value> {
        let mut values = values.into_iter();
        let mut best = values
            .next()
            .ok_or_else(|| EvalError::InvalidArguments(format!("{name}() needs a value")))?;

        for value in values {
            if value.kind() != best.kind() {
                return Err(EvalError::InvalidArguments(format!(
                    "{name}() cannot compare a {} with a {}",
                    best.kind(),
                    value.kind()
                )));
            }
            let difference = self
                .binary(BinaryOperator::Subtract, &value, &best)?
                .amount()
                .ok_or_else(|| {
                    EvalError::InvalidArguments(format!("{name}() cannot compare these values"))
                })?;
            if (largest && difference > 0.0) || (!largest && difference < 0.0) {
                best = value;
            }
        }
        Ok(best)
    }

    /// `print("total: {x}")`; placeholders are replaced by formatted bindings
    fn print(&mut self, argument: &Expression) -> Result<Value> {
        let template = match self.evaluate(argument)? {
            Value::Text(text) => text,
            other => return Ok(Value::Text(other.render(self.precision))),
        };

        let mut rendered = String::with_capacity(template.len());
        let mut last = 0;
        for captures in PLACEHOLDER.captures_iter(&template) {
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            let value = self.variable(name.as_str())?;
            rendered.push_str(&template[last..whole.start()]);
            rendered.push_str(&value.render(self.precision));
            last = whole.end();
        }
        rendered.push_str(&template[last..]);
        Ok(Value::Text(rendered))
    }
}

/// Apply `f` to the scalar part, keeping the value's tag.
fn map_amount(
    name: &str,
    value: &Value,
    f: impl Fn(f64) -> Result<f64>,
) -> Result<Value> {
    let amount = match value {
        Value::Date(_) | Value::Text(_) => None,
        other => other.amount(),
    }
    .ok_or_else(|| {
        EvalError::InvalidArguments(format!("{name}() expects a number, got a {}", value.kind()))
    })?;
    value
        .with_amount(f(amount)?)
        .ok_or_else(|| EvalError::InvalidArguments(format!("{name}() expects a number")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::currency::StaticRates;
    use crate::parser::parse_line;
    use crate::temporal::FixedClock;
    use chrono::NaiveDate;

    fn clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        )
    }

    fn eval_in(env: &mut Environment, input: &str) -> Result<Value> {
        let history = LineHistory::new();
        let rates = StaticRates::new();
        let clock = clock();
        let expr = parse_line(input, true).unwrap();
        Evaluator::new(env, &history, &rates, &clock, 1).evaluate(&expr)
    }

    fn eval(input: &str) -> Result<Value> {
        eval_in(&mut Environment::new(), input)
    }

    fn amount(input: &str) -> f64 {
        eval(input).unwrap().amount().unwrap()
    }

    #[test]
    fn test_number_arithmetic() {
        assert_eq!(eval("1 + 2 * 3").unwrap(), Value::Number(7.0));
        assert_eq!(eval("7 % 3").unwrap(), Value::Number(1.0));
        assert_eq!(eval("1 / 0"), Err(EvalError::DivisionByZero));
        assert_eq!(eval("-(2 - 5)").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_long_flat_chains_are_not_nesting() {
        let sum = vec!["1"; 250].join(" + ");
        assert_eq!(eval(&sum).unwrap(), Value::Number(250.0));
        let product = vec!["1"; 300].join(" * ");
        assert_eq!(eval(&product).unwrap(), Value::Number(1.0));
        let mixed = format!("{} - 1 km", vec!["1 km"; 220].join(" + "));
        assert_eq!(eval(&mixed).unwrap(), Value::unit(219.0, "km"));
    }

    #[test]
    fn test_unit_arithmetic_converts_right_operand() {
        assert_eq!(eval("1 km + 500 m").unwrap(), Value::unit(1.5, "km"));
        assert_eq!(eval("2 * 3 kg").unwrap(), Value::unit(6.0, "kg"));
        assert_eq!(eval("10 km / 2 km").unwrap(), Value::Number(5.0));
        assert!(matches!(
            eval("1 kg + 1 m"),
            Err(EvalError::IncompatibleUnits(_))
        ));
        assert!(matches!(
            eval("5 + 1 km"),
            Err(EvalError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_rates_and_durations() {
        assert_eq!(eval("100 km / 2 h").unwrap(), Value::unit(50.0, "km/h"));
        assert_eq!(eval("60 km/h * 30 min").unwrap(), Value::unit(30.0, "km"));
        assert_eq!(eval("2 h * 60 km/h").unwrap(), Value::unit(120.0, "km"));
        let named = eval("36 kph * 10 s").unwrap();
        assert_eq!(named.kind(), "unit");
        assert!((named.amount().unwrap() - 100.0).abs() < 1e-9);
        assert!((amount("50 kph * 2 h in km") - 100.0).abs() < 1e-9);
        assert!(matches!(eval("50 kph * 2 kg"), Err(EvalError::InvalidOperation(_))));
    }

    #[test]
    fn test_conversion() {
        assert!((amount("5 km in mi") - 3.106_856).abs() < 1e-5);
        assert_eq!(eval("0 °C in °F").unwrap(), Value::unit(32.0, "°F"));
        assert!(matches!(eval("5 in km"), Err(EvalError::InvalidOperation(_))));
        assert!(matches!(eval("5 km in kg"), Err(EvalError::IncompatibleUnits(_))));
    }

    #[test]
    fn test_percentages() {
        assert_eq!(eval("20%").unwrap(), Value::Percent(20.0));
        assert_eq!(amount("20% of 50"), 10.0);
        assert_eq!(amount("100 + 10%"), 110.0);
        assert_eq!(amount("100 - 10%"), 90.0);
        assert_eq!(eval("$200 * 10%").unwrap(), Value::currency(20.0, "USD"));
        assert_eq!(amount("5 + 10%"), 5.5);
        assert_eq!(amount("200 / 50%"), 400.0);
        assert!((amount("increase 100 by 10%") - 110.0).abs() < 1e-9);
        assert!((amount("decrease 100 by 10%") - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_phrases() {
        assert_eq!(eval("half of 10").unwrap(), Value::Number(5.0));
        assert_eq!(eval("double 4 km").unwrap(), Value::unit(8.0, "km"));
        assert_eq!(eval("three quarters of 100").unwrap(), Value::Number(75.0));
        assert_eq!(eval("what is 2 + 2").unwrap(), Value::Number(4.0));
        assert_eq!(eval("sum of 1, 2, 3").unwrap(), Value::Number(6.0));
        assert_eq!(eval("average of 2, 4").unwrap(), Value::Number(3.0));
    }

    #[test]
    fn test_currency() {
        assert_eq!(eval("$100 * 1.5").unwrap(), Value::currency(150.0, "USD"));
        assert_eq!(eval("10 usd + $5").unwrap(), Value::currency(15.0, "USD"));
        assert!(matches!(eval("$5 + 5"), Err(EvalError::InvalidOperation(_))));
        assert!(matches!(eval("5 xyz"), Err(EvalError::UnknownUnit(_))));
    }

    #[test]
    fn test_dates() {
        let date = |d: u32, h: u32| {
            Value::Date(
                NaiveDate::from_ymd_opt(2024, 3, d)
                    .unwrap()
                    .and_hms_opt(h, 0, 0)
                    .unwrap(),
            )
        };
        assert_eq!(eval("today + 2 days").unwrap(), date(3, 0));
        assert_eq!(eval("now - 2 h").unwrap(), date(1, 10));
        assert_eq!(eval("1 day ago").unwrap(), Value::Date(
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(12, 0, 0).unwrap()
        ));
        assert_eq!(eval("2024-03-10 - 2024-03-01").unwrap(), Value::unit(9.0, "day"));
        assert!(matches!(eval("today + 1 kg"), Err(EvalError::IncompatibleUnits(_))));
        assert!(eval("today + today").is_err());
    }

    #[test]
    fn test_variables_and_implicit_multiplication() {
        let mut env = Environment::new();
        assert_eq!(eval_in(&mut env, "x = 4").unwrap(), Value::Number(4.0));
        assert_eq!(eval_in(&mut env, "3 x").unwrap(), Value::Number(12.0));
        assert_eq!(
            eval_in(&mut env, "y + 1"),
            Err(EvalError::UndefinedVariable("y".into()))
        );
        // A failed assignment leaves no binding
        assert!(eval_in(&mut env, "z = 1 / 0").is_err());
        assert!(!env.contains("z"));
    }

    #[test]
    fn test_functions() {
        assert_eq!(eval("max(1 km, 800 m, 2 km)").unwrap(), Value::unit(2.0, "km"));
        assert_eq!(eval("min(3, 1, 2)").unwrap(), Value::Number(1.0));
        assert_eq!(eval("round(3.14159, 2)").unwrap(), Value::Number(3.14));
        assert_eq!(eval("sqrt(16)").unwrap(), Value::Number(4.0));
        assert!(matches!(eval("min(1, 1 km)"), Err(EvalError::InvalidArguments(_))));
        assert!(matches!(eval("cos(1)"), Err(EvalError::UnknownFunction(_))));
    }

    #[test]
    fn test_print_substitutes_bindings() {
        let mut env = Environment::new();
        eval_in(&mut env, "rent = $1200").unwrap();
        assert_eq!(
            eval_in(&mut env, r#"print("rent is {rent}")"#).unwrap(),
            Value::Text("rent is $1200.00".into())
        );
        assert_eq!(
            eval_in(&mut env, r#"print("{missing}")"#),
            Err(EvalError::UndefinedVariable("missing".into()))
        );
    }
}
