//! Session engine
//!
//! Owns the environment, line history and dependency graph, and drives
//! lex → parse → evaluate for each submitted line.

use crate::ast::Expression;
use crate::currency::{CurrencyService, StaticRates};
use crate::depgraph::DependencyGraph;
use crate::environment::Environment;
use crate::error::EvalError;
use crate::evaluator::Evaluator;
use crate::functions::{self, Builtin};
use crate::history::{Line, LineHistory};
use crate::lexer::tokenize;
use crate::parser;
use crate::settings::{parse_flag, Settings};
use crate::temporal::{Clock, SystemClock};
use crate::value::Outcome;
use std::collections::HashMap;

/// Interactive calculator session.
///
/// Lines are evaluated one at a time in submission order. Every line that
/// parses (other than commands and comments) is stored in the history,
/// including lines whose evaluation failed.
#[derive(Debug)]
pub struct Engine {
    settings: Settings,
    env: Environment,
    history: LineHistory,
    graph: DependencyGraph,
    /// Line that last assigned each variable
    assigned_in: HashMap<String, u64>,
    currency: Box<dyn CurrencyService>,
    clock: Box<dyn Clock>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl Engine {
    /// Create an engine with the system clock and the static rate table
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            env: Environment::new(),
            history: LineHistory::new(),
            graph: DependencyGraph::new(),
            assigned_in: HashMap::new(),
            currency: Box::new(StaticRates::new()),
            clock: Box::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_currency(mut self, currency: impl CurrencyService + 'static) -> Self {
        self.currency = Box::new(currency);
        self
    }

    /// Evaluate one input line.
    ///
    /// Returns [`Outcome::Silent`] for comments, blank lines, commands and
    /// (in quiet mode) assignments.
    pub fn evaluate_line(&mut self, input: &str) -> Outcome {
        let tokens = tokenize(input);
        let expression = match parser::parse(&tokens, self.settings.fuzzy) {
            Ok(expression) => expression,
            Err(err) => {
                tracing::debug!(error = %err, "line did not parse");
                return Outcome::Failure(err.into());
            }
        };

        match &expression {
            Expression::NoOp => return Outcome::Silent,
            Expression::Command { name, arguments } => return self.run_command(name, arguments),
            _ => {}
        }

        let id = self.history.next_id();
        let mut evaluator = Evaluator::new(
            &mut self.env,
            &self.history,
            self.currency.as_ref(),
            self.clock.as_ref(),
            id,
        )
        .with_precision(self.settings.precision);
        let result = evaluator.evaluate(&expression);

        let mut dependencies = evaluator.lines_read().to_vec();
        dependencies.extend(
            evaluator
                .variables_read()
                .iter()
                .filter_map(|name| self.assigned_in.get(name).copied()),
        );
        dependencies.sort_unstable();
        dependencies.dedup();

        let outcome = match &result {
            Ok(_) if self.settings.quiet && is_quiet_assignment(&expression) => Outcome::Silent,
            Ok(value) => Outcome::Success(value.clone()),
            Err(err) => Outcome::Failure(err.clone().into()),
        };
        if let (Ok(_), Expression::Assignment { name, .. }) = (&result, &expression) {
            self.assigned_in.insert(name.clone(), id);
        }

        tracing::debug!(
            line = id,
            outcome = outcome_kind(&outcome),
            dependencies = ?dependencies,
            "evaluated line"
        );
        self.graph.add_node(id, input.trim(), dependencies);
        self.history
            .push(input.to_string(), expression, outcome.clone(), result.ok());
        outcome
    }

    fn run_command(&mut self, name: &str, arguments: &[String]) -> Outcome {
        let result = match name {
            "clear" => {
                self.clear();
                Ok(())
            }
            "quiet" => match arguments {
                [] => {
                    self.settings.quiet = !self.settings.quiet;
                    Ok(())
                }
                [flag] => Self::flag(flag, ":quiet [on|off]").map(|on| self.settings.quiet = on),
                _ => Err(usage(":quiet [on|off]")),
            },
            "set" => self.set_option(arguments),
            "unit" => self.define_unit(arguments),
            _ => Err(EvalError::InvalidOperation(format!(
                "unknown command ':{name}'"
            ))),
        };

        match result {
            Ok(()) => {
                tracing::debug!(command = name, "command applied");
                Outcome::Silent
            }
            Err(err) => {
                tracing::warn!(command = name, error = %err, "command rejected");
                Outcome::Failure(err.into())
            }
        }
    }

    /// `:set precision N`, `:set fuzzy on|off`, `:set quiet on|off`
    fn set_option(&mut self, arguments: &[String]) -> Result<(), EvalError> {
        const USAGE: &str = ":set precision <0-12> | fuzzy on|off | quiet on|off";
        let [key, value] = arguments else {
            return Err(usage(USAGE));
        };

        match key.to_ascii_lowercase().as_str() {
            "precision" => {
                let precision = value
                    .parse::<usize>()
                    .ok()
                    .filter(|p| *p <= Settings::MAX_PRECISION)
                    .ok_or_else(|| usage(USAGE))?;
                self.settings.precision = precision;
            }
            "fuzzy" => self.settings.fuzzy = Self::flag(value, USAGE)?,
            "quiet" => self.settings.quiet = Self::flag(value, USAGE)?,
            _ => return Err(usage(USAGE)),
        }
        Ok(())
    }

    /// `:unit <name> <scale> <base>`
    fn define_unit(&mut self, arguments: &[String]) -> Result<(), EvalError> {
        const USAGE: &str = ":unit <name> <scale> <base unit>";
        let [name, scale, base] = arguments else {
            return Err(usage(USAGE));
        };
        let scale = scale.parse::<f64>().map_err(|_| usage(USAGE))?;
        self.env
            .units_mut()
            .add_custom_unit(name, scale, base)
            .map_err(EvalError::from)
    }

    fn flag(value: &str, usage_text: &str) -> Result<bool, EvalError> {
        parse_flag(value).ok_or_else(|| usage(usage_text))
    }

    /// Forget every variable, custom unit and line; IDs restart at 1.
    pub fn clear(&mut self) {
        self.env.clear();
        self.history.clear();
        self.graph.clear();
        self.assigned_in.clear();
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Stored lines in ID order.
    pub fn lines(&self) -> &[Line] {
        self.history.lines()
    }

    pub fn line(&self, id: u64) -> Option<&Line> {
        self.history.get(id)
    }

    pub fn history(&self) -> &LineHistory {
        &self.history
    }

    pub fn dependency_graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Lines that read line `id` directly.
    pub fn dependents(&self, id: u64) -> Vec<u64> {
        self.graph.get_dependents(id)
    }

    /// Line IDs ordered so that every line follows the lines it read.
    pub fn evaluation_order(&self) -> Result<Vec<u64>, EvalError> {
        self.graph.topological_sort()
    }
}

/// Assignments quiet mode hides; `x = print(...)` is always shown.
fn is_quiet_assignment(expression: &Expression) -> bool {
    let Expression::Assignment { expression, .. } = expression else {
        return false;
    };
    !matches!(
        expression.as_ref(),
        Expression::FunctionCall { name, .. }
            if functions::lookup(name).is_ok_and(|f| f.builtin == Builtin::Print)
    )
}

fn usage(text: &str) -> EvalError {
    EvalError::InvalidArguments(format!("usage: {text}"))
}

fn outcome_kind(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Success(value) => value.kind(),
        Outcome::Silent => "silent",
        Outcome::Failure(err) if err.is_parse() => "parse error",
        Outcome::Failure(_) => "error",
    }
}
