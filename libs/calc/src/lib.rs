//! Notepad calculator core
//!
//! Each submitted line flows through a fixed pipeline:
//!
//! ```text
//! Input line
//!      |
//!   Lexer -> tokens
//!      |
//!   Parser -> AST (phrases desugared, `prev` references resolved later)
//!      |
//!   Evaluator -> Value (reads/writes Environment, Unit Engine, currencies)
//!      |
//!   Engine -> Outcome, stored in the line history
//! ```
//!
//! ```rust
//! use tally_calc::{Engine, Settings};
//!
//! let mut engine = Engine::new(Settings::default());
//! engine.evaluate_line("rent = $1200");
//! let outcome = engine.evaluate_line("rent * 12");
//! assert_eq!(outcome.render(2).as_deref(), Some("$14400.00"));
//! ```

#![forbid(unsafe_code)]

pub mod ast;
pub mod currency;
pub mod depgraph;
pub mod engine;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod history;
pub mod lexer;
pub mod parser;
pub mod settings;
pub mod temporal;
pub mod token;
pub mod value;

// Re-export main types
pub use currency::{CurrencyService, StaticRates};
pub use depgraph::DependencyGraph;
pub use engine::Engine;
pub use environment::Environment;
pub use error::{Error, EvalError, ParseError, Result};
pub use history::{Line, LineHistory};
pub use settings::Settings;
pub use temporal::{Clock, FixedClock, SystemClock};
pub use value::{Outcome, Value};
