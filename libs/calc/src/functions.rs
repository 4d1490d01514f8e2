//! Built-in function registry
//!
//! Maps function names to a [`Builtin`] and its arity. Uses a compile-time
//! perfect hash map, so lookups never allocate.

use crate::error::EvalError;
use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Sum,
    Average,
    Min,
    Max,
    Print,
    Sqrt,
    Abs,
    Round,
    Floor,
    Ceil,
}

/// Function metadata
#[derive(Debug, Clone, Copy)]
pub struct FunctionMetadata {
    pub builtin: Builtin,
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: Option<usize>, // None = unbounded
}

static FUNCTIONS_BY_NAME: phf::Map<&'static str, FunctionMetadata> = phf_map! {
    // Aggregates
    "sum" => FunctionMetadata { builtin: Builtin::Sum, name: "sum", min_args: 1, max_args: None },
    "total" => FunctionMetadata { builtin: Builtin::Sum, name: "total", min_args: 1, max_args: None },
    "average" => FunctionMetadata { builtin: Builtin::Average, name: "average", min_args: 1, max_args: None },
    "mean" => FunctionMetadata { builtin: Builtin::Average, name: "mean", min_args: 1, max_args: None },
    "min" => FunctionMetadata { builtin: Builtin::Min, name: "min", min_args: 1, max_args: None },
    "max" => FunctionMetadata { builtin: Builtin::Max, name: "max", min_args: 1, max_args: None },

    // Output
    "print" => FunctionMetadata { builtin: Builtin::Print, name: "print", min_args: 1, max_args: Some(1) },

    // Math, tag-preserving
    "sqrt" => FunctionMetadata { builtin: Builtin::Sqrt, name: "sqrt", min_args: 1, max_args: Some(1) },
    "abs" => FunctionMetadata { builtin: Builtin::Abs, name: "abs", min_args: 1, max_args: Some(1) },
    "round" => FunctionMetadata { builtin: Builtin::Round, name: "round", min_args: 1, max_args: Some(2) },
    "floor" => FunctionMetadata { builtin: Builtin::Floor, name: "floor", min_args: 1, max_args: Some(1) },
    "ceil" => FunctionMetadata { builtin: Builtin::Ceil, name: "ceil", min_args: 1, max_args: Some(1) },
};

/// Resolve a function name, case-insensitively.
pub fn lookup(name: &str) -> Result<&'static FunctionMetadata, EvalError> {
    FUNCTIONS_BY_NAME
        .get(name.to_ascii_lowercase().as_str())
        .ok_or_else(|| EvalError::UnknownFunction(name.to_string()))
}

/// Validate function call arguments
pub fn validate_args(metadata: &FunctionMetadata, arg_count: usize) -> Result<(), EvalError> {
    if arg_count < metadata.min_args {
        return Err(EvalError::InvalidArguments(format!(
            "{}() requires at least {} argument{}, got {}",
            metadata.name,
            metadata.min_args,
            if metadata.min_args == 1 { "" } else { "s" },
            arg_count
        )));
    }

    if let Some(max) = metadata.max_args {
        if arg_count > max {
            return Err(EvalError::InvalidArguments(format!(
                "{}() takes at most {} argument{}, got {}",
                metadata.name,
                max,
                if max == 1 { "" } else { "s" },
                arg_count
            )));
        }
    }

    Ok(())
}

/// Round `value` to `digits` decimal places; negative digits round to tens,
/// hundreds, ...
pub fn round_to(value: f64, digits: i32) -> f64 {
    let scale = 10f64.powi(digits);
    (value * scale).round() / scale
}
