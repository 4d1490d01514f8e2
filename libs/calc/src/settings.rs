//! Behaviour flags threaded through parsing, evaluation and display

use serde::{Deserialize, Serialize};

/// Live calculator settings.
///
/// Passed explicitly to the parser (`fuzzy`), the engine (`quiet`) and
/// [`Outcome::render`](crate::Outcome::render) (`precision`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Digits after the decimal point when rendering
    pub precision: usize,
    /// Recognise natural-language phrases (`half of`, `3 days ago`)
    pub fuzzy: bool,
    /// Suppress the display of assignments
    pub quiet: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            precision: 2,
            fuzzy: true,
            quiet: false,
        }
    }
}

impl Settings {
    /// Largest precision accepted by `:set precision`.
    pub const MAX_PRECISION: usize = 12;
}

/// Parse an on/off style flag as used by `:set` and `:quiet`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" | "1" => Some(true),
        "off" | "false" | "no" | "0" => Some(false),
        _ => None,
    }
}
