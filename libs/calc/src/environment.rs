//! Variable bindings and the session's unit engine

use crate::value::Value;
use std::collections::HashMap;
use tally_units::UnitEngine;

/// Session state read and written by the evaluator.
///
/// Names are case-sensitive; reassignment overwrites.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    variables: HashMap<String, Value>,
    units: UnitEngine,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.variables.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn units(&self) -> &UnitEngine {
        &self.units
    }

    pub fn units_mut(&mut self) -> &mut UnitEngine {
        &mut self.units
    }

    /// Drop every binding and every custom unit.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.units.clear_custom_units();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reassignment_overwrites() {
        let mut env = Environment::new();
        env.set("x", Value::Number(1.0));
        env.set("x", Value::Number(2.0));
        assert_eq!(env.get("x"), Some(&Value::Number(2.0)));
        assert_eq!(env.len(), 1);
        assert!(env.get("X").is_none());
    }

    #[test]
    fn test_clear_drops_custom_units() {
        let mut env = Environment::new();
        env.set("x", Value::Number(1.0));
        env.units_mut().add_custom_unit("box", 20.0, "kg").unwrap();
        env.clear();
        assert!(env.is_empty());
        assert!(!env.units().is_unit("box"));
    }
}
