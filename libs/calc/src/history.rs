//! Stored lines of the session

use crate::ast::Expression;
use crate::value::{Outcome, Value};

/// One evaluated input line.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub id: u64,
    pub input: String,
    pub expression: Expression,
    pub outcome: Outcome,
    /// Computed value, kept even when the outcome was silenced
    pub value: Option<Value>,
}

/// Evaluated lines in ID order. IDs are dense and start at 1.
#[derive(Debug, Clone, Default)]
pub struct LineHistory {
    lines: Vec<Line>,
}

impl LineHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// ID the next stored line will receive.
    pub fn next_id(&self) -> u64 {
        self.lines.len() as u64 + 1
    }

    pub(crate) fn push(
        &mut self,
        input: String,
        expression: Expression,
        outcome: Outcome,
        value: Option<Value>,
    ) -> u64 {
        let id = self.next_id();
        self.lines.push(Line {
            id,
            input,
            expression,
            outcome,
            value,
        });
        id
    }

    pub fn get(&self, id: u64) -> Option<&Line> {
        let index = usize::try_from(id).ok()?.checked_sub(1)?;
        self.lines.get(index)
    }

    pub fn last(&self) -> Option<&Line> {
        self.lines.last()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}
