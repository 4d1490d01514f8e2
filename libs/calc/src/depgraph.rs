//! Dependency graph with cycle detection
//!
//! Nodes name the IDs they depend on. Ordering and cycle checks use a
//! depth-first search with three-state marking; meeting a node that is
//! still in progress means a cycle.

use crate::error::EvalError;
use std::collections::{BTreeMap, HashMap};

/// A graph node: an ID, a label and the IDs it depends on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: u64,
    pub label: String,
    pub dependencies: Vec<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VisitState {
    Unvisited,
    Visiting,
    Done,
}

#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<u64, Node>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the node `id`.
    pub fn add_node(&mut self, id: u64, label: impl Into<String>, dependencies: Vec<u64>) {
        self.nodes.insert(
            id,
            Node {
                id,
                label: label.into(),
                dependencies,
            },
        );
    }

    pub fn node(&self, id: u64) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// IDs of the nodes that depend directly on `id`, ascending.
    pub fn get_dependents(&self, id: u64) -> Vec<u64> {
        self.nodes
            .values()
            .filter(|node| node.dependencies.contains(&id))
            .map(|node| node.id)
            .collect()
    }

    /// Every node after all of its dependencies. Dependencies on IDs that
    /// are not in the graph are ignored.
    pub fn topological_sort(&self) -> Result<Vec<u64>, EvalError> {
        let mut state: HashMap<u64, VisitState> = self
            .nodes
            .keys()
            .map(|id| (*id, VisitState::Unvisited))
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());

        for id in self.nodes.keys() {
            if state.get(id) == Some(&VisitState::Unvisited) {
                self.visit(*id, &mut state, &mut order)?;
            }
        }
        Ok(order)
    }

    fn visit(
        &self,
        id: u64,
        state: &mut HashMap<u64, VisitState>,
        order: &mut Vec<u64>,
    ) -> Result<(), EvalError> {
        state.insert(id, VisitState::Visiting);

        if let Some(node) = self.nodes.get(&id) {
            for next in &node.dependencies {
                match state.get(next) {
                    Some(VisitState::Unvisited) => self.visit(*next, state, order)?,
                    Some(VisitState::Visiting) => return Err(EvalError::CircularReference(*next)),
                    Some(VisitState::Done) | None => {}
                }
            }
        }

        state.insert(id, VisitState::Done);
        order.push(id);
        Ok(())
    }

    pub fn has_cycle(&self) -> bool {
        self.topological_sort().is_err()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}
