// src/dag/graph.rs

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::errors::{CalcError, Result};
use crate::parser::TaskSpec;
use crate::types::TaskId;

/// Dependency graph of one expression, with task ids already assigned.
///
/// Edge direction: dependency -> dependent. For `(1+2)*3` the add task
/// gets an edge to the multiply task.
#[derive(Debug, Clone)]
pub struct TaskGraph {
    graph: DiGraphMap<TaskId, ()>,
    root: TaskId,
}

impl TaskGraph {
    /// Build the graph for `steps`, where step `i` gets id `first_id + i`.
    ///
    /// Fails if a step references a step that is not strictly earlier, or if
    /// the resulting graph is not acyclic.
    pub fn from_steps(steps: &[TaskSpec], first_id: TaskId) -> Result<Self> {
        if steps.is_empty() {
            return Err(CalcError::InvalidGraph("graph has no tasks".to_string()));
        }

        let mut graph: DiGraphMap<TaskId, ()> = DiGraphMap::new();
        for index in 0..steps.len() {
            graph.add_node(first_id + index as TaskId);
        }

        for (index, spec) in steps.iter().enumerate() {
            let id = first_id + index as TaskId;
            for dep in spec.dependencies() {
                if dep >= index {
                    return Err(CalcError::InvalidGraph(format!(
                        "step {index} references step {dep}, which is not emitted before it"
                    )));
                }
                graph.add_edge(first_id + dep as TaskId, id, ());
            }
        }

        // A topological sort will fail if there is a cycle.
        if let Err(cycle) = toposort(&graph, None) {
            return Err(CalcError::InvalidGraph(format!(
                "cycle detected involving task {}",
                cycle.node_id()
            )));
        }

        Ok(Self {
            graph,
            root: first_id + (steps.len() - 1) as TaskId,
        })
    }

    /// The task whose result is the expression's result.
    pub fn root(&self) -> TaskId {
        self.root
    }

    pub fn tasks(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.graph.nodes()
    }

    /// Immediate dependents: tasks that consume this task's result.
    pub fn dependents_of(&self, id: TaskId) -> Vec<TaskId> {
        if !self.graph.contains_node(id) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect()
    }

    /// Immediate dependencies: tasks whose results this task consumes.
    pub fn dependencies_of(&self, id: TaskId) -> Vec<TaskId> {
        if !self.graph.contains_node(id) {
            return Vec::new();
        }
        self.graph
            .neighbors_directed(id, Direction::Incoming)
            .collect()
    }
}
