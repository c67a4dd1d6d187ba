// src/parser/builder.rs

//! Linearise an evaluation tree into task descriptors.

use crate::config::Timings;
use crate::parser::ast::Ast;
use crate::types::Operation;

/// Operand of a planned step: a literal, or the result of an earlier step
/// (by index into [`Plan::steps`]).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlanOperand {
    Literal(f64),
    Step(usize),
}

/// One binary operation, before it has a task id.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub operation: Operation,
    pub arg1: PlanOperand,
    pub arg2: PlanOperand,
    /// Simulated compute time in milliseconds.
    pub operation_time: u64,
}

impl TaskSpec {
    /// Steps this one waits on.
    pub fn dependencies(&self) -> impl Iterator<Item = usize> + '_ {
        [self.arg1, self.arg2].into_iter().filter_map(|op| match op {
            PlanOperand::Step(i) => Some(i),
            PlanOperand::Literal(_) => None,
        })
    }

    /// Whether both operands are literals, i.e. the task can start right away.
    pub fn is_leaf(&self) -> bool {
        self.dependencies().next().is_none()
    }
}

/// Result of building an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// The expression had no operations (e.g. `"7"` or `"(7)"`).
    Literal(f64),
    /// Steps in dependency order; every `Step(i)` points backwards and the
    /// last step is the root.
    Graph(Vec<TaskSpec>),
}

impl Plan {
    pub fn steps(&self) -> &[TaskSpec] {
        match self {
            Plan::Literal(_) => &[],
            Plan::Graph(steps) => steps,
        }
    }
}

/// Post-order walk: children are emitted before their parent, so references
/// always point to already-emitted steps.
pub fn linearize(ast: &Ast, timings: &Timings) -> Plan {
    let mut steps = Vec::with_capacity(ast.operation_count());
    match emit(ast, timings, &mut steps) {
        PlanOperand::Literal(v) => Plan::Literal(v),
        PlanOperand::Step(_) => Plan::Graph(steps),
    }
}

fn emit(ast: &Ast, timings: &Timings, steps: &mut Vec<TaskSpec>) -> PlanOperand {
    match ast {
        Ast::Number(v) => PlanOperand::Literal(*v),
        Ast::Binary { op, lhs, rhs } => {
            let arg1 = emit(lhs, timings, steps);
            let arg2 = emit(rhs, timings, steps);
            steps.push(TaskSpec {
                operation: *op,
                arg1,
                arg2,
                operation_time: timings.for_operation(*op),
            });
            PlanOperand::Step(steps.len() - 1)
        }
    }
}
