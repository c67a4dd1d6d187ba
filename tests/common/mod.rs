#![allow(dead_code)]

pub use distcalc_test_utils::builders;
pub use distcalc_test_utils::simulated_worker::{ScriptedTaskSource, SimulatedWorker};
pub use distcalc_test_utils::{init_tracing, with_timeout};

use distcalc::parser::{Ast, parse_expression};
use distcalc::types::Operation;

/// Evaluate an expression directly from its tree, without any scheduling.
/// `None` on division by zero.
pub fn reference_eval(input: &str) -> Option<f64> {
    let ast = parse_expression(input).expect("reference_eval needs a valid expression");
    eval_ast(&ast)
}

fn eval_ast(ast: &Ast) -> Option<f64> {
    match ast {
        Ast::Number(v) => Some(*v),
        Ast::Binary { op, lhs, rhs } => {
            let a = eval_ast(lhs)?;
            let b = eval_ast(rhs)?;
            match op {
                Operation::Add => Some(a + b),
                Operation::Subtract => Some(a - b),
                Operation::Multiply => Some(a * b),
                Operation::Divide if b == 0.0 => None,
                Operation::Divide => Some(a / b),
            }
        }
    }
}
