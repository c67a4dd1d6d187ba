// src/dag/registry.rs

//! Concurrency-safe registry of submitted expressions.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::types::{ExpressionId, ExpressionStatus};

/// A submitted expression and where it is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExpressionId,
    #[serde(rename = "expression")]
    pub raw_text: String,
    pub status: ExpressionStatus,
    /// Valid only when `status == Completed`.
    pub result: Option<f64>,
    /// Set only when `status == Error`.
    #[serde(rename = "error", default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

#[derive(Debug)]
struct RegistryInner {
    expressions: BTreeMap<ExpressionId, Expression>,
    next_id: ExpressionId,
}

#[derive(Debug)]
pub struct ExpressionRegistry {
    inner: Mutex<RegistryInner>,
}

impl Default for ExpressionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(RegistryInner {
                expressions: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Register a new expression as `Processing` and return its id.
    pub fn create(&self, raw_text: &str) -> ExpressionId {
        self.insert(raw_text, ExpressionStatus::Processing, None, None)
    }

    /// Register an expression that could not be parsed.
    pub fn create_failed(&self, raw_text: &str, detail: impl Into<String>) -> ExpressionId {
        self.insert(raw_text, ExpressionStatus::Error, None, Some(detail.into()))
    }

    /// Register an expression whose value is known without any task.
    pub fn create_completed(&self, raw_text: &str, value: f64) -> ExpressionId {
        self.insert(raw_text, ExpressionStatus::Completed, Some(value), None)
    }

    fn insert(
        &self,
        raw_text: &str,
        status: ExpressionStatus,
        result: Option<f64>,
        error_detail: Option<String>,
    ) -> ExpressionId {
        let mut inner = self.inner.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        inner.expressions.insert(
            id,
            Expression {
                id,
                raw_text: raw_text.to_string(),
                status,
                result,
                error_detail,
            },
        );
        debug!(expression_id = id, %status, "registered expression");
        id
    }

    /// Move a `Processing` expression to `Completed`.
    ///
    /// Returns `false` (and changes nothing) if the expression is unknown or
    /// already terminal.
    pub fn mark_completed(&self, id: ExpressionId, value: f64) -> bool {
        self.finish(id, |expr| {
            expr.status = ExpressionStatus::Completed;
            expr.result = Some(value);
        })
    }

    /// Move a `Processing` expression to `Error`.
    ///
    /// Returns `false` (and changes nothing) if the expression is unknown or
    /// already terminal.
    pub fn mark_error(&self, id: ExpressionId, detail: impl Into<String>) -> bool {
        let detail = detail.into();
        self.finish(id, |expr| {
            expr.status = ExpressionStatus::Error;
            expr.result = None;
            expr.error_detail = Some(detail);
        })
    }

    fn finish(&self, id: ExpressionId, apply: impl FnOnce(&mut Expression)) -> bool {
        let mut inner = self.inner.lock();
        let Some(expr) = inner.expressions.get_mut(&id) else {
            return false;
        };
        if expr.status.is_terminal() {
            debug!(
                expression_id = id,
                status = %expr.status,
                "expression already terminal; ignoring transition"
            );
            return false;
        }

        apply(expr);
        info!(
            expression_id = id,
            status = %expr.status,
            result = ?expr.result,
            "expression finished"
        );
        true
    }

    pub fn get(&self, id: ExpressionId) -> Option<Expression> {
        self.inner.lock().expressions.get(&id).cloned()
    }

    /// Snapshot of all expressions in ascending id order.
    pub fn list(&self) -> Vec<Expression> {
        self.inner.lock().expressions.values().cloned().collect()
    }
}
