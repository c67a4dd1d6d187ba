// src/server/dto.rs

//! JSON bodies of the HTTP API, shared by the server and the HTTP agent.

use serde::{Deserialize, Serialize};

use crate::dag::{DispatchedTask, Expression};
use crate::errors::{CalcError, Result};
use crate::types::{ExpressionId, TaskId, TaskOutcome};

/// `POST /api/v1/calculate` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateRequest {
    pub expression: String,
}

/// `POST /api/v1/calculate` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalculateResponse {
    pub id: ExpressionId,
}

/// `GET /api/v1/expressions` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionsResponse {
    pub expressions: Vec<Expression>,
}

/// `GET /api/v1/expressions/{id}` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpressionResponse {
    pub expression: Expression,
}

/// `GET /internal/task` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskEnvelope {
    pub task: DispatchedTask,
}

/// `POST /internal/task` request: exactly one of `result` and `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskResultRequest {
    pub id: TaskId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskResultRequest {
    pub fn from_outcome(id: TaskId, outcome: TaskOutcome) -> Self {
        match outcome {
            TaskOutcome::Value(v) => Self {
                id,
                result: Some(v),
                error: None,
            },
            TaskOutcome::Failed(detail) => Self {
                id,
                result: None,
                error: Some(detail),
            },
        }
    }

    pub fn into_outcome(self) -> Result<(TaskId, TaskOutcome)> {
        match (self.result, self.error) {
            (Some(v), None) => Ok((self.id, TaskOutcome::Value(v))),
            (None, Some(detail)) => Ok((self.id, TaskOutcome::Failed(detail))),
            (Some(_), Some(_)) => Err(CalcError::Protocol(
                "task result must carry either `result` or `error`, not both".to_string(),
            )),
            (None, None) => Err(CalcError::Protocol(
                "task result must carry `result` or `error`".to_string(),
            )),
        }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    /// Id of the expression that was recorded, for rejected submissions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ExpressionId>,
}
