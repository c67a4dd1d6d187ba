// src/server/handlers.rs

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use tracing::debug;

use crate::dag::{Scheduler, Submission};
use crate::server::dto::{
    CalculateRequest, CalculateResponse, ExpressionResponse, ExpressionsResponse, TaskEnvelope,
    TaskResultRequest,
};
use crate::server::error::ApiError;
use crate::types::ExpressionId;

type ApiResult<T> = Result<T, ApiError>;

/// `POST /api/v1/calculate`
pub async fn calculate(
    State(scheduler): State<Arc<Scheduler>>,
    body: Result<Json<CalculateRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CalculateResponse>)> {
    let Json(request) = body?;

    match scheduler.submit(&request.expression)? {
        Submission::Accepted(id) => Ok((StatusCode::CREATED, Json(CalculateResponse { id }))),
        Submission::Rejected { id, error } => Err(ApiError::Rejected { id, error }),
    }
}

/// `GET /api/v1/expressions`
pub async fn list_expressions(
    State(scheduler): State<Arc<Scheduler>>,
) -> Json<ExpressionsResponse> {
    Json(ExpressionsResponse {
        expressions: scheduler.expressions(),
    })
}

/// `GET /api/v1/expressions/{id}`
pub async fn get_expression(
    State(scheduler): State<Arc<Scheduler>>,
    id: Result<Path<ExpressionId>, PathRejection>,
) -> ApiResult<Json<ExpressionResponse>> {
    let Path(id) = id?;
    let expression = scheduler.expression(id)?;
    Ok(Json(ExpressionResponse { expression }))
}

/// `GET /internal/task`
pub async fn get_task(State(scheduler): State<Arc<Scheduler>>) -> ApiResult<Json<TaskEnvelope>> {
    match scheduler.poll() {
        Some(task) => Ok(Json(TaskEnvelope { task })),
        None => Err(ApiError::NoTask),
    }
}

/// `POST /internal/task`
pub async fn post_task_result(
    State(scheduler): State<Arc<Scheduler>>,
    body: Result<Json<TaskResultRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(request) = body?;
    let (id, outcome) = request.into_outcome()?;
    debug!(task_id = id, ?outcome, "result reported");

    scheduler.report(id, outcome)?;
    Ok(StatusCode::OK)
}
