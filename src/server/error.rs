// src/server/error.rs

//! Mapping from crate errors to HTTP responses.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{debug, error};

use crate::errors::{CalcError, ParseError};
use crate::server::dto::ErrorBody;
use crate::types::ExpressionId;

#[derive(Debug)]
pub enum ApiError {
    /// Any error coming out of the scheduler.
    Calc(CalcError),
    /// A submission that failed to parse; it was still recorded under `id`.
    Rejected { id: ExpressionId, error: ParseError },
    /// Poll found nothing ready. A normal state, not a failure.
    NoTask,
    /// The request body or path could not be decoded.
    BadRequest(String),
}

impl From<CalcError> for ApiError {
    fn from(err: CalcError) -> Self {
        ApiError::Calc(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

fn status_of(err: &CalcError) -> StatusCode {
    match err {
        CalcError::Parse(_) | CalcError::Protocol(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CalcError::UnknownExpression(_) | CalcError::UnknownTask(_) => StatusCode::NOT_FOUND,
        CalcError::TaskNotInProgress { .. } => StatusCode::CONFLICT,
        CalcError::Arithmetic(_)
        | CalcError::InvalidGraph(_)
        | CalcError::ConfigError(_)
        | CalcError::IoError(_)
        | CalcError::TomlError(_)
        | CalcError::Http(_)
        | CalcError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Calc(err) => {
                let status = status_of(&err);
                if status.is_server_error() {
                    error!(error = %err, "request failed");
                } else {
                    debug!(error = %err, %status, "request rejected");
                }
                (
                    status,
                    ErrorBody {
                        error: err.to_string(),
                        id: None,
                    },
                )
            }
            ApiError::Rejected { id, error } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorBody {
                    error: error.to_string(),
                    id: Some(id),
                },
            ),
            ApiError::NoTask => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "no task available".to_string(),
                    id: None,
                },
            ),
            ApiError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: msg,
                    id: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}
