// src/server/mod.rs

//! HTTP transport over the scheduler.
//!
//! Public API under `/api/v1`, worker API under `/internal`. Handlers are
//! thin: every decision is made by [`Scheduler`].

pub mod dto;
pub mod error;
pub mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tracing::info;

use crate::dag::Scheduler;
use crate::errors::Result;

pub fn router(scheduler: Arc<Scheduler>) -> Router {
    Router::new()
        .route("/api/v1/calculate", post(handlers::calculate))
        .route("/api/v1/expressions", get(handlers::list_expressions))
        .route("/api/v1/expressions/{id}", get(handlers::get_expression))
        .route(
            "/internal/task",
            get(handlers::get_task).post(handlers::post_task_result),
        )
        .with_state(scheduler)
}

/// Serve the API on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, scheduler: Arc<Scheduler>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    info!(%addr, "orchestrator listening");

    axum::serve(listener, router(scheduler))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("orchestrator stopped");
    Ok(())
}
