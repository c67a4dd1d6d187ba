// src/agent/source.rs

//! Where a worker gets tasks from and reports results to.
//!
//! Workers talk to a `TaskSource` instead of a concrete transport. This
//! makes it easy to run agents in-process next to the orchestrator, remotely
//! over HTTP, or against a scripted source in tests.
//!
//! - `LocalTaskSource` calls the [`Scheduler`] directly.
//! - `HttpTaskSource` speaks the `/internal/task` protocol with `reqwest`.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use reqwest::StatusCode;

use crate::dag::{DispatchedTask, Scheduler};
use crate::errors::{CalcError, Result};
use crate::server::dto::{ErrorBody, TaskEnvelope, TaskResultRequest};
use crate::types::{TaskId, TaskOutcome};

pub type SourceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Trait abstracting how a worker obtains tasks and returns results.
pub trait TaskSource: Send + Sync {
    /// Fetch one ready task. `Ok(None)` means nothing is ready right now.
    fn fetch_task(&self) -> SourceFuture<'_, Option<DispatchedTask>>;

    /// Report the outcome of a task previously fetched.
    fn submit_result(&self, id: TaskId, outcome: TaskOutcome) -> SourceFuture<'_, ()>;
}

/// In-process source used when agents run inside the orchestrator.
#[derive(Debug, Clone)]
pub struct LocalTaskSource {
    scheduler: Arc<Scheduler>,
}

impl LocalTaskSource {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }
}

impl TaskSource for LocalTaskSource {
    fn fetch_task(&self) -> SourceFuture<'_, Option<DispatchedTask>> {
        let task = self.scheduler.poll();
        Box::pin(async move { Ok(task) })
    }

    fn submit_result(&self, id: TaskId, outcome: TaskOutcome) -> SourceFuture<'_, ()> {
        let result = self.scheduler.report(id, outcome);
        Box::pin(async move { result })
    }
}

/// Remote source talking to an orchestrator over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTaskSource {
    client: reqwest::Client,
    task_url: String,
}

impl HttpTaskSource {
    /// `base_url` is the orchestrator root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            task_url: format!("{}/internal/task", base_url.trim_end_matches('/')),
        }
    }
}

impl TaskSource for HttpTaskSource {
    fn fetch_task(&self) -> SourceFuture<'_, Option<DispatchedTask>> {
        Box::pin(async move {
            let response = self.client.get(&self.task_url).send().await?;
            match response.status() {
                StatusCode::OK => {
                    let envelope: TaskEnvelope = response.json().await?;
                    Ok(Some(envelope.task))
                }
                StatusCode::NOT_FOUND => Ok(None),
                status => Err(rejection(status, response).await),
            }
        })
    }

    fn submit_result(&self, id: TaskId, outcome: TaskOutcome) -> SourceFuture<'_, ()> {
        let body = TaskResultRequest::from_outcome(id, outcome);
        Box::pin(async move {
            let response = self.client.post(&self.task_url).json(&body).send().await?;
            if response.status().is_success() {
                Ok(())
            } else {
                Err(rejection(response.status(), response).await)
            }
        })
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> CalcError {
    let detail = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => "no error body".to_string(),
    };
    CalcError::Protocol(format!("orchestrator answered {status}: {detail}"))
}
