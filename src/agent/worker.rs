// src/agent/worker.rs

//! Worker poll loop and the pool that runs `computing_power` of them.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::agent::compute::execute;
use crate::agent::source::TaskSource;

/// Poll `source` until `shutdown` flips to `true`.
///
/// Each iteration fetches one task, waits its simulated duration, computes
/// it, and reports the outcome. An empty poll or a transport error waits
/// `poll_interval` before trying again. A task abandoned on shutdown is left
/// to the orchestrator's lease sweep.
pub async fn run_worker(
    worker_id: usize,
    source: Arc<dyn TaskSource>,
    poll_interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    debug!(worker_id, "worker started");

    while !*shutdown.borrow() {
        let task = match source.fetch_task().await {
            Ok(Some(task)) => task,
            Ok(None) => {
                if !idle(poll_interval, &mut shutdown).await {
                    break;
                }
                continue;
            }
            Err(err) => {
                warn!(worker_id, error = %err, "failed to fetch task");
                if !idle(poll_interval, &mut shutdown).await {
                    break;
                }
                continue;
            }
        };

        debug!(
            worker_id,
            task_id = task.id,
            operation = %task.operation,
            operation_time = task.operation_time,
            "computing task"
        );

        let outcome = tokio::select! {
            outcome = execute(&task) => outcome,
            _ = shutdown.changed() => {
                info!(worker_id, task_id = task.id, "shutdown while computing; abandoning task");
                break;
            }
        };

        if let Err(err) = source.submit_result(task.id, outcome).await {
            warn!(worker_id, task_id = task.id, error = %err, "failed to report result");
        }
    }

    debug!(worker_id, "worker stopped");
}

/// Sleep for `poll_interval` or until shutdown. Returns `false` once the
/// pool handle is gone.
async fn idle(poll_interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(poll_interval) => true,
        changed = shutdown.changed() => changed.is_ok(),
    }
}

/// Handle to a running set of workers.
#[derive(Debug)]
pub struct AgentPool {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl AgentPool {
    /// Spawn `computing_power` workers sharing `source`.
    pub fn spawn(
        source: Arc<dyn TaskSource>,
        computing_power: usize,
        poll_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handles = (0..computing_power)
            .map(|worker_id| {
                tokio::spawn(run_worker(
                    worker_id,
                    Arc::clone(&source),
                    poll_interval,
                    shutdown_rx.clone(),
                ))
            })
            .collect();

        info!(computing_power, "agent pool started");

        Self {
            shutdown_tx,
            handles,
        }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    /// Ask every worker to stop and wait for them.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles {
            if let Err(err) = handle.await {
                warn!(error = %err, "worker task panicked");
            }
        }
        info!("agent pool stopped");
    }
}
