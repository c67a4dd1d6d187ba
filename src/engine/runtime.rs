// src/engine/runtime.rs

use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::agent::{AgentPool, LocalTaskSource};
use crate::config::ConfigFile;
use crate::dag::Scheduler;
use crate::engine::RuntimeOptions;
use crate::engine::sweeper::spawn_lease_sweeper;
use crate::errors::{CalcError, Result};
use crate::server;

/// A running orchestrator: HTTP server, lease sweeper and (optionally)
/// in-process agents, all sharing one [`Scheduler`].
pub struct Orchestrator {
    addr: SocketAddr,
    scheduler: Arc<Scheduler>,
    shutdown_tx: watch::Sender<bool>,
    server: JoinHandle<Result<()>>,
    sweeper: JoinHandle<()>,
    agents: Option<AgentPool>,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("addr", &self.addr)
            .field("agents", &self.agents.as_ref().map(AgentPool::size))
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Bind `[server].listen` and start everything.
    pub async fn start(cfg: &ConfigFile, options: RuntimeOptions) -> Result<Self> {
        let listener = TcpListener::bind(cfg.server.listen.as_str())
            .await
            .with_context(|| format!("binding orchestrator to {}", cfg.server.listen))?;
        Self::start_on(listener, cfg, options).await
    }

    /// Start on an already-bound listener (tests bind `127.0.0.1:0`).
    pub async fn start_on(
        listener: TcpListener,
        cfg: &ConfigFile,
        options: RuntimeOptions,
    ) -> Result<Self> {
        let addr = listener.local_addr()?;
        let scheduler = Arc::new(Scheduler::from_config(cfg));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let sweeper = spawn_lease_sweeper(
            Arc::clone(&scheduler),
            cfg.lease.sweep_interval(),
            shutdown_rx.clone(),
        );

        let agents = options.run_agents.then(|| {
            AgentPool::spawn(
                Arc::new(LocalTaskSource::new(Arc::clone(&scheduler))),
                options
                    .computing_power
                    .unwrap_or(cfg.agent.computing_power),
                cfg.agent.poll_interval(),
            )
        });

        let mut server_shutdown = shutdown_rx;
        let server = tokio::spawn(server::serve(
            listener,
            Arc::clone(&scheduler),
            async move {
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            },
        ));

        info!(%addr, run_agents = options.run_agents, "orchestrator started");

        Ok(Self {
            addr,
            scheduler,
            shutdown_tx,
            server,
            sweeper,
            agents,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// `http://<addr>`, suitable for an `HttpTaskSource` or a test client.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }

    /// Stop agents, sweeper and server, in that order.
    pub async fn shutdown(self) -> Result<()> {
        info!("orchestrator shutting down");

        if let Some(agents) = self.agents {
            agents.shutdown().await;
        }

        let _ = self.shutdown_tx.send(true);

        if let Err(err) = self.sweeper.await {
            warn!(error = %err, "lease sweeper panicked");
        }

        self.server
            .await
            .map_err(|err| CalcError::Other(anyhow::Error::new(err)))?
    }
}
