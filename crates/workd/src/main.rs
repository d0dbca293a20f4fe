//! # Hashworks Daemon
//!
//! Wires the whole service together and owns its lifecycle:
//!
//! 1. Initialize logging and load configuration from the environment.
//! 2. Construct, in dependency order: bus, solver, backend worker,
//!    coordinator, HTTP router.
//! 3. Spawn the worker under a shutdown signal and serve HTTP.
//! 4. On ctrl-c: stop accepting requests, signal the worker, wait for it
//!    to drain, exit. Shutdown is deterministic - no free-running threads
//!    survive the runtime.

mod adapters;
mod config;

use crate::adapters::TtyLink;
use crate::config::{DispatchMode, WorkdConfig};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "fpga-driver")]
use work_backends::AcceleratorSolver;
use work_backends::{BackendKind, BackendWorker, SerialSolver, SimulatedSolver, Solver};
use work_bus::{InMemoryWorkBus, WorkBus};
use work_dispatch::{BusDispatcher, DirectDispatcher, DispatchCounters, WorkDispatcher};
use work_gateway::AppState;

/// Everything the runtime holds between startup and shutdown.
struct WorkdRuntime {
    router: axum::Router,
    listen: std::net::SocketAddr,
    shutdown_tx: watch::Sender<bool>,
    worker_handle: Option<tokio::task::JoinHandle<()>>,
}

impl WorkdRuntime {
    /// Build the service from configuration.
    fn new(config: &WorkdConfig) -> Result<Self> {
        let solver = build_solver(config)?;
        let descriptor = Arc::new(solver.descriptor().clone());
        info!(backend = %descriptor, mode = ?config.mode, "backend constructed");

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let (dispatcher, counters, worker_handle): (
            Arc<dyn WorkDispatcher>,
            Arc<DispatchCounters>,
            Option<tokio::task::JoinHandle<()>>,
        ) = match config.mode {
            DispatchMode::Bus => {
                let bus: Arc<dyn WorkBus> =
                    Arc::new(InMemoryWorkBus::with_capacity(config.bus_capacity));
                let worker =
                    BackendWorker::new(Arc::clone(&bus), Arc::clone(&solver), shutdown_rx);
                let handle = tokio::spawn(worker.run());

                let dispatcher = BusDispatcher::new(bus, config.dispatch);
                let counters = dispatcher.counters();
                (Arc::new(dispatcher), counters, Some(handle))
            }
            DispatchMode::Direct => {
                let dispatcher = DirectDispatcher::new(Arc::clone(&solver), config.dispatch);
                let counters = dispatcher.counters();
                (Arc::new(dispatcher), counters, None)
            }
        };

        let router = work_gateway::router(AppState {
            dispatcher,
            backend: descriptor,
            counters,
        });

        Ok(Self {
            router,
            listen: config.http_listen,
            shutdown_tx,
            worker_handle,
        })
    }

    /// Serve until ctrl-c, then stop the worker and drain.
    async fn serve(mut self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen)
            .await
            .with_context(|| format!("binding {}", self.listen))?;
        info!(listen = %self.listen, "http front door ready");

        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async {
                let _ = tokio::signal::ctrl_c().await;
                info!("shutdown signal received");
            })
            .await
            .context("http server failed")?;

        // HTTP is down; now stop the backend worker.
        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.worker_handle.take() {
            if tokio::time::timeout(Duration::from_secs(2), handle)
                .await
                .is_err()
            {
                warn!("backend worker did not stop in time");
            }
        }

        info!("shutdown complete");
        Ok(())
    }
}

/// Construct the configured solver variant.
fn build_solver(config: &WorkdConfig) -> Result<Arc<dyn Solver>> {
    let solver: Arc<dyn Solver> = match config.backend.kind {
        BackendKind::Simulated => Arc::new(SimulatedSolver::new(
            config.backend.simulated_output.clone(),
        )),
        BackendKind::Serial => {
            let device = config
                .backend
                .device
                .as_ref()
                .context("serial backend without a device path")?;
            let link = TtyLink::open(device)
                .with_context(|| format!("opening serial device {}", device.display()))?;
            Arc::new(SerialSolver::new(
                device.display().to_string(),
                Box::new(link),
                config.backend.serial_reverse_nonce,
            ))
        }
        BackendKind::Accelerator => {
            #[cfg(feature = "fpga-driver")]
            {
                Arc::new(
                    AcceleratorSolver::new(
                        "vendor accelerator",
                        Box::new(work_backends::ffi::VendorAccelerator::new()),
                    )
                    .context("initializing accelerator")?,
                )
            }
            #[cfg(not(feature = "fpga-driver"))]
            {
                anyhow::bail!(
                    "accelerator backend requires the fpga-driver feature \
                     (rebuild with --features fpga-driver)"
                );
            }
        }
    };
    Ok(solver)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = WorkdConfig::from_env().context("loading configuration")?;
    info!(
        backend = %config.backend.kind,
        timeout = ?config.dispatch.timeout,
        "starting workd"
    );

    let runtime = WorkdRuntime::new(&config)?;
    runtime.serve().await
}
