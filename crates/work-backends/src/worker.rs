//! The backend's bus-facing processing loop.

use crate::Solver;
use std::str;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use work_bus::{reply_topic, WorkBus, WORK_TOPIC};
use work_core::WorkHash;

/// Long-lived loop pulling work items off the shared topic and publishing
/// solutions to the per-hash reply topics.
///
/// One worker per solver; the worker runs as a single background task and
/// stops only through its watch channel (or when the bus goes away). A bad
/// item - unparseable payload, device fault, short output - fails that one
/// request and the loop moves on; the waiting caller times out on its end.
pub struct BackendWorker {
    bus: Arc<dyn WorkBus>,
    solver: Arc<dyn Solver>,
    shutdown: watch::Receiver<bool>,
}

impl BackendWorker {
    /// Wire a solver to the bus.
    #[must_use]
    pub fn new(bus: Arc<dyn WorkBus>, solver: Arc<dyn Solver>, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            bus,
            solver,
            shutdown,
        }
    }

    /// Run until the shutdown signal fires.
    ///
    /// The work-topic subscription is open before this logs ready, so no
    /// request published after spawn can be missed.
    pub async fn run(self) {
        let mut shutdown = self.shutdown.clone();
        let mut work_items = self.bus.subscribe(WORK_TOPIC);
        info!(backend = %self.solver.descriptor(), "backend worker ready");

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(backend = %self.solver.descriptor(), "backend worker stopping");
                        return;
                    }
                }
                payload = work_items.recv() => {
                    match payload {
                        Some(payload) => self.handle(&payload).await,
                        None => {
                            info!(backend = %self.solver.descriptor(), "work topic closed, worker exiting");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Serve one work item. Never propagates an error - failures here are
    /// per-request, the loop must survive them.
    async fn handle(&self, payload: &[u8]) {
        let hash = match parse_work_item(payload) {
            Ok(hash) => hash,
            Err(reason) => {
                warn!(%reason, "malformed work item, skipping");
                return;
            }
        };
        debug!(%hash, "work item received");

        let raw = match self.solver.solve_raw(&hash).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(%hash, error = %err, "backend fault, request abandoned");
                return;
            }
        };

        let nonce = match self.solver.layout().extract(&raw) {
            Ok(nonce) => nonce,
            Err(err) => {
                warn!(%hash, error = %err, "unusable device output, request abandoned");
                return;
            }
        };

        let receivers = self
            .bus
            .publish(&reply_topic(&hash), nonce.as_bytes().to_vec())
            .await;
        debug!(%hash, %nonce, receivers, "solution published");
    }
}

/// Decode a work-topic payload: the ASCII hex of the target hash.
fn parse_work_item(payload: &[u8]) -> Result<WorkHash, String> {
    let text = str::from_utf8(payload).map_err(|_| "payload is not UTF-8".to_string())?;
    text.parse().map_err(|err| format!("{err}"))
}
