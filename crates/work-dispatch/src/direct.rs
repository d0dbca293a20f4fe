//! Coordinator for co-located deployments: no bus hop.

use crate::config::DispatchConfig;
use crate::counters::DispatchCounters;
use crate::error::{DispatchError, Result};
use crate::ports::WorkDispatcher;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error};
use work_backends::Solver;
use work_core::{validate, work_value, Nonce, WorkHash};

/// Coordinator that calls a co-located backend's direct path, skipping
/// the pub/sub indirection entirely.
///
/// Same contract as the bus dispatcher: the timeout window, the
/// re-validation policy, and the error taxonomy all apply unchanged.
pub struct DirectDispatcher {
    solver: Arc<dyn Solver>,
    config: DispatchConfig,
    counters: Arc<DispatchCounters>,
}

impl DirectDispatcher {
    /// Wrap a co-located solver.
    #[must_use]
    pub fn new(solver: Arc<dyn Solver>, config: DispatchConfig) -> Self {
        Self {
            solver,
            config,
            counters: Arc::new(DispatchCounters::default()),
        }
    }

    /// Shared handle to this dispatcher's counters.
    #[must_use]
    pub fn counters(&self) -> Arc<DispatchCounters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl WorkDispatcher for DirectDispatcher {
    async fn solve(&self, hash: WorkHash) -> Result<Nonce> {
        DispatchCounters::bump(&self.counters.dispatched);

        let nonce = match timeout(self.config.timeout, self.solver.solve_direct(&hash)).await {
            Err(_elapsed) => {
                DispatchCounters::bump(&self.counters.timeouts);
                return Err(DispatchError::Timeout {
                    waited: self.config.timeout,
                });
            }
            Ok(Err(err)) => {
                DispatchCounters::bump(&self.counters.backend_faults);
                return Err(err.into());
            }
            Ok(Ok(nonce)) => nonce,
        };

        if self.config.revalidate && !validate(&nonce, &hash) {
            DispatchCounters::bump(&self.counters.validation_failures);
            error!(
                %hash,
                %nonce,
                value = %format!("{:#018x}", work_value(&nonce, &hash)),
                "backend returned sub-threshold work"
            );
            return Err(DispatchError::ValidationFailure { nonce });
        }

        DispatchCounters::bump(&self.counters.completed);
        debug!(%hash, %nonce, "direct solve completed");
        Ok(nonce)
    }
}
