//! The bus-backed coordinator.

use crate::config::DispatchConfig;
use crate::counters::DispatchCounters;
use crate::error::{DispatchError, Result};
use crate::ports::WorkDispatcher;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, error, warn};
use work_bus::{reply_topic, WorkBus, WORK_TOPIC};
use work_core::{validate, work_value, Nonce, WorkHash};

/// Coordinator that reaches its backends over the bus.
///
/// Stateless per request: the reply subscription is created inside the
/// solve call and dropped with it, so there is no pending-request table to
/// clean and caller cancellation cannot leak anything.
pub struct BusDispatcher {
    bus: Arc<dyn WorkBus>,
    config: DispatchConfig,
    counters: Arc<DispatchCounters>,
}

impl BusDispatcher {
    /// Create a coordinator over a bus.
    #[must_use]
    pub fn new(bus: Arc<dyn WorkBus>, config: DispatchConfig) -> Self {
        Self {
            bus,
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
impl WorkDispatcher for BusDispatcher {
    async fn solve(&self, hash: WorkHash) -> Result<Nonce> {
        DispatchCounters::bump(&self.counters.dispatched);

        // Subscribe FIRST: a fast backend's reply must find us already
        // listening, or it is lost and the caller waits out the timeout.
        let mut reply = self.bus.subscribe(&reply_topic(&hash));

        let receivers = self
            .bus
            .publish(WORK_TOPIC, hash.to_hex().into_bytes())
            .await;
        debug!(%hash, receivers, "work item dispatched");

        let payload = match timeout(self.config.timeout, reply.recv()).await {
            Err(_elapsed) => {
                DispatchCounters::bump(&self.counters.timeouts);
                warn!(%hash, waited = ?self.config.timeout, "solve timed out");
                return Err(DispatchError::Timeout {
                    waited: self.config.timeout,
                });
            }
            Ok(None) => {
                DispatchCounters::bump(&self.counters.backend_faults);
                return Err(DispatchError::BackendFault(
                    "reply channel closed before a solution arrived".to_string(),
                ));
            }
            Ok(Some(payload)) => payload,
        };

        let nonce = Nonce::from_slice(&payload).map_err(|err| {
            DispatchCounters::bump(&self.counters.backend_faults);
            DispatchError::BackendFault(format!("malformed solution payload: {err}"))
        })?;

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
        debug!(%hash, %nonce, "solve completed");
        Ok(nonce)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};
    use tokio::sync::watch;
    use work_backends::{BackendWorker, SimulatedSolver, Solver};
    use work_bus::InMemoryWorkBus;

    const HASH: &str = "C8E5B875778702445B25657276ABC56AA9910B283537CA438B2CC59B0CF93712";
    const HASH_NONCE: &str = "00000000005f9505";

    // Second and third reference pairs, for the isolation test.
    const HASH_A: &str = "1111111111111111111111111111111111111111111111111111111111111111";
    const HASH_A_NONCE: &str = "0000000005488a19";
    const HASH_B: &str = "2222222222222222222222222222222222222222222222222222222222222222";
    const HASH_B_NONCE: &str = "00000000020d3556";

    fn fast_config() -> DispatchConfig {
        DispatchConfig {
            timeout: Duration::from_millis(250),
            revalidate: true,
        }
    }

    /// Spawn a worker and wait until its work-topic subscription is live,
    /// so a test's publish cannot race the spawn.
    async fn attach_worker(
        bus: &Arc<InMemoryWorkBus>,
        solver: Arc<dyn Solver>,
    ) -> watch::Sender<bool> {
        let attached_before = bus.subscriber_count(work_bus::WORK_TOPIC);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        tokio::spawn(BackendWorker::new(Arc::clone(bus) as Arc<dyn WorkBus>, solver, shutdown_rx).run());
        while bus.subscriber_count(work_bus::WORK_TOPIC) <= attached_before {
            tokio::task::yield_now().await;
        }
        shutdown_tx
    }

    #[tokio::test]
    async fn round_trip_returns_the_backend_nonce_unchanged() {
        let bus = Arc::new(InMemoryWorkBus::new());
        let _shutdown = attach_worker(
            &bus,
            Arc::new(SimulatedSolver::with_nonce(HASH_NONCE.parse().unwrap())),
        )
        .await;

        let dispatcher = BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, fast_config());
        let nonce = dispatcher.solve(HASH.parse().unwrap()).await.unwrap();
        assert_eq!(nonce.to_string(), HASH_NONCE);
        assert_eq!(dispatcher.counters().snapshot().completed, 1);
    }

    #[tokio::test]
    async fn sequential_solves_are_idempotent() {
        let bus = Arc::new(InMemoryWorkBus::new());
        let _shutdown = attach_worker(
            &bus,
            Arc::new(SimulatedSolver::with_nonce(HASH_NONCE.parse().unwrap())),
        )
        .await;

        let dispatcher = BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, fast_config());
        let hash: WorkHash = HASH.parse().unwrap();
        let first = dispatcher.solve(hash).await.unwrap();
        let second = dispatcher.solve(hash).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn no_backend_means_timeout_not_hang() {
        let bus = Arc::new(InMemoryWorkBus::new());
        let dispatcher = BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, fast_config());

        let started = Instant::now();
        let err = dispatcher.solve(HASH.parse().unwrap()).await.unwrap_err();
        assert!(err.is_timeout());
        // Bounded by timeout + scheduling slack, far from unbounded.
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(dispatcher.counters().snapshot().timeouts, 1);

        // The reply subscription was dropped with the call.
        assert_eq!(bus.topic_count(), 0);
    }

    #[tokio::test]
    async fn concurrent_solves_for_distinct_hashes_never_cross_talk() {
        let bus = Arc::new(InMemoryWorkBus::new());

        // One worker answers everything with A's nonce, the other with
        // B's. Cross-delivery would hand a caller the wrong nonce, which
        // re-validation turns into a loud failure - so a fully green run
        // proves reply topics never crossed.
        struct PickySolver {
            inner: SimulatedSolver,
            only: WorkHash,
        }

        #[async_trait]
        impl Solver for PickySolver {
            fn descriptor(&self) -> &work_backends::BackendDescriptor {
                self.inner.descriptor()
            }

            fn layout(&self) -> work_core::NonceLayout {
                self.inner.layout()
            }

            async fn solve_raw(&self, hash: &WorkHash) -> work_backends::Result<work_core::RawOutput> {
                if *hash != self.only {
                    return Err(work_backends::BackendError::Device(
                        "not my hash".to_string(),
                    ));
                }
                self.inner.solve_raw(hash).await
            }
        }

        let hash_a: WorkHash = HASH_A.parse().unwrap();
        let hash_b: WorkHash = HASH_B.parse().unwrap();

        let _shutdown_a = attach_worker(
            &bus,
            Arc::new(PickySolver {
                inner: SimulatedSolver::with_nonce(HASH_A_NONCE.parse().unwrap()),
                only: hash_a,
            }),
        )
        .await;
        let _shutdown_b = attach_worker(
            &bus,
            Arc::new(PickySolver {
                inner: SimulatedSolver::with_nonce(HASH_B_NONCE.parse().unwrap()),
                only: hash_b,
            }),
        )
        .await;

        let dispatcher =
            Arc::new(BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, fast_config()));

        let task_a = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.solve(hash_a).await })
        };
        let task_b = {
            let dispatcher = Arc::clone(&dispatcher);
            tokio::spawn(async move { dispatcher.solve(hash_b).await })
        };

        let nonce_a = task_a.await.unwrap().unwrap();
        let nonce_b = task_b.await.unwrap().unwrap();
        assert_eq!(nonce_a.to_string(), HASH_A_NONCE);
        assert_eq!(nonce_b.to_string(), HASH_B_NONCE);
    }

    #[tokio::test]
    async fn malformed_input_never_reaches_the_bus() {
        let bus = Arc::new(InMemoryWorkBus::new());
        let mut work_items = bus.subscribe(work_bus::WORK_TOPIC);
        let dispatcher = BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, fast_config());

        for bad in ["not-hex", &HASH[..63]] {
            let err = dispatcher.solve_hex(bad).await.unwrap_err();
            assert!(err.is_client_error(), "{bad}");
        }
        // Nothing was published on the work topic.
        assert!(matches!(work_items.try_recv(), Ok(None)));
        assert_eq!(dispatcher.counters().snapshot().dispatched, 0);
    }

    #[tokio::test]
    async fn sub_threshold_reply_is_a_validation_failure() {
        let bus = Arc::new(InMemoryWorkBus::new());
        // A backend echoing a nonce that does not solve this hash.
        let _shutdown = attach_worker(
            &bus,
            Arc::new(SimulatedSolver::with_nonce(
                "0000000000000000".parse().unwrap(),
            )),
        )
        .await;

        let dispatcher = BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, fast_config());
        let err = dispatcher.solve(HASH.parse().unwrap()).await.unwrap_err();
        assert!(matches!(err, DispatchError::ValidationFailure { .. }));
        assert_eq!(dispatcher.counters().snapshot().validation_failures, 1);
    }

    #[tokio::test]
    async fn revalidation_can_be_disabled_by_configuration() {
        let bus = Arc::new(InMemoryWorkBus::new());
        let _shutdown = attach_worker(
            &bus,
            Arc::new(SimulatedSolver::with_nonce(
                "0000000000000000".parse().unwrap(),
            )),
        )
        .await;

        let dispatcher = BusDispatcher::new(
            Arc::clone(&bus) as Arc<dyn WorkBus>,
            DispatchConfig {
                timeout: Duration::from_millis(250),
                revalidate: false,
            },
        );
        let nonce = dispatcher.solve(HASH.parse().unwrap()).await.unwrap();
        assert_eq!(nonce.to_string(), "0000000000000000");
    }
}
