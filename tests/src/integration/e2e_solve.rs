//! End-to-end solve flow: HTTP body in, validated nonce out.

#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use std::time::Duration;

#[cfg(test)]
use axum::body::Body;
#[cfg(test)]
use axum::http::{header, Request, StatusCode};
#[cfg(test)]
use http_body_util::BodyExt;
#[cfg(test)]
use tokio::sync::watch;
#[cfg(test)]
use tower::ServiceExt;

#[cfg(test)]
use work_backends::{BackendDescriptor, BackendKind, BackendWorker, SimulatedSolver, Solver};
#[cfg(test)]
use work_bus::{InMemoryWorkBus, WorkBus, WORK_TOPIC};
#[cfg(test)]
use work_core::{validate, Nonce, WorkHash};
#[cfg(test)]
use work_dispatch::{BusDispatcher, DirectDispatcher, DispatchConfig};
#[cfg(test)]
use work_gateway::AppState;

/// The reference pair the validation fixtures are pinned to.
#[cfg(test)]
const REFERENCE_HASH: &str = "C8E5B875778702445B25657276ABC56AA9910B283537CA438B2CC59B0CF93712";
#[cfg(test)]
const REFERENCE_NONCE: &str = "00000000005f9505";

#[cfg(test)]
fn dispatch_config() -> DispatchConfig {
    DispatchConfig {
        timeout: Duration::from_millis(500),
        revalidate: true,
    }
}

/// Bring up bus + worker + coordinator + gateway, returning the router and
/// the worker's stop handle.
#[cfg(test)]
async fn full_stack(nonce_hex: &str) -> (axum::Router, watch::Sender<bool>) {
    let bus: Arc<InMemoryWorkBus> = Arc::new(InMemoryWorkBus::new());
    let solver: Arc<dyn Solver> = Arc::new(SimulatedSolver::with_nonce(
        nonce_hex.parse().expect("fixture nonce"),
    ));
    let descriptor = Arc::new(solver.descriptor().clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(
        BackendWorker::new(Arc::clone(&bus) as Arc<dyn WorkBus>, solver, shutdown_rx).run(),
    );
    while bus.subscriber_count(WORK_TOPIC) == 0 {
        tokio::task::yield_now().await;
    }

    let dispatcher = BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, dispatch_config());
    let counters = dispatcher.counters();
    let router = work_gateway::router(AppState {
        dispatcher: Arc::new(dispatcher),
        backend: descriptor,
        counters,
    });
    (router, shutdown_tx)
}

#[cfg(test)]
fn solve_request(hash: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(format!("{{\"hash\": \"{hash}\"}}")))
        .expect("request")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reference_hash_round_trips_to_a_validated_nonce() {
        let (app, _shutdown) = full_stack(REFERENCE_NONCE).await;

        let response = app.oneshot(solve_request(REFERENCE_HASH)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let work = json["work"].as_str().unwrap();
        assert_eq!(work, REFERENCE_NONCE);

        // The response body really is a solution for the requested hash.
        let hash: WorkHash = REFERENCE_HASH.parse().unwrap();
        let nonce: Nonce = work.parse().unwrap();
        assert!(validate(&nonce, &hash));
    }

    #[tokio::test]
    async fn same_request_twice_gets_the_same_answer() {
        let (app, _shutdown) = full_stack(REFERENCE_NONCE).await;

        let mut answers = Vec::new();
        for _ in 0..2 {
            let response = app
                .clone()
                .oneshot(solve_request(REFERENCE_HASH))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            answers.push(json["work"].as_str().unwrap().to_string());
        }
        assert_eq!(answers[0], answers[1]);
    }

    #[tokio::test]
    async fn no_backend_attached_times_out_as_504() {
        // Coordinator and gateway, but no worker on the work topic.
        let bus: Arc<InMemoryWorkBus> = Arc::new(InMemoryWorkBus::new());
        let dispatcher =
            BusDispatcher::new(Arc::clone(&bus) as Arc<dyn WorkBus>, dispatch_config());
        let counters = dispatcher.counters();
        let app = work_gateway::router(AppState {
            dispatcher: Arc::new(dispatcher),
            backend: Arc::new(BackendDescriptor {
                kind: BackendKind::Simulated,
                name: "absent".to_string(),
            }),
            counters,
        });

        let response = app.oneshot(solve_request(REFERENCE_HASH)).await.unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);

        // The abandoned reply topic was cleaned up with the call.
        assert_eq!(bus.topic_count(), 0);
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_before_dispatch() {
        let (app, _shutdown) = full_stack(REFERENCE_NONCE).await;

        let response = app
            .clone()
            .oneshot(solve_request("not-hex"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(solve_request(&REFERENCE_HASH[..63]))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn direct_mode_serves_the_same_contract() {
        let solver: Arc<dyn Solver> = Arc::new(SimulatedSolver::with_nonce(
            REFERENCE_NONCE.parse().unwrap(),
        ));
        let descriptor = Arc::new(solver.descriptor().clone());
        let dispatcher = DirectDispatcher::new(solver, dispatch_config());
        let counters = dispatcher.counters();
        let app = work_gateway::router(AppState {
            dispatcher: Arc::new(dispatcher),
            backend: descriptor,
            counters,
        });

        let response = app.oneshot(solve_request(REFERENCE_HASH)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["work"], REFERENCE_NONCE);
    }

    #[tokio::test]
    async fn worker_shutdown_turns_later_requests_into_timeouts() {
        let (app, shutdown) = full_stack(REFERENCE_NONCE).await;

        // Served while the worker runs.
        let response = app
            .clone()
            .oneshot(solve_request(REFERENCE_HASH))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // Stop the worker; the service stays up and fails loudly instead
        // of hanging.
        shutdown.send(true).unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let response = app.oneshot(solve_request(REFERENCE_HASH)).await.unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    }
}
