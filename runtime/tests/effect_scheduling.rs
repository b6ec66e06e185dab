//! Integration tests for effect scheduling policies.
//!
//! Covers the two composition strategies the store guarantees:
//! - `Serial`: same-key effects apply in submission order, never interleaved
//! - `Supersede`: a newer same-key fetch invalidates an older in-flight one

use fitsync_core::effect::{Effect, OpKey};
use fitsync_core::reducer::Reducer;
use fitsync_core::{SmallVec, smallvec};
use fitsync_runtime::{Store, StoreError};
use std::time::Duration;

const PROBE_WRITE: OpKey = OpKey("probe.write");
const PROBE_FETCH: OpKey = OpKey("probe.fetch");

#[derive(Clone, Debug, Default)]
struct ProbeState {
    log: Vec<String>,
    value: Option<u32>,
}

#[derive(Clone, Debug)]
enum ProbeAction {
    RunSerial { label: String, delay_ms: u64 },
    RunFetch { label: String, value: u32, delay_ms: u64 },
    RunDelay { label: String, delay_ms: u64 },
    Applied { label: String },
    FetchDone { label: String, value: u32 },
}

#[derive(Clone)]
struct ProbeEnv;

#[derive(Clone, Debug)]
struct ProbeReducer;

impl Reducer for ProbeReducer {
    type State = ProbeState;
    type Action = ProbeAction;
    type Environment = ProbeEnv;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        _env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ProbeAction::RunSerial { label, delay_ms } => {
                smallvec![Effect::serial(PROBE_WRITE, async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Some(ProbeAction::Applied { label })
                })]
            },
            ProbeAction::RunFetch { label, value, delay_ms } => {
                smallvec![Effect::supersede(PROBE_FETCH, async move {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    Some(ProbeAction::FetchDone { label, value })
                })]
            },
            ProbeAction::RunDelay { label, delay_ms } => {
                smallvec![Effect::Delay {
                    duration: Duration::from_millis(delay_ms),
                    action: Box::new(ProbeAction::Applied { label }),
                }]
            },
            ProbeAction::Applied { label } => {
                state.log.push(label);
                SmallVec::new()
            },
            ProbeAction::FetchDone { label, value } => {
                state.log.push(label);
                state.value = Some(value);
                SmallVec::new()
            },
        }
    }
}

fn probe_store() -> Store<ProbeState, ProbeAction, ProbeEnv, ProbeReducer> {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Store::new(ProbeState::default(), ProbeReducer, ProbeEnv)
}

#[tokio::test]
async fn serial_effects_apply_in_submission_order() {
    let store = probe_store();

    // The first job sleeps far longer than the second; only FIFO queueing
    // can make it win.
    let mut first = store
        .send(ProbeAction::RunSerial { label: "first".to_string(), delay_ms: 80 })
        .await
        .unwrap();
    let mut second = store
        .send(ProbeAction::RunSerial { label: "second".to_string(), delay_ms: 5 })
        .await
        .unwrap();

    first.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
    second.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let log = store.state(|s| s.log.clone()).await;
    assert_eq!(log, ["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn serial_effects_interleave_nothing_across_many_submissions() {
    let store = probe_store();
    let mut handles = Vec::new();

    for i in 0..6 {
        let delay = if i % 2 == 0 { 30 } else { 2 };
        let handle = store
            .send(ProbeAction::RunSerial { label: format!("w{i}"), delay_ms: delay })
            .await
            .unwrap();
        handles.push(handle);
    }

    for handle in &mut handles {
        handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
    }

    let log = store.state(|s| s.log.clone()).await;
    let expected: Vec<String> = (0..6).map(|i| format!("w{i}")).collect();
    assert_eq!(log, expected);
}

#[tokio::test]
async fn newer_fetch_supersedes_older_in_flight_one() {
    let store = probe_store();

    let mut slow = store
        .send(ProbeAction::RunFetch { label: "slow".to_string(), value: 1, delay_ms: 100 })
        .await
        .unwrap();
    let mut fast = store
        .send(ProbeAction::RunFetch { label: "fast".to_string(), value: 2, delay_ms: 5 })
        .await
        .unwrap();

    fast.wait_with_timeout(Duration::from_secs(5)).await.unwrap();
    slow.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let (log, value) = store.state(|s| (s.log.clone(), s.value)).await;
    assert_eq!(log, ["fast".to_string()], "stale fetch result must be dropped");
    assert_eq!(value, Some(2));
}

#[tokio::test]
async fn send_and_wait_for_returns_matching_terminal_action() {
    let store = probe_store();

    let result = store
        .send_and_wait_for(
            ProbeAction::RunFetch { label: "only".to_string(), value: 7, delay_ms: 5 },
            |a| matches!(a, ProbeAction::FetchDone { .. }),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    match result {
        ProbeAction::FetchDone { value, .. } => assert_eq!(value, 7),
        other => panic!("unexpected action: {other:?}"),
    }
}

#[tokio::test]
async fn delay_effect_dispatches_after_sleep() {
    let store = probe_store();

    let mut handle = store
        .send(ProbeAction::RunDelay { label: "later".to_string(), delay_ms: 10 })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let log = store.state(|s| s.log.clone()).await;
    assert_eq!(log, ["later".to_string()]);
}

#[tokio::test]
async fn shutdown_rejects_new_actions() {
    let store = probe_store();
    store.shutdown(Duration::from_secs(1)).await.unwrap();

    let result = store
        .send(ProbeAction::RunDelay { label: "x".to_string(), delay_ms: 1 })
        .await;
    assert!(matches!(result, Err(StoreError::ShutdownInProgress)));
}

#[tokio::test]
async fn shutdown_waits_for_pending_effects() {
    let store = probe_store();

    let _handle = store
        .send(ProbeAction::RunSerial { label: "draining".to_string(), delay_ms: 30 })
        .await
        .unwrap();

    // Returns Ok only once the in-flight serial job has drained. Terminal
    // actions arriving during shutdown are rejected.
    store.shutdown(Duration::from_secs(5)).await.unwrap();
}

#[tokio::test]
async fn observers_see_effect_produced_actions() {
    let store = probe_store();
    let mut rx = store.subscribe_actions();

    let mut handle = store
        .send(ProbeAction::RunFetch { label: "watched".to_string(), value: 3, delay_ms: 5 })
        .await
        .unwrap();
    handle.wait_with_timeout(Duration::from_secs(5)).await.unwrap();

    let observed = rx.recv().await.unwrap();
    assert!(matches!(observed, ProbeAction::FetchDone { value: 3, .. }));
}
