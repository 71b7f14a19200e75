use super::*;

use std::{sync::Arc, time::Duration};

use anyhow::Result;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use shared::{
    domain::{Record, Store, SubmissionStatus, TrackingStatus},
    protocol::SubmissionPayload,
};
use tokio::{
    net::TcpListener,
    runtime::Handle,
    sync::{broadcast, Mutex},
};

const HOOK_PATH: &str = "/webhook/order-return";

#[derive(Clone)]
struct HookState {
    status: StatusCode,
    body: String,
    delay: Duration,
    received: Arc<Mutex<Vec<ReceivedHook>>>,
}

#[derive(Debug, Clone)]
struct ReceivedHook {
    content_type: Option<String>,
    payload: SubmissionPayload,
}

async fn handle_hook(
    State(state): State<HookState>,
    headers: HeaderMap,
    Json(payload): Json<SubmissionPayload>,
) -> (StatusCode, String) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    state.received.lock().await.push(ReceivedHook {
        content_type,
        payload,
    });
    if !state.delay.is_zero() {
        tokio::time::sleep(state.delay).await;
    }
    (state.status, state.body.clone())
}

async fn spawn_hook_server(
    status: StatusCode,
    body: &str,
    delay: Duration,
) -> Result<(String, Arc<Mutex<Vec<ReceivedHook>>>)> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = HookState {
        status,
        body: body.to_string(),
        delay,
        received: Arc::clone(&received),
    };
    let app = Router::new()
        .route(HOOK_PATH, post(handle_hook))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}{HOOK_PATH}"), received))
}

fn fast_settings(endpoint_url: String) -> SubmissionSettings {
    SubmissionSettings {
        request_timeout: Duration::from_millis(500),
        success_reset_delay: Duration::from_millis(100),
        error_reset_delay: Duration::from_millis(150),
        ..SubmissionSettings::with_endpoint(endpoint_url)
    }
}

fn order_one() -> Record {
    Record {
        order_number: "ORD-1".to_string(),
        tracking_status: TrackingStatus::Tracked,
        link: String::new(),
        store: Store::A2k,
        action: String::new(),
    }
}

fn controller_for(settings: SubmissionSettings) -> (SubmissionController, RecordStore) {
    let store = RecordStore::new();
    let controller = SubmissionController::new(settings, store.clone(), Handle::current())
        .expect("controller");
    store.set_order_number("ORD-1");
    store.set_tracking_status(TrackingStatus::Tracked);
    store.set_store(Store::A2k);
    (controller, store)
}

async fn wait_for(rx: &mut broadcast::Receiver<ControllerEvent>, expected: ControllerEvent) {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) if event == expected => return,
                Ok(_) => continue,
                Err(err) => panic!("event stream closed before {expected:?}: {err}"),
            }
        }
    })
    .await
    .expect("expected event in time");
}

#[tokio::test]
async fn confirmed_submission_posts_json_and_clears_record() {
    let (url, received) = spawn_hook_server(
        StatusCode::OK,
        r#"{"message":"Workflow was started"}"#,
        Duration::ZERO,
    )
    .await
    .expect("spawn server");
    let (controller, store) = controller_for(fast_settings(url));
    let mut events = controller.subscribe();

    let outcome = controller.submit_current().outcome().await.expect("dispatched");
    assert!(outcome.is_ok(), "unexpected failure: {outcome:?}");
    assert!(store.get().is_empty());

    let hooks = received.lock().await.clone();
    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(hooks[0].payload, SubmissionPayload::from(&order_one()));

    wait_for(&mut events, ControllerEvent::StatusChanged(SubmissionStatus::Success)).await;
    wait_for(&mut events, ControllerEvent::StatusChanged(SubmissionStatus::Idle)).await;
    wait_for(&mut events, ControllerEvent::FocusFirstField).await;
}

#[tokio::test]
async fn workflow_failure_message_keeps_record() {
    let (url, received) = spawn_hook_server(
        StatusCode::OK,
        r#"{"message":"Workflow failed"}"#,
        Duration::ZERO,
    )
    .await
    .expect("spawn server");
    let (controller, store) = controller_for(fast_settings(url));
    let mut events = controller.subscribe();

    let err = controller
        .submit_current()
        .outcome()
        .await
        .expect("dispatched")
        .expect_err("rejected");
    assert_eq!(err.kind(), SubmitErrorKind::Rejected);
    assert_eq!(store.get(), order_one());
    assert_eq!(received.lock().await.len(), 1);

    wait_for(&mut events, ControllerEvent::StatusChanged(SubmissionStatus::Error)).await;
    wait_for(&mut events, ControllerEvent::StatusChanged(SubmissionStatus::Idle)).await;
    assert_eq!(controller.status(), SubmissionStatus::Idle);
}

#[tokio::test]
async fn server_error_status_is_a_transport_failure() {
    let (url, _received) = spawn_hook_server(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"message":"Workflow was started"}"#,
        Duration::ZERO,
    )
    .await
    .expect("spawn server");
    let (controller, store) = controller_for(fast_settings(url));

    let err = controller
        .submit_current()
        .outcome()
        .await
        .expect("dispatched")
        .expect_err("500");
    assert!(matches!(
        err,
        SubmitError::Transport(TransportError::Status { status: 500 })
    ));
    assert_eq!(controller.status(), SubmissionStatus::Error);
    assert_eq!(store.get(), order_one());
}

#[tokio::test]
async fn slow_endpoint_times_out_without_late_success() {
    let (url, received) = spawn_hook_server(
        StatusCode::OK,
        r#"{"message":"Workflow was started"}"#,
        Duration::from_millis(800),
    )
    .await
    .expect("spawn server");
    let settings = SubmissionSettings {
        request_timeout: Duration::from_millis(200),
        ..fast_settings(url)
    };
    let (controller, store) = controller_for(settings);
    let mut events = controller.subscribe();

    let err = controller
        .submit_current()
        .outcome()
        .await
        .expect("dispatched")
        .expect_err("timeout");
    assert_eq!(err.kind(), SubmitErrorKind::Timeout);
    assert_eq!(received.lock().await.len(), 1);

    tokio::time::sleep(Duration::from_millis(1_000)).await;
    assert_eq!(controller.status(), SubmissionStatus::Idle);
    assert_eq!(store.get(), order_one());

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert!(!seen.contains(&ControllerEvent::StatusChanged(SubmissionStatus::Success)));
}

#[tokio::test]
async fn unreachable_endpoint_is_a_transport_failure() {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let (controller, store) = controller_for(fast_settings(format!("http://{addr}{HOOK_PATH}")));
    let err = controller
        .submit_current()
        .outcome()
        .await
        .expect("dispatched")
        .expect_err("connection refused");
    assert_eq!(err.kind(), SubmitErrorKind::Transport);
    assert_eq!(store.get(), order_one());
}
