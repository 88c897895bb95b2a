use std::{sync::Arc, time::Duration};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use tower::ServiceExt;

use tokio::{net::TcpListener, sync::oneshot};

use stopwatch::{
    create_router, serve,
    services::{ManualClock, MemoryStore},
    state::TimerPhase,
    AppState, TimerController,
};

struct TestApp {
    router: Router,
    controller: Arc<TimerController>,
    clock: Arc<ManualClock>,
}

impl TestApp {
    async fn new() -> Self {
        let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
        let controller = Arc::new(TimerController::new(
            Arc::new(MemoryStore::new()),
            clock.clone(),
            Duration::from_millis(500),
        ));
        controller.rehydrate().await;

        let state = Arc::new(AppState::new(Arc::clone(&controller), 0, "127.0.0.1".to_string()));
        Self {
            router: create_router(state),
            controller,
            clock,
        }
    }

    async fn call(&self, method: &str, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.call("POST", uri).await
    }

    async fn status(&self) -> Value {
        let (code, body) = self.call("GET", "/status").await;
        assert_eq!(code, StatusCode::OK);
        body
    }
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..100 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached");
}

#[tokio::test]
async fn test_idle_screen_shows_start_only() {
    let app = TestApp::new().await;
    let status = app.status().await;

    assert_eq!(status["timer"]["phase"], "idle");
    assert_eq!(status["timer"]["display"], "00:00:00");
    assert_eq!(status["buttons"], serde_json::json!(["START"]));
    assert!(status["reset_prompt"].is_null());
}

#[tokio::test]
async fn test_start_twice_conflicts() {
    let app = TestApp::new().await;

    let (code, body) = app.post("/start").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["timer"]["phase"], "running");

    let (code, body) = app.post("/start").await;
    assert_eq!(code, StatusCode::CONFLICT);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "cannot start a timer that is running");
    assert_eq!(body["timer"]["phase"], "running");

    let status = app.status().await;
    assert_eq!(status["buttons"], serde_json::json!(["RESET", "PAUSE"]));
    assert_eq!(status["last_action"], "start");
}

#[tokio::test]
async fn test_pause_and_resume_through_toggle() {
    let app = TestApp::new().await;
    let (code, _) = app.post("/pause").await;
    assert_eq!(code, StatusCode::CONFLICT);
    let (code, _) = app.post("/toggle").await;
    assert_eq!(code, StatusCode::CONFLICT);

    app.post("/start").await;
    app.clock.advance(Duration::from_secs(5));

    let (code, body) = app.post("/toggle").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "paused");
    assert_eq!(body["timer"]["display"], "00:00:05");
    assert_eq!(body["timer"]["accumulated_ms"], 5000);

    let status = app.status().await;
    assert_eq!(status["buttons"], serde_json::json!(["RESET", "RESUME"]));
    assert_eq!(status["last_action"], "pause");

    let (code, body) = app.post("/resume").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "running");
    let (code, _) = app.post("/resume").await;
    assert_eq!(code, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reset_goes_through_confirmation() {
    let app = TestApp::new().await;
    app.post("/start").await;
    app.clock.advance(Duration::from_secs(42));

    let (code, body) = app.post("/reset").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "confirm");
    assert_eq!(body["reset_prompt"]["title"], "Reset timer?");
    let first = body["reset_prompt"]["id"].as_u64().unwrap();

    let (code, _) = app.post(&format!("/reset/{}/cancel", first)).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(app.status().await["timer"]["phase"], "running");

    let (_, body) = app.post("/reset").await;
    let second = body["reset_prompt"]["id"].as_u64().unwrap();
    assert_eq!(app.status().await["reset_prompt"]["id"], second);

    let (code, body) = app.post(&format!("/reset/{}/confirm", second)).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["timer"]["phase"], "idle");
    assert_eq!(body["timer"]["display"], "00:00:00");
    assert_eq!(body["timer"]["accumulated_ms"], 0);

    let (code, body) = app.post(&format!("/reset/{}/confirm", second)).await;
    assert_eq!(code, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_foreground_catches_up_after_background() {
    let app = TestApp::new().await;
    app.post("/start").await;

    let (code, body) = app.post("/lifecycle/background").await;
    assert_eq!(code, StatusCode::ACCEPTED);
    assert_eq!(body["event"], "background");
    wait_until(|| !app.controller.is_refreshing()).await;
    assert_eq!(app.status().await["timer"]["phase"], "running");

    app.clock.advance(Duration::from_secs(60));
    let (code, body) = app.post("/lifecycle/foreground").await;
    assert_eq!(code, StatusCode::ACCEPTED);
    assert_eq!(body["event"], "active");

    wait_until(|| app.controller.display() == "00:01:00").await;
    assert!(app.controller.is_refreshing());
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (code, body) = app.call("GET", "/health").await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_shutdown_unmounts_screen_and_flushes_writes() {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()));
    let controller = Arc::new(TimerController::new(store.clone(), clock, Duration::from_millis(500)));
    controller.rehydrate().await;

    let state = Arc::new(AppState::new(Arc::clone(&controller), 0, "127.0.0.1".to_string()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(serve(listener, state, async {
        let _ = stop_rx.await;
    }));

    controller.start().unwrap();
    assert!(controller.is_refreshing());

    stop_tx.send(()).unwrap();
    server.await.unwrap().unwrap();

    assert!(!controller.is_refreshing());
    assert_eq!(store.snapshot().unwrap()["started"], "true");

    // Unmounted screens stay stopped
    controller.pause().unwrap();
    controller.resume().unwrap();
    assert_eq!(controller.phase(), TimerPhase::Running);
    assert!(!controller.is_refreshing());
}
