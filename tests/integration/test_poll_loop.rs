//! End-to-end tests for the poll loop.
//!
//! The real HTTP clients talk to in-process `axum` servers standing in for
//! the homework review API and the Telegram Bot API.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use review_watch_clients::{PracticumClient, TelegramChannel};
use review_watch_core::{
    CursorStart, ErrorCategory, LoopSettings, PollCursor, PollLoop, TickOutcome, WatchError,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const APPROVED_HW1: &str =
    "Изменился статус проверки работы \"hw1\". Работа проверена: ревьюеру всё понравилось. Ура!";

// ============================================================================
// Mock servers
// ============================================================================

/// A canned reply of the mock homework API.
#[derive(Clone)]
enum Reply {
    Json(Value),
    Status(StatusCode),
}

/// Shared state of the mock homework API.
#[derive(Clone, Default)]
struct ApiMock {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    seen_from_dates: Arc<Mutex<Vec<String>>>,
    seen_auth: Arc<Mutex<Vec<String>>>,
}

impl ApiMock {
    fn with_replies(replies: impl IntoIterator<Item = Reply>) -> Self {
        let mock = Self::default();
        mock.replies
            .lock()
            .expect("lock replies")
            .extend(replies);
        mock
    }

    fn from_dates(&self) -> Vec<String> {
        self.seen_from_dates.lock().expect("lock from_dates").clone()
    }

    fn auth_headers(&self) -> Vec<String> {
        self.seen_auth.lock().expect("lock auth").clone()
    }
}

async fn homework_statuses(
    State(mock): State<ApiMock>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    mock.seen_from_dates
        .lock()
        .expect("lock from_dates")
        .push(params.get("from_date").cloned().unwrap_or_default());
    mock.seen_auth.lock().expect("lock auth").push(
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string(),
    );

    let reply = mock
        .replies
        .lock()
        .expect("lock replies")
        .pop_front()
        .unwrap_or_else(|| Reply::Json(json!({"homeworks": []})));

    match reply {
        Reply::Json(body) => Json(body).into_response(),
        Reply::Status(status) => (status, "unavailable").into_response(),
    }
}

/// Shared state of the mock Telegram Bot API.
#[derive(Clone, Default)]
struct TelegramMock {
    texts: Arc<Mutex<Vec<String>>>,
    reject: bool,
}

impl TelegramMock {
    fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    fn texts(&self) -> Vec<String> {
        self.texts.lock().expect("lock texts").clone()
    }
}

async fn send_message(State(mock): State<TelegramMock>, Json(body): Json<Value>) -> Json<Value> {
    if mock.reject {
        return Json(json!({"ok": false, "description": "Bad Request: chat not found"}));
    }
    assert_eq!(body["chat_id"], "4242", "unexpected chat id");
    let text = body["text"].as_str().unwrap_or_default().to_string();
    mock.texts.lock().expect("lock texts").push(text);
    Json(json!({"ok": true, "result": {"message_id": 1}}))
}

/// Serves `router` on an ephemeral port and returns its base URL.
async fn spawn_test_server(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("Failed to get local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("Server failed");
    });
    format!("http://{addr}")
}

/// Starts both mocks and builds a loop wired to them.
async fn start_loop(
    api_mock: &ApiMock,
    telegram_mock: &TelegramMock,
    settings: LoopSettings,
) -> PollLoop<PracticumClient, TelegramChannel> {
    let api_base = spawn_test_server(
        Router::new()
            .route("/api/user_api/homework_statuses/", get(homework_statuses))
            .with_state(api_mock.clone()),
    )
    .await;
    let telegram_base = spawn_test_server(
        Router::new()
            .route("/:bot/sendMessage", post(send_message))
            .with_state(telegram_mock.clone()),
    )
    .await;

    let api = PracticumClient::with_endpoint(
        format!("{api_base}/api/user_api/homework_statuses/"),
        "practicum-token",
    )
    .expect("Failed to build API client");
    let channel = TelegramChannel::with_base_url(telegram_base, "123:bot-token", "4242")
        .expect("Failed to build Telegram channel");

    PollLoop::new(api, channel, settings)
}

fn settings() -> LoopSettings {
    LoopSettings {
        cursor_start: CursorStart::At(1),
        ..LoopSettings::default()
    }
}

fn approved_hw1() -> Reply {
    Reply::Json(json!({
        "homeworks": [{"status": "approved", "homework_name": "hw1"}],
        "current_date": 1000
    }))
}

// ============================================================================
// Scenarios
// ============================================================================

/// A fresh approval is delivered and the cursor moves to `current_date`.
#[tokio::test]
async fn test_approved_status_is_delivered() {
    let api = ApiMock::with_replies([approved_hw1()]);
    let telegram = TelegramMock::default();
    let mut poll = start_loop(&api, &telegram, settings()).await;

    let outcome = poll.step().await;

    assert_eq!(outcome, TickOutcome::Notified(APPROVED_HW1.to_string()));
    assert_eq!(telegram.texts(), vec![APPROVED_HW1.to_string()]);
    assert_eq!(poll.state().cursor, PollCursor::new(1000));
    assert_eq!(api.from_dates(), vec!["1"]);
    assert_eq!(api.auth_headers(), vec!["OAuth practicum-token"]);
}

/// The same response twice produces a single message.
#[tokio::test]
async fn test_unchanged_status_is_not_resent() {
    let api = ApiMock::with_replies([approved_hw1(), approved_hw1()]);
    let telegram = TelegramMock::default();
    let mut poll = start_loop(&api, &telegram, settings()).await;

    assert!(matches!(poll.step().await, TickOutcome::Notified(_)));
    assert_eq!(poll.step().await, TickOutcome::Unchanged);

    assert_eq!(telegram.texts().len(), 1);
    assert_eq!(api.from_dates(), vec!["1", "1000"]);
}

/// An empty homework list is a quiet tick.
#[tokio::test]
async fn test_empty_homeworks_takes_no_action() {
    let api = ApiMock::with_replies([
        Reply::Json(json!({"homeworks": []})),
        Reply::Json(json!({"homeworks": [], "current_date": 77})),
    ]);
    let telegram = TelegramMock::default();
    let mut poll = start_loop(&api, &telegram, settings()).await;

    assert_eq!(poll.step().await, TickOutcome::NoHomeworks);
    assert_eq!(poll.state().cursor, PollCursor::new(1));

    assert_eq!(poll.step().await, TickOutcome::NoHomeworks);
    assert_eq!(poll.state().cursor, PollCursor::new(77));

    assert!(telegram.texts().is_empty());
}

/// An unknown status is an error; the loop survives and the cursor stays.
#[tokio::test]
async fn test_unknown_status_is_recoverable() {
    let api = ApiMock::with_replies([
        Reply::Json(json!({"homeworks": [{"status": "unknown_status", "homework_name": "hw2"}]})),
        approved_hw1(),
    ]);
    let telegram = TelegramMock::default();
    let mut poll = start_loop(&api, &telegram, settings()).await;

    assert_eq!(
        poll.step().await,
        TickOutcome::Failed(ErrorCategory::TickRecoverable)
    );
    assert_eq!(poll.state().cursor, PollCursor::new(1));
    assert!(telegram.texts().is_empty());

    assert!(matches!(poll.step().await, TickOutcome::Notified(_)));
}

/// A list body fails validation with a not-a-mapping error.
#[tokio::test]
async fn test_list_body_is_rejected() {
    let api = ApiMock::with_replies([Reply::Json(json!([{"homeworks": []}]))]);
    let telegram = TelegramMock::default();
    let mut poll = start_loop(&api, &telegram, settings()).await;

    let err = poll.tick().await.expect_err("list body must fail");
    assert!(
        matches!(err, WatchError::NotAMapping { found: "list" }),
        "got: {err:?}"
    );
    assert_eq!(poll.state().cursor, PollCursor::new(1));
}

/// A 5xx from the API is reported through the chat once, then recovers.
#[tokio::test]
async fn test_server_error_is_reported_once() {
    let api = ApiMock::with_replies([
        Reply::Status(StatusCode::SERVICE_UNAVAILABLE),
        Reply::Status(StatusCode::SERVICE_UNAVAILABLE),
        approved_hw1(),
    ]);
    let telegram = TelegramMock::default();
    let settings = LoopSettings {
        report_failures: true,
        ..settings()
    };
    let mut poll = start_loop(&api, &telegram, settings).await;

    assert_eq!(
        poll.step().await,
        TickOutcome::Failed(ErrorCategory::TickRecoverable)
    );
    assert_eq!(
        poll.step().await,
        TickOutcome::Failed(ErrorCategory::TickRecoverable)
    );
    assert!(matches!(poll.step().await, TickOutcome::Notified(_)));

    assert_eq!(
        telegram.texts(),
        vec![
            "Сбой в работе программы: Homework API returned status 503".to_string(),
            APPROVED_HW1.to_string(),
        ]
    );
}

/// A rejected Telegram delivery is its own failure category.
#[tokio::test]
async fn test_rejected_delivery_is_distinct() {
    let api = ApiMock::with_replies([approved_hw1()]);
    let telegram = TelegramMock::rejecting();
    let mut poll = start_loop(&api, &telegram, settings()).await;

    assert_eq!(
        poll.step().await,
        TickOutcome::Failed(ErrorCategory::DeliveryFailure)
    );
    assert_eq!(poll.state().cursor, PollCursor::new(1000));
}

/// `run` keeps polling through failures.
#[tokio::test]
async fn test_run_survives_failures() {
    let api = ApiMock::with_replies([
        Reply::Status(StatusCode::BAD_GATEWAY),
        Reply::Json(json!({"current_date": 5})),
        approved_hw1(),
    ]);
    let telegram = TelegramMock::default();
    let settings = LoopSettings {
        retry_period: Duration::from_millis(10),
        ..settings()
    };
    let mut poll = start_loop(&api, &telegram, settings).await;

    let result = tokio::time::timeout(Duration::from_secs(2), poll.run()).await;
    assert!(result.is_err(), "run() must never complete");

    assert!(api.from_dates().len() >= 3);
    assert_eq!(telegram.texts(), vec![APPROVED_HW1.to_string()]);
    assert_eq!(poll.state().cursor, PollCursor::new(1000));
}
