use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex as StdMutex,
    },
    time::Duration,
};

use super::*;
use crate::backend::{HttpAuditBackend, DEFAULT_FUNCTION_NAME};
use async_trait::async_trait;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use shared::domain::Fidelity;
use tokio::{net::TcpListener, sync::Mutex};

/// Backend answering from a fixed script keyed by screen name, logging every
/// call start and finish.
struct ScriptedBackend {
    responses: HashMap<String, Result<Value, AuditError>>,
    log: Arc<StdMutex<Vec<String>>>,
}

impl ScriptedBackend {
    fn new(responses: Vec<(&str, Result<Value, AuditError>)>) -> Self {
        Self {
            responses: responses
                .into_iter()
                .map(|(key, response)| (key.to_string(), response))
                .collect(),
            log: Arc::new(StdMutex::new(Vec::new())),
        }
    }

    fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditBackend for ScriptedBackend {
    async fn invoke(&self, request: &AuditRequest) -> Result<AuditResult, AuditError> {
        let key = request.screen_name().unwrap_or("single").to_string();
        self.log.lock().unwrap().push(format!("start {key}"));
        tokio::time::sleep(Duration::from_millis(5)).await;
        self.log.lock().unwrap().push(format!("end {key}"));
        self.responses
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Ok(json!({"screen": key})))
            .map(AuditResult)
    }
}

/// Backend replaying its responses in call order.
struct SequenceBackend {
    responses: StdMutex<VecDeque<Result<Value, AuditError>>>,
}

impl SequenceBackend {
    fn new(responses: Vec<Result<Value, AuditError>>) -> Self {
        Self {
            responses: StdMutex::new(responses.into()),
        }
    }
}

#[async_trait]
impl AuditBackend for SequenceBackend {
    async fn invoke(&self, _request: &AuditRequest) -> Result<AuditResult, AuditError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AuditError::transport("no scripted response left")))
            .map(AuditResult)
    }
}

fn persona() -> PersonaId {
    PersonaId::new("accessibility-expert")
}

fn config() -> AuditConfig {
    AuditConfig::new(Fidelity::Medium, "onboarding")
}

fn frames(names: &[&str]) -> Vec<Frame> {
    names
        .iter()
        .map(|name| Frame::new(*name, format!("https://cdn.example/{name}.png")))
        .collect()
}

#[tokio::test]
async fn run_audit_returns_backend_result_unchanged() {
    let payload = json!({"score": 72, "findings": [{"title": "Low contrast"}]});
    let mut session = AuditSession::new(ScriptedBackend::new(vec![(
        "single",
        Ok(payload.clone()),
    )]));

    let result = session
        .run_audit("data:image/png;base64,AA", &persona(), &config())
        .await;

    assert_eq!(result, Some(AuditResult(payload.clone())));
    assert_eq!(session.result(), Some(&AuditResult(payload)));
    assert_eq!(session.error(), None);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn run_audit_reports_embedded_error_verbatim() {
    let mut session = AuditSession::new(ScriptedBackend::new(vec![(
        "single",
        Ok(json!({"error": "Rate limit exceeded, try again later"})),
    )]));

    let result = session.run_audit("AA", &persona(), &config()).await;

    assert_eq!(result, None);
    assert_eq!(session.error(), Some("Rate limit exceeded, try again later"));
    assert_eq!(session.result(), None);
    assert!(!session.is_loading());
}

#[tokio::test]
async fn run_audit_reports_transport_error() {
    let mut session = AuditSession::new(ScriptedBackend::new(vec![(
        "single",
        Err(AuditError::transport("failed to reach audit function: connection refused")),
    )]));

    assert_eq!(session.run_audit("AA", &persona(), &config()).await, None);
    assert_eq!(
        session.error(),
        Some("failed to reach audit function: connection refused")
    );
}

#[tokio::test]
async fn successful_run_clears_previous_error() {
    let mut session = AuditSession::new(SequenceBackend::new(vec![
        Err(AuditError::application("bad image")),
        Ok(json!({"score": 64})),
    ]));

    assert_eq!(session.run_audit("AA", &persona(), &config()).await, None);
    assert_eq!(session.error(), Some("bad image"));

    let result = session.run_audit("AA", &persona(), &config()).await;
    assert_eq!(result, Some(AuditResult(json!({"score": 64}))));
    assert_eq!(session.result(), Some(&AuditResult(json!({"score": 64}))));
    assert_eq!(session.error(), None);
}

#[tokio::test]
async fn blank_embedded_error_is_kept_verbatim() {
    let mut session =
        AuditSession::new(SequenceBackend::new(vec![Ok(json!({"error": "   "}))]));

    assert_eq!(session.run_audit("AA", &persona(), &config()).await, None);
    assert_eq!(session.error(), Some("   "));
}

#[tokio::test]
async fn zero_error_field_counts_as_success() {
    let payload = json!({"error": 0, "score": 3});
    let mut session = AuditSession::new(SequenceBackend::new(vec![Ok(payload.clone())]));

    let result = session.run_audit("AA", &persona(), &config()).await;

    assert_eq!(result, Some(AuditResult(payload)));
    assert_eq!(session.error(), None);
}

#[tokio::test]
async fn multi_screen_reports_every_frame_in_order() {
    let backend = ScriptedBackend::new(vec![
        ("login", Ok(json!({"score": 90}))),
        (
            "settings",
            Err(AuditError::transport(
                "audit function returned status 500 Internal Server Error",
            )),
        ),
        ("profile", Ok(json!({"error": "could not load image"}))),
        ("checkout", Ok(json!({"score": 40}))),
    ]);
    let input = frames(&["login", "settings", "profile", "checkout"]);
    let mut session = AuditSession::new(backend);

    let mut reported = Vec::new();
    session
        .run_multi_screen_audit(&input, &persona(), &config(), |index, screen| {
            reported.push((index, screen));
        })
        .await;

    assert_eq!(reported.len(), input.len());
    for (position, (index, screen)) in reported.iter().enumerate() {
        assert_eq!(*index, position);
        assert_eq!(screen.screen_name, input[position].name);
        assert_eq!(screen.screen_image_url, input[position].image_url);
        assert!(!screen.is_loading);
    }

    assert_eq!(reported[0].1.result, Some(AuditResult(json!({"score": 90}))));
    assert_eq!(
        reported[1].1.error.as_deref(),
        Some("audit function returned status 500 Internal Server Error")
    );
    assert_eq!(reported[1].1.result, None);
    assert_eq!(reported[2].1.error.as_deref(), Some("could not load image"));
    assert_eq!(reported[3].1.result, Some(AuditResult(json!({"score": 40}))));
    assert!(!session.is_loading());
}

#[tokio::test]
async fn multi_screen_issues_next_call_only_after_previous_completes() {
    let backend = Arc::new(ScriptedBackend::new(vec![(
        "b",
        Err(AuditError::application("nope")),
    )]));
    let log = backend.log.clone();
    let mut session = AuditSession::new(backend.clone());

    session
        .run_multi_screen_audit(&frames(&["a", "b", "c"]), &persona(), &config(), |index, _| {
            log.lock().unwrap().push(format!("done {index}"));
        })
        .await;

    assert_eq!(
        backend.log(),
        vec![
            "start a", "end a", "done 0", "start b", "end b", "done 1", "start c", "end c",
            "done 2",
        ]
    );
}

#[tokio::test]
async fn multi_screen_with_no_frames_makes_no_calls() {
    let backend = Arc::new(ScriptedBackend::new(vec![]));
    let mut session = AuditSession::new(backend.clone());
    let mut calls = 0;

    session
        .run_multi_screen_audit(&[], &persona(), &config(), |_, _| calls += 1)
        .await;

    assert_eq!(calls, 0);
    assert!(backend.log().is_empty());
    assert!(!session.is_loading());
}

#[derive(Clone, Default)]
struct AuditServerState {
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    screens: Arc<Mutex<Vec<String>>>,
}

async fn handle_audit(
    State(state): State<AuditServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let current = state.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
    state.max_in_flight.fetch_max(current, Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;

    let screen = body
        .get("screenName")
        .and_then(Value::as_str)
        .unwrap_or("single")
        .to_string();
    state.screens.lock().await.push(screen.clone());

    let response = if screen.starts_with("broken") {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"message": "worker crashed"})),
        )
    } else if screen.starts_with("rejected") {
        (StatusCode::OK, Json(json!({"error": format!("cannot audit {screen}")})))
    } else {
        (StatusCode::OK, Json(json!({"screen": screen, "score": 87})))
    };
    state.in_flight.fetch_sub(1, Ordering::SeqCst);
    response
}

async fn spawn_audit_server() -> anyhow::Result<(String, AuditServerState)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let state = AuditServerState::default();
    let app = Router::new()
        .route("/functions/v1/audit-design", post(handle_audit))
        .with_state(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((format!("http://{addr}/functions/v1"), state))
}

#[tokio::test]
async fn multi_screen_over_http_is_serialized_and_survives_failures() {
    let (url, state) = spawn_audit_server().await.expect("server");
    let backend = HttpAuditBackend::new(&url, DEFAULT_FUNCTION_NAME, None).expect("backend");
    let mut session = AuditSession::new(backend);
    let input = frames(&["home", "broken-cart", "rejected-search", "account"]);

    let mut reported: Vec<ScreenAuditResult> = Vec::new();
    session
        .run_multi_screen_audit(&input, &persona(), &config(), |index, screen| {
            assert_eq!(index, reported.len());
            reported.push(screen);
        })
        .await;

    assert_eq!(state.max_in_flight.load(Ordering::SeqCst), 1);
    assert_eq!(
        *state.screens.lock().await,
        vec!["home", "broken-cart", "rejected-search", "account"]
    );

    assert!(reported[0].succeeded());
    assert_eq!(
        reported[1].error.as_deref(),
        Some("audit function returned status 500 Internal Server Error")
    );
    assert_eq!(
        reported[2].error.as_deref(),
        Some("cannot audit rejected-search")
    );
    assert_eq!(
        reported[3].result,
        Some(AuditResult(json!({"screen": "account", "score": 87})))
    );
}
