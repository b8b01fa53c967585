//! In-process stand-in for the Claila API.
//!
//! Binds to an ephemeral port, records every call it receives and can be told
//! to fail at a given step or to stall the completion call.
#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Form, Router,
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use claila_relay::{
    routes::create_router,
    services::{claila::ClailaClient, models::Model, relay::ChatRelay, shaping::ResponseShape},
    state::{AppState, SharedState},
};
use tokio::net::TcpListener;
use tower::util::ServiceExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Seed,
    Token,
    Completion,
}

#[derive(Debug, Clone)]
pub struct ReceivedCall {
    pub step: Step,
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub form: HashMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct Behaviour {
    pub token: String,
    pub final_body: Vec<u8>,
    pub final_content_type: Option<String>,
    pub fail_at: Option<Step>,
    pub completion_delay: Duration,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            token: "  csrf-abc123\n".to_string(),
            final_body: br#"{"x":1}"#.to_vec(),
            final_content_type: Some("application/json".to_string()),
            fail_at: None,
            completion_delay: Duration::ZERO,
        }
    }
}

#[derive(Default)]
struct MockState {
    calls: Vec<ReceivedCall>,
    in_flight: usize,
    max_in_flight: usize,
}

#[derive(Clone)]
struct Shared {
    behaviour: Behaviour,
    state: Arc<Mutex<MockState>>,
}

pub struct MockUpstream {
    pub base_url: String,
    state: Arc<Mutex<MockState>>,
}

impl MockUpstream {
    pub async fn start(behaviour: Behaviour) -> Self {
        let state = Arc::new(Mutex::new(MockState::default()));
        let shared = Shared {
            behaviour,
            state: Arc::clone(&state),
        };

        let app = Router::new()
            .route("/api/v2/unichat1", post(handle_seed))
            .route("/api/v2/getcsrftoken", get(handle_token))
            .route("/api/v2/unichat1/{model}", post(handle_completion))
            .with_state(shared);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}/api/v2"),
            state,
        }
    }

    pub fn calls(&self) -> Vec<ReceivedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn steps(&self) -> Vec<Step> {
        self.calls().into_iter().map(|c| c.step).collect()
    }

    pub fn max_in_flight_completions(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

/// A base URL nothing listens on.
pub async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/v2")
}

fn header_map(headers: &HeaderMap) -> HashMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or("").to_string()))
        .collect()
}

fn record(shared: &Shared, step: Step, method: &str, path: String, headers: &HeaderMap, form: HashMap<String, String>) {
    shared.state.lock().unwrap().calls.push(ReceivedCall {
        step,
        method: method.to_string(),
        path,
        headers: header_map(headers),
        form,
    });
}

fn failure() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
}

async fn handle_seed(
    State(shared): State<Shared>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    record(&shared, Step::Seed, "POST", "/api/v2/unichat1".to_string(), &headers, form);
    if shared.behaviour.fail_at == Some(Step::Seed) {
        return failure();
    }
    (StatusCode::OK, r#"{"seeded":true}"#).into_response()
}

async fn handle_token(State(shared): State<Shared>, headers: HeaderMap) -> Response {
    record(&shared, Step::Token, "GET", "/api/v2/getcsrftoken".to_string(), &headers, HashMap::new());
    if shared.behaviour.fail_at == Some(Step::Token) {
        return failure();
    }
    (StatusCode::OK, shared.behaviour.token.clone()).into_response()
}

async fn handle_completion(
    State(shared): State<Shared>,
    Path(model): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    record(&shared, Step::Completion, "POST", format!("/api/v2/unichat1/{model}"), &headers, form);
    if shared.behaviour.fail_at == Some(Step::Completion) {
        return failure();
    }

    {
        let mut state = shared.state.lock().unwrap();
        state.in_flight += 1;
        state.max_in_flight = state.max_in_flight.max(state.in_flight);
    }
    tokio::time::sleep(shared.behaviour.completion_delay).await;
    shared.state.lock().unwrap().in_flight -= 1;

    let mut response = Response::builder().status(StatusCode::OK);
    if let Some(content_type) = &shared.behaviour.final_content_type {
        response = response.header("content-type", content_type);
    }
    response.body(Body::from(shared.behaviour.final_body.clone())).unwrap()
}

pub fn relay(base_url: &str, shape: ResponseShape, timeout: Duration) -> ChatRelay {
    let client = ClailaClient::new(base_url, timeout).unwrap();
    ChatRelay::new(client, shape)
}

pub fn app_with_state(base_url: &str, shape: ResponseShape) -> (Router, SharedState) {
    let state = Arc::new(AppState::new(relay(base_url, shape, Duration::from_secs(5))));
    let app = create_router(&Model::ALL).with_state(Arc::clone(&state));
    (app, state)
}

pub fn app(base_url: &str, shape: ResponseShape) -> Router {
    app_with_state(base_url, shape).0
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    pub body: String,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub async fn send(app: Router, uri: &str) -> TestResponse {
    let response = app
        .oneshot(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get("content-type")
        .map(|v| v.to_str().unwrap().to_string());
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    TestResponse {
        status,
        content_type,
        bytes: body_bytes.to_vec(),
        body: String::from_utf8_lossy(&body_bytes).into_owned(),
    }
}
