//! In-process mock of the BoTTube API.
//!
//! Runs an axum server on its own thread and tokio runtime so the blocking
//! client under test can talk to it from the test thread.  Every request is
//! recorded for later inspection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path as UrlPath, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use axum::Router;
use serde_json::{json, Value};

use bottube_agent::client::PlatformClient;
use bottube_common::config::{self, Config};

pub const API_KEY: &str = "test-key";
pub const AGENT_NAME: &str = "tube_bot";

/// One request as seen by the mock.
#[derive(Debug, Clone, Default)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub api_key: Option<String>,
    pub query: HashMap<String, String>,
    pub json: Option<Value>,
    /// Multipart text fields.
    pub fields: HashMap<String, String>,
    /// Size of the multipart `video` part.
    pub file_len: Option<usize>,
}

#[derive(Default)]
struct MockState {
    requests: Mutex<Vec<Recorded>>,
    trending: Mutex<Value>,
    trending_raw: Mutex<Option<String>>,
    fail_with: Mutex<Option<StatusCode>>,
    fail_actions: Mutex<Option<StatusCode>>,
}

type Shared = Arc<MockState>;

pub struct MockApi {
    pub base_url: String,
    state: Shared,
}

impl MockApi {
    pub fn start() -> Self {
        let state: Shared = Arc::new(MockState::default());
        *state.trending.lock().unwrap() = json!({ "videos": [] });

        let app = router(state.clone());
        let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("mock runtime");
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind mock server");
                tx.send(listener.local_addr().expect("local addr"))
                    .expect("report address");
                axum::serve(listener, app).await.expect("mock server");
            });
        });

        let addr = rx.recv().expect("mock server did not start");
        MockApi {
            base_url: format!("http://{addr}/api"),
            state,
        }
    }

    /// Body served by `GET /trending`.
    pub fn set_trending(&self, body: Value) {
        *self.state.trending.lock().unwrap() = body;
    }

    /// Serve `body` verbatim as a 200 `text/plain` trending response.
    pub fn set_trending_raw(&self, body: &str) {
        *self.state.trending_raw.lock().unwrap() = Some(body.to_string());
    }

    /// Answer every following request with `status` and an error body.
    pub fn fail_with(&self, status: u16) {
        *self.state.fail_with.lock().unwrap() =
            Some(StatusCode::from_u16(status).expect("valid status"));
    }

    /// Reject only votes and comments; reads keep working.
    pub fn fail_actions_with(&self, status: u16) {
        *self.state.fail_actions.lock().unwrap() =
            Some(StatusCode::from_u16(status).expect("valid status"));
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn requests_ending_with(&self, suffix: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.path.ends_with(suffix))
            .collect()
    }

    /// Config pointing at this mock, with no transcoder installed.
    pub fn config(&self, video_dir: &Path, extra: &[(&str, &str)]) -> Config {
        let mut map: HashMap<String, String> = HashMap::from([
            ("BOTTUBE_API_KEY".to_string(), API_KEY.to_string()),
            ("BOTTUBE_AGENT_NAME".to_string(), AGENT_NAME.to_string()),
            ("BOTTUBE_BASE_URL".to_string(), self.base_url.clone()),
            (
                "VIDEO_DIR".to_string(),
                video_dir.to_string_lossy().into_owned(),
            ),
            (
                "FFMPEG_BIN".to_string(),
                "/nonexistent/bin/ffmpeg-for-tests".to_string(),
            ),
        ]);
        for (k, v) in extra {
            map.insert(k.to_string(), v.to_string());
        }
        config::from_lookup(None, move |key: &str| map.get(key).cloned()).expect("test config")
    }

    pub fn client(&self, video_dir: &Path) -> PlatformClient {
        PlatformClient::from_config(&self.config(video_dir, &[])).expect("client")
    }
}

// ── routes ───────────────────────────────────────────────────────────────

fn router(state: Shared) -> Router {
    Router::new()
        .route("/api/register", post(register))
        .route("/api/agents/{name}", get(agent_info))
        .route("/api/upload", post(upload))
        .route("/api/videos/{id}/comment", post(comment))
        .route("/api/videos/{id}/vote", post(vote))
        .route("/api/trending", get(trending))
        .with_state(state)
}

fn record(state: &MockState, rec: Recorded) {
    state.requests.lock().unwrap().push(rec);
}

fn reply(state: &MockState, ok: Value) -> Response {
    match *state.fail_with.lock().unwrap() {
        Some(status) => (status, Json(json!({ "error": "rejected by mock" }))).into_response(),
        None => Json(ok).into_response(),
    }
}

fn reply_action(state: &MockState, ok: Value) -> Response {
    match *state.fail_actions.lock().unwrap() {
        Some(status) => (status, Json(json!({ "error": "action refused" }))).into_response(),
        None => reply(state, ok),
    }
}

fn api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn register(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(
        &state,
        Recorded {
            method: "POST",
            path: "/api/register".into(),
            api_key: api_key(&headers),
            json: Some(body.clone()),
            ..Default::default()
        },
    );
    reply(&state, json!({ "ok": true, "agent_name": body["agent_name"] }))
}

async fn agent_info(State(state): State<Shared>, UrlPath(name): UrlPath<String>) -> Response {
    record(
        &state,
        Recorded {
            method: "GET",
            path: format!("/api/agents/{name}"),
            ..Default::default()
        },
    );
    reply(&state, json!({ "agent_name": name, "videos": 0 }))
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let mut rec = Recorded {
        method: "POST",
        path: "/api/upload".into(),
        api_key: api_key(&headers),
        ..Default::default()
    };
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        if name == "video" {
            let bytes = field.bytes().await.unwrap_or_default();
            rec.file_len = Some(bytes.len());
        } else {
            let text = field.text().await.unwrap_or_default();
            rec.fields.insert(name, text);
        }
    }
    record(&state, rec);
    reply(&state, json!({ "ok": true, "video_id": "new1" }))
}

async fn comment(
    State(state): State<Shared>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(
        &state,
        Recorded {
            method: "POST",
            path: format!("/api/videos/{id}/comment"),
            api_key: api_key(&headers),
            json: Some(body),
            ..Default::default()
        },
    );
    reply_action(&state, json!({ "ok": true, "comment_id": 1 }))
}

async fn vote(
    State(state): State<Shared>,
    UrlPath(id): UrlPath<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(
        &state,
        Recorded {
            method: "POST",
            path: format!("/api/videos/{id}/vote"),
            api_key: api_key(&headers),
            json: Some(body),
            ..Default::default()
        },
    );
    reply_action(&state, json!({ "ok": true }))
}

async fn trending(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    record(
        &state,
        Recorded {
            method: "GET",
            path: "/api/trending".into(),
            query,
            ..Default::default()
        },
    );
    if let Some(raw) = state.trending_raw.lock().unwrap().clone() {
        return (StatusCode::OK, raw).into_response();
    }
    let body = state.trending.lock().unwrap().clone();
    reply(&state, body)
}
