//! In-process mock of the bin API for exercising the remote client.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;

use super::TEST_BIN_ID;

/// A captured request for assertions.
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
struct MockState {
    bins: Arc<Mutex<HashMap<String, Vec<Value>>>>,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    /// Forced status per HTTP method
    failures: Arc<Mutex<HashMap<String, u16>>>,
    /// Return a create response without metadata
    omit_created_id: Arc<Mutex<bool>>,
    created: Arc<AtomicUsize>,
}

impl MockState {
    async fn capture(&self, method: &str, path: String, headers: &HeaderMap, body: Option<Value>) {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        self.requests.lock().await.push(CapturedRequest {
            method: method.to_string(),
            path,
            headers,
            body,
        });
    }

    async fn forced_failure(&self, method: &str) -> Option<Response> {
        let status = *self.failures.lock().await.get(method)?;
        Some(error_response(status, "Internal server error"))
    }
}

/// Mock bin server for testing.
pub struct MockBin {
    pub addr: SocketAddr,
    state: MockState,
    shutdown: tokio::sync::watch::Sender<bool>,
}

/// The two quotes the default bin starts with.
pub fn seed_quotes() -> Vec<Value> {
    vec![
        json!({"id": "1", "text": "Test quote 1", "author": "Author 1", "slug": "test-quote-1"}),
        json!({"id": "2", "text": "Test quote 2", "author": "Author 2", "slug": "test-quote-2"}),
    ]
}

impl MockBin {
    /// Start a server holding `test-bin-id` with the seed quotes.
    pub async fn start() -> Self {
        let mock = Self::empty().await;
        mock.insert_bin(TEST_BIN_ID, seed_quotes()).await;
        mock
    }

    /// Start a server with no bins.
    pub async fn empty() -> Self {
        let state = MockState::default();
        let (shutdown_tx, mut shutdown_rx) = tokio::sync::watch::channel(false);

        let app = Router::new()
            .route("/b", post(create_bin))
            .route("/b/{bin_id}", put(replace_bin))
            .route("/b/{bin_id}/latest", get(latest_bin))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock server");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.changed().await;
                })
                .await
                .ok();
        });

        Self {
            addr,
            state,
            shutdown: shutdown_tx,
        }
    }

    /// Base URL to configure the client with.
    pub fn base_url(&self) -> String {
        format!("http://{}/b", self.addr)
    }

    pub async fn insert_bin(&self, bin_id: &str, quotes: Vec<Value>) {
        self.state
            .bins
            .lock()
            .await
            .insert(bin_id.to_string(), quotes);
    }

    /// Current contents of a bin.
    pub async fn bin(&self, bin_id: &str) -> Option<Vec<Value>> {
        self.state.bins.lock().await.get(bin_id).cloned()
    }

    pub async fn bin_ids(&self) -> Vec<String> {
        self.state.bins.lock().await.keys().cloned().collect()
    }

    /// Make every request with `method` answer with `status`.
    pub async fn fail(&self, method: &str, status: u16) {
        self.state
            .failures
            .lock()
            .await
            .insert(method.to_string(), status);
    }

    /// Make bin creation succeed without reporting the new id.
    pub async fn omit_created_id(&self) {
        *self.state.omit_created_id.lock().await = true;
    }

    /// Get all captured requests.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().await.clone()
    }

    /// Clear captured requests.
    pub async fn clear_requests(&self) {
        self.state.requests.lock().await.clear();
    }
}

impl Drop for MockBin {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

fn error_response(status: u16, message: &str) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": message }))).into_response()
}

fn quotes_from(body: &Value) -> Vec<Value> {
    body.get("quotes")
        .and_then(|q| q.as_array())
        .cloned()
        .unwrap_or_default()
}

async fn latest_bin(
    State(state): State<MockState>,
    Path(bin_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state
        .capture("GET", format!("/b/{}/latest", bin_id), &headers, None)
        .await;
    if let Some(response) = state.forced_failure("GET").await {
        return response;
    }

    match state.bins.lock().await.get(&bin_id) {
        Some(quotes) => Json(json!({
            "record": { "quotes": quotes },
            "metadata": { "id": bin_id }
        }))
        .into_response(),
        None => error_response(404, "Bin not found"),
    }
}

async fn replace_bin(
    State(state): State<MockState>,
    Path(bin_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state
        .capture("PUT", format!("/b/{}", bin_id), &headers, Some(body.clone()))
        .await;
    if let Some(response) = state.forced_failure("PUT").await {
        return response;
    }

    let quotes = quotes_from(&body);
    let mut bins = state.bins.lock().await;
    match bins.get_mut(&bin_id) {
        Some(stored) => {
            *stored = quotes.clone();
            Json(json!({
                "record": { "quotes": quotes },
                "metadata": { "parentId": bin_id }
            }))
            .into_response()
        }
        None => error_response(404, "Bin not found"),
    }
}

async fn create_bin(
    State(state): State<MockState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state
        .capture("POST", "/b".to_string(), &headers, Some(body.clone()))
        .await;
    if let Some(response) = state.forced_failure("POST").await {
        return response;
    }

    let quotes = quotes_from(&body);
    let bin_id = format!("bin-{}", state.created.fetch_add(1, Ordering::SeqCst) + 1);
    state
        .bins
        .lock()
        .await
        .insert(bin_id.clone(), quotes.clone());

    let metadata = if *state.omit_created_id.lock().await {
        json!({})
    } else {
        json!({ "id": bin_id, "private": true })
    };

    (
        StatusCode::CREATED,
        Json(json!({ "record": { "quotes": quotes }, "metadata": metadata })),
    )
        .into_response()
}
