//! In-process stand-in for the recognition backend.
//!
//! Binds an axum server to `127.0.0.1:0`, answers each path with a scripted
//! reply and records every request it receives.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use facedesk_client::{ApiClient, ClientConfig};
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, String),
    Bytes(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl FormField {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.data).into_owned()
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Raw (still percent-encoded) request path.
    pub path: String,
    pub content_type: String,
    /// Multipart fields in the order they were sent.
    pub fields: Vec<FormField>,
    /// Raw body for anything that is not multipart.
    pub body: String,
}

#[derive(Default)]
struct MockState {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

pub struct MockBackend {
    pub base_url: String,
    state: Arc<MockState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(MockState::default());
        let app = Router::new().fallback(handle).with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    /// Script the replies for `path`. Replies are used in order; the last one repeats.
    pub fn route(&self, path: &str, replies: impl IntoIterator<Item = Reply>) -> &Self {
        self.state
            .routes
            .lock()
            .unwrap()
            .insert(path.to_string(), replies.into_iter().collect());
        self
    }

    pub fn json(&self, path: &str, body: Value) -> &Self {
        self.route(path, [Reply::Json(StatusCode::OK, body)])
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    /// The single request received. Panics if there were zero or several.
    pub fn only_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {requests:?}");
        requests.into_iter().next().unwrap()
    }

    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ClientConfig {
            base_url: self.base_url.clone(),
            rebuild_poll_interval_ms: 5,
            ..ClientConfig::default()
        })
        .unwrap()
    }
}

async fn handle(State(state): State<Arc<MockState>>, req: Request) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let mut fields = Vec::new();
    let mut body = String::new();
    if content_type.starts_with("multipart/form-data") {
        let mut multipart = Multipart::from_request(req, &()).await.unwrap();
        while let Some(field) = multipart.next_field().await.unwrap() {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let field_type = field.content_type().map(str::to_string);
            let data: Bytes = field.bytes().await.unwrap();
            fields.push(FormField {
                name,
                file_name,
                content_type: field_type,
                data: data.to_vec(),
            });
        }
    } else {
        let bytes = axum::body::to_bytes(req.into_body(), usize::MAX).await.unwrap();
        body = String::from_utf8_lossy(&bytes).into_owned();
    }

    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        path: path.clone(),
        content_type,
        fields,
        body,
    });

    let reply = {
        let mut routes = state.routes.lock().unwrap();
        routes.get_mut(&path).and_then(|queue| {
            if queue.len() > 1 {
                queue.pop_front()
            } else {
                queue.front().cloned()
            }
        })
    };

    match reply {
        Some(Reply::Json(status, value)) => (status, Json(value)).into_response(),
        Some(Reply::Text(status, text)) => (status, text).into_response(),
        Some(Reply::Bytes(bytes)) => (StatusCode::OK, bytes).into_response(),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "Not found"}))).into_response(),
    }
}
