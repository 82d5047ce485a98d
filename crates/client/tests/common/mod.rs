#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Router,
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use finflow_client::{Client, Session};
use query_cache::{QueryState, Subscription};
use serde_json::{Value, json};

/// One request as the fake backend saw it.
#[derive(Clone, Debug)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Option<Value>,
}

impl Recorded {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// In-process stand-in for the FinFlow REST API.
///
/// Answers with canned `(status, body)` pairs per method and path, and
/// records every request it receives.
#[derive(Clone, Default)]
pub struct FakeBackend {
    routes: Arc<Mutex<HashMap<(Method, String), (StatusCode, Value)>>>,
    requests: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) -> &Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), (status, body));
        self
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn hits(&self, method: Method, path: &str) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|req| req.method == method && req.path == path)
            .collect()
    }

    /// Serves on an ephemeral port and returns the base URL.
    pub async fn spawn(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().fallback(handle).with_state(self.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

async fn handle(
    State(backend): State<FakeBackend>,
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_string(),
        query,
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
        body: serde_json::from_slice(&body).ok(),
    };
    backend.requests.lock().unwrap().push(recorded);

    let canned = backend
        .routes
        .lock()
        .unwrap()
        .get(&(method, uri.path().to_string()))
        .cloned();
    let (status, body) =
        canned.unwrap_or((StatusCode::NOT_FOUND, json!({ "message": "not found" })));
    (status, axum::Json(body)).into_response()
}

pub fn session() -> Session {
    Session {
        user_id: "u1".to_string(),
        display_name: "Ana".to_string(),
        token: "token-123".to_string(),
    }
}

pub async fn authenticated(backend: &FakeBackend) -> Client {
    Client::builder(backend.spawn().await)
        .session(session())
        .build()
        .unwrap()
}

pub fn raw_transaction(id: &str, description: &str, kind: &str, category: Value) -> Value {
    json!({
        "id": id,
        "description": description,
        "amount": 25.5,
        "type": kind,
        "category": category,
        "account": { "name": "Nubank" },
        "date": "2025-01-05",
    })
}

/// Waits until the subscribed entry holds fresh data.
pub async fn settled(sub: &mut Subscription) -> QueryState {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let state = sub.state();
            if state.is_success() && !state.stale && !state.is_fetching {
                return state;
            }
            sub.changed().await.unwrap();
        }
    })
    .await
    .unwrap()
}
