//! Purpose: Loopback mock of a Trac JSON-RPC endpoint for integration tests.
//! Exports: `MockTrac`, `RecordedCall`, `TestResult`.
//! Role: Scripted per-method replies plus a log of every request received.
//! Invariants: Binds 127.0.0.1 on an ephemeral port; shuts down on drop.
//! Invariants: Unscripted methods get a `-32601` fault, like the real plugin.
#![allow(dead_code)]

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::net::{SocketAddr, TcpListener};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use tokio::sync::oneshot;

pub type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

pub const RPC_PATH: &str = "/login/jsonrpc";

#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub method: String,
    pub params: Value,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Clone)]
struct Reply {
    status: u16,
    body: Vec<u8>,
}

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<String, Reply>>,
    calls: Mutex<Vec<RecordedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poison| poison.into_inner())
}

pub struct MockTrac {
    addr: SocketAddr,
    state: Arc<MockState>,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MockTrac {
    pub fn start() -> TestResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;
        let state = Arc::new(MockState::default());
        let app = Router::new()
            .route(RPC_PATH, post(rpc))
            .with_state(Arc::clone(&state));
        let (shutdown, signal) = oneshot::channel::<()>();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let thread = std::thread::spawn(move || {
            runtime.block_on(async move {
                let Ok(listener) = tokio::net::TcpListener::from_std(listener) else {
                    return;
                };
                let _ = axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = signal.await;
                    })
                    .await;
            });
        });

        Ok(Self {
            addr,
            state,
            shutdown: Some(shutdown),
            thread: Some(thread),
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}{RPC_PATH}", self.addr)
    }

    pub fn endpoint_with_credentials(&self, user: &str, password: &str) -> String {
        format!("http://{user}:{password}@{}{RPC_PATH}", self.addr)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn on_result(&self, method: &str, result: Value) -> &Self {
        let body = json!({"error": null, "id": null, "result": result});
        self.on_raw(method, 200, body.to_string().into_bytes())
    }

    pub fn on_fault(&self, method: &str, status: u16, code: i64, name: &str, message: &str) -> &Self {
        let body = json!({
            "error": {"code": code, "message": message, "name": name},
            "id": null,
            "result": null
        });
        self.on_raw(method, status, body.to_string().into_bytes())
    }

    pub fn on_raw(&self, method: &str, status: u16, body: Vec<u8>) -> &Self {
        lock(&self.state.replies).insert(method.to_string(), Reply { status, body });
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.state.calls).clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|call| call.method).collect()
    }
}

impl Drop for MockTrac {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

async fn rpc(State(state): State<Arc<MockState>>, headers: HeaderMap, body: Bytes) -> Response {
    let request: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let method = request["method"].as_str().unwrap_or_default().to_string();
    let header_text = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    lock(&state.calls).push(RecordedCall {
        method: method.clone(),
        params: request["params"].clone(),
        authorization: header_text(header::AUTHORIZATION),
        content_type: header_text(header::CONTENT_TYPE),
    });

    let reply = lock(&state.replies).get(&method).cloned().unwrap_or_else(|| Reply {
        status: 200,
        body: json!({
            "error": {"code": -32601, "message": format!("No such method {method}"), "name": "JSONRPCError"},
            "id": null,
            "result": null
        })
        .to_string()
        .into_bytes(),
    });
    let status = StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, [(header::CONTENT_TYPE, "application/json")], reply.body).into_response()
}
