//! Shared fixtures: a fake inference endpoint and a gateway bound to a local port.

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use lib::config::{Config, UpstreamSettings};
use lib::gateway::{self, GatewayState};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

pub const TEST_TOKEN: &str = "dapi-test-token";

/// How the fake endpoint answers every request.
#[derive(Clone)]
pub enum Behavior {
    Reply(Value),
    Fail(StatusCode, String),
    Delay(Duration, Value),
}

/// One request as seen by the fake endpoint.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: Value,
}

#[derive(Clone)]
struct FakeState {
    behavior: Behavior,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

pub struct FakeUpstream {
    pub url: String,
    seen: Arc<Mutex<Vec<Recorded>>>,
}

impl FakeUpstream {
    pub async fn start(behavior: Behavior) -> Self {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new()
            .route("/serving-endpoints/agent/invocations", post(invocations))
            .with_state(FakeState {
                behavior,
                seen: seen.clone(),
            });
        let addr = serve(app).await;
        Self {
            url: format!("http://{}/serving-endpoints/agent/invocations", addr),
            seen,
        }
    }

    pub async fn requests(&self) -> Vec<Recorded> {
        self.seen.lock().await.clone()
    }
}

async fn invocations(
    State(state): State<FakeState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.seen.lock().await.push(Recorded {
        authorization: header("authorization"),
        content_type: header("content-type"),
        body,
    });
    match state.behavior {
        Behavior::Reply(v) => Json(v).into_response(),
        Behavior::Fail(status, text) => (status, text).into_response(),
        Behavior::Delay(d, v) => {
            tokio::time::sleep(d).await;
            Json(v).into_response()
        }
    }
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

/// A port nothing listens on.
pub fn closed_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

pub fn settings(endpoint_url: &str) -> UpstreamSettings {
    UpstreamSettings {
        endpoint_url: endpoint_url.to_string(),
        token: Some(TEST_TOKEN.to_string()),
        ask_timeout: Duration::from_secs(5),
        health_timeout: Duration::from_secs(5),
        health_prompt: lib::config::DEFAULT_HEALTH_PROMPT.to_string(),
    }
}

/// Start a gateway on an ephemeral port; returns its base URL.
pub async fn start_gateway(settings: UpstreamSettings) -> String {
    let app = gateway::router(GatewayState::new(Config::default(), settings)).expect("router");
    format!("http://{}", serve(app).await)
}
