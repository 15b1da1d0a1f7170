//! Helpers shared by the integration tests: free ports, a gateway on a background task
//! and a stand-in Graph API that records what it receives.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use messenger::config::Config;
use messenger::gateway;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

pub fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind free port");
    listener.local_addr().expect("local_addr").port()
}

/// Env overrides that would otherwise win over the config the tests hand the gateway.
pub const FACEBOOK_ENV: [&str; 4] = [
    "FACEBOOK_TOKEN",
    "FACEBOOK_APP_SECRET",
    "FACEBOOK_VERIFICATION",
    "FACEBOOK_GRAPH_API_BASE",
];

static CLEAR_ENV: Once = Once::new();

/// Remove the `FACEBOOK_*` overrides from this test process so only the test's config counts.
pub fn clear_facebook_env() {
    CLEAR_ENV.call_once(|| {
        for key in FACEBOOK_ENV {
            std::env::remove_var(key);
        }
    });
}

/// Start the gateway with `config` on a free port and wait until GET / answers.
/// The server task is left running when the test ends.
pub async fn spawn_gateway(mut config: Config) -> u16 {
    clear_facebook_env();
    let port = free_port();
    config.gateway.port = port;
    config.gateway.bind = "127.0.0.1".to_string();
    tokio::spawn(async move {
        let _ = gateway::run_gateway(config).await;
    });

    let url = format!("http://127.0.0.1:{}/", port);
    let client = reqwest::Client::new();
    for _ in 0..100 {
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return port;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("gateway on port {} did not come up within 5s", port);
}

/// What the stand-in Graph API has seen.
#[derive(Clone, Default)]
pub struct Recorded {
    pub messages: Arc<Mutex<Vec<Value>>>,
    pub requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorded {
    pub fn messages(&self) -> Vec<Value> {
        self.messages.lock().unwrap().clone()
    }

    /// Poll until a recorded `me/messages` body satisfies `pred`.
    pub async fn wait_for_message(&self, pred: impl Fn(&Value) -> bool) -> Option<Value> {
        for _ in 0..100 {
            if let Some(found) = self.messages().into_iter().find(|m| pred(m)) {
                return Some(found);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        None
    }
}

async fn me_messages(State(rec): State<Recorded>, Json(body): Json<Value>) -> Json<Value> {
    let recipient = body["recipient"]["id"].clone();
    rec.messages.lock().unwrap().push(body);
    Json(json!({ "recipient_id": recipient, "message_id": "mid.1" }))
}

async fn endpoint(
    State(rec): State<Recorded>,
    Path(endpoint): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    rec.requests.lock().unwrap().push((endpoint, body));
    Json(json!({ "result": "success" }))
}

async fn profile(
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> (StatusCode, Json<Value>) {
    if query.get("access_token").map(String::as_str) != Some("PAGE_TOKEN") {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "Invalid OAuth access token.", "code": 190 } })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "id": id,
            "first_name": "Ada",
            "last_name": "Lovelace",
            "locale": "en_GB",
            "timezone": 0,
            "fields": query.get("fields").cloned().unwrap_or_default(),
        })),
    )
}

/// Serve a Graph API stand-in on a free port. Returns its `/v2.6` base URL.
pub async fn spawn_graph() -> (String, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route("/v2.6/me/messages", post(me_messages))
        .route("/v2.6/me/:endpoint", post(endpoint))
        .route("/v2.6/:id", get(profile))
        .with_state(recorded.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind graph stand-in");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    (format!("http://{}/v2.6", addr), recorded)
}

/// Graph API stand-in that rejects every send with an OAuth error.
pub async fn spawn_failing_graph() -> String {
    async fn reject() -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": { "message": "(#100) No matching user found", "code": 100 } })),
        )
    }
    let app = Router::new().route("/v2.6/me/messages", post(reject));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind graph stand-in");
    let addr = listener.local_addr().expect("local_addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{}/v2.6", addr)
}
