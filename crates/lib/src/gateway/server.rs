//! Gateway HTTP server: Facebook webhook verification and delivery endpoints.

use crate::config::{self, Config, FacebookConfig};
use crate::facebook::{
    verify_subscription, FacebookDriver, FacebookError, GraphClient, IncomingMessage, Reply,
    SubscriptionQuery, DRIVER_NAME, SIGNATURE_HEADER,
};
use crate::gateway::responder::{EchoResponder, Responder};
use anyhow::{Context, Result};
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Path Facebook is configured to call.
pub const WEBHOOK_PATH: &str = "/facebook/webhook";

/// Shared state for the gateway handlers and the delivery processor.
#[derive(Clone)]
pub struct GatewayState {
    pub config: Arc<Config>,
    /// Resolved credentials (config file + env).
    pub facebook: Arc<FacebookConfig>,
    pub graph: GraphClient,
    /// Classified deliveries waiting for replies. Processor task receives.
    pub inbound_tx: mpsc::Sender<FacebookDriver>,
    pub responder: Arc<dyn Responder>,
}

/// Run the gateway with the echo responder. Blocks until shutdown (e.g. Ctrl+C).
pub async fn run_gateway(config: Config) -> Result<()> {
    run_gateway_with(config, Arc::new(EchoResponder)).await
}

/// Run the gateway; binds to config.gateway.bind:config.gateway.port and answers
/// deliveries with `responder`.
pub async fn run_gateway_with(config: Config, responder: Arc<dyn Responder>) -> Result<()> {
    let facebook = Arc::new(config::resolve_facebook_config(&config));
    let bind = config.gateway.bind.trim().to_string();
    if !facebook.is_configured() {
        log::warn!("facebook page token not configured; replies will be rejected by the graph api");
    }
    if !config::is_loopback_bind(&bind) && facebook.app_secret().is_none() {
        log::warn!(
            "gateway bound to {} without an app secret; webhook signatures will not be checked",
            bind
        );
    }

    let (inbound_tx, mut inbound_rx) = mpsc::channel::<FacebookDriver>(64);
    let state = GatewayState {
        config: Arc::new(config.clone()),
        graph: GraphClient::new(&facebook),
        facebook,
        inbound_tx,
        responder,
    };

    {
        let state_inbound = state.clone();
        tokio::spawn(async move {
            while let Some(driver) = inbound_rx.recv().await {
                process_delivery(&state_inbound, driver).await;
            }
        });
    }

    let app = Router::new()
        .route("/", get(health_http))
        .route(WEBHOOK_PATH, get(verify_webhook).post(receive_webhook))
        .with_state(state);

    let bind_addr = format!("{}:{}", bind, config.gateway.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding to {}", bind_addr))?;
    log::info!("gateway listening on {}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("gateway server exited")?;
    log::info!("gateway stopped");
    Ok(())
}

/// Future that completes when the process should shut down (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    log::info!("shutdown signal received");
}

/// GET / returns a simple health JSON (for probes).
async fn health_http(State(state): State<GatewayState>) -> Json<Value> {
    Json(json!({
        "runtime": "running",
        "driver": DRIVER_NAME,
        "configured": state.facebook.is_configured(),
        "port": state.config.gateway.port,
    }))
}

/// GET /facebook/webhook — subscription handshake; echoes `hub.challenge` when the verify token
/// matches, otherwise an empty 200. An undecodable query (e.g. both `hub.mode` and `hub_mode`)
/// counts as a failed handshake.
async fn verify_webhook(
    State(state): State<GatewayState>,
    query: Option<Query<SubscriptionQuery>>,
) -> Response {
    let query = query.map(|Query(q)| q).unwrap_or_default();
    match verify_subscription(&query, state.facebook.verification.as_deref()) {
        Some(challenge) => {
            log::info!("facebook webhook subscription verified");
            challenge.into_response()
        }
        None => {
            log::warn!("facebook webhook verification failed");
            StatusCode::OK.into_response()
        }
    }
}

/// POST /facebook/webhook — classifies the delivery and queues it for the processor.
/// Answers 200 for anything decodable so Facebook does not redeliver.
async fn receive_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    let mut driver = match FacebookDriver::from_request(state.facebook.clone(), &body, signature) {
        Ok(d) => d,
        Err(e) => {
            log::debug!("facebook webhook rejected: {}", e);
            return StatusCode::BAD_REQUEST;
        }
    };
    let has_event = match driver.has_matching_event() {
        Some(event) => {
            log::debug!("facebook event: {}", event.name());
            true
        }
        None => false,
    };
    let wanted = driver.matches_request() || (has_event && driver.has_valid_signature());
    if !wanted {
        return StatusCode::OK;
    }
    if state.inbound_tx.send(driver).await.is_err() {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}

/// Answer one delivery: the captured event first, then every chat message.
async fn process_delivery(state: &GatewayState, mut driver: FacebookDriver) {
    if let Some(event) = driver.driver_event().cloned() {
        if let Some(reply) = state.responder.on_event(&event).await {
            deliver(state, &driver, &reply, &IncomingMessage::placeholder()).await;
        }
    }
    if !driver.matches_request() {
        return;
    }
    for message in driver.messages() {
        if message.is_placeholder() {
            continue;
        }
        let typing = state.graph.clone();
        let recipient = driver.recipient_for(&message);
        tokio::spawn(async move {
            if let Err(e) = typing.types(&recipient).await {
                log::debug!("facebook typing indicator failed: {}", e);
            }
        });
        let answer = driver.conversation_answer(&message);
        if let Some(reply) = state.responder.on_message(&message, &answer).await {
            deliver(state, &driver, &reply, &message).await;
        }
    }
}

async fn deliver(
    state: &GatewayState,
    driver: &FacebookDriver,
    reply: &Reply,
    matching: &IncomingMessage,
) {
    if let Err(e) = send_reply(state, driver, reply, matching).await {
        log::warn!("facebook send failed: {}", e);
    }
}

async fn send_reply(
    state: &GatewayState,
    driver: &FacebookDriver,
    reply: &Reply,
    matching: &IncomingMessage,
) -> Result<(), FacebookError> {
    let payload = driver.build_service_payload(reply, matching, &Value::Null)?;
    state.graph.send_payload(&payload).await?;
    Ok(())
}
