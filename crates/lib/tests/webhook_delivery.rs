//! Integration test: signed webhook deliveries flow through the gateway and come back out
//! as Send API calls against a local Graph API stand-in.

mod common;

use messenger::config::Config;
use messenger::facebook::sign;
use std::time::Duration;

const SECRET: &str = "app-secret";

const TEXT_BODY: &str = r#"{"object":"page","entry":[{"id":"PAGE","time":1458692752478,"messaging":[{"sender":{"id":"U1"},"recipient":{"id":"PAGE"},"timestamp":1458692752478,"message":{"mid":"mid.1457764197618:41d102a3e1ae206a38","text":"hello"}}]}]}"#;

const POSTBACK_BODY: &str = r#"{"object":"page","entry":[{"id":"PAGE","time":1,"messaging":[{"sender":{"id":"U2"},"recipient":{"id":"PAGE"},"timestamp":1,"postback":{"title":"Get started","payload":"GET_STARTED"}}]}]}"#;

fn config(graph_base: &str) -> Config {
    let mut config = Config::default();
    config.facebook.token = Some("PAGE_TOKEN".to_string());
    config.facebook.app_secret = Some(SECRET.to_string());
    config.facebook.graph_api_base = Some(graph_base.to_string());
    config
}

async fn post_webhook(port: u16, body: &str, signature: Option<String>) -> reqwest::Response {
    let url = format!("http://127.0.0.1:{}/facebook/webhook", port);
    let mut req = reqwest::Client::new()
        .post(&url)
        .header("Content-Type", "application/json")
        .body(body.to_string());
    if let Some(sig) = signature {
        req = req.header("X-Hub-Signature", sig);
    }
    req.send().await.expect("POST webhook")
}

#[tokio::test]
async fn signed_text_message_is_echoed_back() {
    let (graph, recorded) = common::spawn_graph().await;
    let port = common::spawn_gateway(config(&graph)).await;

    let resp = post_webhook(port, TEXT_BODY, sign(SECRET, TEXT_BODY.as_bytes())).await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let sent = recorded
        .wait_for_message(|m| m["message"]["text"] == "hello")
        .await
        .expect("echo reply reached the Send API");
    assert_eq!(sent["recipient"]["id"], "U1");
    assert_eq!(sent["access_token"], "PAGE_TOKEN");

    let typing = recorded
        .wait_for_message(|m| m["sender_action"] == "typing_on")
        .await
        .expect("typing indicator reached the Send API");
    assert_eq!(typing["recipient"]["id"], "U1");
}

#[tokio::test]
async fn postback_is_echoed_by_payload() {
    let (graph, recorded) = common::spawn_graph().await;
    let port = common::spawn_gateway(config(&graph)).await;

    post_webhook(port, POSTBACK_BODY, sign(SECRET, POSTBACK_BODY.as_bytes())).await;

    let sent = recorded
        .wait_for_message(|m| m["message"]["text"] == "GET_STARTED")
        .await
        .expect("postback reply reached the Send API");
    assert_eq!(sent["recipient"]["id"], "U2");
}

#[tokio::test]
async fn bad_signature_is_acknowledged_but_ignored() {
    let (graph, recorded) = common::spawn_graph().await;
    let port = common::spawn_gateway(config(&graph)).await;

    let resp = post_webhook(port, TEXT_BODY, sign("someone-else", TEXT_BODY.as_bytes())).await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let resp = post_webhook(port, TEXT_BODY, None).await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(recorded.messages().is_empty());
}

#[tokio::test]
async fn malformed_delivery_is_rejected() {
    let (graph, _recorded) = common::spawn_graph().await;
    let port = common::spawn_gateway(config(&graph)).await;

    let resp = post_webhook(port, "not json", None).await;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
    let resp = post_webhook(port, r#"{"object":"page"}"#, None).await;
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delivery_receipts_get_no_reply() {
    let (graph, recorded) = common::spawn_graph().await;
    let port = common::spawn_gateway(config(&graph)).await;

    let body = r#"{"object":"page","entry":[{"messaging":[{"sender":{"id":"U3"},"recipient":{"id":"PAGE"},"delivery":{"mids":["mid.1"],"watermark":1458668856253}}]}]}"#;
    let resp = post_webhook(port, body, sign(SECRET, body.as_bytes())).await;
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(recorded.messages().is_empty());
}
