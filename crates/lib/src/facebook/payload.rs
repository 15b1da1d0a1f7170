//! Send API request bodies.

use crate::facebook::error::FacebookError;
use crate::facebook::merge::merge_object;
use crate::facebook::outgoing::Reply;
use serde_json::{json, Map, Value};

/// Build the `me/messages` body for `reply` addressed to `recipient_id`.
///
/// `additional` (an object) is deep-merged into the base `{recipient, message}` before the
/// reply kind rewrites `message`; `access_token` is always set last.
pub fn build_payload(
    reply: &Reply,
    recipient_id: &str,
    additional: &Value,
    token: &str,
) -> Result<Value, FacebookError> {
    let mut root = Map::new();
    root.insert("recipient".into(), json!({ "id": recipient_id }));
    root.insert("message".into(), json!({ "text": reply.text() }));
    match additional {
        Value::Object(extra) => merge_object(&mut root, extra.clone()),
        Value::Null => {}
        other => log::debug!("facebook: ignoring non-object additional parameters: {}", other),
    }

    match reply {
        Reply::Question(question) => {
            let quick_replies: Vec<Value> =
                question.buttons.iter().map(|b| b.to_quick_reply()).collect();
            root.insert(
                "message".into(),
                json!({ "text": question.text, "quick_replies": quick_replies }),
            );
        }
        Reply::Template(template) => {
            root.insert("message".into(), template.to_message()?);
        }
        Reply::Message(outgoing) => {
            let mut message = match root.remove("message") {
                Some(Value::Object(message)) => message,
                _ => Map::new(),
            };
            match outgoing.attachment.as_ref().and_then(|a| a.upload()) {
                Some((kind, url)) => {
                    message.remove("text");
                    message.insert(
                        "attachment".into(),
                        json!({ "type": kind, "payload": { "url": url } }),
                    );
                }
                None => {
                    message.insert("text".into(), Value::from(outgoing.text.clone()));
                }
            }
            root.insert("message".into(), Value::Object(message));
        }
        Reply::Text(_) => {}
    }

    root.insert("access_token".into(), Value::from(token));
    Ok(Value::Object(root))
}

/// Body that switches the typing indicator on for `recipient_id`.
pub fn typing_payload(recipient_id: &str, token: &str) -> Value {
    json!({
        "recipient": { "id": recipient_id },
        "access_token": token,
        "sender_action": "typing_on",
    })
}
