//! Webhook body types: the envelope Facebook POSTs and its `messaging` items.

use crate::facebook::error::FacebookError;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decoded webhook body. Only `entry[0]` is classified.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEnvelope {
    #[serde(default)]
    pub object: Option<String>,
    pub entry: Vec<Entry>,
}

/// One `entry` element. Deliveries from Messenger carry a `messaging` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient_items")]
    pub messaging: Vec<MessagingItem>,
}

/// Sender or recipient reference (`{"id": "..."}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
}

/// One `messaging` element: a user message, a postback, or a platform event.
///
/// Known keys are decoded into fields; every other key (read, delivery, optin, ...)
/// stays in `extra` in wire order. A known key with an unexpected shape decodes to `None`
/// without dropping the rest of the item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessagingItem {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub sender: Option<Participant>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Participant>,
    #[serde(default, deserialize_with = "lenient_millis", skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub postback: Option<Postback>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `message` object of a user message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub quick_reply: Option<QuickReplyPayload>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

/// `message.quick_reply`: payload of the quick reply the user tapped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuickReplyPayload {
    #[serde(default, deserialize_with = "lenient_text")]
    pub payload: Option<String>,
}

/// `postback` object sent when the user clicks a postback button.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postback {
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text", skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(flatten)]
    pub rest: Map<String, Value>,
}

impl RawEnvelope {
    /// Items of the first entry. Empty when there is no entry or it carries no `messaging`.
    pub fn messaging(&self) -> &[MessagingItem] {
        self.entry
            .first()
            .map(|e| e.messaging.as_slice())
            .unwrap_or(&[])
    }
}

impl MessagingItem {
    pub fn sender_id(&self) -> Option<&str> {
        self.sender.as_ref().map(|p| p.id.as_str())
    }

    pub fn recipient_id(&self) -> Option<&str> {
        self.recipient.as_ref().map(|p| p.id.as_str())
    }

    /// Message text when `message.text` is present (possibly empty).
    pub fn text(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.text.as_deref())
    }

    /// Postback payload when `postback.payload` is present (possibly empty).
    pub fn postback_payload(&self) -> Option<&str> {
        self.postback.as_ref().and_then(|p| p.payload.as_deref())
    }

    /// Name of the first key that is neither addressing nor a message/postback.
    pub fn event_key(&self) -> Option<&str> {
        self.extra.keys().next().map(String::as_str)
    }

    /// Delivery time; `timestamp` is milliseconds since the epoch.
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis)
    }
}

/// Decode a raw webhook body. Fails when the body is not JSON or has no `entry` list.
pub fn parse(body: &[u8]) -> Result<RawEnvelope, FacebookError> {
    serde_json::from_slice(body).map_err(|e| FacebookError::MalformedPayload(e.to_string()))
}

/// Decode each `messaging` element on its own so one odd item does not reject the delivery.
fn lenient_items<'de, D>(deserializer: D) -> Result<Vec<MessagingItem>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw
        .into_iter()
        .map(|v| {
            serde_json::from_value(v).unwrap_or_else(|e| {
                log::debug!("facebook: undecodable messaging item: {}", e);
                MessagingItem::default()
            })
        })
        .collect())
}

/// Decode an optional field; a value of the wrong shape becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value)
        .map_err(|e| log::debug!("facebook: ignoring undecodable field: {}", e))
        .ok())
}

/// Strings as-is, numbers and booleans in their JSON spelling, anything else `None`.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

/// Epoch milliseconds sent as an integer, a float or a numeric string.
fn lenient_millis<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as i64))
        }
        _ => None,
    })
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number id, got {}",
            other
        ))),
    }
}
