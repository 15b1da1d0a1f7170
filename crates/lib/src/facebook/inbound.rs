//! Inbound classification: messages, postbacks and platform events.

use crate::facebook::envelope::{MessagingItem, RawEnvelope};
use serde_json::Value;

/// A normalized chat message handed to the conversation engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingMessage {
    /// Message body, or the postback payload for button clicks.
    pub text: String,
    pub sender: String,
    pub recipient: String,
    /// Source item; `None` for placeholders.
    pub payload: Option<MessagingItem>,
}

impl IncomingMessage {
    pub fn new(
        text: impl Into<String>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        payload: Option<MessagingItem>,
    ) -> Self {
        Self {
            text: text.into(),
            sender: sender.into(),
            recipient: recipient.into(),
            payload,
        }
    }

    /// Empty message emitted for items that carry neither text nor a postback payload.
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_placeholder(&self) -> bool {
        self.payload.is_none() && self.text.is_empty() && self.sender.is_empty()
    }
}

/// Non-message platform notification. Wraps the item it was read from.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverEvent {
    Referral(MessagingItem),
    Optin(MessagingItem),
    Delivery(MessagingItem),
    Read(MessagingItem),
    CheckoutUpdate(MessagingItem),
    /// Any other key; `name` is the key as sent.
    Generic { name: String, item: MessagingItem },
}

impl DriverEvent {
    /// Classify an item by its event key. `None` when the item is a plain message or postback.
    pub fn from_item(item: &MessagingItem) -> Option<Self> {
        let key = item.event_key()?;
        let item = item.clone();
        Some(match key {
            "referral" => DriverEvent::Referral(item),
            "optin" => DriverEvent::Optin(item),
            "delivery" => DriverEvent::Delivery(item),
            "read" => DriverEvent::Read(item),
            "checkout_update" => DriverEvent::CheckoutUpdate(item),
            other => DriverEvent::Generic {
                name: other.to_string(),
                item,
            },
        })
    }

    /// Event name used by listeners (e.g. `messaging_reads`).
    pub fn name(&self) -> &str {
        match self {
            DriverEvent::Referral(_) => "messaging_referrals",
            DriverEvent::Optin(_) => "messaging_optins",
            DriverEvent::Delivery(_) => "messaging_deliveries",
            DriverEvent::Read(_) => "messaging_reads",
            DriverEvent::CheckoutUpdate(_) => "messaging_checkout_updates",
            DriverEvent::Generic { name, .. } => name.as_str(),
        }
    }

    pub fn item(&self) -> &MessagingItem {
        match self {
            DriverEvent::Referral(item)
            | DriverEvent::Optin(item)
            | DriverEvent::Delivery(item)
            | DriverEvent::Read(item)
            | DriverEvent::CheckoutUpdate(item)
            | DriverEvent::Generic { item, .. } => item,
        }
    }

    pub fn sender_id(&self) -> Option<&str> {
        self.item().sender_id()
    }

    /// The event object itself, e.g. `{"watermark": ...}` for reads.
    pub fn data(&self) -> Option<&Value> {
        let item = self.item();
        item.event_key().and_then(|k| item.extra.get(k))
    }
}

/// Messages extracted from one delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    /// Never empty.
    pub messages: Vec<IncomingMessage>,
    /// True when at least one message came from a postback.
    pub was_postback: bool,
}

/// True when any item has a non-empty `message.text` or `postback.payload`.
pub fn has_chat_message(envelope: &RawEnvelope) -> bool {
    envelope.messaging().iter().any(|item| {
        item.text().is_some_and(|t| !t.is_empty())
            || item.postback_payload().is_some_and(|p| !p.is_empty())
    })
}

/// First item carrying a key other than sender/recipient/timestamp/message/postback.
pub fn extract_event(envelope: &RawEnvelope) -> Option<DriverEvent> {
    envelope.messaging().iter().find_map(DriverEvent::from_item)
}

/// One message per item: text, postback payload, or an empty placeholder.
pub fn extract_messages(envelope: &RawEnvelope) -> Extracted {
    let mut was_postback = false;
    let mut messages: Vec<IncomingMessage> = envelope
        .messaging()
        .iter()
        .map(|item| {
            let sender = item.sender_id().unwrap_or_default();
            let recipient = item.recipient_id().unwrap_or_default();
            if let Some(text) = item.text() {
                IncomingMessage::new(text, sender, recipient, Some(item.clone()))
            } else if let Some(payload) = item.postback_payload() {
                was_postback = true;
                IncomingMessage::new(payload, sender, recipient, Some(item.clone()))
            } else {
                IncomingMessage::placeholder()
            }
        })
        .collect();
    if messages.is_empty() {
        messages.push(IncomingMessage::placeholder());
    }
    Extracted {
        messages,
        was_postback,
    }
}

/// Answer to a conversation question, derived from an incoming message.
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    /// Quick reply or postback payload.
    pub value: Option<String>,
    /// True when the user tapped a quick reply or a button.
    pub interactive: bool,
    pub message: IncomingMessage,
}

/// Quick replies answer with the message text and the reply payload; postbacks with
/// the button title and payload; anything else with the plain text.
pub fn conversation_answer(message: &IncomingMessage) -> Answer {
    let item = message.payload.as_ref();
    let quick_reply = item
        .and_then(|i| i.message.as_ref())
        .and_then(|m| m.quick_reply.as_ref());
    if let Some(reply) = quick_reply {
        return Answer {
            text: message.text.clone(),
            value: reply.payload.clone(),
            interactive: true,
            message: message.clone(),
        };
    }
    if let Some(postback) = item
        .and_then(|i| i.postback.as_ref())
        .filter(|p| p.payload.is_some())
    {
        return Answer {
            text: postback.title.clone().unwrap_or_default(),
            value: postback.payload.clone(),
            interactive: true,
            message: message.clone(),
        };
    }
    Answer {
        text: message.text.clone(),
        value: None,
        interactive: false,
        message: message.clone(),
    }
}
