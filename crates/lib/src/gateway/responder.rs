//! Seam to the conversation engine: decides what to answer.

use crate::facebook::{Answer, DriverEvent, IncomingMessage, Reply};
use async_trait::async_trait;

/// Picks replies for inbound messages and platform events. `None` means stay silent.
#[async_trait]
pub trait Responder: Send + Sync {
    async fn on_message(&self, message: &IncomingMessage, answer: &Answer) -> Option<Reply>;

    /// Default ignores events.
    async fn on_event(&self, _event: &DriverEvent) -> Option<Reply> {
        None
    }
}

/// Repeats the user's text; postbacks and quick replies are echoed by their value.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoResponder;

#[async_trait]
impl Responder for EchoResponder {
    async fn on_message(&self, message: &IncomingMessage, answer: &Answer) -> Option<Reply> {
        let text = answer
            .value
            .as_deref()
            .unwrap_or(message.text.as_str())
            .trim();
        if text.is_empty() {
            None
        } else {
            Some(Reply::Text(text.to_string()))
        }
    }
}
