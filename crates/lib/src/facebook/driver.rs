//! Per-request driver: holds one webhook delivery and answers the questions the
//! conversation engine asks about it.

use crate::config::FacebookConfig;
use crate::facebook::envelope::{self, RawEnvelope};
use crate::facebook::error::FacebookError;
use crate::facebook::inbound::{
    conversation_answer, extract_event, extract_messages, has_chat_message, Answer, DriverEvent,
    IncomingMessage,
};
use crate::facebook::outgoing::Reply;
use crate::facebook::payload::build_payload;
use crate::facebook::signature::validate_signature;
use serde_json::Value;
use std::sync::Arc;

pub const DRIVER_NAME: &str = "Facebook";

/// One webhook delivery plus the request-scoped state derived from it.
#[derive(Debug, Clone)]
pub struct FacebookDriver {
    config: Arc<FacebookConfig>,
    envelope: RawEnvelope,
    content: Vec<u8>,
    signature: String,
    driver_event: Option<DriverEvent>,
    is_postback: bool,
}

impl FacebookDriver {
    /// Decode a webhook body. `signature` is the `X-Hub-Signature` header, if any.
    pub fn from_request(
        config: Arc<FacebookConfig>,
        body: &[u8],
        signature: Option<&str>,
    ) -> Result<Self, FacebookError> {
        let envelope = envelope::parse(body)?;
        Ok(Self {
            config,
            envelope,
            content: body.to_vec(),
            signature: signature.unwrap_or_default().to_string(),
            driver_event: None,
            is_postback: false,
        })
    }

    pub fn name(&self) -> &'static str {
        DRIVER_NAME
    }

    pub fn envelope(&self) -> &RawEnvelope {
        &self.envelope
    }

    /// Raw request body.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// True when no app secret is configured or the signature header matches the body.
    pub fn has_valid_signature(&self) -> bool {
        match self.config.app_secret() {
            None => true,
            Some(secret) => validate_signature(secret, &self.content, &self.signature),
        }
    }

    /// True when the delivery carries a chat message or postback and is authentic.
    pub fn matches_request(&self) -> bool {
        let matches = has_chat_message(&self.envelope);
        if matches && !self.has_valid_signature() {
            log::warn!("facebook: X-Hub-Signature mismatch, ignoring delivery");
            return false;
        }
        matches
    }

    /// Capture the first platform event in the delivery. Later replies go to its sender.
    pub fn has_matching_event(&mut self) -> Option<&DriverEvent> {
        if self.driver_event.is_none() {
            self.driver_event = extract_event(&self.envelope);
        }
        self.driver_event.as_ref()
    }

    pub fn driver_event(&self) -> Option<&DriverEvent> {
        self.driver_event.as_ref()
    }

    /// Messages in the delivery; never empty. Marks the request as a postback when one is seen.
    pub fn messages(&mut self) -> Vec<IncomingMessage> {
        let extracted = extract_messages(&self.envelope);
        self.is_postback |= extracted.was_postback;
        extracted.messages
    }

    /// True once [`Self::messages`] has seen a postback.
    pub fn is_postback(&self) -> bool {
        self.is_postback
    }

    /// Messenger does not deliver the page's own replies to this webhook.
    pub fn is_bot(&self) -> bool {
        false
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    pub fn conversation_answer(&self, message: &IncomingMessage) -> Answer {
        conversation_answer(message)
    }

    /// Id replies are addressed to: the captured event's sender, else the message sender.
    pub fn recipient_for(&self, matching: &IncomingMessage) -> String {
        self.driver_event
            .as_ref()
            .and_then(|e| e.sender_id())
            .map(str::to_string)
            .unwrap_or_else(|| matching.sender.clone())
    }

    /// Send API body for `reply` in answer to `matching`.
    pub fn build_service_payload(
        &self,
        reply: &Reply,
        matching: &IncomingMessage,
        additional: &Value,
    ) -> Result<Value, FacebookError> {
        build_payload(
            reply,
            &self.recipient_for(matching),
            additional,
            self.config.token(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facebook::signature::sign;

    const TEXT_BODY: &str = r#"{"object":"page","entry":[{"id":"P","time":1,"messaging":[{"sender":{"id":"U1"},"recipient":{"id":"P"},"timestamp":1,"message":{"mid":"m","text":"hello"}}]}]}"#;

    fn config(secret: Option<&str>) -> Arc<FacebookConfig> {
        Arc::new(FacebookConfig {
            token: Some("PAGE_TOKEN".to_string()),
            app_secret: secret.map(str::to_string),
            ..Default::default()
        })
    }

    #[test]
    fn malformed_body_is_rejected() {
        assert!(matches!(
            FacebookDriver::from_request(config(None), b"{", None),
            Err(FacebookError::MalformedPayload(_))
        ));
    }

    #[test]
    fn matches_without_app_secret() {
        let driver = FacebookDriver::from_request(config(None), TEXT_BODY.as_bytes(), None).unwrap();
        assert!(driver.matches_request());
        assert!(driver.is_configured());
        assert!(!driver.is_bot());
        assert_eq!(driver.name(), "Facebook");
    }

    #[test]
    fn signature_is_required_when_secret_is_set() {
        let body = TEXT_BODY.as_bytes();
        let good = sign("s3cret", body).unwrap();
        let driver = FacebookDriver::from_request(config(Some("s3cret")), body, Some(&good)).unwrap();
        assert!(driver.matches_request());

        let bad = sign("other", body).unwrap();
        let driver = FacebookDriver::from_request(config(Some("s3cret")), body, Some(&bad)).unwrap();
        assert!(!driver.matches_request());

        let driver = FacebookDriver::from_request(config(Some("s3cret")), body, None).unwrap();
        assert!(!driver.matches_request());
    }

    #[test]
    fn postback_flag_follows_messages() {
        let body = r#"{"entry":[{"messaging":[{"sender":{"id":"U"},"recipient":{"id":"P"},"postback":{"title":"Go","payload":"GO"}}]}]}"#;
        let mut driver = FacebookDriver::from_request(config(None), body.as_bytes(), None).unwrap();
        assert!(!driver.is_postback());
        let messages = driver.messages();
        assert_eq!(messages[0].text, "GO");
        assert!(driver.is_postback());
        let answer = driver.conversation_answer(&messages[0]);
        assert_eq!(answer.text, "Go");
    }

    #[test]
    fn payload_goes_to_message_sender() {
        let mut driver =
            FacebookDriver::from_request(config(None), TEXT_BODY.as_bytes(), None).unwrap();
        assert!(driver.has_matching_event().is_none());
        let message = driver.messages().remove(0);
        let payload = driver
            .build_service_payload(&Reply::from("hi"), &message, &Value::Null)
            .unwrap();
        assert_eq!(payload["recipient"]["id"], "U1");
        assert_eq!(payload["access_token"], "PAGE_TOKEN");
    }

    #[test]
    fn payload_goes_to_event_sender_when_event_captured() {
        let body = r#"{"entry":[{"messaging":[
            {"sender":{"id":"READER"},"recipient":{"id":"P"},"timestamp":0,"read":{"watermark":1}}
        ]}]}"#;
        let mut driver = FacebookDriver::from_request(config(None), body.as_bytes(), None).unwrap();
        assert!(!driver.matches_request());
        assert!(matches!(driver.has_matching_event(), Some(DriverEvent::Read(_))));
        let placeholder = driver.messages().remove(0);
        assert!(placeholder.is_placeholder());
        let payload = driver
            .build_service_payload(&Reply::from("thanks for reading"), &placeholder, &Value::Null)
            .unwrap();
        assert_eq!(payload["recipient"]["id"], "READER");
    }
}
