//! Facebook Messenger driver.
//!
//! Inbound: webhook bodies are decoded into [`RawEnvelope`]s and classified into
//! [`IncomingMessage`]s and at most one [`DriverEvent`] per delivery. Outbound: [`Reply`]s
//! are turned into Send API bodies and delivered with [`GraphClient`].

mod client;
mod driver;
mod envelope;
mod error;
mod inbound;
mod merge;
mod outgoing;
mod payload;
mod profile;
mod signature;
pub mod templates;

pub use client::{GraphClient, GraphResponse};
pub use driver::{FacebookDriver, DRIVER_NAME};
pub use envelope::{
    parse, MessageBody, MessagingItem, Participant, Postback, QuickReplyPayload, RawEnvelope,
};
pub use error::FacebookError;
pub use inbound::{
    conversation_answer, extract_event, extract_messages, has_chat_message, Answer, DriverEvent,
    Extracted, IncomingMessage,
};
pub use merge::{merge_recursive, replace_recursive};
pub use outgoing::{Attachment, Button, OutgoingMessage, Question, Reply};
pub use payload::{build_payload, typing_payload};
pub use profile::{UserProfile, PROFILE_FIELDS};
pub use signature::{sign, validate_signature, verify_subscription, SubscriptionQuery, SIGNATURE_HEADER};
pub use templates::Template;
