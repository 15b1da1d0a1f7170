//! Abstract replies produced by the conversation engine.

use crate::facebook::templates::Template;
use serde_json::{Map, Value};

/// What the bot wants to say. Converted to a Send API body by [`crate::facebook::build_payload`].
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    /// Text with quick reply buttons.
    Question(Question),
    /// Platform template, sent verbatim.
    Template(Template),
    /// Text and/or attachment.
    Message(OutgoingMessage),
}

impl Reply {
    /// Text used for the base `message.text` before kind-specific rewriting.
    pub fn text(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::Question(q) => &q.text,
            Reply::Template(_) => "",
            Reply::Message(m) => &m.text,
        }
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<Question> for Reply {
    fn from(q: Question) -> Self {
        Reply::Question(q)
    }
}

impl From<Template> for Reply {
    fn from(t: Template) -> Self {
        Reply::Template(t)
    }
}

impl From<OutgoingMessage> for Reply {
    fn from(m: OutgoingMessage) -> Self {
        Reply::Message(m)
    }
}

/// A question offering quick reply buttons.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Question {
    pub text: String,
    pub buttons: Vec<Button>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn add_button(mut self, button: Button) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn add_buttons(mut self, buttons: impl IntoIterator<Item = Button>) -> Self {
        self.buttons.extend(buttons);
        self
    }
}

/// One quick reply choice.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Button {
    pub text: String,
    pub value: String,
    pub image_url: Option<String>,
    /// Extra quick reply fields; these override the generated ones.
    pub additional: Map<String, Value>,
}

impl Button {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            value: text.clone(),
            text,
            image_url: None,
            additional: Map::new(),
        }
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn additional(mut self, additional: Map<String, Value>) -> Self {
        self.additional = additional;
        self
    }

    /// Quick reply object: `{content_type, title, payload, image_url}` overlaid with `additional`.
    pub fn to_quick_reply(&self) -> Value {
        let mut reply = Map::new();
        reply.insert("content_type".into(), Value::from("text"));
        reply.insert("title".into(), Value::from(self.text.clone()));
        reply.insert("payload".into(), Value::from(self.value.clone()));
        reply.insert(
            "image_url".into(),
            self.image_url.clone().map(Value::from).unwrap_or(Value::Null),
        );
        for (key, value) in &self.additional {
            reply.insert(key.clone(), value.clone());
        }
        Value::Object(reply)
    }
}

/// Text message, optionally carrying an attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutgoingMessage {
    pub text: String,
    pub attachment: Option<Attachment>,
}

impl OutgoingMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment: None,
        }
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    Video { url: String },
    Audio { url: String },
    Image { url: String },
    File { url: String },
    /// Not sendable through the Send API as an attachment; the message text is sent instead.
    Location { latitude: f64, longitude: f64 },
}

impl Attachment {
    /// Attachment `type` and URL when the Send API supports this kind.
    pub fn upload(&self) -> Option<(&'static str, &str)> {
        match self {
            Attachment::Video { url } => Some(("video", url)),
            Attachment::Audio { url } => Some(("audio", url)),
            Attachment::Image { url } => Some(("image", url)),
            Attachment::File { url } => Some(("file", url)),
            Attachment::Location { .. } => None,
        }
    }
}
