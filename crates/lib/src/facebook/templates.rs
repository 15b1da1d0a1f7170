//! Structured message templates (button, generic, list, receipt).
//!
//! A template serializes to the Send API `message` body:
//! `{"attachment": {"type": "template", "payload": {"template_type": ..., ...}}}`.

use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "template_type", rename_all = "snake_case")]
pub enum Template {
    Button(ButtonTemplate),
    Generic(GenericTemplate),
    List(ListTemplate),
    Receipt(ReceiptTemplate),
}

impl Template {
    /// The `message` object for this template.
    pub fn to_message(&self) -> Result<Value, serde_json::Error> {
        Ok(json!({
            "attachment": {
                "type": "template",
                "payload": serde_json::to_value(self)?,
            }
        }))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonType {
    WebUrl,
    Postback,
    PhoneNumber,
    ElementShare,
    AccountLink,
    AccountUnlink,
}

/// Button attached to a template or template element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementButton {
    #[serde(rename = "type")]
    pub kind: ButtonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webview_height_ratio: Option<String>,
}

impl ElementButton {
    fn new(kind: ButtonType, title: Option<String>) -> Self {
        Self {
            kind,
            title,
            url: None,
            payload: None,
            webview_height_ratio: None,
        }
    }

    pub fn web_url(title: impl Into<String>, url: impl Into<String>) -> Self {
        let mut b = Self::new(ButtonType::WebUrl, Some(title.into()));
        b.url = Some(url.into());
        b
    }

    pub fn postback(title: impl Into<String>, payload: impl Into<String>) -> Self {
        let mut b = Self::new(ButtonType::Postback, Some(title.into()));
        b.payload = Some(payload.into());
        b
    }

    /// `number` in international format, e.g. `+15105551234`.
    pub fn phone_number(title: impl Into<String>, number: impl Into<String>) -> Self {
        let mut b = Self::new(ButtonType::PhoneNumber, Some(title.into()));
        b.payload = Some(number.into());
        b
    }

    pub fn share() -> Self {
        Self::new(ButtonType::ElementShare, None)
    }

    pub fn account_link(url: impl Into<String>) -> Self {
        let mut b = Self::new(ButtonType::AccountLink, None);
        b.url = Some(url.into());
        b
    }

    pub fn account_unlink() -> Self {
        Self::new(ButtonType::AccountUnlink, None)
    }

    /// `compact`, `tall` or `full`.
    pub fn height_ratio(mut self, ratio: impl Into<String>) -> Self {
        self.webview_height_ratio = Some(ratio.into());
        self
    }
}

/// Text with up to three buttons.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ButtonTemplate {
    pub text: String,
    pub buttons: Vec<ElementButton>,
}

impl ButtonTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            buttons: Vec::new(),
        }
    }

    pub fn add_button(mut self, button: ElementButton) -> Self {
        self.buttons.push(button);
        self
    }
}

/// Card used by generic and list templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Element {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ElementButton>,
}

impl Element {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn item_url(mut self, url: impl Into<String>) -> Self {
        self.item_url = Some(url.into());
        self
    }

    pub fn add_button(mut self, button: ElementButton) -> Self {
        self.buttons.push(button);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageAspectRatio {
    Horizontal,
    Square,
}

/// Horizontally scrollable carousel of elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GenericTemplate {
    pub elements: Vec<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_aspect_ratio: Option<ImageAspectRatio>,
}

impl GenericTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn add_elements(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.elements.extend(elements);
        self
    }

    pub fn image_aspect_ratio(mut self, ratio: ImageAspectRatio) -> Self {
        self.image_aspect_ratio = Some(ratio);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TopElementStyle {
    Large,
    Compact,
}

/// Vertical list of 2–4 elements with an optional global button.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ListTemplate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_element_style: Option<TopElementStyle>,
    pub elements: Vec<Element>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<ElementButton>,
}

impl ListTemplate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_element(mut self, element: Element) -> Self {
        self.elements.push(element);
        self
    }

    pub fn add_global_button(mut self, button: ElementButton) -> Self {
        self.buttons.push(button);
        self
    }

    pub fn top_element_style(mut self, style: TopElementStyle) -> Self {
        self.top_element_style = Some(style);
        self
    }
}

/// Order confirmation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptTemplate {
    pub recipient_name: String,
    pub order_number: String,
    pub currency: String,
    pub payment_method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_url: Option<String>,
    /// Seconds since the epoch, as a string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    pub elements: Vec<ReceiptElement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<ReceiptAddress>,
    pub summary: ReceiptSummary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub adjustments: Vec<ReceiptAdjustment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptElement {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptAddress {
    pub street_1: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_2: Option<String>,
    pub city: String,
    pub postal_code: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipping_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tax: Option<f64>,
    pub total_cost: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReceiptAdjustment {
    pub name: String,
    pub amount: f64,
}

impl From<ButtonTemplate> for Template {
    fn from(t: ButtonTemplate) -> Self {
        Template::Button(t)
    }
}

impl From<GenericTemplate> for Template {
    fn from(t: GenericTemplate) -> Self {
        Template::Generic(t)
    }
}

impl From<ListTemplate> for Template {
    fn from(t: ListTemplate) -> Self {
        Template::List(t)
    }
}

impl From<ReceiptTemplate> for Template {
    fn from(t: ReceiptTemplate) -> Self {
        Template::Receipt(t)
    }
}
