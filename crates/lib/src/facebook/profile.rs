//! User profile returned by the Graph API.

use serde_json::Value;

/// Fields requested from the profile endpoint.
pub const PROFILE_FIELDS: &str =
    "first_name,last_name,profile_pic,locale,timezone,gender,is_payment_enabled,last_ad_referral";

/// Profile of the person behind a page-scoped id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserProfile {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub profile_pic: Option<String>,
    pub locale: Option<String>,
    /// Offset from UTC in hours.
    pub timezone: Option<f64>,
    pub gender: Option<String>,
    pub is_payment_enabled: Option<bool>,
    pub last_ad_referral: Option<Value>,
    /// Full response body.
    pub info: Value,
}

impl UserProfile {
    /// Build from a profile response. Each field is read on its own; one that is missing or
    /// of an unexpected type stays `None`.
    pub fn from_info(id: impl Into<String>, info: Value) -> Self {
        let text = |key: &str| info.get(key).and_then(Value::as_str).map(str::to_string);
        Self {
            id: id.into(),
            first_name: text("first_name"),
            last_name: text("last_name"),
            profile_pic: text("profile_pic"),
            locale: text("locale"),
            timezone: info.get("timezone").and_then(Value::as_f64),
            gender: text("gender"),
            is_payment_enabled: info.get("is_payment_enabled").and_then(Value::as_bool),
            last_ad_referral: info.get("last_ad_referral").filter(|v| !v.is_null()).cloned(),
            info,
        }
    }

    /// "First Last", skipping missing parts.
    pub fn full_name(&self) -> String {
        [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }
}
