//! Driver errors.

#[derive(Debug, thiserror::Error)]
pub enum FacebookError {
    /// Webhook body is not JSON or lacks the `entry` list.
    #[error("malformed webhook payload: {0}")]
    MalformedPayload(String),
    /// Graph API answered with a status other than 200; carries `error.message`.
    #[error("Error sending payload: {0}")]
    Platform(String),
    #[error("facebook page token not configured")]
    NotConfigured,
    #[error("graph api request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("encoding payload: {0}")]
    Serialize(#[from] serde_json::Error),
}
