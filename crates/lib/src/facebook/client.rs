//! Graph API client: Send API, typing indicator, user profile and raw calls.

use crate::config::FacebookConfig;
use crate::facebook::error::FacebookError;
use crate::facebook::merge::replace_recursive;
use crate::facebook::payload::typing_payload;
use crate::facebook::profile::{UserProfile, PROFILE_FIELDS};
use reqwest::StatusCode;
use serde_json::{json, Value};

/// Raw Graph API answer, returned by [`GraphClient::send_request`].
#[derive(Debug, Clone, PartialEq)]
pub struct GraphResponse {
    pub status: u16,
    pub body: String,
}

impl GraphResponse {
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

/// Client for the Graph API endpoints the driver uses. Cheap to clone.
#[derive(Clone)]
pub struct GraphClient {
    base_url: String,
    token: String,
    client: reqwest::Client,
}

impl GraphClient {
    pub fn new(config: &FacebookConfig) -> Self {
        Self {
            base_url: config.graph_api_base(),
            token: config.token().to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn messages_url(&self) -> String {
        format!("{}/me/messages", self.base_url)
    }

    /// POST a built payload to `me/messages`. Any status other than 200 is an error.
    pub async fn send_payload(&self, payload: &Value) -> Result<GraphResponse, FacebookError> {
        let res = self
            .client
            .post(self.messages_url())
            .json(payload)
            .send()
            .await?;
        let response = read_response(res).await?;
        ensure_ok(&response)?;
        Ok(response)
    }

    /// Switch the typing indicator on. The status is not checked.
    pub async fn types(&self, recipient_id: &str) -> Result<GraphResponse, FacebookError> {
        let res = self
            .client
            .post(self.messages_url())
            .json(&typing_payload(recipient_id, &self.token))
            .send()
            .await?;
        read_response(res).await
    }

    /// GET the profile of a page-scoped user id.
    pub async fn user_profile(&self, sender_id: &str) -> Result<UserProfile, FacebookError> {
        if self.token.is_empty() {
            return Err(FacebookError::NotConfigured);
        }
        let url = format!("{}/{}", self.base_url, sender_id);
        let res = self
            .client
            .get(&url)
            .query(&[("fields", PROFILE_FIELDS), ("access_token", self.token.as_str())])
            .send()
            .await?;
        let response = read_response(res).await?;
        ensure_ok(&response)?;
        let info = response.json().unwrap_or(Value::Null);
        Ok(UserProfile::from_info(sender_id, info))
    }

    /// POST `parameters` to `<base>/<endpoint>` with `access_token` added; keys already in
    /// `parameters` win over the injected token. The status is returned, not checked.
    pub async fn send_request(
        &self,
        endpoint: &str,
        parameters: Value,
    ) -> Result<GraphResponse, FacebookError> {
        let mut body = json!({ "access_token": self.token });
        replace_recursive(&mut body, parameters);
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        let res = self.client.post(&url).json(&body).send().await?;
        read_response(res).await
    }
}

async fn read_response(res: reqwest::Response) -> Result<GraphResponse, FacebookError> {
    let status = res.status().as_u16();
    let body = res.text().await?;
    Ok(GraphResponse { status, body })
}

/// Map a non-200 answer to [`FacebookError::Platform`] with the API's `error.message`.
fn ensure_ok(response: &GraphResponse) -> Result<(), FacebookError> {
    if response.status == StatusCode::OK.as_u16() {
        return Ok(());
    }
    let message = response
        .json()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| format!("{} {}", response.status, response.body));
    log::debug!("facebook: graph api returned {}: {}", response.status, message);
    Err(FacebookError::Platform(message))
}
