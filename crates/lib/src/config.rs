//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.fbgate/config.json`) and environment.
//! Facebook credentials can be supplied entirely through environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Graph API base used when no override is configured.
pub const DEFAULT_GRAPH_API_BASE: &str = "https://graph.facebook.com/v2.6";

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Gateway server settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Facebook page credentials.
    #[serde(default)]
    pub facebook: FacebookConfig,
}

/// Gateway bind and port.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    /// Port for HTTP (default 15152).
    #[serde(default = "default_gateway_port")]
    pub port: u16,

    /// Bind address (default "127.0.0.1").
    #[serde(default = "default_gateway_bind")]
    pub bind: String,
}

fn default_gateway_port() -> u16 {
    15152
}

fn default_gateway_bind() -> String {
    "127.0.0.1".to_string()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_gateway_port(),
            bind: default_gateway_bind(),
        }
    }
}

/// Facebook driver credentials. Read-only once resolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FacebookConfig {
    /// Page access token. Overridden by FACEBOOK_TOKEN env.
    pub token: Option<String>,
    /// App secret used to verify `X-Hub-Signature`. When unset, signatures are not checked.
    /// Overridden by FACEBOOK_APP_SECRET env.
    pub app_secret: Option<String>,
    /// Verify token for the webhook subscription handshake. Overridden by FACEBOOK_VERIFICATION env.
    pub verification: Option<String>,
    /// Graph API base URL (default https://graph.facebook.com/v2.6). Overridden by FACEBOOK_GRAPH_API_BASE env.
    pub graph_api_base: Option<String>,
}

impl FacebookConfig {
    /// Page access token, or "" when not configured.
    pub fn token(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }

    /// App secret when set and non-empty.
    pub fn app_secret(&self) -> Option<&str> {
        self.app_secret.as_deref().filter(|s| !s.is_empty())
    }

    /// True when a page access token is available.
    pub fn is_configured(&self) -> bool {
        !self.token().is_empty()
    }

    /// Graph API base without a trailing slash.
    pub fn graph_api_base(&self) -> String {
        self.graph_api_base
            .as_deref()
            .map(|s| s.trim().trim_end_matches('/'))
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_GRAPH_API_BASE)
            .to_string()
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Resolve Facebook credentials: each env var overrides the matching config field.
pub fn resolve_facebook_config(config: &Config) -> FacebookConfig {
    let fb = &config.facebook;
    FacebookConfig {
        token: env_non_empty("FACEBOOK_TOKEN").or_else(|| trimmed(&fb.token)),
        app_secret: env_non_empty("FACEBOOK_APP_SECRET").or_else(|| trimmed(&fb.app_secret)),
        verification: env_non_empty("FACEBOOK_VERIFICATION")
            .or_else(|| trimmed(&fb.verification)),
        graph_api_base: env_non_empty("FACEBOOK_GRAPH_API_BASE")
            .or_else(|| trimmed(&fb.graph_api_base)),
    }
}

/// True if the bind address is loopback (127.0.0.1, ::1, etc.).
pub fn is_loopback_bind(bind: &str) -> bool {
    let b = bind.trim();
    b == "127.0.0.1" || b == "::1" || b == "localhost"
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("FBGATE_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".fbgate").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, the default path, or FBGATE_CONFIG_PATH. Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
