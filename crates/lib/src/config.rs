//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.zerochat/config.json`) and environment.
//! Every field has a default, so an empty `{}` file is a valid config.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Request defaults for the HTTP client.
    #[serde(default)]
    pub http: HttpConfig,

    /// Remote chat endpoint.
    #[serde(default)]
    pub chat: ChatConfig,

    /// Wallet provider and transaction settings.
    #[serde(default)]
    pub chain: ChainConfig,
}

/// Defaults applied to every HTTP request unless overridden per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpConfig {
    /// Prefix for relative request URLs (e.g. "/api/list"). Absolute URLs ignore it.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Per-attempt timeout in milliseconds (default 30000).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Extra attempts after the first one fails (default 3).
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Backoff before retry n is `n * backoffStepMs` (default 1000).
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,

    /// Bearer token sent as `Authorization`. Overridden by ZEROCHAT_API_TOKEN env.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_retries() -> u32 {
    3
}

fn default_backoff_step_ms() -> u64 {
    1_000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
            backoff_step_ms: default_backoff_step_ms(),
            auth_token: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }
}

/// Chat endpoint config.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatConfig {
    /// URL that accepts `POST {"prompt": "..."}` and answers with the reply.
    #[serde(default = "default_chat_endpoint")]
    pub endpoint: String,
}

fn default_chat_endpoint() -> String {
    "https://cloudflare-work.liujifeng8106.workers.dev".to_string()
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: default_chat_endpoint(),
        }
    }
}

/// Wallet provider, list endpoint and receipt polling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    /// Endpoint returning the latest zero-address transaction record.
    #[serde(default = "default_list_endpoint")]
    pub list_endpoint: String,

    /// JSON-RPC URL of the node that acts as wallet provider for the CLI.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Confirmations to wait for after submitting a transaction (default 1).
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,

    /// Interval between receipt polls in milliseconds.
    #[serde(default = "default_receipt_poll_ms")]
    pub receipt_poll_ms: u64,

    /// Give up waiting for inclusion after this many milliseconds.
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
}

fn default_list_endpoint() -> String {
    "/api/list".to_string()
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8545".to_string()
}

fn default_confirmations() -> u64 {
    1
}

fn default_receipt_poll_ms() -> u64 {
    1_000
}

fn default_receipt_timeout_ms() -> u64 {
    120_000
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            list_endpoint: default_list_endpoint(),
            rpc_url: default_rpc_url(),
            confirmations: default_confirmations(),
            receipt_poll_ms: default_receipt_poll_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
        }
    }
}

impl ChainConfig {
    pub fn receipt_poll(&self) -> Duration {
        Duration::from_millis(self.receipt_poll_ms)
    }

    pub fn receipt_timeout(&self) -> Duration {
        Duration::from_millis(self.receipt_timeout_ms)
    }
}

/// Resolve the API token: env ZEROCHAT_API_TOKEN overrides config.
pub fn resolve_auth_token(config: &Config) -> Option<String> {
    std::env::var("ZEROCHAT_API_TOKEN")
        .ok()
        .and_then(|s| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(t.to_string())
            }
        })
        .or_else(|| {
            config
                .http
                .auth_token
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("ZEROCHAT_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            dirs::home_dir()
                .map(|h| h.join(".zerochat").join("config.json"))
                .unwrap_or_else(|| PathBuf::from("config.json"))
        })
}

/// Load config from the given path, ZEROCHAT_CONFIG_PATH, or the default. Missing file => default config.
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
