//! Provider backed by a node's JSON-RPC endpoint (e.g. a local dev node with unlocked accounts).
//!
//! A node never prompts, so `eth_requestAccounts` is answered with `eth_accounts`, and it never
//! emits `accountsChanged`. Requests are sent once; nothing here retries.

use crate::wallet::provider::{methods, ProviderError, WalletProvider, DISCONNECTED};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;

#[derive(Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<ProviderError>,
}

pub struct JsonRpcProvider {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
    accounts_tx: broadcast::Sender<Vec<String>>,
}

impl JsonRpcProvider {
    pub fn new(url: impl Into<String>) -> Self {
        let (accounts_tx, _) = broadcast::channel(1);
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
            accounts_tx,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl WalletProvider for JsonRpcProvider {
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError> {
        let method = if method == methods::REQUEST_ACCOUNTS {
            methods::ACCOUNTS
        } else {
            method
        };
        let params = if params.is_null() {
            serde_json::json!([])
        } else {
            params
        };
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            method,
            params,
        };
        log::debug!("rpc: {} -> {}", method, self.url);
        let res = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::new(DISCONNECTED, format!("rpc request failed: {}", e)))?;
        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(ProviderError::new(
                DISCONNECTED,
                format!("rpc api error: {} {}", status, body),
            ));
        }
        let data: JsonRpcResponse = res
            .json()
            .await
            .map_err(|e| ProviderError::new(DISCONNECTED, format!("invalid rpc response: {}", e)))?;
        if let Some(err) = data.error {
            return Err(err);
        }
        Ok(data.result.unwrap_or(serde_json::Value::Null))
    }

    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<String>> {
        self.accounts_tx.subscribe()
    }
}
