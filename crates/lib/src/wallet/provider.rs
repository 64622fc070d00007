//! Provider capability: the EIP-1193 `request` call plus the `accountsChanged` event stream.

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

/// RPC method names used by the session and the chain writer.
pub mod methods {
    pub const ACCOUNTS: &str = "eth_accounts";
    pub const REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
    pub const SEND_TRANSACTION: &str = "eth_sendTransaction";
    pub const GET_TRANSACTION_RECEIPT: &str = "eth_getTransactionReceipt";
    pub const BLOCK_NUMBER: &str = "eth_blockNumber";
}

/// The user declined the request in the wallet UI.
pub const USER_REJECTED: i64 = 4001;
/// The provider already has a prompt of the same kind open.
pub const REQUEST_PENDING: i64 = -32002;
/// The provider cannot reach any chain.
pub const DISCONNECTED: i64 = 4900;

/// Error object returned by a provider (`{code, message}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, thiserror::Error)]
#[error("provider error {code}: {message}")]
pub struct ProviderError {
    pub code: i64,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Injected wallet provider. Payloads are untyped JSON; callers narrow them.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// `request({method, params})`.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, ProviderError>;

    /// Subscribe to `accountsChanged`. Dropping the receiver removes the listener.
    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<String>>;
}
