//! Signer handle: submits transactions on behalf of the connected account through the provider.

use crate::wallet::provider::{methods, WalletProvider};
use crate::wallet::{Address, TxHash, WalletError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// `eth_sendTransaction` parameter object. `value` is a hex quantity (`0x0` for zero).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRequest {
    pub from: Address,
    pub to: Address,
    pub value: String,
    pub data: String,
}

/// Subset of `eth_getTransactionReceipt` that inclusion tracking needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxReceipt {
    pub transaction_hash: TxHash,
    #[serde(default)]
    pub block_number: Option<String>,
    /// `0x1` success, `0x0` reverted; absent on pre-Byzantium chains.
    #[serde(default)]
    pub status: Option<String>,
}

impl TxReceipt {
    pub fn succeeded(&self) -> bool {
        self.status.as_deref() != Some("0x0")
    }

    pub fn block(&self) -> Option<u64> {
        self.block_number.as_deref().and_then(parse_quantity)
    }
}

/// Parse a JSON-RPC hex quantity such as `0x1a`.
pub(crate) fn parse_quantity(s: &str) -> Option<u64> {
    let digits = s.strip_prefix("0x")?;
    u64::from_str_radix(digits, 16).ok()
}

/// Capability to sign and send for one account. Cheap to clone; owned by the wallet session.
#[derive(Clone)]
pub struct SignerHandle {
    account: Address,
    provider: Arc<dyn WalletProvider>,
}

impl fmt::Debug for SignerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerHandle")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

impl SignerHandle {
    pub(crate) fn new(account: Address, provider: Arc<dyn WalletProvider>) -> Self {
        Self { account, provider }
    }

    pub fn address(&self) -> &Address {
        &self.account
    }

    /// Submit the transaction; the wallet signs it. Returns the hash once accepted into the pool.
    pub async fn send_transaction(&self, tx: &TransactionRequest) -> Result<TxHash, WalletError> {
        let params = serde_json::json!([tx]);
        let res = self
            .provider
            .request(methods::SEND_TRANSACTION, params)
            .await?;
        let hash = res
            .as_str()
            .ok_or_else(|| WalletError::InvalidResponse(format!("transaction hash: {}", res)))?;
        TxHash::parse(hash).map_err(|e| WalletError::InvalidResponse(e.to_string()))
    }

    /// Receipt for `hash`, or `None` while the transaction is still pending.
    pub async fn transaction_receipt(
        &self,
        hash: &TxHash,
    ) -> Result<Option<TxReceipt>, WalletError> {
        let res = self
            .provider
            .request(
                methods::GET_TRANSACTION_RECEIPT,
                serde_json::json!([hash.to_string()]),
            )
            .await?;
        if res.is_null() {
            return Ok(None);
        }
        serde_json::from_value(res)
            .map(Some)
            .map_err(|e| WalletError::InvalidResponse(format!("receipt: {}", e)))
    }

    pub async fn block_number(&self) -> Result<u64, WalletError> {
        let res = self
            .provider
            .request(methods::BLOCK_NUMBER, serde_json::json!([]))
            .await?;
        res.as_str()
            .and_then(parse_quantity)
            .ok_or_else(|| WalletError::InvalidResponse(format!("block number: {}", res)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quantity_parsing() {
        assert_eq!(parse_quantity("0x0"), Some(0));
        assert_eq!(parse_quantity("0x1a"), Some(26));
        assert_eq!(parse_quantity("1a"), None);
    }

    #[test]
    fn receipt_status() {
        let hash = format!("0x{}", "11".repeat(32));
        let ok: TxReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": hash, "blockNumber": "0x10", "status": "0x1"
        }))
        .unwrap();
        assert!(ok.succeeded());
        assert_eq!(ok.block(), Some(16));

        let reverted: TxReceipt = serde_json::from_value(serde_json::json!({
            "transactionHash": hash, "blockNumber": "0x10", "status": "0x0"
        }))
        .unwrap();
        assert!(!reverted.succeeded());
    }

    #[test]
    fn transaction_request_wire_shape() {
        let tx = TransactionRequest {
            from: Address::parse(&format!("0x{}", "ab".repeat(20))).unwrap(),
            to: Address::zero(),
            value: "0x0".to_string(),
            data: "0x6869".to_string(),
        };
        let v = serde_json::to_value(&tx).unwrap();
        assert_eq!(v["to"], "0x0000000000000000000000000000000000000000");
        assert_eq!(v["value"], "0x0");
        assert_eq!(v["data"], "0x6869");
    }
}
