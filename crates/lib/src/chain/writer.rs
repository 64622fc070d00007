//! Chain writer: zero-value transaction to the null address carrying the payload as calldata.
//!
//! Sending moves funds-bearing state, so nothing here is retried; every failure is returned.

use crate::chain::encode_payload;
use crate::config::ChainConfig;
use crate::http::ApiResult;
use crate::wallet::{
    Address, SignerHandle, TransactionRequest, TxHash, TxReceipt, WalletError, WalletSession,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub struct ChainWriter {
    session: Arc<WalletSession>,
    confirmations: u64,
    poll_interval: Duration,
    receipt_timeout: Duration,
}

impl ChainWriter {
    pub fn new(session: Arc<WalletSession>, config: &ChainConfig) -> Self {
        Self {
            session,
            confirmations: config.confirmations,
            poll_interval: config.receipt_poll(),
            receipt_timeout: config.receipt_timeout(),
        }
    }

    /// Write `payload` to the zero address and wait for inclusion. Requires a connected session.
    pub async fn send_payload(&self, payload: &str) -> ApiResult<TxHash> {
        match self.try_send_payload(payload).await {
            Ok(hash) => ApiResult::success(hash),
            Err(e) => {
                log::error!("chain: send to zero address failed: {}", e);
                ApiResult::failure(e.to_string())
            }
        }
    }

    async fn try_send_payload(&self, payload: &str) -> Result<TxHash, WalletError> {
        let signer = self.session.signer().await.ok_or(WalletError::NotConnected)?;
        let tx = TransactionRequest {
            from: signer.address().clone(),
            to: Address::zero(),
            value: "0x0".to_string(),
            data: encode_payload(payload),
        };
        let hash = signer.send_transaction(&tx).await?;
        log::info!("chain: submitted {} from {}", hash, tx.from);
        if self.confirmations > 0 {
            let receipt = self.wait_for_inclusion(&signer, &hash).await?;
            log::info!(
                "chain: {} included in block {}",
                hash,
                receipt
                    .block()
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "?".to_string())
            );
        }
        Ok(hash)
    }

    /// Poll for the receipt until it has `confirmations` blocks on top (counting its own).
    async fn wait_for_inclusion(
        &self,
        signer: &SignerHandle,
        hash: &TxHash,
    ) -> Result<TxReceipt, WalletError> {
        let deadline = Instant::now() + self.receipt_timeout;
        loop {
            if let Some(receipt) = signer.transaction_receipt(hash).await? {
                if !receipt.succeeded() {
                    return Err(WalletError::Transaction(format!("{} reverted", hash)));
                }
                if self.confirmations <= 1 {
                    return Ok(receipt);
                }
                if let Some(mined) = receipt.block() {
                    let head = signer.block_number().await?;
                    if head.saturating_sub(mined) + 1 >= self.confirmations {
                        return Ok(receipt);
                    }
                }
            }
            if Instant::now() >= deadline {
                return Err(WalletError::Transaction(format!(
                    "timed out waiting for {} to be included",
                    hash
                )));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
