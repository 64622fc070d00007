//! Scriptable in-memory provider for session and chain-writer tests.

use crate::wallet::provider::{methods, ProviderError, WalletProvider};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Notify};

pub(crate) const ALICE: &str = "0x00000000000000000000000000000000000a11ce";
pub(crate) const BOB: &str = "0x0000000000000000000000000000000000000b0b";
pub(crate) const MOCK_TX_HASH: &str =
    "0x5e1f000000000000000000000000000000000000000000000000000000000001";

pub(crate) struct MockProvider {
    accounts: Mutex<Vec<String>>,
    request_accounts_failures: Mutex<VecDeque<ProviderError>>,
    gated: AtomicBool,
    entered: Notify,
    release: Notify,
    send_failure: Mutex<Option<ProviderError>>,
    receipts: Mutex<VecDeque<Value>>,
    block_number: AtomicU64,
    calls: Mutex<Vec<(String, Value)>>,
    accounts_tx: broadcast::Sender<Vec<String>>,
}

impl MockProvider {
    pub(crate) fn with_accounts(accounts: &[&str]) -> Arc<Self> {
        let (accounts_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            accounts: Mutex::new(accounts.iter().map(|a| a.to_string()).collect()),
            request_accounts_failures: Mutex::new(VecDeque::new()),
            gated: AtomicBool::new(false),
            entered: Notify::new(),
            release: Notify::new(),
            send_failure: Mutex::new(None),
            receipts: Mutex::new(VecDeque::new()),
            block_number: AtomicU64::new(0x10),
            calls: Mutex::new(Vec::new()),
            accounts_tx,
        })
    }

    /// Make `eth_requestAccounts` block until [`release_prompt`](Self::release_prompt).
    pub(crate) fn gate_request_accounts(&self) {
        self.gated.store(true, Ordering::SeqCst);
    }

    pub(crate) async fn wait_for_prompt(&self) {
        self.entered.notified().await;
    }

    pub(crate) fn release_prompt(&self) {
        self.release.notify_one();
    }

    /// Fail the next `eth_requestAccounts` with `err`.
    pub(crate) fn fail_request_accounts(&self, err: ProviderError) {
        self.request_accounts_failures.lock().unwrap().push_back(err);
    }

    pub(crate) fn fail_send(&self, err: ProviderError) {
        *self.send_failure.lock().unwrap() = Some(err);
    }

    /// Queue a receipt response (`Value::Null` for "still pending").
    pub(crate) fn push_receipt(&self, receipt: Value) {
        self.receipts.lock().unwrap().push_back(receipt);
    }

    pub(crate) fn set_block_number(&self, n: u64) {
        self.block_number.store(n, Ordering::SeqCst);
    }

    pub(crate) fn emit_accounts(&self, accounts: &[&str]) {
        let _ = self
            .accounts_tx
            .send(accounts.iter().map(|a| a.to_string()).collect());
    }

    pub(crate) fn calls_to(&self, method: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .count()
    }

    /// Transaction objects passed to `eth_sendTransaction`.
    pub(crate) fn sent_transactions(&self) -> Vec<Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == methods::SEND_TRANSACTION)
            .map(|(_, params)| params[0].clone())
            .collect()
    }

    fn accounts_json(&self) -> Value {
        json!(*self.accounts.lock().unwrap())
    }
}

pub(crate) fn mined_receipt(block: u64, status: &str) -> Value {
    json!({
        "transactionHash": MOCK_TX_HASH,
        "blockNumber": format!("0x{:x}", block),
        "status": status,
    })
}

#[async_trait]
impl WalletProvider for MockProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));
        match method {
            methods::ACCOUNTS => Ok(self.accounts_json()),
            methods::REQUEST_ACCOUNTS => {
                if self.gated.load(Ordering::SeqCst) {
                    self.entered.notify_one();
                    self.release.notified().await;
                }
                let failure = self.request_accounts_failures.lock().unwrap().pop_front();
                match failure {
                    Some(e) => Err(e),
                    None => Ok(self.accounts_json()),
                }
            }
            methods::SEND_TRANSACTION => match self.send_failure.lock().unwrap().take() {
                Some(e) => Err(e),
                None => Ok(json!(MOCK_TX_HASH)),
            },
            methods::GET_TRANSACTION_RECEIPT => Ok(self
                .receipts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| mined_receipt(0x10, "0x1"))),
            methods::BLOCK_NUMBER => Ok(json!(format!(
                "0x{:x}",
                self.block_number.load(Ordering::SeqCst)
            ))),
            other => Err(ProviderError::new(4200, format!("unsupported method {}", other))),
        }
    }

    fn subscribe_accounts(&self) -> broadcast::Receiver<Vec<String>> {
        self.accounts_tx.subscribe()
    }
}
