//! Wallet session: `Disconnected -> Connecting -> Connected` with a single-flight connect guard.
//!
//! State sits behind a `tokio::sync::Mutex` that is never held across a provider call, so the
//! guard is the state itself: a second `connect()` sees `Connecting` and returns without
//! prompting. `Connecting` records why it is pending: our own request is outstanding, or the
//! provider reported it still has a prompt open (-32002). The latter is not cleared by a failed
//! call; only an approval, an account change or `disconnect()` leaves it.

use crate::wallet::provider::{methods, WalletProvider};
use crate::wallet::{Address, SignerHandle, WalletError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

/// Why a connection attempt is still pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingReason {
    /// Our `eth_requestAccounts` call has not resolved yet.
    AwaitingAuthorization,
    /// The provider refused a new prompt because one is already open.
    ProviderBusy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting(PendingReason),
    Connected,
}

enum SessionState {
    Disconnected,
    Connecting(PendingReason),
    Connected {
        account: Address,
        signer: SignerHandle,
    },
}

/// Read-only snapshot. `connected` implies `account.is_some()`.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    pub phase: Phase,
    pub connected: bool,
    pub account: Option<Address>,
    pub signer: Option<SignerHandle>,
    pub pending: bool,
}

pub struct WalletSession {
    provider: Option<Arc<dyn WalletProvider>>,
    state: Mutex<SessionState>,
    watching: AtomicBool,
}

impl WalletSession {
    /// `provider` is `None` when no wallet was detected; connecting then fails with `ProviderMissing`.
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            state: Mutex::new(SessionState::Disconnected),
            watching: AtomicBool::new(false),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn state(&self) -> ConnectionState {
        let state = self.state.lock().await;
        match &*state {
            SessionState::Disconnected => ConnectionState {
                phase: Phase::Disconnected,
                connected: false,
                account: None,
                signer: None,
                pending: false,
            },
            SessionState::Connecting(reason) => ConnectionState {
                phase: Phase::Connecting(*reason),
                connected: false,
                account: None,
                signer: None,
                pending: true,
            },
            SessionState::Connected { account, signer } => ConnectionState {
                phase: Phase::Connected,
                connected: true,
                account: Some(account.clone()),
                signer: Some(signer.clone()),
                pending: false,
            },
        }
    }

    pub async fn is_connected(&self) -> bool {
        matches!(*self.state.lock().await, SessionState::Connected { .. })
    }

    pub async fn account(&self) -> Option<Address> {
        match &*self.state.lock().await {
            SessionState::Connected { account, .. } => Some(account.clone()),
            _ => None,
        }
    }

    pub async fn signer(&self) -> Option<SignerHandle> {
        match &*self.state.lock().await {
            SessionState::Connected { signer, .. } => Some(signer.clone()),
            _ => None,
        }
    }

    fn connected(provider: &Arc<dyn WalletProvider>, account: Address) -> SessionState {
        SessionState::Connected {
            signer: SignerHandle::new(account.clone(), provider.clone()),
            account,
        }
    }

    /// Pick up an authorization granted earlier (`eth_accounts`, never prompts).
    /// Returns the account when one was found; without a provider this is a no-op.
    pub async fn check_existing(&self) -> Result<Option<Address>, WalletError> {
        let Some(provider) = self.provider.as_ref() else {
            return Ok(None);
        };
        let res = provider
            .request(methods::ACCOUNTS, serde_json::json!([]))
            .await?;
        let accounts = narrow_accounts(&res)?;
        let Some(account) = accounts.into_iter().next() else {
            log::debug!("wallet: no previously authorized account");
            return Ok(None);
        };
        log::info!("wallet: restored connection to {}", account);
        *self.state.lock().await = Self::connected(provider, account.clone());
        Ok(Some(account))
    }

    /// Ask the wallet to authorize an account (`eth_requestAccounts`, prompts the user).
    pub async fn connect(&self) -> Result<Address, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::ProviderMissing)?;
        {
            let mut state = self.state.lock().await;
            match &*state {
                SessionState::Connecting(PendingReason::AwaitingAuthorization) => {
                    log::warn!("wallet: connect ignored, a connection request is already in flight");
                    return Err(WalletError::AlreadyConnecting);
                }
                SessionState::Connecting(PendingReason::ProviderBusy) => {
                    log::warn!("wallet: connect ignored, the wallet still has a prompt open");
                    return Err(WalletError::ProviderBusy);
                }
                _ => {}
            }
            *state = SessionState::Connecting(PendingReason::AwaitingAuthorization);
        }

        let outcome = match provider
            .request(methods::REQUEST_ACCOUNTS, serde_json::json!([]))
            .await
        {
            Ok(res) => narrow_accounts(&res)
                .and_then(|accounts| accounts.into_iter().next().ok_or(WalletError::NoAccounts)),
            Err(e) => Err(WalletError::from(e)),
        };

        let mut state = self.state.lock().await;
        if !matches!(
            *state,
            SessionState::Connecting(PendingReason::AwaitingAuthorization)
        ) {
            // accountsChanged or disconnect() landed while the prompt was open
            log::debug!("wallet: connect outcome superseded by a newer state change");
            return match (outcome, &*state) {
                (Ok(_), SessionState::Connected { account, .. }) => Ok(account.clone()),
                (Ok(_), _) => Err(WalletError::NotConnected),
                (Err(e), _) => Err(e),
            };
        }
        match outcome {
            Ok(account) => {
                log::info!("wallet: connected {}", account);
                *state = Self::connected(provider, account.clone());
                Ok(account)
            }
            Err(WalletError::ProviderBusy) => {
                log::warn!("wallet: provider is already processing a connection request");
                *state = SessionState::Connecting(PendingReason::ProviderBusy);
                Err(WalletError::ProviderBusy)
            }
            Err(e) => {
                log::error!("wallet: connect failed: {}", e);
                *state = SessionState::Disconnected;
                Err(e)
            }
        }
    }

    /// Forget the connection locally. The wallet keeps its authorization.
    pub async fn disconnect(&self) {
        *self.state.lock().await = SessionState::Disconnected;
        log::info!("wallet: disconnected");
    }

    /// Apply an `accountsChanged` notification.
    pub async fn handle_accounts_changed(&self, accounts: Vec<String>) {
        let accounts = match narrow_accounts(&serde_json::json!(accounts)) {
            Ok(a) => a,
            Err(e) => {
                log::warn!("wallet: ignoring accountsChanged: {}", e);
                return;
            }
        };
        let Some(account) = accounts.into_iter().next() else {
            self.disconnect().await;
            return;
        };
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        log::info!("wallet: active account is now {}", account);
        *self.state.lock().await = Self::connected(provider, account);
    }

    /// Follow the provider's account changes until the returned guard is dropped.
    /// Returns `None` without a provider or when a watcher is already running.
    pub fn watch_accounts(self: &Arc<Self>) -> Option<AccountsWatcher> {
        let provider = self.provider.as_ref()?;
        if self.watching.swap(true, Ordering::SeqCst) {
            log::debug!("wallet: accountsChanged watcher already running");
            return None;
        }
        let mut rx = provider.subscribe_accounts();
        let session = self.clone();
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(accounts) => session.handle_accounts_changed(accounts).await,
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        log::debug!("wallet: accountsChanged watcher skipped {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Some(AccountsWatcher {
            session: self.clone(),
            handle,
        })
    }
}

/// Live `accountsChanged` subscription; dropping it removes the listener.
pub struct AccountsWatcher {
    session: Arc<WalletSession>,
    handle: JoinHandle<()>,
}

impl Drop for AccountsWatcher {
    fn drop(&mut self) {
        self.handle.abort();
        self.session.watching.store(false, Ordering::SeqCst);
    }
}

/// Narrow a provider account list (JSON array of strings) into addresses.
fn narrow_accounts(value: &serde_json::Value) -> Result<Vec<Address>, WalletError> {
    let items = value
        .as_array()
        .ok_or_else(|| WalletError::InvalidResponse(format!("expected account list, got {}", value)))?;
    items
        .iter()
        .map(|item| {
            item.as_str()
                .ok_or_else(|| WalletError::InvalidResponse(format!("account entry {}", item)))
                .and_then(|s| {
                    Address::parse(s).map_err(|e| WalletError::InvalidResponse(e.to_string()))
                })
        })
        .collect()
}
