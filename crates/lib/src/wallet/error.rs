use crate::wallet::provider::{ProviderError, REQUEST_PENDING, USER_REJECTED};

/// Wallet-side failures. Never retried; each variant carries its own user-facing message.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    #[error("no wallet provider found; install a wallet extension or configure an RPC provider")]
    ProviderMissing,
    #[error("the wallet already has a request open; finish or dismiss it in the wallet first")]
    ProviderBusy,
    #[error("request was rejected in the wallet")]
    UserRejected,
    #[error("already connecting; wait for the current request to finish")]
    AlreadyConnecting,
    #[error("the wallet returned no accounts")]
    NoAccounts,
    #[error("wallet not connected")]
    NotConnected,
    #[error(transparent)]
    Provider(ProviderError),
    #[error("unexpected provider response: {0}")]
    InvalidResponse(String),
    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl From<ProviderError> for WalletError {
    fn from(e: ProviderError) -> Self {
        match e.code {
            USER_REJECTED => WalletError::UserRejected,
            REQUEST_PENDING => WalletError::ProviderBusy,
            _ => WalletError::Provider(e),
        }
    }
}
