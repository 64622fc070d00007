//! Wallet: connection lifecycle against an injected EIP-1193 provider.
//!
//! The provider is a capability passed in as `Arc<dyn WalletProvider>`; [`JsonRpcProvider`] forwards
//! to a node's JSON-RPC endpoint. Untyped provider payloads are narrowed into [`Address`] and
//! [`TxHash`] at this boundary.

mod error;
#[cfg(test)]
pub(crate) mod mock;
mod provider;
mod rpc;
mod session;
mod signer;
mod types;

pub use error::WalletError;
pub use provider::{methods, ProviderError, WalletProvider, REQUEST_PENDING, USER_REJECTED};
pub use rpc::JsonRpcProvider;
pub use session::{AccountsWatcher, ConnectionState, PendingReason, Phase, WalletSession};
pub use signer::{SignerHandle, TransactionRequest, TxReceipt};
pub use types::{Address, ParseHexError, TxHash};
