//! zerochat core library: retrying HTTP client, chat gateway and session, wallet session over an
//! injected EIP-1193 provider, and the zero-address payload writer used by the CLI.

pub mod chain;
pub mod chat;
pub mod config;
pub mod http;
pub mod init;
pub mod wallet;
