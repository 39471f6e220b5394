//! Error types for helius-kit.
//!
//! # Error Hierarchy
//!
//! - [`Error`](enum@Error) — Main error type, returned by most operations
//!   - [`RpcError`] — Transport and JSON-RPC failures
//!   - [`SignerError`] — Signing operation failures
//!   - [`ParsePubkeyError`] — Invalid address format
//!   - [`ParseHashError`] — Invalid hash format
//!
//! # Pattern Matching
//!
//! ```rust,no_run
//! use helius_kit::{Error, Helius};
//!
//! # async fn example(stake_account: helius_kit::Pubkey) -> Result<(), Error> {
//! let helius = Helius::mainnet().api_key("key").build();
//!
//! match helius.stake().get_withdrawable_amount(stake_account, false).await {
//!     Ok(lamports) => println!("withdrawable: {lamports}"),
//!     Err(Error::StakeAccountNotFound(address)) => {
//!         println!("no stake account at {address}");
//!     }
//!     Err(e) => return Err(e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

use crate::types::Pubkey;

/// Error parsing a base58-encoded address.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParsePubkeyError {
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid address length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Error parsing a base58-encoded hash.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseHashError {
    #[error("Invalid base58 encoding: {0}")]
    InvalidBase58(String),

    #[error("Invalid hash length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

/// Errors from signing operations.
#[derive(Debug, Error)]
pub enum SignerError {
    /// A required signer for the transaction was not provided.
    #[error("Transaction requires a signature for {0}, but no matching signer was provided")]
    MissingSigner(String),

    /// The provided signer does not sign for any account in the transaction.
    #[error("Signer {0} is not a required signer for this transaction")]
    UnknownSigner(String),

    /// Invalid secret key material.
    #[error("Invalid secret key: {0}")]
    InvalidKey(String),

    /// The signing backend failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),
}

/// Errors from the RPC transport and JSON-RPC protocol layers.
///
/// Nothing is retried or suppressed at this layer: every failure
/// surfaces to the caller unmodified.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Non-success HTTP response. The message is extracted from the
    /// response body when possible, otherwise the status text.
    #[error("Transport error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// The server returned a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },

    /// The HTTP request itself failed (connection, TLS, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be decoded.
    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    /// The response was well-formed JSON but not a valid JSON-RPC reply.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request was cancelled before a response arrived.
    #[error("Request cancelled")]
    Cancelled,
}

/// Main error type for helius-kit operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The queried stake account does not exist on chain.
    #[error("Stake account {0} does not exist")]
    StakeAccountNotFound(Pubkey),

    /// The queried account exists but does not hold stake-program state.
    #[error("Account {address} is not a valid stake account: {reason}")]
    InvalidStakeAccount { address: Pubkey, reason: String },

    /// RPC failure, propagated unmodified.
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// Signing failure, propagated unmodified.
    #[error(transparent)]
    Signer(#[from] SignerError),

    /// Client configuration problem (missing API key, bad env vars).
    #[error("Configuration error: {0}")]
    Config(String),
}
