//! An ergonomic Rust client for Helius RPC.
//!
//! **helius-kit** wraps the Helius Solana endpoints behind one client:
//! the standard JSON-RPC surface, the Helius-specific methods (DAS
//! asset queries, priority-fee estimation), and typed builders for the
//! stake lifecycle against the Helius validator.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use helius_kit::{Helius, Keypair};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), helius_kit::Error> {
//!     // Configure once
//!     let helius = Helius::mainnet().api_key("my-api-key").build();
//!
//!     // Build a signed stake creation for 1.5 SOL
//!     let owner = Keypair::generate();
//!     let created = helius.stake().create_stake_transaction(&owner, 1.5).await?;
//!     println!("stake account: {}", created.stake_account);
//!
//!     Ok(())
//! }
//! ```
//!
//! # Design
//!
//! 1. **Single entry point**: Everything hangs off the [`Helius`] client
//! 2. **Configure once**: Network and api key set at client creation
//! 3. **Open dispatch**: Any method by name via [`Helius::invoke`],
//!    with the Helius method table shaping parameters where needed
//! 4. **Typed where it counts**: The stake lifecycle uses real types
//!    ([`Pubkey`], [`Keypair`], [`Instruction`]) end to end
//!
//! # Core Types
//!
//! - [`Pubkey`] — 32-byte account address, base58 in text
//! - [`Hash`] — 32-byte blockhash
//! - [`Keypair`] — ed25519 keypair implementing [`KeySigner`]
//! - [`Transaction`] / [`Message`] — legacy wire-format transactions

pub mod client;
pub mod error;
pub mod stake;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{Error, RpcError, SignerError};
pub use types::*;

// Re-export client types
pub use client::{
    BaseRpc, CallOutcome, ChainQueries, CustomMethodRegistry, DeferredRequest, DispatchProxy,
    DispatchProxyBuilder, Helius, HeliusBuilder, MethodDescriptor, Network, RpcCapability,
};

// Re-export stake types
pub use stake::{CreatedStake, StakeClient};
