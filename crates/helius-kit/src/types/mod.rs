//! Core Solana types.
//!
//! Hand-rolled types for addresses, hashes, keys, instructions, the
//! legacy transaction wire format, and the RPC response views this
//! crate consumes.

mod hash;
mod instruction;
mod key;
mod pubkey;
mod rpc;
mod transaction;

pub use hash::Hash;
pub use instruction::{AccountMeta, Instruction};
pub use key::{KeySigner, Keypair, Signature};
pub use pubkey::Pubkey;
pub use rpc::{
    AccountFilter, AuthorizedView, DelegationView, EpochInfo, KeyedParsedAccount, LatestBlockhash,
    MemcmpFilter, ParsedAccountView, ParsedDataView, RpcContext, StakeDetailsView, StakeInfoView,
    StakeMetaView, StakeStateView, WithContext,
};
pub use transaction::{CompiledInstruction, Message, MessageHeader, Transaction};
