//! Typed views over JSON-RPC responses.
//!
//! Hand-rolled serde structs for the subset of the RPC surface the
//! stake client consumes, plus the program-account filter shapes. The
//! `jsonParsed` encoding renders u64 fields as strings, so those use
//! `DisplayFromStr`.

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::types::{Hash, Pubkey};

// ============================================================================
// Generic response envelopes
// ============================================================================

/// Slot context attached to commitment-aware responses.
#[derive(Clone, Debug, Deserialize)]
pub struct RpcContext {
    pub slot: u64,
}

/// The `{ context, value }` wrapper used by account and blockhash
/// queries.
#[derive(Clone, Debug, Deserialize)]
pub struct WithContext<T> {
    pub context: RpcContext,
    pub value: T,
}

// ============================================================================
// Chain state views
// ============================================================================

/// `getEpochInfo` response.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochInfo {
    pub epoch: u64,
    pub slot_index: u64,
    pub slots_in_epoch: u64,
    pub absolute_slot: u64,
    pub block_height: u64,
    #[serde(default)]
    pub transaction_count: Option<u64>,
}

/// `getLatestBlockhash` response value.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatestBlockhash {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}

// ============================================================================
// Parsed accounts
// ============================================================================

/// An account in `jsonParsed` encoding.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedAccountView {
    pub lamports: u64,
    pub owner: Pubkey,
    pub data: ParsedDataView,
    pub executable: bool,
    pub rent_epoch: u64,
    #[serde(default)]
    pub space: Option<u64>,
}

/// The parsed data section: the owning program's name plus its
/// program-specific JSON rendering.
#[derive(Clone, Debug, Deserialize)]
pub struct ParsedDataView {
    pub program: String,
    pub parsed: serde_json::Value,
    #[serde(default)]
    pub space: Option<u64>,
}

/// A program-owned account with its address, as returned by
/// `getProgramAccounts`.
#[derive(Clone, Debug, Deserialize)]
pub struct KeyedParsedAccount {
    pub pubkey: Pubkey,
    pub account: ParsedAccountView,
}

// ============================================================================
// Stake account views (jsonParsed "stake" program rendering)
// ============================================================================

/// Top level of a parsed stake account: state tag plus details.
#[derive(Clone, Debug, Deserialize)]
pub struct StakeStateView {
    #[serde(rename = "type")]
    pub state: String,
    pub info: StakeInfoView,
}

#[derive(Clone, Debug, Deserialize)]
pub struct StakeInfoView {
    pub meta: StakeMetaView,
    /// Absent until the account has been delegated.
    #[serde(default)]
    pub stake: Option<StakeDetailsView>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeMetaView {
    #[serde_as(as = "DisplayFromStr")]
    pub rent_exempt_reserve: u64,
    pub authorized: AuthorizedView,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AuthorizedView {
    pub staker: Pubkey,
    pub withdrawer: Pubkey,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StakeDetailsView {
    pub delegation: DelegationView,
    #[serde(default)]
    pub credits_observed: Option<u64>,
}

#[serde_as]
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegationView {
    /// The vote account this stake is delegated to.
    pub voter: Pubkey,
    #[serde_as(as = "DisplayFromStr")]
    pub stake: u64,
    #[serde_as(as = "DisplayFromStr")]
    pub activation_epoch: u64,
    /// `u64::MAX` while the delegation is live.
    #[serde_as(as = "DisplayFromStr")]
    pub deactivation_epoch: u64,
}

// ============================================================================
// Program account filters
// ============================================================================

/// Server-side filters for `getProgramAccounts`.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AccountFilter {
    /// Keep accounts whose data is exactly this many bytes.
    DataSize(u64),
    /// Keep accounts whose data matches `bytes` at `offset`.
    Memcmp(MemcmpFilter),
}

#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct MemcmpFilter {
    pub offset: u64,
    /// Base58-encoded bytes to compare.
    pub bytes: String,
}

impl AccountFilter {
    /// Match a pubkey's raw bytes at a fixed offset.
    pub fn memcmp_pubkey(offset: u64, pubkey: &Pubkey) -> Self {
        Self::Memcmp(MemcmpFilter {
            offset,
            bytes: pubkey.to_string(),
        })
    }
}
