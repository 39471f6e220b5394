//! System and stake program instruction builders.
//!
//! Instruction data uses the programs' native encoding: a little-endian
//! u32 discriminant followed by little-endian fields.

use std::sync::LazyLock;

use crate::types::{AccountMeta, Instruction, Pubkey};

/// On-chain size of a stake account, in bytes.
pub const STAKE_ACCOUNT_SIZE: u64 = 200;

/// Byte offset of the staker authority within a stake account:
/// 4-byte state discriminant + 8-byte rent-exempt reserve.
pub const STAKER_AUTHORITY_OFFSET: u64 = 12;

/// Lamports per SOL.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

fn known_pubkey(encoded: &'static str) -> Pubkey {
    encoded.parse().expect("hardcoded address is valid base58")
}

/// The system program.
pub static SYSTEM_PROGRAM_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("11111111111111111111111111111111"));

/// The stake program.
pub static STAKE_PROGRAM_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("Stake11111111111111111111111111111111111111"));

/// Stake config account consumed by delegate instructions.
pub static STAKE_CONFIG_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("StakeConfig11111111111111111111111111111111"));

/// Clock sysvar.
pub static SYSVAR_CLOCK_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("SysvarC1ock11111111111111111111111111111111"));

/// Stake history sysvar.
pub static SYSVAR_STAKE_HISTORY_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("SysvarStakeHistory1111111111111111111111111"));

/// Rent sysvar.
pub static SYSVAR_RENT_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("SysvarRent111111111111111111111111111111111"));

/// The Helius validator vote account: the one delegation target this
/// crate creates stake for and filters stake accounts by.
pub static HELIUS_VALIDATOR_ID: LazyLock<Pubkey> =
    LazyLock::new(|| known_pubkey("he1iusMsKZDLmaGBzX9Jx8x9oHLYnbFx1Ariz2CvXUM"));

// System program discriminant.
const SYSTEM_CREATE_ACCOUNT: u32 = 0;

// Stake program discriminants.
const STAKE_INITIALIZE: u32 = 0;
const STAKE_DELEGATE: u32 = 2;
const STAKE_WITHDRAW: u32 = 4;
const STAKE_DEACTIVATE: u32 = 5;

/// System `CreateAccount`: allocate `space` bytes owned by `owner`,
/// funded with `lamports` from `from`.
pub fn create_account(
    from: &Pubkey,
    new_account: &Pubkey,
    lamports: u64,
    space: u64,
    owner: &Pubkey,
) -> Instruction {
    let mut data = Vec::with_capacity(4 + 8 + 8 + 32);
    data.extend_from_slice(&SYSTEM_CREATE_ACCOUNT.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());
    data.extend_from_slice(&space.to_le_bytes());
    data.extend_from_slice(owner.as_bytes());

    Instruction::new(
        *SYSTEM_PROGRAM_ID,
        vec![
            AccountMeta::new(*from, true),
            AccountMeta::new(*new_account, true),
        ],
        data,
    )
}

/// Stake `Initialize`: set authorities with no lockup.
pub fn initialize(stake: &Pubkey, staker: &Pubkey, withdrawer: &Pubkey) -> Instruction {
    let mut data = Vec::with_capacity(4 + 32 + 32 + 8 + 8 + 32);
    data.extend_from_slice(&STAKE_INITIALIZE.to_le_bytes());
    // Authorized { staker, withdrawer }
    data.extend_from_slice(staker.as_bytes());
    data.extend_from_slice(withdrawer.as_bytes());
    // Lockup { unix_timestamp: 0, epoch: 0, custodian: default }
    data.extend_from_slice(&0i64.to_le_bytes());
    data.extend_from_slice(&0u64.to_le_bytes());
    data.extend_from_slice(Pubkey::default().as_bytes());

    Instruction::new(
        *STAKE_PROGRAM_ID,
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(*SYSVAR_RENT_ID, false),
        ],
        data,
    )
}

/// Stake `DelegateStake`: delegate `stake` to the `vote` account.
pub fn delegate_stake(stake: &Pubkey, vote: &Pubkey, stake_authority: &Pubkey) -> Instruction {
    Instruction::new(
        *STAKE_PROGRAM_ID,
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(*vote, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK_ID, false),
            AccountMeta::new_readonly(*SYSVAR_STAKE_HISTORY_ID, false),
            AccountMeta::new_readonly(*STAKE_CONFIG_ID, false),
            AccountMeta::new_readonly(*stake_authority, true),
        ],
        STAKE_DELEGATE.to_le_bytes().to_vec(),
    )
}

/// Stake `Deactivate`: begin cooldown for `stake`.
pub fn deactivate(stake: &Pubkey, stake_authority: &Pubkey) -> Instruction {
    Instruction::new(
        *STAKE_PROGRAM_ID,
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK_ID, false),
            AccountMeta::new_readonly(*stake_authority, true),
        ],
        STAKE_DEACTIVATE.to_le_bytes().to_vec(),
    )
}

/// Stake `Withdraw`: move `lamports` from `stake` to `recipient`.
pub fn withdraw(
    stake: &Pubkey,
    recipient: &Pubkey,
    withdraw_authority: &Pubkey,
    lamports: u64,
) -> Instruction {
    let mut data = Vec::with_capacity(4 + 8);
    data.extend_from_slice(&STAKE_WITHDRAW.to_le_bytes());
    data.extend_from_slice(&lamports.to_le_bytes());

    Instruction::new(
        *STAKE_PROGRAM_ID,
        vec![
            AccountMeta::new(*stake, false),
            AccountMeta::new(*recipient, false),
            AccountMeta::new_readonly(*SYSVAR_CLOCK_ID, false),
            AccountMeta::new_readonly(*SYSVAR_STAKE_HISTORY_ID, false),
            AccountMeta::new_readonly(*withdraw_authority, true),
        ],
        data,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    #[test]
    fn test_known_addresses_parse() {
        // Force every lazy constant; a bad literal would panic here.
        assert_eq!(SYSTEM_PROGRAM_ID.as_bytes(), &[0u8; 32]);
        let _ = *STAKE_PROGRAM_ID;
        let _ = *STAKE_CONFIG_ID;
        let _ = *SYSVAR_CLOCK_ID;
        let _ = *SYSVAR_STAKE_HISTORY_ID;
        let _ = *SYSVAR_RENT_ID;
        let _ = *HELIUS_VALIDATOR_ID;
    }

    #[test]
    fn test_create_account_encoding() {
        let ix = create_account(&key(1), &key(2), 3_000_000, STAKE_ACCOUNT_SIZE, &STAKE_PROGRAM_ID);
        assert_eq!(ix.program_id, *SYSTEM_PROGRAM_ID);
        assert_eq!(&ix.data[..4], &0u32.to_le_bytes());
        assert_eq!(&ix.data[4..12], &3_000_000u64.to_le_bytes());
        assert_eq!(&ix.data[12..20], &200u64.to_le_bytes());
        assert_eq!(&ix.data[20..], STAKE_PROGRAM_ID.as_bytes());
        // Both funder and new account sign
        assert!(ix.accounts.iter().all(|m| m.is_signer && m.is_writable));
    }

    #[test]
    fn test_initialize_encoding() {
        let ix = initialize(&key(1), &key(2), &key(3));
        assert_eq!(ix.program_id, *STAKE_PROGRAM_ID);
        assert_eq!(ix.data.len(), 4 + 32 + 32 + 8 + 8 + 32);
        assert_eq!(&ix.data[..4], &0u32.to_le_bytes());
        assert_eq!(&ix.data[4..36], key(2).as_bytes());
        assert_eq!(&ix.data[36..68], key(3).as_bytes());
        // Lockup is zeroed
        assert!(ix.data[68..].iter().all(|b| *b == 0));
        // Initialize itself needs no signature
        assert!(ix.accounts.iter().all(|m| !m.is_signer));
        assert_eq!(ix.accounts[1].pubkey, *SYSVAR_RENT_ID);
    }

    #[test]
    fn test_delegate_encoding_and_accounts() {
        let ix = delegate_stake(&key(1), &HELIUS_VALIDATOR_ID, &key(2));
        assert_eq!(ix.data, 2u32.to_le_bytes().to_vec());
        assert_eq!(ix.accounts.len(), 6);
        assert_eq!(ix.accounts[1].pubkey, *HELIUS_VALIDATOR_ID);
        assert_eq!(ix.accounts[4].pubkey, *STAKE_CONFIG_ID);
        let authority = &ix.accounts[5];
        assert!(authority.is_signer && !authority.is_writable);
    }

    #[test]
    fn test_deactivate_encoding() {
        let ix = deactivate(&key(1), &key(2));
        assert_eq!(ix.data, 5u32.to_le_bytes().to_vec());
        assert_eq!(ix.accounts.len(), 3);
        assert!(ix.accounts[2].is_signer);
    }

    #[test]
    fn test_withdraw_encoding() {
        let ix = withdraw(&key(1), &key(4), &key(2), 7_500);
        assert_eq!(&ix.data[..4], &4u32.to_le_bytes());
        assert_eq!(&ix.data[4..], &7_500u64.to_le_bytes());
        assert_eq!(ix.accounts.len(), 5);
        assert!(ix.accounts[0].is_writable); // stake
        assert!(ix.accounts[1].is_writable); // recipient
        assert!(ix.accounts[4].is_signer); // authority
    }
}
