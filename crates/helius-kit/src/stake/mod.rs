//! Stake lifecycle transaction builders.
//!
//! [`StakeClient`] composes, signs, and serializes the transactions
//! that move a stake account through its lifecycle:
//!
//! `none → created → active → deactivating → withdrawable → closed`
//!
//! Every builder call fetches a fresh blockhash; nothing is cached or
//! reused across calls, so two sequential builds may carry different
//! lifetimes. Queries within one call run sequentially. Calls for
//! different stake accounts are independent; concurrent lifecycle
//! operations against the *same* account are not coordinated here and
//! must be serialized by the caller.
//!
//! # Example
//!
//! ```rust,no_run
//! use helius_kit::{Helius, Keypair};
//!
//! # async fn example() -> Result<(), helius_kit::Error> {
//! let helius = Helius::mainnet().api_key("key").build();
//! let owner = Keypair::generate();
//!
//! let created = helius.stake().create_stake_transaction(&owner, 2.5).await?;
//! println!("send this: {}", created.transaction);
//!
//! let withdrawable = helius
//!     .stake()
//!     .get_withdrawable_amount(created.stake_account, false)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod instructions;

use std::sync::Arc;

use crate::client::ChainQueries;
use crate::error::Error;
use crate::types::{
    AccountFilter, Instruction, KeySigner, Keypair, KeyedParsedAccount, Message,
    ParsedAccountView, Pubkey, StakeStateView, Transaction,
};

use instructions::{
    HELIUS_VALIDATOR_ID, LAMPORTS_PER_SOL, STAKE_ACCOUNT_SIZE, STAKE_PROGRAM_ID,
    STAKER_AUTHORITY_OFFSET,
};

/// A freshly built stake-creation transaction.
#[derive(Clone, Debug)]
pub struct CreatedStake {
    /// The fully signed transaction, base64 wire bytes.
    pub transaction: String,
    /// The address of the new stake account.
    pub stake_account: Pubkey,
}

/// Builder for stake lifecycle transactions against the Helius
/// validator.
#[derive(Clone)]
pub struct StakeClient {
    rpc: Arc<dyn ChainQueries>,
}

impl StakeClient {
    pub fn new(rpc: Arc<dyn ChainQueries>) -> Self {
        Self { rpc }
    }

    /// Build a signed transaction that creates, funds, initializes, and
    /// delegates a brand-new stake account in one atomic step.
    ///
    /// The account is funded with the rent-exempt floor plus
    /// `amount_sol`, its staker and withdrawer authorities are both set
    /// to the owner, and the stake is delegated to the Helius
    /// validator. A fresh address is generated per call and never
    /// reused.
    pub async fn create_stake_transaction(
        &self,
        owner: &dyn KeySigner,
        amount_sol: f64,
    ) -> Result<CreatedStake, Error> {
        let rent_exempt = self
            .rpc
            .minimum_balance_for_rent_exemption(STAKE_ACCOUNT_SIZE)
            .await?;
        let lamports = rent_exempt + sol_to_lamports(amount_sol);

        let stake_keypair = Keypair::generate();
        let stake_account = stake_keypair.pubkey();
        let owner_pubkey = owner.pubkey();
        tracing::debug!(%stake_account, lamports, "building stake creation transaction");

        let instructions =
            create_stake_instructions(&owner_pubkey, &stake_account, lamports);
        let transaction = self
            .sign_and_encode(&instructions, &owner_pubkey, &[owner, &stake_keypair])
            .await?;

        Ok(CreatedStake {
            transaction,
            stake_account,
        })
    }

    /// Build a signed transaction that deactivates a stake account,
    /// starting its cooldown. No balance is computed here.
    pub async fn create_unstake_transaction(
        &self,
        owner: &dyn KeySigner,
        stake_account: Pubkey,
    ) -> Result<String, Error> {
        let owner_pubkey = owner.pubkey();
        tracing::debug!(%stake_account, "building deactivate transaction");

        let instruction = instructions::deactivate(&stake_account, &owner_pubkey);
        self.sign_and_encode(&[instruction], &owner_pubkey, &[owner])
            .await
    }

    /// Build a signed transaction that withdraws `lamports` from a
    /// stake account to `destination`.
    ///
    /// The amount is taken as given; query
    /// [`get_withdrawable_amount`](Self::get_withdrawable_amount) first
    /// to learn what the account can release.
    pub async fn create_withdraw_transaction(
        &self,
        withdraw_authority: &dyn KeySigner,
        stake_account: Pubkey,
        destination: Pubkey,
        lamports: u64,
    ) -> Result<String, Error> {
        let authority_pubkey = withdraw_authority.pubkey();
        tracing::debug!(%stake_account, lamports, "building withdraw transaction");

        let instruction =
            instructions::withdraw(&stake_account, &destination, &authority_pubkey, lamports);
        self.sign_and_encode(&[instruction], &authority_pubkey, &[withdraw_authority])
            .await
    }

    /// How many lamports the stake account can release right now.
    ///
    /// Returns 0 while the delegation is active or cooling down
    /// (deactivation epoch still ahead of the current epoch) — the
    /// rent-exemption floor is not queried in that case. Once eligible,
    /// returns the full balance when `include_rent_exempt` is set,
    /// otherwise the balance above the rent-exempt floor, clamped at 0.
    pub async fn get_withdrawable_amount(
        &self,
        stake_account: Pubkey,
        include_rent_exempt: bool,
    ) -> Result<u64, Error> {
        let account = self
            .rpc
            .parsed_account(stake_account)
            .await?
            .ok_or(Error::StakeAccountNotFound(stake_account))?;
        let state = parse_stake_state(&account, stake_account)?;

        let deactivation_epoch = deactivation_epoch(&state);
        let current_epoch = self.rpc.epoch_info().await?.epoch;
        if deactivation_epoch > current_epoch {
            return Ok(0);
        }

        if include_rent_exempt {
            return Ok(account.lamports);
        }
        let rent_exempt = self
            .rpc
            .minimum_balance_for_rent_exemption(STAKE_ACCOUNT_SIZE)
            .await?;
        Ok(account.lamports.saturating_sub(rent_exempt))
    }

    /// All stake accounts whose staker authority is `wallet` and whose
    /// stake is delegated to the Helius validator.
    ///
    /// The authority match runs server-side (memcmp at the staker
    /// authority offset); the delegation target is filtered
    /// client-side.
    pub async fn get_helius_stake_accounts(
        &self,
        wallet: Pubkey,
    ) -> Result<Vec<KeyedParsedAccount>, Error> {
        let filters = vec![AccountFilter::memcmp_pubkey(
            STAKER_AUTHORITY_OFFSET,
            &wallet,
        )];
        let accounts = self
            .rpc
            .program_accounts(*STAKE_PROGRAM_ID, filters)
            .await?;

        Ok(accounts
            .into_iter()
            .filter(|keyed| delegated_to_helius(&keyed.account))
            .collect())
    }

    /// Fetch a fresh blockhash, assemble, sign, and base64-encode.
    async fn sign_and_encode(
        &self,
        instructions: &[Instruction],
        payer: &Pubkey,
        signers: &[&dyn KeySigner],
    ) -> Result<String, Error> {
        let blockhash = self.rpc.latest_blockhash().await?;
        let message = Message::new(instructions, payer, blockhash);
        let mut transaction = Transaction::new_unsigned(message);
        transaction.try_sign(signers)?;
        Ok(transaction.to_base64())
    }
}

impl std::fmt::Debug for StakeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StakeClient").finish()
    }
}

/// The three instructions of a stake creation, in their fixed order.
fn create_stake_instructions(
    owner: &Pubkey,
    stake_account: &Pubkey,
    lamports: u64,
) -> [Instruction; 3] {
    [
        instructions::create_account(
            owner,
            stake_account,
            lamports,
            STAKE_ACCOUNT_SIZE,
            &STAKE_PROGRAM_ID,
        ),
        instructions::initialize(stake_account, owner, owner),
        instructions::delegate_stake(stake_account, &HELIUS_VALIDATOR_ID, owner),
    ]
}

fn sol_to_lamports(amount_sol: f64) -> u64 {
    (amount_sol * LAMPORTS_PER_SOL as f64).round() as u64
}

/// Interpret a parsed account as stake-program state.
fn parse_stake_state(
    account: &ParsedAccountView,
    address: Pubkey,
) -> Result<StakeStateView, Error> {
    if account.data.program != "stake" {
        return Err(Error::InvalidStakeAccount {
            address,
            reason: format!("owned by the {} program", account.data.program),
        });
    }
    serde_json::from_value(account.data.parsed.clone()).map_err(|e| Error::InvalidStakeAccount {
        address,
        reason: format!("missing stake metadata: {e}"),
    })
}

/// The epoch at which the delegation deactivates. An account that has
/// never been delegated reports `u64::MAX` — "never deactivates" — and
/// therefore stays ineligible for withdrawal, matching the chain's own
/// sentinel for live delegations.
fn deactivation_epoch(state: &StakeStateView) -> u64 {
    state
        .info
        .stake
        .as_ref()
        .map(|stake| stake.delegation.deactivation_epoch)
        .unwrap_or(u64::MAX)
}

fn delegated_to_helius(account: &ParsedAccountView) -> bool {
    let Ok(state) = serde_json::from_value::<StakeStateView>(account.data.parsed.clone()) else {
        return false;
    };
    state
        .info
        .stake
        .map(|stake| stake.delegation.voter == *HELIUS_VALIDATOR_ID)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use base64::{Engine as _, engine::general_purpose::STANDARD};
    use futures::future::BoxFuture;
    use serde_json::json;

    use super::*;
    use crate::error::RpcError;
    use crate::types::{EpochInfo, Hash, ParsedDataView};

    // ========================================================================
    // Mock chain
    // ========================================================================

    struct MockChain {
        rent_floor: u64,
        epoch: u64,
        blockhash: Hash,
        account: Option<ParsedAccountView>,
        program_accounts: Vec<KeyedParsedAccount>,
        calls: Mutex<Vec<String>>,
        filters_seen: Mutex<Vec<AccountFilter>>,
    }

    impl MockChain {
        fn new() -> Self {
            Self {
                rent_floor: 2_000_000,
                epoch: 100,
                blockhash: Hash::new_from_array([7u8; 32]),
                account: None,
                program_accounts: Vec::new(),
                calls: Mutex::new(Vec::new()),
                filters_seen: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ChainQueries for MockChain {
        fn minimum_balance_for_rent_exemption(
            &self,
            _data_len: u64,
        ) -> BoxFuture<'_, Result<u64, RpcError>> {
            self.calls.lock().unwrap().push("rent".to_string());
            Box::pin(async move { Ok(self.rent_floor) })
        }

        fn latest_blockhash(&self) -> BoxFuture<'_, Result<Hash, RpcError>> {
            self.calls.lock().unwrap().push("blockhash".to_string());
            Box::pin(async move { Ok(self.blockhash) })
        }

        fn epoch_info(&self) -> BoxFuture<'_, Result<EpochInfo, RpcError>> {
            self.calls.lock().unwrap().push("epoch".to_string());
            let epoch = self.epoch;
            Box::pin(async move {
                Ok(EpochInfo {
                    epoch,
                    slot_index: 0,
                    slots_in_epoch: 432_000,
                    absolute_slot: 0,
                    block_height: 0,
                    transaction_count: None,
                })
            })
        }

        fn parsed_account(
            &self,
            _address: Pubkey,
        ) -> BoxFuture<'_, Result<Option<ParsedAccountView>, RpcError>> {
            self.calls.lock().unwrap().push("account".to_string());
            let account = self.account.clone();
            Box::pin(async move { Ok(account) })
        }

        fn program_accounts(
            &self,
            _program: Pubkey,
            filters: Vec<AccountFilter>,
        ) -> BoxFuture<'_, Result<Vec<KeyedParsedAccount>, RpcError>> {
            self.calls.lock().unwrap().push("program_accounts".to_string());
            self.filters_seen.lock().unwrap().extend(filters);
            let accounts = self.program_accounts.clone();
            Box::pin(async move { Ok(accounts) })
        }
    }

    fn stake_account_view(
        lamports: u64,
        deactivation_epoch: Option<u64>,
        voter: &Pubkey,
    ) -> ParsedAccountView {
        let parsed = match deactivation_epoch {
            Some(epoch) => json!({
                "type": "delegated",
                "info": {
                    "meta": {
                        "rentExemptReserve": "2000000",
                        "authorized": {
                            "staker": Pubkey::new_from_array([1u8; 32]).to_string(),
                            "withdrawer": Pubkey::new_from_array([1u8; 32]).to_string()
                        }
                    },
                    "stake": {
                        "delegation": {
                            "voter": voter.to_string(),
                            "stake": "3000000",
                            "activationEpoch": "70",
                            "deactivationEpoch": epoch.to_string()
                        }
                    }
                }
            }),
            None => json!({
                "type": "initialized",
                "info": {
                    "meta": {
                        "rentExemptReserve": "2000000",
                        "authorized": {
                            "staker": Pubkey::new_from_array([1u8; 32]).to_string(),
                            "withdrawer": Pubkey::new_from_array([1u8; 32]).to_string()
                        }
                    }
                }
            }),
        };
        ParsedAccountView {
            lamports,
            owner: *STAKE_PROGRAM_ID,
            data: ParsedDataView {
                program: "stake".to_string(),
                parsed,
                space: Some(200),
            },
            executable: false,
            rent_epoch: 0,
            space: Some(200),
        }
    }

    fn client(chain: MockChain) -> (StakeClient, Arc<MockChain>) {
        let chain = Arc::new(chain);
        (StakeClient::new(chain.clone()), chain)
    }

    fn decode_instruction_count(transaction_base64: &str) -> (usize, usize) {
        // Walk the wire bytes far enough to count signatures and
        // instructions. Compact lengths below 128 fit in one byte,
        // which holds for every transaction built here.
        let bytes = STANDARD.decode(transaction_base64).unwrap();
        let signature_count = bytes[0] as usize;
        let mut offset = 1 + signature_count * 64;
        offset += 3; // header
        let key_count = bytes[offset] as usize;
        offset += 1 + key_count * 32;
        offset += 32; // blockhash
        let instruction_count = bytes[offset] as usize;
        (signature_count, instruction_count)
    }

    // ========================================================================
    // create / unstake / withdraw
    // ========================================================================

    #[tokio::test]
    async fn test_create_emits_three_instructions_and_two_signatures() {
        let (stake, chain) = client(MockChain::new());
        let owner = Keypair::generate();

        let created = stake.create_stake_transaction(&owner, 1.0).await.unwrap();
        let (signatures, instruction_count) = decode_instruction_count(&created.transaction);
        assert_eq!(signatures, 2);
        assert_eq!(instruction_count, 3);
        assert_eq!(chain.calls(), vec!["rent", "blockhash"]);
    }

    #[tokio::test]
    async fn test_create_generates_fresh_address_per_call() {
        let (stake, _) = client(MockChain::new());
        let owner = Keypair::generate();

        let a = stake.create_stake_transaction(&owner, 1.0).await.unwrap();
        let b = stake.create_stake_transaction(&owner, 1.0).await.unwrap();
        assert_ne!(a.stake_account, b.stake_account);
    }

    #[tokio::test]
    async fn test_unstake_emits_one_instruction() {
        let (stake, chain) = client(MockChain::new());
        let owner = Keypair::generate();

        let transaction = stake
            .create_unstake_transaction(&owner, Pubkey::new_from_array([4u8; 32]))
            .await
            .unwrap();
        let (signatures, instruction_count) = decode_instruction_count(&transaction);
        assert_eq!(signatures, 1);
        assert_eq!(instruction_count, 1);
        // No balance computation on unstake
        assert_eq!(chain.calls(), vec!["blockhash"]);
    }

    #[tokio::test]
    async fn test_withdraw_emits_one_instruction() {
        let (stake, chain) = client(MockChain::new());
        let authority = Keypair::generate();

        let transaction = stake
            .create_withdraw_transaction(
                &authority,
                Pubkey::new_from_array([4u8; 32]),
                authority.pubkey(),
                1_234,
            )
            .await
            .unwrap();
        let (signatures, instruction_count) = decode_instruction_count(&transaction);
        assert_eq!(signatures, 1);
        assert_eq!(instruction_count, 1);
        assert_eq!(chain.calls(), vec!["blockhash"]);
    }

    #[test]
    fn test_create_instruction_order() {
        let owner = Pubkey::new_from_array([1u8; 32]);
        let stake_account = Pubkey::new_from_array([2u8; 32]);
        let [first, second, third] = create_stake_instructions(&owner, &stake_account, 5_000_000);

        assert_eq!(first.program_id, *instructions::SYSTEM_PROGRAM_ID);
        assert_eq!(second.program_id, *STAKE_PROGRAM_ID);
        assert_eq!(&second.data[..4], &0u32.to_le_bytes()); // initialize
        assert_eq!(third.program_id, *STAKE_PROGRAM_ID);
        assert_eq!(&third.data[..4], &2u32.to_le_bytes()); // delegate
    }

    #[test]
    fn test_sol_to_lamports_rounds() {
        assert_eq!(sol_to_lamports(1.0), 1_000_000_000);
        assert_eq!(sol_to_lamports(0.5), 500_000_000);
        assert_eq!(sol_to_lamports(1.5e-9), 2); // rounds, not truncates
        assert_eq!(sol_to_lamports(0.0), 0);
    }

    // ========================================================================
    // get_withdrawable_amount
    // ========================================================================

    #[tokio::test]
    async fn test_withdrawable_after_deactivation() {
        let mut chain = MockChain::new();
        chain.epoch = 100;
        chain.account = Some(stake_account_view(5_000_000, Some(80), &HELIUS_VALIDATOR_ID));
        let (stake, chain) = client(chain);

        let amount = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap();
        assert_eq!(amount, 3_000_000);
        assert_eq!(chain.calls(), vec!["account", "epoch", "rent"]);
    }

    #[tokio::test]
    async fn test_withdrawable_including_rent_exempt() {
        let mut chain = MockChain::new();
        chain.epoch = 100;
        chain.account = Some(stake_account_view(5_000_000, Some(80), &HELIUS_VALIDATOR_ID));
        let (stake, chain) = client(chain);

        let amount = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), true)
            .await
            .unwrap();
        assert_eq!(amount, 5_000_000);
        // Full balance path never queries the rent floor
        assert_eq!(chain.calls(), vec!["account", "epoch"]);
    }

    #[tokio::test]
    async fn test_withdrawable_zero_while_cooling_down() {
        let mut chain = MockChain::new();
        chain.epoch = 50;
        chain.account = Some(stake_account_view(5_000_000, Some(80), &HELIUS_VALIDATOR_ID));
        let (stake, chain) = client(chain);

        let amount = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap();
        assert_eq!(amount, 0);
        // Rent floor query skipped entirely while ineligible
        assert_eq!(chain.calls(), vec!["account", "epoch"]);
    }

    #[tokio::test]
    async fn test_withdrawable_clamps_at_zero() {
        let mut chain = MockChain::new();
        chain.epoch = 100;
        chain.rent_floor = 2_000_000;
        chain.account = Some(stake_account_view(1_500_000, Some(80), &HELIUS_VALIDATOR_ID));
        let (stake, _) = client(chain);

        let amount = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap();
        assert_eq!(amount, 0);
    }

    #[tokio::test]
    async fn test_withdrawable_never_delegated_uses_sentinel() {
        let mut chain = MockChain::new();
        chain.epoch = 1_000_000;
        chain.account = Some(stake_account_view(5_000_000, None, &HELIUS_VALIDATOR_ID));
        let (stake, _) = client(chain);

        let amount = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap();
        // Never delegated reads as "deactivates at u64::MAX": still active
        assert_eq!(amount, 0);
    }

    #[tokio::test]
    async fn test_withdrawable_eligible_at_exact_epoch() {
        let mut chain = MockChain::new();
        chain.epoch = 80;
        chain.account = Some(stake_account_view(5_000_000, Some(80), &HELIUS_VALIDATOR_ID));
        let (stake, _) = client(chain);

        let amount = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap();
        assert_eq!(amount, 3_000_000);
    }

    #[tokio::test]
    async fn test_withdrawable_not_found() {
        let (stake, _) = client(MockChain::new());
        let address = Pubkey::new_from_array([4u8; 32]);

        let err = stake
            .get_withdrawable_amount(address, false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StakeAccountNotFound(a) if a == address));
    }

    #[tokio::test]
    async fn test_withdrawable_invalid_account() {
        let mut chain = MockChain::new();
        chain.account = Some(ParsedAccountView {
            lamports: 10,
            owner: Pubkey::new_from_array([9u8; 32]),
            data: ParsedDataView {
                program: "spl-token".to_string(),
                parsed: json!({}),
                space: None,
            },
            executable: false,
            rent_epoch: 0,
            space: None,
        });
        let (stake, _) = client(chain);

        let err = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStakeAccount { .. }));
    }

    #[tokio::test]
    async fn test_withdrawable_stake_program_without_metadata() {
        let mut chain = MockChain::new();
        chain.account = Some(ParsedAccountView {
            lamports: 10,
            owner: *STAKE_PROGRAM_ID,
            data: ParsedDataView {
                program: "stake".to_string(),
                parsed: json!({ "type": "uninitialized" }),
                space: Some(200),
            },
            executable: false,
            rent_epoch: 0,
            space: Some(200),
        });
        let (stake, _) = client(chain);

        let err = stake
            .get_withdrawable_amount(Pubkey::new_from_array([4u8; 32]), false)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidStakeAccount { .. }));
    }

    // ========================================================================
    // get_helius_stake_accounts
    // ========================================================================

    #[tokio::test]
    async fn test_stake_accounts_filters_by_validator() {
        let wallet = Pubkey::new_from_array([1u8; 32]);
        let other_validator = Pubkey::new_from_array([6u8; 32]);

        let mut chain = MockChain::new();
        chain.program_accounts = vec![
            KeyedParsedAccount {
                pubkey: Pubkey::new_from_array([10u8; 32]),
                account: stake_account_view(1, Some(u64::MAX), &HELIUS_VALIDATOR_ID),
            },
            KeyedParsedAccount {
                pubkey: Pubkey::new_from_array([11u8; 32]),
                account: stake_account_view(1, Some(u64::MAX), &other_validator),
            },
            KeyedParsedAccount {
                pubkey: Pubkey::new_from_array([12u8; 32]),
                account: stake_account_view(1, None, &HELIUS_VALIDATOR_ID),
            },
        ];
        let (stake, chain) = client(chain);

        let accounts = stake.get_helius_stake_accounts(wallet).await.unwrap();
        // Only the delegated-to-Helius account survives; the undelegated
        // one has no voter to match.
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].pubkey, Pubkey::new_from_array([10u8; 32]));

        let filters = chain.filters_seen.lock().unwrap();
        assert_eq!(
            *filters,
            vec![AccountFilter::memcmp_pubkey(STAKER_AUTHORITY_OFFSET, &wallet)]
        );
    }
}
