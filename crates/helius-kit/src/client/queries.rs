//! Typed chain queries.
//!
//! [`ChainQueries`] is the narrow read surface the stake client
//! depends on. [`DispatchProxy`] implements it by routing through the
//! generic `invoke` path, so overrides and registry methods apply to
//! these calls too; tests implement it directly with canned state.

use futures::future::BoxFuture;
use serde_json::json;

use crate::error::RpcError;
use crate::types::{
    AccountFilter, EpochInfo, Hash, KeyedParsedAccount, LatestBlockhash, ParsedAccountView,
    Pubkey, WithContext,
};

use super::proxy::DispatchProxy;

/// The statically-declared read operations the transaction builders
/// need. Anything else goes through the generic `invoke` fallback.
pub trait ChainQueries: Send + Sync {
    /// Minimum lamport balance for rent exemption at `data_len` bytes.
    fn minimum_balance_for_rent_exemption(&self, data_len: u64)
    -> BoxFuture<'_, Result<u64, RpcError>>;

    /// A fresh recent blockhash.
    fn latest_blockhash(&self) -> BoxFuture<'_, Result<Hash, RpcError>>;

    /// Current epoch information.
    fn epoch_info(&self) -> BoxFuture<'_, Result<EpochInfo, RpcError>>;

    /// A single account in `jsonParsed` encoding, or `None` if absent.
    fn parsed_account(
        &self,
        address: Pubkey,
    ) -> BoxFuture<'_, Result<Option<ParsedAccountView>, RpcError>>;

    /// Accounts owned by `program` matching the given filters, in
    /// `jsonParsed` encoding.
    fn program_accounts(
        &self,
        program: Pubkey,
        filters: Vec<AccountFilter>,
    ) -> BoxFuture<'_, Result<Vec<KeyedParsedAccount>, RpcError>>;
}

impl ChainQueries for DispatchProxy {
    fn minimum_balance_for_rent_exemption(
        &self,
        data_len: u64,
    ) -> BoxFuture<'_, Result<u64, RpcError>> {
        Box::pin(async move {
            self.invoke_as("getMinimumBalanceForRentExemption", json!([data_len]))
                .await
        })
    }

    fn latest_blockhash(&self) -> BoxFuture<'_, Result<Hash, RpcError>> {
        Box::pin(async move {
            let response: WithContext<LatestBlockhash> =
                self.invoke_as("getLatestBlockhash", json!([])).await?;
            Ok(response.value.blockhash)
        })
    }

    fn epoch_info(&self) -> BoxFuture<'_, Result<EpochInfo, RpcError>> {
        Box::pin(async move { self.invoke_as("getEpochInfo", json!([])).await })
    }

    fn parsed_account(
        &self,
        address: Pubkey,
    ) -> BoxFuture<'_, Result<Option<ParsedAccountView>, RpcError>> {
        Box::pin(async move {
            let response: WithContext<Option<ParsedAccountView>> = self
                .invoke_as(
                    "getAccountInfo",
                    json!([address.to_string(), { "encoding": "jsonParsed" }]),
                )
                .await?;
            Ok(response.value)
        })
    }

    fn program_accounts(
        &self,
        program: Pubkey,
        filters: Vec<AccountFilter>,
    ) -> BoxFuture<'_, Result<Vec<KeyedParsedAccount>, RpcError>> {
        Box::pin(async move {
            self.invoke_as(
                "getProgramAccounts",
                json!([
                    program.to_string(),
                    { "encoding": "jsonParsed", "filters": filters }
                ]),
            )
            .await
        })
    }
}
