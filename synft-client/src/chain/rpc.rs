//! RPC gateway abstraction over the Solana ledger.
//!
//! [`RpcGatewayLike`] is the capability the protocol core depends on:
//! account reads (where "never created" is a normal outcome), largest-holder
//! queries, byte-filtered program scans, and transaction submission with
//! confirmation. It owns no business logic and no retry policy; retries
//! belong to the caller. [`RpcGateway`] implements it over the nonblocking
//! Solana RPC client.

use async_trait::async_trait;
use solana_account::Account;
use solana_account_decoder_client_types::UiAccountEncoding;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_config::{RpcAccountInfoConfig, RpcProgramAccountsConfig};
use solana_client::rpc_filter::{Memcmp, RpcFilterType};
use solana_commitment_config::CommitmentConfig;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::chain::types::TokenHolder;
use crate::error::SynftError;

/// A byte-level filter for program account scans.
///
/// Scans are linear over all accounts owned by the program, so their cost
/// grows with total record count, not with the size of any one tree.
#[derive(Debug, Clone)]
pub enum AccountFilter {
    /// Match `bytes` at `offset` in the account data.
    Memcmp {
        /// Byte offset into the account data.
        offset: usize,
        /// Bytes that must match at the offset.
        bytes: Vec<u8>,
    },
    /// Match accounts of exactly this data length.
    DataSize(u64),
}

impl AccountFilter {
    /// Whether raw account data satisfies this filter.
    #[must_use]
    pub fn matches(&self, data: &[u8]) -> bool {
        match self {
            Self::Memcmp { offset, bytes } => data
                .get(*offset..offset + bytes.len())
                .is_some_and(|window| window == bytes.as_slice()),
            Self::DataSize(len) => data.len() as u64 == *len,
        }
    }
}

/// Capability interface over the ledger.
#[async_trait]
pub trait RpcGatewayLike: Send + Sync {
    /// Reads one account; `None` means the account was never created.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::ReadFailed`] on transport failure.
    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, SynftError>;

    /// Returns the largest holding account of `mint`, if any exists.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::ReadFailed`] on transport failure.
    async fn largest_token_holder(
        &self,
        mint: &Pubkey,
    ) -> Result<Option<TokenHolder>, SynftError>;

    /// Scans all accounts owned by `program_id` matching every filter.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::ScanFailed`] on transport failure.
    async fn scan_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>, SynftError>;

    /// Fetches a recent blockhash for transaction assembly.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::ReadFailed`] on transport failure.
    async fn latest_blockhash(&self) -> Result<Hash, SynftError>;

    /// Submits a signed transaction without waiting for confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::SubmissionFailed`] when the ledger rejects the
    /// transaction or the send fails.
    async fn submit(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, SynftError>;

    /// Waits until `signature` reaches `commitment`.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::NotConfirmed`] when the transaction does not
    /// reach the requested commitment or the poll fails.
    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), SynftError>;
}

/// Default gateway over the nonblocking Solana RPC client.
pub struct RpcGateway {
    rpc: RpcClient,
    commitment: CommitmentConfig,
}

impl std::fmt::Debug for RpcGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcGateway")
            .field("commitment", &self.commitment)
            .finish_non_exhaustive()
    }
}

impl RpcGateway {
    /// Connects to `url` reading at `processed` commitment.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_commitment(url, CommitmentConfig::processed())
    }

    /// Connects to `url` reading at the given commitment.
    #[must_use]
    pub fn with_commitment(url: impl Into<String>, commitment: CommitmentConfig) -> Self {
        Self {
            rpc: RpcClient::new_with_commitment(url.into(), commitment),
            commitment,
        }
    }

    /// Wraps an existing RPC client.
    #[must_use]
    pub const fn from_client(rpc: RpcClient, commitment: CommitmentConfig) -> Self {
        Self { rpc, commitment }
    }
}

fn to_rpc_filter(filter: &AccountFilter) -> RpcFilterType {
    match filter {
        AccountFilter::Memcmp { offset, bytes } => {
            RpcFilterType::Memcmp(Memcmp::new_raw_bytes(*offset, bytes.clone()))
        }
        AccountFilter::DataSize(len) => RpcFilterType::DataSize(*len),
    }
}

#[async_trait]
impl RpcGatewayLike for RpcGateway {
    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, SynftError> {
        self.rpc
            .get_account_with_commitment(address, self.commitment)
            .await
            .map(|response| response.value)
            .map_err(|e| SynftError::ReadFailed(e.to_string()))
    }

    async fn largest_token_holder(
        &self,
        mint: &Pubkey,
    ) -> Result<Option<TokenHolder>, SynftError> {
        let balances = self
            .rpc
            .get_token_largest_accounts(mint)
            .await
            .map_err(|e| SynftError::ReadFailed(e.to_string()))?;
        let Some(largest) = balances.first() else {
            return Ok(None);
        };
        let address = largest
            .address
            .parse::<Pubkey>()
            .map_err(|e| SynftError::ReadFailed(format!("bad holder address: {e}")))?;
        let amount = largest
            .amount
            .amount
            .parse::<u64>()
            .map_err(|e| SynftError::ReadFailed(format!("bad holder amount: {e}")))?;
        Ok(Some(TokenHolder {
            address,
            amount,
            decimals: largest.amount.decimals,
        }))
    }

    async fn scan_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>, SynftError> {
        let config = RpcProgramAccountsConfig {
            filters: Some(filters.iter().map(to_rpc_filter).collect()),
            account_config: RpcAccountInfoConfig {
                encoding: Some(UiAccountEncoding::Base64),
                commitment: Some(self.commitment),
                ..RpcAccountInfoConfig::default()
            },
            ..RpcProgramAccountsConfig::default()
        };
        self.rpc
            .get_program_accounts_with_config(program_id, config)
            .await
            .map_err(|e| SynftError::ScanFailed(e.to_string()))
    }

    async fn latest_blockhash(&self) -> Result<Hash, SynftError> {
        self.rpc
            .get_latest_blockhash()
            .await
            .map_err(|e| SynftError::ReadFailed(e.to_string()))
    }

    async fn submit(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, SynftError> {
        self.rpc
            .send_transaction(transaction)
            .await
            .map_err(|e| SynftError::SubmissionFailed(e.to_string()))
    }

    async fn confirm(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> Result<(), SynftError> {
        let confirmed = self
            .rpc
            .confirm_transaction_with_commitment(signature, commitment)
            .await
            .map_err(|_| SynftError::NotConfirmed(*signature))?;
        if confirmed.value {
            Ok(())
        } else {
            Err(SynftError::NotConfirmed(*signature))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memcmp_filter_matching() {
        let filter = AccountFilter::Memcmp {
            offset: 2,
            bytes: vec![0xaa, 0xbb],
        };
        assert!(filter.matches(&[0, 0, 0xaa, 0xbb, 9]));
        assert!(!filter.matches(&[0xaa, 0xbb, 0, 0]));
        assert!(!filter.matches(&[0, 0, 0xaa]));
    }

    #[test]
    fn test_datasize_filter_matching() {
        let filter = AccountFilter::DataSize(3);
        assert!(filter.matches(&[1, 2, 3]));
        assert!(!filter.matches(&[1, 2]));
    }
}
