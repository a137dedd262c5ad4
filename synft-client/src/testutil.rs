//! In-memory ledger fixtures shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use solana_account::Account;
use solana_commitment_config::CommitmentConfig;
use solana_message::Hash;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;
use spl_token::solana_program::program_option::COption;
use spl_token::solana_program::program_pack::Pack;
use spl_token::state::AccountState;

use crate::chain::rpc::{AccountFilter, RpcGatewayLike};
use crate::chain::types::TokenHolder;
use crate::error::SynftError;
use crate::pda;
use crate::record::{AttachmentKind, EdgeScheme};

pub(crate) fn encode_record_v2(child: &Pubkey, parent: &Pubkey, root: &Pubkey) -> Vec<u8> {
    let mut data = EdgeScheme::V2.discriminator().to_vec();
    data.extend_from_slice(child.as_ref());
    data.extend_from_slice(parent.as_ref());
    data.extend_from_slice(root.as_ref());
    data.push(AttachmentKind::Nft.as_byte());
    data.push(1);
    data.push(0);
    data
}

pub(crate) fn encode_record_v1(child: &Pubkey, kind: AttachmentKind) -> Vec<u8> {
    let mut data = EdgeScheme::V1.discriminator().to_vec();
    data.extend_from_slice(child.as_ref());
    data.push(kind.as_byte());
    data.push(1);
    data.push(0);
    data
}

/// In-memory gateway: a map of accounts plus captured submissions.
#[derive(Default)]
pub(crate) struct MockGateway {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    holders: Mutex<HashMap<Pubkey, TokenHolder>>,
    submitted: Mutex<Vec<VersionedTransaction>>,
    failing: Mutex<HashSet<Pubkey>>,
    fail_scans: Mutex<bool>,
}

impl MockGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn put_account(&self, address: Pubkey, account: Account) {
        self.accounts.lock().unwrap().insert(address, account);
    }

    pub(crate) fn put_program_account(
        &self,
        owner: Pubkey,
        address: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    ) {
        self.put_account(
            address,
            Account {
                lamports,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    /// Writes a V2 edge record at its derived address and returns it.
    ///
    /// `root` defaults to the record's own address, which is how the
    /// program anchors a root-level edge.
    pub(crate) fn put_edge_v2(
        &self,
        program_id: &Pubkey,
        parent: &Pubkey,
        child: &Pubkey,
        root: Option<Pubkey>,
    ) -> Pubkey {
        let (address, _) = pda::edge_v2(program_id, parent, child).unwrap();
        let root = root.unwrap_or(address);
        self.put_program_account(
            *program_id,
            address,
            2_000_000,
            encode_record_v2(child, parent, &root),
        );
        address
    }

    pub(crate) fn put_edge_v1(
        &self,
        program_id: &Pubkey,
        parent: &Pubkey,
        child: &Pubkey,
        lamports: u64,
        kind: AttachmentKind,
    ) -> Pubkey {
        let (address, _) = pda::edge_v1(program_id, parent).unwrap();
        self.put_program_account(*program_id, address, lamports, encode_record_v1(child, kind));
        address
    }

    pub(crate) fn put_sol_attachment(
        &self,
        program_id: &Pubkey,
        mint: &Pubkey,
        lamports: u64,
    ) -> Pubkey {
        let (address, _) = pda::sol_attachment(program_id, mint).unwrap();
        self.put_program_account(*program_id, address, lamports, Vec::new());
        address
    }

    /// Registers a mint as a single-unit NFT held by `owner` and returns the
    /// holding token account address.
    pub(crate) fn put_nft(&self, mint: &Pubkey, owner: &Pubkey) -> Pubkey {
        let token_account = Pubkey::new_unique();
        let state = spl_token::state::Account {
            mint: *mint,
            owner: *owner,
            amount: 1,
            delegate: COption::None,
            state: AccountState::Initialized,
            is_native: COption::None,
            delegated_amount: 0,
            close_authority: COption::None,
        };
        let mut data = vec![0u8; spl_token::state::Account::LEN];
        spl_token::state::Account::pack(state, &mut data).unwrap();
        self.put_program_account(spl_token::id(), token_account, 2_000_000, data);
        self.holders.lock().unwrap().insert(
            *mint,
            TokenHolder {
                address: token_account,
                amount: 1,
                decimals: 0,
            },
        );
        token_account
    }

    pub(crate) fn put_holder(&self, mint: Pubkey, holder: TokenHolder) {
        self.holders.lock().unwrap().insert(mint, holder);
    }

    pub(crate) fn remove_account(&self, address: &Pubkey) {
        self.accounts.lock().unwrap().remove(address);
    }

    pub(crate) fn fail_address(&self, address: Pubkey) {
        self.failing.lock().unwrap().insert(address);
    }

    pub(crate) fn fail_scans(&self) {
        *self.fail_scans.lock().unwrap() = true;
    }

    pub(crate) fn submitted(&self) -> Vec<VersionedTransaction> {
        self.submitted.lock().unwrap().clone()
    }
}

#[async_trait]
impl RpcGatewayLike for MockGateway {
    async fn account(&self, address: &Pubkey) -> Result<Option<Account>, SynftError> {
        if self.failing.lock().unwrap().contains(address) {
            return Err(SynftError::ReadFailed("mock read failure".to_string()));
        }
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn largest_token_holder(
        &self,
        mint: &Pubkey,
    ) -> Result<Option<TokenHolder>, SynftError> {
        if self.failing.lock().unwrap().contains(mint) {
            return Err(SynftError::ReadFailed("mock read failure".to_string()));
        }
        Ok(self.holders.lock().unwrap().get(mint).copied())
    }

    async fn scan_program_accounts(
        &self,
        program_id: &Pubkey,
        filters: &[AccountFilter],
    ) -> Result<Vec<(Pubkey, Account)>, SynftError> {
        if *self.fail_scans.lock().unwrap() {
            return Err(SynftError::ScanFailed("mock scan failure".to_string()));
        }
        let mut hits: Vec<(Pubkey, Account)> = self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, account)| account.owner == *program_id)
            .filter(|(_, account)| filters.iter().all(|f| f.matches(&account.data)))
            .map(|(address, account)| (*address, account.clone()))
            .collect();
        hits.sort_by_key(|(address, _)| address.to_bytes());
        Ok(hits)
    }

    async fn latest_blockhash(&self) -> Result<Hash, SynftError> {
        Ok(Hash::default())
    }

    async fn submit(
        &self,
        transaction: &VersionedTransaction,
    ) -> Result<Signature, SynftError> {
        self.submitted.lock().unwrap().push(transaction.clone());
        Ok(Signature::default())
    }

    async fn confirm(
        &self,
        _signature: &Signature,
        _commitment: CommitmentConfig,
    ) -> Result<(), SynftError> {
        Ok(())
    }
}
