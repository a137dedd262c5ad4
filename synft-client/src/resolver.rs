//! Parent/child relationship resolution over composition records.
//!
//! Edges are discovered with byte-filtered scans over the program's
//! accounts: the child field sits at a fixed offset, so "who is my parent"
//! is a memcmp on that offset, and "who are my children" is the symmetric
//! scan on the parent field. Scans are linear in the program's total record
//! count; nothing here assumes they are cheap.

use serde::Serialize;
use solana_pubkey::Pubkey;
use spl_token::solana_program::program_pack::Pack;
use tracing::warn;

use crate::chain::rpc::{AccountFilter, RpcGatewayLike};
use crate::chain::types::Address;
use crate::client::SynftConfig;
use crate::error::SynftError;
use crate::pda;
use crate::record::{CHILD_OFFSET, CompositionRecord, EdgeScheme, PARENT_OFFSET};

/// A token's parent edge, as stored on its composition record.
#[derive(Debug, Clone, Copy)]
pub struct ParentLink {
    /// The parent mint.
    pub parent: Pubkey,
    /// Address of the root edge record of the chain this edge belongs to.
    pub root_record: Pubkey,
}

/// Caller-facing parent reference with the chain's root resolved.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentRef {
    /// The parent mint.
    pub token: Address,
    /// Address of the root edge record of the chain.
    pub record_address: Address,
    /// Mint of the chain's root token.
    pub root_mint: Address,
}

/// Point-in-time ownership classification for a token.
///
/// All-false is the safe default: read failures collapse into it, so a
/// negative result means "not shown to be owned", not "proven unowned".
#[derive(Debug, Clone, Copy, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BelongingResult {
    /// The root of the token's chain is held by the caller.
    pub owned_by_caller: bool,
    /// The token sits in program custody (a synthetic copy exists for it).
    pub owned_by_program: bool,
    /// The token's parent edge, if it is a child in some chain.
    pub parent: Option<ParentRef>,
}

/// A single-unit token holding discovered in a wallet.
#[derive(Debug, Clone, Copy)]
pub struct OwnedToken {
    /// The holding token account.
    pub address: Pubkey,
    /// The held mint.
    pub mint: Pubkey,
}

fn edge_scan_filters(offset: usize, mint: &Pubkey) -> [AccountFilter; 2] {
    [
        AccountFilter::Memcmp {
            offset: 0,
            bytes: EdgeScheme::V2.discriminator().to_vec(),
        },
        AccountFilter::Memcmp {
            offset,
            bytes: mint.as_ref().to_vec(),
        },
    ]
}

/// Finds the edge naming `mint` as a child, if one exists.
///
/// The full `(parent, child)` pair is unknown here, so the record address
/// cannot be derived up front; discovery is a scan on the child field.
///
/// # Errors
///
/// Returns [`SynftError::ScanFailed`] on transport failure.
pub async fn find_parent<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
) -> Result<Option<ParentLink>, SynftError> {
    let records = gateway
        .scan_program_accounts(&config.program_id, &edge_scan_filters(CHILD_OFFSET, mint))
        .await?;
    Ok(records.iter().find_map(|(address, account)| {
        match CompositionRecord::parse(address, &account.data) {
            Ok(record) => Some(ParentLink {
                parent: record.parent,
                root_record: record.root,
            }),
            Err(err) => {
                warn!(%address, %err, "skipping malformed edge record");
                None
            }
        }
    }))
}

/// Lists the mints injected into `mint` under the current scheme.
///
/// # Errors
///
/// Returns [`SynftError::ScanFailed`] on transport failure.
pub async fn find_children<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
) -> Result<Vec<Pubkey>, SynftError> {
    let records = gateway
        .scan_program_accounts(&config.program_id, &edge_scan_filters(PARENT_OFFSET, mint))
        .await?;
    Ok(records
        .iter()
        .filter_map(|(address, account)| {
            match CompositionRecord::parse(address, &account.data) {
                Ok(record) => Some(record.child),
                Err(err) => {
                    warn!(%address, %err, "skipping malformed edge record");
                    None
                }
            }
        })
        .collect())
}

/// Whether `mint` behaves as a non-fungible unit: its largest holding shows
/// exactly one unit with zero decimals. Any read failure is `false`.
pub async fn check_valid_token<G: RpcGatewayLike>(
    gateway: &G,
    mint: &Pubkey,
) -> bool {
    match gateway.largest_token_holder(mint).await {
        Ok(Some(holder)) => holder.is_nft_unit(),
        Ok(None) => false,
        Err(err) => {
            warn!(%mint, %err, "validity check failed closed");
            false
        }
    }
}

/// Resolves a caller-facing parent reference, reading the root record to
/// learn the chain's root mint. Soft: any failure yields `None`.
pub async fn resolve_parent_ref<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
) -> Option<ParentRef> {
    let link = match find_parent(gateway, config, mint).await {
        Ok(link) => link?,
        Err(err) => {
            warn!(%mint, %err, "parent lookup failed");
            return None;
        }
    };
    let account = match gateway.account(&link.root_record).await {
        Ok(Some(account)) => account,
        Ok(None) => {
            warn!(root_record = %link.root_record, "root record missing");
            return None;
        }
        Err(err) => {
            warn!(root_record = %link.root_record, %err, "root record read failed");
            return None;
        }
    };
    let root = match CompositionRecord::parse(&link.root_record, &account.data) {
        Ok(record) => record,
        Err(err) => {
            warn!(root_record = %link.root_record, %err, "root record malformed");
            return None;
        }
    };
    Some(ParentRef {
        token: link.parent.into(),
        record_address: link.root_record.into(),
        root_mint: root.parent.into(),
    })
}

/// Classifies who owns `mint`: the caller, the program, or neither.
///
/// Walks one parent hop to find the chain's root, then inspects the root
/// holder's owner. Program custody is checked against the synthetic mint
/// derived from the token itself, not the root. Every failure collapses
/// into the current partial result.
pub async fn resolve_belonging<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
    caller: &Pubkey,
) -> BelongingResult {
    let mut result = BelongingResult::default();

    let holder = match gateway.largest_token_holder(mint).await {
        Ok(Some(holder)) => holder,
        Ok(None) => return result,
        Err(err) => {
            warn!(%mint, %err, "holder lookup failed");
            return result;
        }
    };
    if holder.amount != 1 {
        return result;
    }

    let mut holding_account = holder.address;
    if let Some(parent) = resolve_parent_ref(gateway, config, mint).await {
        result.parent = Some(parent);
        match gateway.largest_token_holder(parent.root_mint.pubkey()).await {
            Ok(Some(root_holder)) => holding_account = root_holder.address,
            Ok(None) => return result,
            Err(err) => {
                warn!(root_mint = %parent.root_mint, %err, "root holder lookup failed");
                return result;
            }
        }
    }

    let owner = match gateway.account(&holding_account).await {
        Ok(Some(account)) => match spl_token::state::Account::unpack(&account.data) {
            Ok(token_account) => token_account.owner,
            Err(err) => {
                warn!(%holding_account, %err, "holding account unpack failed");
                return result;
            }
        },
        Ok(None) => return result,
        Err(err) => {
            warn!(%holding_account, %err, "holding account read failed");
            return result;
        }
    };
    result.owned_by_caller = owner == *caller;

    if !result.owned_by_caller {
        result.owned_by_program = match pda::synthetic_mint(&config.program_id, mint) {
            Ok((synthetic_mint, _)) => {
                matches!(gateway.account(&synthetic_mint).await, Ok(Some(_)))
            }
            Err(err) => {
                warn!(%mint, %err, "synthetic mint derivation failed");
                false
            }
        };
    }
    result
}

/// Lists single-unit token holdings of `owner`.
///
/// Scans the SPL token program for accounts whose owner field matches,
/// keeping those holding exactly one unit. Decimals live on the mint, so
/// callers wanting strict NFT semantics should confirm candidates with
/// [`check_valid_token`].
///
/// # Errors
///
/// Returns [`SynftError::ScanFailed`] on transport failure.
pub async fn valid_tokens_by_owner<G: RpcGatewayLike>(
    gateway: &G,
    owner: &Pubkey,
) -> Result<Vec<OwnedToken>, SynftError> {
    let filters = [
        AccountFilter::DataSize(spl_token::state::Account::LEN as u64),
        AccountFilter::Memcmp {
            offset: 32,
            bytes: owner.as_ref().to_vec(),
        },
    ];
    let accounts = gateway
        .scan_program_accounts(&spl_token::id(), &filters)
        .await?;
    Ok(accounts
        .iter()
        .filter_map(|(address, account)| {
            let token_account = spl_token::state::Account::unpack(&account.data).ok()?;
            (token_account.amount == 1).then_some(OwnedToken {
                address: *address,
                mint: token_account.mint,
            })
        })
        .collect())
}
