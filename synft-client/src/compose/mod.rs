//! Transaction composition for tree mutations.
//!
//! Every operation follows the same shape: derive the addresses each
//! instruction needs, build the instructions, bundle them into one
//! transaction, sign, submit, and wait for confirmation. A logical
//! operation is never split across transactions, so it either lands whole
//! or not at all; atomicity within the bundle is the ledger's. Preparation
//! failures abort before anything is submitted, and nothing here retries.

/// Instruction encoders for the Synft program.
pub mod instructions;

use futures_util::future;
use solana_instruction::Instruction;
use solana_message::v0::Message as MessageV0;
use solana_message::VersionedMessage;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;
use solana_transaction::versioned::VersionedTransaction;
use tracing::debug;

use crate::chain::rpc::RpcGatewayLike;
use crate::client::SynftConfig;
use crate::error::SynftError;
use crate::pda;
use crate::record::CompositionRecord;
use crate::resolver::ParentLink;

/// Object-safe signer handle used by mutation operations.
pub type DynSigner = dyn Signer + Send + Sync;

/// Display attributes for a synthetic copy.
#[derive(Debug, Clone)]
pub struct CopyArgs {
    /// Token name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// URI of the off-chain metadata document.
    pub uri: String,
}

/// Signs `instructions` into one transaction, submits it, and waits for
/// confirmation at the configured commitment.
pub(crate) async fn send_bundle<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    instructions: &[Instruction],
) -> Result<Signature, SynftError> {
    let payer = signer.pubkey();
    let blockhash = gateway.latest_blockhash().await?;
    let message = MessageV0::try_compile(&payer, instructions, &[], blockhash)
        .map_err(|e| SynftError::SubmissionFailed(format!("message compile failed: {e}")))?;
    let mut transaction = VersionedTransaction {
        signatures: vec![],
        message: VersionedMessage::V0(message),
    };

    let signature = signer
        .try_sign_message(&transaction.message.serialize())
        .map_err(|e| SynftError::SubmissionFailed(format!("signing failed: {e}")))?;
    let num_required = transaction.message.header().num_required_signatures as usize;
    let position = transaction
        .message
        .static_account_keys()
        .iter()
        .take(num_required)
        .position(|key| *key == payer)
        .ok_or_else(|| {
            SynftError::SubmissionFailed("signer not among required signers".to_string())
        })?;
    transaction
        .signatures
        .resize(num_required, Signature::default());
    transaction.signatures[position] = signature;

    let signature = gateway.submit(&transaction).await?;
    gateway.confirm(&signature, config.commitment).await?;
    Ok(signature)
}

async fn holder_address<G: RpcGatewayLike>(
    gateway: &G,
    mint: &Pubkey,
) -> Result<Pubkey, SynftError> {
    gateway
        .largest_token_holder(mint)
        .await?
        .map(|holder| holder.address)
        .ok_or(SynftError::RecordNotFound(*mint))
}

pub(crate) async fn read_root_record<G: RpcGatewayLike>(
    gateway: &G,
    root_record: &Pubkey,
) -> Result<CompositionRecord, SynftError> {
    let account = gateway
        .account(root_record)
        .await?
        .ok_or(SynftError::RecordNotFound(*root_record))?;
    CompositionRecord::parse(root_record, &account.data)
}

/// Attaches `lamports` to `mint`.
///
/// # Errors
///
/// Surfaces derivation, read, submission, and confirmation failures
/// verbatim; nothing is submitted when preparation fails.
pub async fn inject_sol<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    mint: &Pubkey,
    lamports: u64,
) -> Result<Signature, SynftError> {
    let parent_token_account = holder_address(gateway, mint).await?;
    let (sol_account, bump) = pda::sol_attachment(&config.program_id, mint)?;
    let instruction = instructions::inject_to_sol_v2(
        &config.program_id,
        &signer.pubkey(),
        &parent_token_account,
        mint,
        &sol_account,
        bump,
        lamports,
    );
    send_bundle(gateway, config, signer, &[instruction]).await
}

/// Injects `children` directly under the chain root `root`.
///
/// One instruction per child, all in one transaction, in the order the
/// children were supplied. An empty batch is a no-op success and submits
/// nothing.
///
/// # Errors
///
/// Any single preparation failure aborts the whole batch before
/// submission; submission and confirmation failures surface verbatim.
pub async fn inject_nfts_to_root<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    root: &Pubkey,
    children: &[Pubkey],
) -> Result<Option<Signature>, SynftError> {
    if children.is_empty() {
        debug!(%root, "empty child batch, nothing to submit");
        return Ok(None);
    }
    let parent_token_account = holder_address(gateway, root).await?;
    let owner = signer.pubkey();

    // Derivations and holder lookups are independent per child; only the
    // instruction order must follow the supplied order.
    let prepared = future::try_join_all(children.iter().map(|child| async move {
        let (edge_record, bump) = pda::edge_v2(&config.program_id, root, child)?;
        let child_token_account = holder_address(gateway, child).await?;
        Ok::<_, SynftError>((*child, child_token_account, edge_record, bump))
    }))
    .await?;

    let bundle: Vec<Instruction> = prepared
        .iter()
        .map(|(child, child_token_account, edge_record, bump)| {
            instructions::inject_to_root_v2(
                &config.program_id,
                &owner,
                child_token_account,
                child,
                &parent_token_account,
                root,
                edge_record,
                true,
                *bump,
            )
        })
        .collect();
    send_bundle(gateway, config, signer, &bundle).await.map(Some)
}

/// Injects `children` under the non-root node `mint`.
///
/// Reads the chain's root record first so the root mint and holder are the
/// real ones even when the chain is several levels deep, then derives the
/// root/parent/child edge addresses every instruction must present.
///
/// # Errors
///
/// Same contract as [`inject_nfts_to_root`].
pub async fn inject_nfts_to_non_root<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    mint: &Pubkey,
    children: &[Pubkey],
    parent: &ParentLink,
) -> Result<Option<Signature>, SynftError> {
    if children.is_empty() {
        debug!(%mint, "empty child batch, nothing to submit");
        return Ok(None);
    }
    let root_record = read_root_record(gateway, &parent.root_record).await?;
    let root_mint = root_record.parent;
    let root_token_account = holder_address(gateway, &root_mint).await?;
    let parent_token_account = holder_address(gateway, mint).await?;
    let (parent_edge, _) = pda::edge_v2(&config.program_id, &parent.parent, mint)?;
    let owner = signer.pubkey();

    let prepared = future::try_join_all(children.iter().map(|child| async move {
        let (edge_record, bump) = pda::edge_v2(&config.program_id, mint, child)?;
        let child_token_account = holder_address(gateway, child).await?;
        Ok::<_, SynftError>((*child, child_token_account, edge_record, bump))
    }))
    .await?;

    let bundle: Vec<Instruction> = prepared
        .iter()
        .map(|(child, child_token_account, edge_record, bump)| {
            instructions::inject_to_non_root_v2(
                &config.program_id,
                &owner,
                child_token_account,
                child,
                &parent_token_account,
                mint,
                &root_token_account,
                &root_mint,
                edge_record,
                &parent_edge,
                &parent.root_record,
                true,
                false,
                *bump,
            )
        })
        .collect();
    send_bundle(gateway, config, signer, &bundle).await.map(Some)
}

/// Mints a synthetic copy of `source` and attaches `lamports` to it, in one
/// transaction. Returns the new mint.
///
/// # Errors
///
/// Surfaces derivation, submission, and confirmation failures verbatim.
pub async fn copy_with_inject_sol<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    source: &Pubkey,
    lamports: u64,
    args: &CopyArgs,
) -> Result<Pubkey, SynftError> {
    let owner = signer.pubkey();
    let (mint_account, _) = pda::synthetic_mint(&config.program_id, source)?;
    let (token_account, _) = pda::synthetic_token_account(&config.program_id, source)?;
    let (metadata_account, _) =
        pda::token_metadata(&config.metadata_program_id, &mint_account)?;
    let copy = instructions::nft_copy(
        &config.program_id,
        &config.metadata_program_id,
        &owner,
        source,
        &metadata_account,
        &mint_account,
        &token_account,
        &args.name,
        &args.symbol,
        &args.uri,
    );

    // The injection is keyed to the copy's mint, which exists only after
    // the first instruction runs; bundling both keeps the pair atomic.
    let (sol_account, sol_bump) = pda::sol_attachment(&config.program_id, &mint_account)?;
    let inject = instructions::inject_to_sol_v2(
        &config.program_id,
        &owner,
        &token_account,
        &mint_account,
        &sol_account,
        sol_bump,
        lamports,
    );

    send_bundle(gateway, config, signer, &[copy, inject]).await?;
    Ok(mint_account)
}

/// Extracts the lamports attached to `mint`.
///
/// # Errors
///
/// Surfaces derivation, read, submission, and confirmation failures
/// verbatim.
pub async fn extract_sol<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    mint: &Pubkey,
) -> Result<Signature, SynftError> {
    let parent_token_account = holder_address(gateway, mint).await?;
    let (sol_account, bump) = pda::sol_attachment(&config.program_id, mint)?;
    let instruction = instructions::extract_sol_v2(
        &config.program_id,
        &signer.pubkey(),
        &parent_token_account,
        mint,
        &sol_account,
        bump,
    );
    send_bundle(gateway, config, signer, &[instruction]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MockGateway;
    use crate::tree;
    use solana_keypair::Keypair;

    fn config() -> SynftConfig {
        SynftConfig::new(Pubkey::new_unique())
    }

    #[tokio::test]
    async fn test_empty_batches_submit_nothing() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let mint = Pubkey::new_unique();

        let result = inject_nfts_to_root(&gateway, &config, &signer, &mint, &[])
            .await
            .unwrap();
        assert!(result.is_none());

        let link = ParentLink {
            parent: Pubkey::new_unique(),
            root_record: Pubkey::new_unique(),
        };
        let result = inject_nfts_to_non_root(&gateway, &config, &signer, &mint, &[], &link)
            .await
            .unwrap();
        assert!(result.is_none());

        assert!(gateway.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_inject_sol_bundle() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let mint = Pubkey::new_unique();
        let token_account = gateway.put_nft(&mint, &signer.pubkey());

        inject_sol(&gateway, &config, &signer, &mint, 1_000_000)
            .await
            .unwrap();

        let submitted = gateway.submitted();
        assert_eq!(submitted.len(), 1);
        let message = &submitted[0].message;
        assert_eq!(message.instructions().len(), 1);

        let ix = &message.instructions()[0];
        assert_eq!(&ix.data[..8], &instructions::discriminator("inject_to_sol_v2"));
        assert_eq!(&ix.data[9..17], &1_000_000u64.to_le_bytes());

        let keys = message.static_account_keys();
        let (sol_account, _) = pda::sol_attachment(&config.program_id, &mint).unwrap();
        assert!(keys.contains(&sol_account));
        assert!(keys.contains(&token_account));
        assert_eq!(keys[0], signer.pubkey());
        assert!(submitted[0].signatures[0] != Signature::default());
    }

    #[tokio::test]
    async fn test_inject_to_root_bundles_in_supplied_order() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let root = Pubkey::new_unique();
        gateway.put_nft(&root, &signer.pubkey());
        let children: Vec<Pubkey> = (0..3).map(|_| Pubkey::new_unique()).collect();
        let child_accounts: Vec<Pubkey> = children
            .iter()
            .map(|child| gateway.put_nft(child, &signer.pubkey()))
            .collect();

        inject_nfts_to_root(&gateway, &config, &signer, &root, &children)
            .await
            .unwrap()
            .unwrap();

        let submitted = gateway.submitted();
        assert_eq!(submitted.len(), 1);
        let message = &submitted[0].message;
        assert_eq!(message.instructions().len(), children.len());

        // Instruction i must target child i's token account (index 1 in the
        // account list).
        let keys = message.static_account_keys();
        for (i, ix) in message.instructions().iter().enumerate() {
            assert_eq!(&ix.data[..8], &instructions::discriminator("inject_to_root_v2"));
            let child_token_key = keys[ix.accounts[1] as usize];
            assert_eq!(child_token_key, child_accounts[i]);
        }
    }

    #[tokio::test]
    async fn test_inject_to_root_fails_fast_without_submitting() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let root = Pubkey::new_unique();
        gateway.put_nft(&root, &signer.pubkey());
        let good = Pubkey::new_unique();
        gateway.put_nft(&good, &signer.pubkey());
        let missing = Pubkey::new_unique();

        let err = inject_nfts_to_root(&gateway, &config, &signer, &root, &[good, missing])
            .await
            .unwrap_err();
        assert!(matches!(err, SynftError::RecordNotFound(m) if m == missing));
        assert!(gateway.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_inject_to_non_root_resolves_root_chain() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let root = Pubkey::new_unique();
        let mid = Pubkey::new_unique();
        let new_child = Pubkey::new_unique();
        let root_token = gateway.put_nft(&root, &signer.pubkey());
        gateway.put_nft(&mid, &signer.pubkey());
        gateway.put_nft(&new_child, &signer.pubkey());
        let root_record = gateway.put_edge_v2(&config.program_id, &root, &mid, None);

        let link = ParentLink {
            parent: root,
            root_record,
        };
        inject_nfts_to_non_root(&gateway, &config, &signer, &mid, &[new_child], &link)
            .await
            .unwrap()
            .unwrap();

        let submitted = gateway.submitted();
        assert_eq!(submitted.len(), 1);
        let message = &submitted[0].message;
        assert_eq!(message.instructions().len(), 1);
        let keys = message.static_account_keys();
        // The bundle must reference the chain's real root holdings and the
        // three edge records the program verifies.
        assert!(keys.contains(&root_token));
        assert!(keys.contains(&root));
        assert!(keys.contains(&root_record));
        let (child_edge, _) = pda::edge_v2(&config.program_id, &mid, &new_child).unwrap();
        assert!(keys.contains(&child_edge));
    }

    #[tokio::test]
    async fn test_copy_with_inject_sol_bundles_both_instructions() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let source = Pubkey::new_unique();
        let args = CopyArgs {
            name: "Synthetic".to_string(),
            symbol: "SYN".to_string(),
            uri: "https://example.com/1.json".to_string(),
        };

        let new_mint = copy_with_inject_sol(&gateway, &config, &signer, &source, 9, &args)
            .await
            .unwrap();
        let (expected_mint, _) = pda::synthetic_mint(&config.program_id, &source).unwrap();
        assert_eq!(new_mint, expected_mint);

        let submitted = gateway.submitted();
        assert_eq!(submitted.len(), 1);
        let message = &submitted[0].message;
        assert_eq!(message.instructions().len(), 2);
        assert_eq!(
            &message.instructions()[0].data[..8],
            &instructions::discriminator("nft_copy")
        );
        assert_eq!(
            &message.instructions()[1].data[..8],
            &instructions::discriminator("inject_to_sol_v2")
        );
        // The injection is keyed to the new mint, not the source.
        let (sol_account, _) = pda::sol_attachment(&config.program_id, &new_mint).unwrap();
        assert!(message.static_account_keys().contains(&sol_account));
    }

    #[tokio::test]
    async fn test_inject_then_extract_leaves_no_attachment() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = Keypair::new();
        let mint = Pubkey::new_unique();
        gateway.put_nft(&mint, &signer.pubkey());

        inject_sol(&gateway, &config, &signer, &mint, 1_000_000)
            .await
            .unwrap();
        // Mirror the confirmed effects on the mock ledger.
        let sol_account = gateway.put_sol_attachment(&config.program_id, &mint, 1_000_000);
        let with_value = tree::build_tree(&gateway, &config, &mint, false)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(with_value.current.value_attachment.unwrap().lamports, 1_000_000);

        extract_sol(&gateway, &config, &signer, &mint).await.unwrap();
        gateway.remove_account(&sol_account);
        let drained = tree::build_tree(&gateway, &config, &mint, false)
            .await
            .unwrap()
            .unwrap();
        assert!(drained.current.value_attachment.is_none());

        let submitted = gateway.submitted();
        assert_eq!(submitted.len(), 2);
        assert_eq!(
            &submitted[1].message.instructions()[0].data[..8],
            &instructions::discriminator("extract_sol_v2")
        );
    }
}
