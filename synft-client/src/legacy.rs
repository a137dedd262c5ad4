//! Legacy V1 scheme support.
//!
//! The V1 layout keys its single edge record by the parent alone, so the
//! record address is derivable up front and reads need no scan. Records
//! written under V1 remain on the ledger, so the read surface and the two
//! mutations that still target it stay supported alongside the current
//! scheme.

use serde::Serialize;
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_signer::Signer;

use crate::chain::rpc::RpcGatewayLike;
use crate::chain::types::Address;
use crate::client::SynftConfig;
use crate::compose::{self, CopyArgs, DynSigner, instructions};
use crate::error::SynftError;
use crate::pda;
use crate::record::LegacyCompositionRecord;

/// A legacy injection attached to a token.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectInfoV1 {
    /// Address of the legacy edge record.
    pub record_address: Address,
    /// Lamports held at the record.
    pub lamports: u64,
    /// Whether the injection can be undone.
    pub reversible: bool,
}

/// Reads the legacy injection attached to `mint`, if any.
///
/// # Errors
///
/// Returns derivation, read, and [`SynftError::InvalidRecord`] failures;
/// an absent record is `None`, not an error.
pub async fn inject_info_v1<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
) -> Result<Option<InjectInfoV1>, SynftError> {
    let (record_address, _) = pda::edge_v1(&config.program_id, mint)?;
    let Some(account) = gateway.account(&record_address).await? else {
        return Ok(None);
    };
    let record = LegacyCompositionRecord::parse(&record_address, &account.data)?;
    Ok(Some(InjectInfoV1 {
        record_address: record_address.into(),
        lamports: account.lamports,
        reversible: record.reversible,
    }))
}

/// Whether `mint` carries a legacy injection. Read failures are `false`.
pub async fn has_inject_v1<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
) -> bool {
    match pda::edge_v1(&config.program_id, mint) {
        Ok((record_address, _)) => {
            matches!(gateway.account(&record_address).await, Ok(Some(_)))
        }
        Err(_) => false,
    }
}

/// Mints a synthetic copy of `source` and attaches `lamports` under the
/// legacy record, in one transaction. Returns the new mint.
///
/// # Errors
///
/// Surfaces derivation, submission, and confirmation failures verbatim.
pub async fn copy_with_inject_sol_v1<G: RpcGatewayLike>(
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

    let (edge_record, bump) = pda::edge_v1(&config.program_id, &mint_account)?;
    let inject = instructions::initialize_sol_inject(
        &config.program_id,
        &owner,
        &token_account,
        &mint_account,
        &edge_record,
        true,
        bump,
        lamports,
    );

    compose::send_bundle(gateway, config, signer, &[copy, inject]).await?;
    Ok(mint_account)
}

/// Extracts the lamports held at `mint`'s legacy record.
///
/// # Errors
///
/// Surfaces derivation, read, submission, and confirmation failures
/// verbatim.
pub async fn extract_sol_v1<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    signer: &DynSigner,
    mint: &Pubkey,
) -> Result<Signature, SynftError> {
    let holder = gateway
        .largest_token_holder(mint)
        .await?
        .ok_or(SynftError::RecordNotFound(*mint))?;
    let (edge_record, bump) = pda::edge_v1(&config.program_id, mint)?;
    let instruction = instructions::extract_sol(
        &config.program_id,
        &signer.pubkey(),
        &holder.address,
        mint,
        &edge_record,
        bump,
    );
    compose::send_bundle(gateway, config, signer, &[instruction]).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::AttachmentKind;
    use crate::testutil::MockGateway;

    fn config() -> SynftConfig {
        SynftConfig::new(Pubkey::new_unique())
    }

    #[tokio::test]
    async fn test_inject_info_absent() {
        let gateway = MockGateway::new();
        let config = config();
        let mint = Pubkey::new_unique();
        assert!(inject_info_v1(&gateway, &config, &mint).await.unwrap().is_none());
        assert!(!has_inject_v1(&gateway, &config, &mint).await);
    }

    #[tokio::test]
    async fn test_inject_info_present() {
        let gateway = MockGateway::new();
        let config = config();
        let mint = Pubkey::new_unique();
        let child = Pubkey::new_unique();
        let record = gateway.put_edge_v1(
            &config.program_id,
            &mint,
            &child,
            5_000_000,
            AttachmentKind::Sol,
        );

        let info = inject_info_v1(&gateway, &config, &mint).await.unwrap().unwrap();
        assert_eq!(*info.record_address.pubkey(), record);
        assert_eq!(info.lamports, 5_000_000);
        assert!(info.reversible);
        assert!(has_inject_v1(&gateway, &config, &mint).await);
    }

    #[tokio::test]
    async fn test_extract_sol_v1_targets_legacy_record() {
        let gateway = MockGateway::new();
        let config = config();
        let signer = solana_keypair::Keypair::new();
        let mint = Pubkey::new_unique();
        gateway.put_nft(&mint, &signer.pubkey());
        gateway.put_edge_v1(
            &config.program_id,
            &mint,
            &Pubkey::new_unique(),
            1_000,
            AttachmentKind::Sol,
        );

        extract_sol_v1(&gateway, &config, &signer, &mint).await.unwrap();
        let submitted = gateway.submitted();
        assert_eq!(submitted.len(), 1);
        let message = &submitted[0].message;
        assert_eq!(message.instructions().len(), 1);
        let (edge_record, _) = pda::edge_v1(&config.program_id, &mint).unwrap();
        assert!(message.static_account_keys().contains(&edge_record));
    }
}
