//! Program-derived address computation for the Synft program.
//!
//! Every piece of composition state lives at an address derived from a fixed
//! seed tag plus mint key material. The program re-derives these addresses
//! independently, so the helpers here must agree with it bit-for-bit. Each
//! helper returns the canonical bump alongside the address; instructions
//! carry the bump so the program can prove the derivation.

use solana_pubkey::Pubkey;

use crate::error::SynftError;
use crate::record::EdgeScheme;

/// Seed tag for lamport attachment accounts.
pub const SOL_SEED: &[u8] = b"sol-seed";
/// Seed tag for composition edge records, shared by both schemes.
pub const CHILDREN_OF: &[u8] = b"children-of";
/// Seed tag for Metaplex token metadata accounts.
pub const METADATA_SEED: &[u8] = b"metadata";
/// Seed tag for the token account of a synthetic copy.
pub const ACCOUNT_SEED: &[u8] = b"synthetic-nft-account-seed";
/// Seed tag for the mint of a synthetic copy.
pub const MINT_SEED: &[u8] = b"synthetic-nft-mint-seed";

pub(crate) fn derive(
    seeds: &[&[u8]],
    program_id: &Pubkey,
) -> Result<(Pubkey, u8), SynftError> {
    for seed in seeds {
        if seed.len() > solana_pubkey::MAX_SEED_LEN {
            return Err(SynftError::AddressDerivation(format!(
                "seed length {} exceeds maximum {}",
                seed.len(),
                solana_pubkey::MAX_SEED_LEN
            )));
        }
    }
    Pubkey::try_find_program_address(seeds, program_id).ok_or_else(|| {
        SynftError::AddressDerivation("no valid bump for seed set".to_string())
    })
}

/// Address holding lamports attached to `mint`.
///
/// There is at most one such address per mint, so reads need no scan.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists.
pub fn sol_attachment(
    program_id: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, u8), SynftError> {
    derive(&[SOL_SEED, mint.as_ref()], program_id)
}

/// Edge record address for the given scheme.
///
/// The legacy V1 layout keys the record by the parent alone, so a parent can
/// hold at most one child; V2 keys it by the `(parent, child)` pair and the
/// `child` disambiguator is required.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists, or
/// [`SynftError::InvalidInput`] when a V2 derivation is requested without a
/// child mint.
pub fn edge_record(
    program_id: &Pubkey,
    scheme: EdgeScheme,
    parent: &Pubkey,
    child: Option<&Pubkey>,
) -> Result<(Pubkey, u8), SynftError> {
    match scheme {
        EdgeScheme::V1 => derive(&[CHILDREN_OF, parent.as_ref()], program_id),
        EdgeScheme::V2 => {
            let child = child.ok_or_else(|| {
                SynftError::InvalidInput(
                    "V2 edge derivation requires a child mint".to_string(),
                )
            })?;
            derive(&[CHILDREN_OF, parent.as_ref(), child.as_ref()], program_id)
        }
    }
}

/// V2 edge record address for the `(parent, child)` pair.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists.
pub fn edge_v2(
    program_id: &Pubkey,
    parent: &Pubkey,
    child: &Pubkey,
) -> Result<(Pubkey, u8), SynftError> {
    edge_record(program_id, EdgeScheme::V2, parent, Some(child))
}

/// Legacy V1 edge record address, keyed by the parent alone.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists.
pub fn edge_v1(program_id: &Pubkey, parent: &Pubkey) -> Result<(Pubkey, u8), SynftError> {
    edge_record(program_id, EdgeScheme::V1, parent, None)
}

/// Mint address of the synthetic copy derived from `source`.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists.
pub fn synthetic_mint(
    program_id: &Pubkey,
    source: &Pubkey,
) -> Result<(Pubkey, u8), SynftError> {
    derive(&[MINT_SEED, source.as_ref()], program_id)
}

/// Token account address of the synthetic copy derived from `source`.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists.
pub fn synthetic_token_account(
    program_id: &Pubkey,
    source: &Pubkey,
) -> Result<(Pubkey, u8), SynftError> {
    derive(&[ACCOUNT_SEED, source.as_ref()], program_id)
}

/// Metaplex metadata account for `mint`, owned by the metadata program.
///
/// # Errors
///
/// Returns [`SynftError::AddressDerivation`] if no valid bump exists.
pub fn token_metadata(
    metadata_program_id: &Pubkey,
    mint: &Pubkey,
) -> Result<(Pubkey, u8), SynftError> {
    derive(
        &[METADATA_SEED, metadata_program_id.as_ref(), mint.as_ref()],
        metadata_program_id,
    )
}
