//! Instruction encoding for the Synft program.
//!
//! Wire format is Anchor's: an 8-byte method discriminator
//! (`sha256("global:<method>")[0..8]`) followed by Borsh-encoded arguments.
//! Account lists and their order are part of the program contract; changing
//! either silently targets the wrong accounts.

use sha2::{Digest, Sha256};
use solana_instruction::{AccountMeta, Instruction};
use solana_pubkey::{Pubkey, pubkey};

/// System program address.
pub const SYSTEM_PROGRAM_ID: Pubkey = pubkey!("11111111111111111111111111111111");
/// Rent sysvar address.
pub const RENT_SYSVAR_ID: Pubkey = pubkey!("SysvarRent111111111111111111111111111111111");

pub(crate) fn discriminator(method: &str) -> [u8; 8] {
    let digest = Sha256::digest(format!("global:{method}").as_bytes());
    let mut out = [0u8; 8];
    out.copy_from_slice(&digest[..8]);
    out
}

fn encode_str(data: &mut Vec<u8>, value: &str) {
    #[allow(clippy::cast_possible_truncation)]
    data.extend_from_slice(&(value.len() as u32).to_le_bytes());
    data.extend_from_slice(value.as_bytes());
}

/// Attaches `lamports` to `parent_mint`'s sol account (current scheme).
#[must_use]
pub fn inject_to_sol_v2(
    program_id: &Pubkey,
    current_owner: &Pubkey,
    parent_token_account: &Pubkey,
    parent_mint: &Pubkey,
    sol_account: &Pubkey,
    bump: u8,
    lamports: u64,
) -> Instruction {
    let mut data = discriminator("inject_to_sol_v2").to_vec();
    data.push(bump);
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new_readonly(*parent_token_account, false),
            AccountMeta::new_readonly(*parent_mint, false),
            AccountMeta::new(*sol_account, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ],
        data,
    }
}

/// Injects `child_mint` directly under a chain root.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn inject_to_root_v2(
    program_id: &Pubkey,
    current_owner: &Pubkey,
    child_token_account: &Pubkey,
    child_mint: &Pubkey,
    parent_token_account: &Pubkey,
    parent_mint: &Pubkey,
    edge_record: &Pubkey,
    reversible: bool,
    bump: u8,
) -> Instruction {
    let mut data = discriminator("inject_to_root_v2").to_vec();
    data.push(u8::from(reversible));
    data.push(bump);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new(*child_token_account, false),
            AccountMeta::new_readonly(*child_mint, false),
            AccountMeta::new_readonly(*parent_token_account, false),
            AccountMeta::new_readonly(*parent_mint, false),
            AccountMeta::new(*edge_record, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    }
}

/// Injects `child_mint` under a non-root node; the program verifies the
/// whole root/parent/child account triple.
#[must_use]
#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
pub fn inject_to_non_root_v2(
    program_id: &Pubkey,
    current_owner: &Pubkey,
    child_token_account: &Pubkey,
    child_mint: &Pubkey,
    parent_token_account: &Pubkey,
    parent_mint: &Pubkey,
    root_token_account: &Pubkey,
    root_mint: &Pubkey,
    child_edge_record: &Pubkey,
    parent_edge_record: &Pubkey,
    root_edge_record: &Pubkey,
    reversible: bool,
    is_mutable: bool,
    bump: u8,
) -> Instruction {
    let mut data = discriminator("inject_to_non_root_v2").to_vec();
    data.push(u8::from(reversible));
    data.push(u8::from(is_mutable));
    data.push(bump);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new(*child_token_account, false),
            AccountMeta::new_readonly(*child_mint, false),
            AccountMeta::new_readonly(*parent_token_account, false),
            AccountMeta::new_readonly(*parent_mint, false),
            AccountMeta::new_readonly(*root_token_account, false),
            AccountMeta::new_readonly(*root_mint, false),
            AccountMeta::new(*child_edge_record, false),
            AccountMeta::new_readonly(*parent_edge_record, false),
            AccountMeta::new_readonly(*root_edge_record, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            AccountMeta::new_readonly(spl_token::id(), false),
        ],
        data,
    }
}

/// Mints a synthetic copy of `source_mint` with fresh metadata.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn nft_copy(
    program_id: &Pubkey,
    metadata_program_id: &Pubkey,
    current_owner: &Pubkey,
    source_mint: &Pubkey,
    metadata_account: &Pubkey,
    mint_account: &Pubkey,
    token_account: &Pubkey,
    name: &str,
    symbol: &str,
    uri: &str,
) -> Instruction {
    let mut data = discriminator("nft_copy").to_vec();
    encode_str(&mut data, name);
    encode_str(&mut data, symbol);
    encode_str(&mut data, uri);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new_readonly(*source_mint, false),
            AccountMeta::new(*metadata_account, false),
            AccountMeta::new(*mint_account, false),
            AccountMeta::new(*token_account, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
            AccountMeta::new_readonly(spl_token::id(), false),
            AccountMeta::new_readonly(*metadata_program_id, false),
        ],
        data,
    }
}

/// Drains the sol account attached to `parent_mint` (current scheme).
#[must_use]
pub fn extract_sol_v2(
    program_id: &Pubkey,
    current_owner: &Pubkey,
    parent_token_account: &Pubkey,
    parent_mint: &Pubkey,
    sol_account: &Pubkey,
    bump: u8,
) -> Instruction {
    let mut data = discriminator("extract_sol_v2").to_vec();
    data.push(bump);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new_readonly(*parent_token_account, false),
            AccountMeta::new_readonly(*parent_mint, false),
            AccountMeta::new(*sol_account, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ],
        data,
    }
}

/// Drains and closes a legacy V1 edge record holding lamports.
#[must_use]
pub fn extract_sol(
    program_id: &Pubkey,
    current_owner: &Pubkey,
    parent_token_account: &Pubkey,
    parent_mint: &Pubkey,
    edge_record: &Pubkey,
    bump: u8,
) -> Instruction {
    let mut data = discriminator("extract_sol").to_vec();
    data.push(bump);
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new_readonly(*parent_token_account, false),
            AccountMeta::new_readonly(*parent_mint, false),
            AccountMeta::new(*edge_record, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ],
        data,
    }
}

/// Attaches lamports under the legacy V1 single-child record.
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn initialize_sol_inject(
    program_id: &Pubkey,
    current_owner: &Pubkey,
    parent_token_account: &Pubkey,
    parent_mint: &Pubkey,
    edge_record: &Pubkey,
    reversible: bool,
    bump: u8,
    lamports: u64,
) -> Instruction {
    let mut data = discriminator("initialize_sol_inject").to_vec();
    data.push(u8::from(reversible));
    data.push(bump);
    data.extend_from_slice(&lamports.to_le_bytes());
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*current_owner, true),
            AccountMeta::new_readonly(*parent_token_account, false),
            AccountMeta::new_readonly(*parent_mint, false),
            AccountMeta::new(*edge_record, false),
            AccountMeta::new_readonly(SYSTEM_PROGRAM_ID, false),
            AccountMeta::new_readonly(RENT_SYSVAR_ID, false),
        ],
        data,
    }
}
