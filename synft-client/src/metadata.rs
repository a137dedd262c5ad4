//! Token metadata lookup.
//!
//! Display attributes live in a Metaplex metadata account derived from the
//! mint; the on-chain record carries a URI pointing at an off-chain JSON
//! document. Both reads are soft: a missing or malformed account yields
//! `None`, and a failed fetch leaves only the off-chain field empty.

use serde::Serialize;
use solana_pubkey::Pubkey;
use tracing::warn;

use crate::chain::rpc::RpcGatewayLike;
use crate::chain::types::Address;
use crate::client::SynftConfig;
use crate::pda;

/// Display metadata for a token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaInfo {
    /// The described mint.
    pub mint: Address,
    /// Token name, trimmed of padding.
    pub name: String,
    /// Token symbol, trimmed of padding.
    pub symbol: String,
    /// URI of the off-chain document.
    pub uri: String,
    /// The off-chain JSON document, when it could be fetched.
    pub external: Option<serde_json::Value>,
}

// Metaplex metadata layout: key (1), update authority (32), mint (32),
// then three length-prefixed strings stored at fixed capacity and padded
// with NULs.
const NAME_OFFSET: usize = 65;

fn read_padded_string(data: &[u8], offset: usize) -> Option<(String, usize)> {
    let len_bytes: [u8; 4] = data.get(offset..offset + 4)?.try_into().ok()?;
    let len = u32::from_le_bytes(len_bytes) as usize;
    let raw = data.get(offset + 4..offset + 4 + len)?;
    let value = String::from_utf8_lossy(raw)
        .trim_end_matches('\0')
        .to_string();
    Some((value, offset + 4 + len))
}

pub(crate) fn parse_metadata(data: &[u8]) -> Option<(String, String, String)> {
    let (name, offset) = read_padded_string(data, NAME_OFFSET)?;
    let (symbol, offset) = read_padded_string(data, offset)?;
    let (uri, _) = read_padded_string(data, offset)?;
    Some((name, symbol, uri))
}

/// Resolves display metadata for `mint`. Soft: any on-chain failure yields
/// `None`, and an off-chain fetch failure leaves `external` empty.
pub async fn metadata_info<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    http: &reqwest::Client,
    mint: &Pubkey,
) -> Option<MetaInfo> {
    let (metadata_account, _) =
        pda::token_metadata(&config.metadata_program_id, mint).ok()?;
    let account = match gateway.account(&metadata_account).await {
        Ok(account) => account?,
        Err(err) => {
            warn!(%mint, %err, "metadata read failed");
            return None;
        }
    };
    let (name, symbol, uri) = parse_metadata(&account.data)?;

    let external = match http.get(uri.as_str()).send().await {
        Ok(response) => response.json().await.ok(),
        Err(err) => {
            warn!(%mint, %err, "off-chain metadata fetch failed");
            None
        }
    };

    Some(MetaInfo {
        mint: (*mint).into(),
        name,
        symbol,
        uri,
        external,
    })
}
