//! On-chain composition record layouts.
//!
//! Two layouts coexist on the ledger. The current V2 record is keyed by the
//! `(parent, child)` pair and carries the root record address, so a parent
//! can hold any number of children. The legacy V1 record is keyed by the
//! parent alone and therefore holds at most one child. Scan filters match on
//! raw byte offsets, so the offsets here are part of the wire contract and
//! must never drift.

use sha2::{Digest, Sha256};
use solana_pubkey::Pubkey;

use crate::error::SynftError;

/// Byte offset of the child mint in a V2 record.
pub const CHILD_OFFSET: usize = 8;
/// Byte offset of the parent mint in a V2 record.
pub const PARENT_OFFSET: usize = 40;
/// Byte offset of the root record address in a V2 record.
pub const ROOT_OFFSET: usize = 72;
/// Serialized length of a V2 record.
pub const RECORD_V2_LEN: usize = 107;
/// Serialized length of a V1 record.
pub const RECORD_V1_LEN: usize = 43;

const DISCRIMINATOR_LEN: usize = 8;

/// Which data layout an edge record was written under.
///
/// Callers select the scheme explicitly; nothing in this crate falls back
/// from one layout to the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeScheme {
    /// Legacy single-child-per-parent layout.
    V1,
    /// Current multi-child layout keyed by the `(parent, child)` pair.
    V2,
}

impl EdgeScheme {
    /// Account discriminator for this scheme's record type.
    ///
    /// The program prefixes every record with the first eight bytes of
    /// `sha256("account:<TypeName>")`; scans and parsers match on it so a
    /// memcmp hit on a mint offset alone can never be mistaken for a record.
    #[must_use]
    pub fn discriminator(self) -> [u8; 8] {
        let name = match self {
            Self::V1 => "ChildrenMetadata",
            Self::V2 => "ChildrenMetadataV2",
        };
        let digest = Sha256::digest(format!("account:{name}").as_bytes());
        let mut out = [0u8; 8];
        out.copy_from_slice(&digest[..DISCRIMINATOR_LEN]);
        out
    }
}

/// What an edge attaches to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    /// Native lamports.
    Sol,
    /// Another NFT.
    Nft,
}

impl AttachmentKind {
    fn parse(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Sol),
            1 => Some(Self::Nft),
            _ => None,
        }
    }

    pub(crate) const fn as_byte(self) -> u8 {
        match self {
            Self::Sol => 0,
            Self::Nft => 1,
        }
    }
}

/// A parsed V2 composition edge record.
///
/// One record exists per `(parent, child)` pair. `root` points at the edge
/// record of the chain's root; that record's `parent` field is the root mint.
#[derive(Debug, Clone, Copy)]
pub struct CompositionRecord {
    /// The injected child mint.
    pub child: Pubkey,
    /// The mint the child is injected into.
    pub parent: Pubkey,
    /// Address of the root edge record of this chain.
    pub root: Pubkey,
    /// What the edge attaches.
    pub kind: AttachmentKind,
    /// Whether the injection can be undone by the owner.
    pub reversible: bool,
    /// Bump used when the record address was derived.
    pub bump: u8,
}

impl CompositionRecord {
    /// Parses a V2 record from raw account data.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::InvalidRecord`] when the data is too short,
    /// carries the wrong discriminator, or holds an unknown attachment kind.
    pub fn parse(address: &Pubkey, data: &[u8]) -> Result<Self, SynftError> {
        if data.len() < RECORD_V2_LEN
            || data[..DISCRIMINATOR_LEN] != EdgeScheme::V2.discriminator()
        {
            return Err(SynftError::InvalidRecord(*address));
        }
        let kind = AttachmentKind::parse(data[ROOT_OFFSET + 32])
            .ok_or(SynftError::InvalidRecord(*address))?;
        Ok(Self {
            child: read_pubkey(data, CHILD_OFFSET),
            parent: read_pubkey(data, PARENT_OFFSET),
            root: read_pubkey(data, ROOT_OFFSET),
            kind,
            reversible: data[ROOT_OFFSET + 33] != 0,
            bump: data[ROOT_OFFSET + 34],
        })
    }
}

/// A parsed legacy V1 edge record.
///
/// Keyed by the parent alone, so the parent mint is implied by the record
/// address and only the child is stored.
#[derive(Debug, Clone, Copy)]
pub struct LegacyCompositionRecord {
    /// The injected child mint.
    pub child: Pubkey,
    /// What the edge attaches.
    pub kind: AttachmentKind,
    /// Whether the injection can be undone by the owner.
    pub reversible: bool,
    /// Bump used when the record address was derived.
    pub bump: u8,
}

impl LegacyCompositionRecord {
    /// Parses a V1 record from raw account data.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::InvalidRecord`] when the data is too short,
    /// carries the wrong discriminator, or holds an unknown attachment kind.
    pub fn parse(address: &Pubkey, data: &[u8]) -> Result<Self, SynftError> {
        if data.len() < RECORD_V1_LEN
            || data[..DISCRIMINATOR_LEN] != EdgeScheme::V1.discriminator()
        {
            return Err(SynftError::InvalidRecord(*address));
        }
        let kind = AttachmentKind::parse(data[CHILD_OFFSET + 32])
            .ok_or(SynftError::InvalidRecord(*address))?;
        Ok(Self {
            child: read_pubkey(data, CHILD_OFFSET),
            kind,
            reversible: data[CHILD_OFFSET + 33] != 0,
            bump: data[CHILD_OFFSET + 34],
        })
    }
}

fn read_pubkey(data: &[u8], offset: usize) -> Pubkey {
    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(&data[offset..offset + 32]);
    Pubkey::new_from_array(bytes)
}
