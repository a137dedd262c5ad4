//! Client SDK for the Synft NFT composition program on Solana.
//!
//! Synft lets a non-fungible token hold value or other NFTs ("injection"),
//! forming a parent/child tree anchored at a root token. This crate is the
//! client side of that protocol: it derives the program addresses holding
//! composition state, rebuilds the full tree by walking them, resolves who
//! owns what across root/parent/child boundaries, and assembles the
//! multi-instruction transactions that mutate the tree. Two data layouts
//! coexist on the ledger, the legacy V1 single-child scheme and the
//! current V2 multi-child scheme, and both are supported explicitly.
//!
//! # Architecture
//!
//! - [`pda`] - deterministic program-address derivation (pure, no I/O)
//! - [`chain`] - ledger types and the [`chain::rpc::RpcGatewayLike`]
//!   capability the rest of the crate depends on
//! - [`record`] - on-chain edge record layouts for both schemes
//! - [`resolver`] - parent/child discovery, validity, and belonging checks
//! - [`tree`] - recursive composition-tree reconstruction
//! - [`compose`] - transaction assembly, submission, and confirmation
//! - [`legacy`] - the V1 scheme's read and mutation surface
//! - [`metadata`] - Metaplex metadata plus off-chain JSON lookup
//! - [`client`] - the [`SynftClient`] session facade
//!
//! Read paths degrade gracefully: a missing branch shows as absent, a
//! failed ownership check reads as unowned. Mutation paths never swallow
//! an error, since a failure there may correspond to spent funds or a
//! signature already given.
//!
//! # Reading a tree
//!
//! ```ignore
//! use synft_client::{RpcGateway, SynftClient, SynftConfig};
//!
//! let config = SynftConfig::new(SYNFT_PROGRAM_ID);
//! let client = SynftClient::new(config, RpcGateway::new("https://api.devnet.solana.com"));
//!
//! if let Some(tree) = client.get_inject_tree(&mint).await? {
//!     println!("{}", serde_json::to_string_pretty(&tree)?);
//! }
//! ```
//!
//! # Injecting value
//!
//! ```ignore
//! use solana_keypair::Keypair;
//!
//! let client = SynftClient::new(config, gateway).with_signer(Box::new(keypair));
//! let signature = client.inject_sol(&mint, 1_000_000).await?;
//! ```

pub mod chain;
pub mod client;
pub mod compose;
pub mod error;
pub mod legacy;
pub mod metadata;
pub mod pda;
pub mod record;
pub mod resolver;
pub mod tree;

#[cfg(test)]
pub(crate) mod testutil;

pub use chain::rpc::{AccountFilter, RpcGateway, RpcGatewayLike};
pub use chain::types::{Address, TokenHolder};
pub use client::{METADATA_PROGRAM_ID, SynftClient, SynftConfig};
pub use compose::{CopyArgs, DynSigner};
pub use error::SynftError;
pub use legacy::InjectInfoV1;
pub use metadata::MetaInfo;
pub use record::{AttachmentKind, CompositionRecord, EdgeScheme, LegacyCompositionRecord};
pub use resolver::{BelongingResult, OwnedToken, ParentLink, ParentRef};
pub use tree::{CompositionTree, TreeNode, ValueAttachment};
