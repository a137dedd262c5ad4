//! Composition tree reconstruction.
//!
//! A tree is rebuilt from scratch on every query; the ledger is the only
//! source of truth. Children of a node are discovered by scan and their
//! subtrees are built concurrently. The recorded graph is externally
//! controlled, so every recursive call threads the set of mints on the path
//! from the root; re-encountering one fails the whole build instead of
//! looping forever. Any other read failure reports just the failing subtree
//! as absent.

use std::collections::HashSet;
use std::future::Future;
use std::pin::Pin;

use futures_util::future;
use serde::Serialize;
use solana_pubkey::Pubkey;
use tracing::warn;

use crate::chain::rpc::RpcGatewayLike;
use crate::chain::types::Address;
use crate::client::SynftConfig;
use crate::error::SynftError;
use crate::pda;
use crate::resolver::{self, ParentRef};

/// Lamports attached to a token.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueAttachment {
    /// Attached balance in lamports.
    pub lamports: u64,
}

/// One node of a composition tree.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// The node's mint.
    pub token: Address,
    /// Lamports attached to this node, if any.
    pub value_attachment: Option<ValueAttachment>,
    /// Child subtrees; `None` marks a child that could not be read.
    pub children: Vec<Option<CompositionTree>>,
}

/// A composition tree rooted at the queried token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionTree {
    /// The queried node and its descendants.
    pub current: TreeNode,
    /// Parent edge of the queried node, resolved only at the top level.
    pub parent: Option<ParentRef>,
}

type NodeFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<TreeNode>, SynftError>> + Send + 'a>>;

/// Builds the composition tree rooted at `mint`.
///
/// With `include_parent`, the top-level node also carries its parent edge;
/// recursive calls never re-resolve parents, since each child's parent is
/// the node that discovered it and re-deriving it could race a concurrent
/// mutation.
///
/// # Errors
///
/// Returns [`SynftError::CycleDetected`] when the recorded graph loops.
/// Other read failures degrade to an absent node or subtree.
pub async fn build_tree<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
    include_parent: bool,
) -> Result<Option<CompositionTree>, SynftError> {
    let mut path = HashSet::new();
    path.insert(*mint);
    let Some(current) = build_node(gateway, config, *mint, path).await? else {
        return Ok(None);
    };
    let parent = if include_parent {
        resolver::resolve_parent_ref(gateway, config, mint).await
    } else {
        None
    };
    Ok(Some(CompositionTree { current, parent }))
}

fn build_node<'a, G: RpcGatewayLike>(
    gateway: &'a G,
    config: &'a SynftConfig,
    mint: Pubkey,
    path: HashSet<Pubkey>,
) -> NodeFuture<'a> {
    Box::pin(async move {
        let value_attachment = match read_value_attachment(gateway, config, &mint).await {
            Ok(attachment) => attachment,
            Err(err) => {
                warn!(%mint, %err, "value attachment read failed");
                return Ok(None);
            }
        };

        let child_mints = match resolver::find_children(gateway, config, &mint).await {
            Ok(children) => children,
            Err(err) => {
                warn!(%mint, %err, "child scan failed");
                return Ok(None);
            }
        };
        for child in &child_mints {
            if path.contains(child) {
                return Err(SynftError::CycleDetected(*child));
            }
        }

        let subtrees = future::join_all(child_mints.iter().map(|child| {
            let mut child_path = path.clone();
            child_path.insert(*child);
            build_node(gateway, config, *child, child_path)
        }))
        .await;

        let mut children = Vec::with_capacity(subtrees.len());
        for subtree in subtrees {
            children.push(subtree?.map(|node| CompositionTree {
                current: node,
                parent: None,
            }));
        }

        Ok(Some(TreeNode {
            token: mint.into(),
            value_attachment,
            children,
        }))
    })
}

async fn read_value_attachment<G: RpcGatewayLike>(
    gateway: &G,
    config: &SynftConfig,
    mint: &Pubkey,
) -> Result<Option<ValueAttachment>, SynftError> {
    let (sol_account, _) = pda::sol_attachment(&config.program_id, mint)?;
    Ok(gateway
        .account(&sol_account)
        .await?
        .map(|account| ValueAttachment {
            lamports: account.lamports,
        }))
}
