//! Client facade wiring the gateway, program binding, and signer.
//!
//! One [`SynftClient`] is a session: construct it with a gateway, attach a
//! signer when mutations are needed, and pass it where it is used. Every
//! dependency is explicit; there is no process-wide instance, and swapping
//! wallets means building a new client.

use solana_commitment_config::CommitmentConfig;
use solana_pubkey::{Pubkey, pubkey};
use solana_signature::Signature;
use solana_signer::Signer;
use tracing::warn;

use crate::chain::rpc::RpcGatewayLike;
use crate::compose::{self, CopyArgs, DynSigner};
use crate::error::SynftError;
use crate::legacy::{self, InjectInfoV1};
use crate::metadata::{self, MetaInfo};
use crate::resolver::{self, BelongingResult, OwnedToken, ParentLink};
use crate::tree::{self, CompositionTree};

/// Metaplex Token Metadata program.
pub const METADATA_PROGRAM_ID: Pubkey =
    pubkey!("metaqbxxUerdq28cj1RbAWkYQm3ybzjb6a8bt518x1s");

/// Program binding and commitment for a client session.
#[derive(Debug, Clone, Copy)]
pub struct SynftConfig {
    /// The Synft program.
    pub program_id: Pubkey,
    /// The token metadata program.
    pub metadata_program_id: Pubkey,
    /// Commitment level transactions are confirmed at.
    pub commitment: CommitmentConfig,
}

impl SynftConfig {
    /// Binds to `program_id` with the standard metadata program and
    /// `processed` commitment.
    #[must_use]
    pub fn new(program_id: Pubkey) -> Self {
        Self {
            program_id,
            metadata_program_id: METADATA_PROGRAM_ID,
            commitment: CommitmentConfig::processed(),
        }
    }

    /// Overrides the confirmation commitment.
    #[must_use]
    pub const fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }
}

/// A Synft client session over some gateway.
///
/// Read operations work without a signer; mutation operations fail with
/// [`SynftError::SessionNotReady`] until one is attached.
pub struct SynftClient<G> {
    gateway: G,
    config: SynftConfig,
    signer: Option<Box<DynSigner>>,
    http: reqwest::Client,
}

impl<G> std::fmt::Debug for SynftClient<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynftClient")
            .field("config", &self.config)
            .field("has_signer", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl<G: RpcGatewayLike> SynftClient<G> {
    /// Creates a read-only session.
    #[must_use]
    pub fn new(config: SynftConfig, gateway: G) -> Self {
        Self {
            gateway,
            config,
            signer: None,
            http: reqwest::Client::new(),
        }
    }

    /// Attaches a signing capability, enabling mutations.
    #[must_use]
    pub fn with_signer(mut self, signer: Box<DynSigner>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// The session configuration.
    #[must_use]
    pub const fn config(&self) -> &SynftConfig {
        &self.config
    }

    /// The gateway this session reads and submits through.
    #[must_use]
    pub const fn gateway(&self) -> &G {
        &self.gateway
    }

    fn signer(&self) -> Result<&DynSigner, SynftError> {
        self.signer
            .as_deref()
            .ok_or(SynftError::SessionNotReady)
    }

    // --- read surface -----------------------------------------------------

    /// Whether `mint` behaves as a non-fungible unit. Read failures are
    /// `false`.
    pub async fn check_valid(&self, mint: &Pubkey) -> bool {
        resolver::check_valid_token(&self.gateway, mint).await
    }

    /// Classifies who owns `mint` relative to the attached signer.
    ///
    /// Without a signer the caller cannot match anything, so the all-false
    /// default is returned; use [`resolver::resolve_belonging`] directly to
    /// check an arbitrary identity.
    pub async fn check_belonging(&self, mint: &Pubkey) -> BelongingResult {
        let Ok(signer) = self.signer() else {
            warn!(%mint, "belonging check without a signer");
            return BelongingResult::default();
        };
        resolver::resolve_belonging(&self.gateway, &self.config, mint, &signer.pubkey())
            .await
    }

    /// Builds the composition tree rooted at `mint`, parent included.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::CycleDetected`] when the recorded graph loops;
    /// other read failures degrade to absent nodes.
    pub async fn get_inject_tree(
        &self,
        mint: &Pubkey,
    ) -> Result<Option<CompositionTree>, SynftError> {
        tree::build_tree(&self.gateway, &self.config, mint, true).await
    }

    /// Resolves display metadata for `mint`. Soft: failures yield `None`.
    pub async fn metadata_info(&self, mint: &Pubkey) -> Option<MetaInfo> {
        metadata::metadata_info(&self.gateway, &self.config, &self.http, mint).await
    }

    /// Lists single-unit token holdings of `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::ScanFailed`] on transport failure.
    pub async fn valid_tokens_by_owner(
        &self,
        owner: &Pubkey,
    ) -> Result<Vec<OwnedToken>, SynftError> {
        resolver::valid_tokens_by_owner(&self.gateway, owner).await
    }

    /// Reads the legacy injection attached to `mint`. Soft: failures yield
    /// `None`.
    pub async fn inject_info_v1(&self, mint: &Pubkey) -> Option<InjectInfoV1> {
        match legacy::inject_info_v1(&self.gateway, &self.config, mint).await {
            Ok(info) => info,
            Err(err) => {
                warn!(%mint, %err, "legacy inject lookup failed");
                None
            }
        }
    }

    /// Whether `mint` carries a legacy injection. Read failures are `false`.
    pub async fn has_inject_v1(&self, mint: &Pubkey) -> bool {
        legacy::has_inject_v1(&self.gateway, &self.config, mint).await
    }

    // --- mutation surface -------------------------------------------------

    /// Attaches `lamports` to `mint`.
    ///
    /// # Errors
    ///
    /// Returns [`SynftError::SessionNotReady`] without a signer; otherwise
    /// surfaces preparation, submission, and confirmation failures verbatim.
    pub async fn inject_sol(
        &self,
        mint: &Pubkey,
        lamports: u64,
    ) -> Result<Signature, SynftError> {
        compose::inject_sol(&self.gateway, &self.config, self.signer()?, mint, lamports)
            .await
    }

    /// Injects `children` directly under the chain root `root`. An empty
    /// batch is a no-op success (`None`).
    ///
    /// # Errors
    ///
    /// Same contract as [`SynftClient::inject_sol`]; any per-child
    /// preparation failure aborts the whole batch before submission.
    pub async fn inject_nfts_to_root(
        &self,
        root: &Pubkey,
        children: &[Pubkey],
    ) -> Result<Option<Signature>, SynftError> {
        compose::inject_nfts_to_root(
            &self.gateway,
            &self.config,
            self.signer()?,
            root,
            children,
        )
        .await
    }

    /// Injects `children` under the non-root node `mint`; `parent` names
    /// the node's parent edge. An empty batch is a no-op success (`None`).
    ///
    /// # Errors
    ///
    /// Same contract as [`SynftClient::inject_nfts_to_root`].
    pub async fn inject_nfts_to_non_root(
        &self,
        mint: &Pubkey,
        children: &[Pubkey],
        parent: &ParentLink,
    ) -> Result<Option<Signature>, SynftError> {
        compose::inject_nfts_to_non_root(
            &self.gateway,
            &self.config,
            self.signer()?,
            mint,
            children,
            parent,
        )
        .await
    }

    /// Mints a synthetic copy of `source` with `lamports` attached.
    /// Returns the new mint.
    ///
    /// # Errors
    ///
    /// Same contract as [`SynftClient::inject_sol`].
    pub async fn copy_with_inject_sol(
        &self,
        source: &Pubkey,
        lamports: u64,
        args: &CopyArgs,
    ) -> Result<Pubkey, SynftError> {
        compose::copy_with_inject_sol(
            &self.gateway,
            &self.config,
            self.signer()?,
            source,
            lamports,
            args,
        )
        .await
    }

    /// Extracts the lamports attached to `mint`.
    ///
    /// # Errors
    ///
    /// Same contract as [`SynftClient::inject_sol`].
    pub async fn extract_sol(&self, mint: &Pubkey) -> Result<Signature, SynftError> {
        compose::extract_sol(&self.gateway, &self.config, self.signer()?, mint).await
    }

    /// Legacy variant of [`SynftClient::copy_with_inject_sol`].
    ///
    /// # Errors
    ///
    /// Same contract as [`SynftClient::inject_sol`].
    pub async fn copy_with_inject_sol_v1(
        &self,
        source: &Pubkey,
        lamports: u64,
        args: &CopyArgs,
    ) -> Result<Pubkey, SynftError> {
        legacy::copy_with_inject_sol_v1(
            &self.gateway,
            &self.config,
            self.signer()?,
            source,
            lamports,
            args,
        )
        .await
    }

    /// Extracts the lamports held at `mint`'s legacy record.
    ///
    /// # Errors
    ///
    /// Same contract as [`SynftClient::inject_sol`].
    pub async fn extract_sol_v1(&self, mint: &Pubkey) -> Result<Signature, SynftError> {
        legacy::extract_sol_v1(&self.gateway, &self.config, self.signer()?, mint).await
    }
}
