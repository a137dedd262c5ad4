//! Error types for Synft composition operations.
//!
//! One taxonomy covers both the read and mutation paths. Read-path entry
//! points (tree building, belonging checks) soften most of these into
//! empty/negative defaults; mutation-path operations always surface them.

use solana_pubkey::Pubkey;
use solana_signature::Signature;

/// Errors surfaced by Synft client operations.
#[derive(Debug, thiserror::Error)]
pub enum SynftError {
    /// No signing capability is attached to the client.
    #[error("No signer attached to the client")]
    SessionNotReady,
    /// A program address could not be derived from the given seeds.
    #[error("Address derivation failed: {0}")]
    AddressDerivation(String),
    /// An expected ledger record is absent.
    #[error("Record not found at {0}")]
    RecordNotFound(Pubkey),
    /// A record was present but its bytes do not match the expected layout.
    #[error("Malformed composition record at {0}")]
    InvalidRecord(Pubkey),
    /// An account read failed at the transport level.
    #[error("Account read failed: {0}")]
    ReadFailed(String),
    /// A filtered program scan failed at the transport level.
    #[error("Program account scan failed: {0}")]
    ScanFailed(String),
    /// A transaction was rejected at submission.
    #[error("Transaction submission failed: {0}")]
    SubmissionFailed(String),
    /// A submitted transaction did not reach the requested commitment.
    #[error("Transaction {0} was not confirmed")]
    NotConfirmed(Signature),
    /// The recorded composition graph loops back on itself.
    #[error("Composition cycle detected at {0}")]
    CycleDetected(Pubkey),
    /// Caller-supplied input was rejected before any ledger interaction.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
