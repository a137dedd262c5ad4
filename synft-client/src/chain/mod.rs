//! Ledger-facing types and the RPC gateway.
//!
//! The rest of the crate talks to Solana exclusively through the
//! [`rpc::RpcGatewayLike`] capability trait, so protocol logic can be tested
//! against an in-memory ledger and swapped onto any transport.

/// Core ledger types (addresses, token holders).
pub mod types;
pub use types::*;

/// RPC gateway abstraction and its default implementation.
pub mod rpc;
pub use rpc::*;
