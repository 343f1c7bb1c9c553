//! Client-side access to Antelope/EOSIO nodes.
//!
//! - [`rpc`] talks to a node over HTTP/JSON and classifies every failure as
//!   transport, backend or unclassified.
//! - [`transactions`] drives a transaction through prepare, sign and
//!   broadcast on top of the RPC provider and pluggable ABI, serialization
//!   and signature providers.
//! - [`errors`] recovers the node's own error report from any error chain.

pub mod abi;
pub mod cli;
pub mod config;
pub mod errors;
pub mod log;
pub mod rpc;
pub mod serialization;
pub mod signature;
pub mod transactions;

#[cfg(test)]
mod testing;

pub use crate::errors::{backend_error, describe};
pub use crate::rpc::{CallError, CallErrorKind, NodeRpcProvider, RpcProvider, RpcResponseError};
pub use crate::transactions::{Action, Authorization, TransactionProcessor, TransactionSession};
