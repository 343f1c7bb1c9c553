//! RPC provider for Antelope/EOSIO node communication.
//!
//! This module is the only place that talks HTTP. It turns each logical node
//! operation into one POST against the node's `/v1/chain` API and classifies
//! the outcome.
//!
//! # Architecture
//!
//! - [`RpcProvider`] - the trait collaborators depend on
//! - [`NodeRpcProvider`] - HTTP/JSON implementation with timeout, optional
//!   network logging and latency tracking
//! - [`CallError`] / [`InitializerError`] - the error taxonomy
//! - Request and response types matching the node's wire schema
//!
//! # Example
//!
//! ```rust,no_run
//! use antelope_rpc::rpc::{NodeRpcProvider, RpcProvider};
//!
//! # async fn example() -> Result<(), anyhow::Error> {
//! let provider = NodeRpcProvider::with_url("http://127.0.0.1:8888")?;
//!
//! match provider.get_info().await {
//!     Ok(info) => println!("Head block: {}", info.head_block_num),
//!     Err(e) if e.is_transport() => println!("Node unreachable: {}", e),
//!     Err(e) => println!("Node rejected the call: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

mod endpoint;
mod error;
mod http_client;
mod network_log;
mod provider;
mod types;

pub use endpoint::Endpoint;
pub use error::{CallError, CallErrorKind, CallFault, InitializerError};
pub use network_log::NETWORK_LOG_TARGET;
pub use provider::{NodeRpcProvider, RpcProvider};
pub use types::{
    ActionTrace, ActionTraceAct, ActionValueError, ErrorDetail, GetAccountResponse, GetBlockInfoResponse,
    GetInfoResponse, GetRawAbiResponse, GetRequiredKeysRequest, GetRequiredKeysResponse, Processed, RpcError,
    RpcResponseError, SendTransactionRequest, SendTransactionResponse, TableRowsResponse,
};
