//! Client configuration.
//!
//! Settings come from a TOML file layered with `ANTELOPE_` environment
//! variables (see [`loader`]), and are finally overridden by command line
//! arguments through [`ApplyArgs`].

pub mod loader;

use serde::{Deserialize, Serialize};

use crate::cli::NodeArgs;

/// Connection settings for the RPC provider.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    pub node_url: String,
    pub enable_network_log: bool,
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            node_url: "http://127.0.0.1:8888".to_string(),
            enable_network_log: false,
            timeout_secs: 30,
        }
    }
}

/// Settings the transaction processor bakes into every transaction.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TransactionConfig {
    /// Seconds after the head block time at which the transaction expires.
    pub expire_seconds: u32,
    /// How far behind the head block the reference block is taken when
    /// `use_last_irreversible` is off.
    pub blocks_behind: u32,
    /// Reference the last irreversible block instead of `head - blocks_behind`.
    pub use_last_irreversible: bool,
    /// Accept a transaction the signature provider changed while signing.
    pub allow_transaction_modification: bool,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            expire_seconds: 300,
            blocks_behind: 3,
            use_last_irreversible: true,
            allow_transaction_modification: false,
            max_net_usage_words: 0,
            max_cpu_usage_ms: 0,
            delay_sec: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    pub rpc: RpcConfig,
    pub transaction: TransactionConfig,
}

/// Applies command line overrides on top of file and environment settings.
pub trait ApplyArgs {
    fn apply_node(&mut self, args: &NodeArgs);
}

impl ApplyArgs for ClientConfig {
    fn apply_node(&mut self, args: &NodeArgs) {
        if let Some(node_url) = &args.node_url {
            self.rpc.node_url = node_url.clone();
        }
        if args.network_log {
            self.rpc.enable_network_log = true;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.rpc.timeout_secs = timeout_secs;
        }
    }
}
