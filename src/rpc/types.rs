use std::fmt::{self, Display};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::transactions::Transaction;

/// Structured failure reported by the node inside a well-formed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcResponseError {
    pub code: i64,
    pub message: String,
    pub error: RpcError,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub name: String,
    pub what: String,
    #[serde(default)]
    pub details: Vec<ErrorDetail>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub line_number: i64,
    #[serde(default)]
    pub method: String,
}

impl Display for RpcResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (code {}) - Code: {} - Name: {} - What: {}",
            self.message, self.code, self.error.code, self.error.name, self.error.what
        )?;
        if !self.error.details.is_empty() {
            f.write_str(" - Details:")?;
            for detail in &self.error.details {
                write!(f, " {} -", detail.message)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetInfoResponse {
    pub server_version: String,
    pub chain_id: String,
    pub head_block_num: u32,
    pub last_irreversible_block_num: u32,
    #[serde(default)]
    pub last_irreversible_block_id: Option<String>,
    pub head_block_id: String,
    pub head_block_time: String,
    #[serde(default)]
    pub head_block_producer: Option<String>,
    #[serde(default)]
    pub virtual_block_cpu_limit: Option<u64>,
    #[serde(default)]
    pub virtual_block_net_limit: Option<u64>,
    #[serde(default)]
    pub block_cpu_limit: Option<u64>,
    #[serde(default)]
    pub block_net_limit: Option<u64>,
    #[serde(default)]
    pub server_version_string: Option<String>,
    #[serde(default)]
    pub fork_db_head_block_num: Option<u32>,
    #[serde(default)]
    pub fork_db_head_block_id: Option<String>,
    #[serde(default)]
    pub server_full_version_string: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetBlockInfoResponse {
    pub block_num: u32,
    #[serde(default)]
    pub ref_block_num: u16,
    pub id: String,
    pub timestamp: String,
    #[serde(default)]
    pub producer: String,
    #[serde(default)]
    pub confirmed: u32,
    #[serde(default)]
    pub previous: String,
    #[serde(default)]
    pub transaction_mroot: String,
    #[serde(default)]
    pub action_mroot: String,
    #[serde(default)]
    pub schedule_version: u32,
    #[serde(default)]
    pub producer_signature: String,
    pub ref_block_prefix: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRawAbiResponse {
    pub account_name: String,
    #[serde(default)]
    pub code_hash: String,
    pub abi_hash: String,
    /// Base64 encoded binary ABI, absent when no contract is deployed.
    #[serde(default)]
    pub abi: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequiredKeysRequest {
    pub transaction: Transaction,
    pub available_keys: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetRequiredKeysResponse {
    pub required_keys: Vec<String>,
}

/// Body of `send_transaction` and `push_transaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendTransactionRequest {
    pub signatures: Vec<String>,
    pub compression: u8,
    pub packed_context_free_data: String,
    pub packed_trx: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendTransactionResponse {
    pub transaction_id: String,
    #[serde(default)]
    pub processed: Processed,
    /// Decoded return values of the top level actions, in action order.
    #[serde(skip)]
    pub(crate) action_values: Vec<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Processed {
    pub id: String,
    pub block_num: u32,
    pub block_time: String,
    pub receipt: Option<Value>,
    pub elapsed: i64,
    pub net_usage: u64,
    pub scheduled: bool,
    pub action_traces: Vec<ActionTrace>,
    pub account_ram_delta: Option<Value>,
    pub except: Option<Value>,
    pub error_code: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTrace {
    pub action_ordinal: u32,
    pub creator_action_ordinal: u32,
    pub receipt: Option<Value>,
    pub receiver: String,
    pub act: ActionTraceAct,
    pub elapsed: i64,
    pub console: String,
    pub return_value_hex_data: Option<String>,
    pub return_value_data: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionTraceAct {
    pub account: String,
    pub name: String,
    pub data: Option<Value>,
    pub hex_data: Option<String>,
}

/// Failure to read an action return value from a broadcast response.
#[derive(Debug, thiserror::Error)]
pub enum ActionValueError {
    #[error("No action value at index {index}: the transaction processed {len} actions")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Action value at index {index} cannot be read as {target}: {source}")]
    TypeMismatch {
        index: usize,
        target: &'static str,
        source: serde_json::Error,
    },
}

impl SendTransactionResponse {
    pub fn transaction_id(&self) -> &str {
        &self.transaction_id
    }

    /// Number of decoded action values, one per top level action.
    pub fn action_value_count(&self) -> usize {
        self.action_values.len()
    }

    /// Reads the return value of the action at `index` as `T`.
    ///
    /// Actions that returned nothing hold `null`, so `Option<T>` reads them
    /// as `None`.
    ///
    /// # Errors
    ///
    /// [`ActionValueError::IndexOutOfRange`] when `index` is past the last
    /// processed action, [`ActionValueError::TypeMismatch`] when the value
    /// does not deserialize into `T`.
    pub fn get_action_value_at_index<T: DeserializeOwned>(&self, index: usize) -> Result<T, ActionValueError> {
        let value = self.action_values.get(index).ok_or(ActionValueError::IndexOutOfRange {
            index,
            len: self.action_values.len(),
        })?;
        T::deserialize(value).map_err(|source| ActionValueError::TypeMismatch {
            index,
            target: std::any::type_name::<T>(),
            source,
        })
    }

    /// Top level action traces ordered by action ordinal.
    pub fn top_level_traces(&self) -> Vec<&ActionTrace> {
        let mut traces: Vec<&ActionTrace> = self
            .processed
            .action_traces
            .iter()
            .filter(|trace| trace.creator_action_ordinal == 0)
            .collect();
        traces.sort_by_key(|trace| trace.action_ordinal);
        traces
    }
}

/// Rows of a legacy or key-value table query, left undecoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableRowsResponse {
    pub rows: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TableRowsResponse {
    pub fn more(&self) -> bool {
        self.extra.get("more").and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn next_key(&self) -> Option<&str> {
        self.extra.get("next_key").and_then(Value::as_str)
    }

    pub fn into_json(self) -> Value {
        let mut object = self.extra;
        object.insert("rows".to_string(), Value::Array(self.rows));
        Value::Object(object)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetAccountResponse {
    pub account_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
