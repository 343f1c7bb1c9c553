use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::rpc::SendTransactionRequest;

use super::action::Authorization;

/// An action as it appears inside a transaction, with hex encoded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedAction {
    pub account: String,
    pub name: String,
    pub authorization: Vec<Authorization>,
    pub data: String,
}

/// Transaction header and actions in the node's JSON form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// UTC time without zone suffix, e.g. `2026-10-16T12:05:00.000`.
    pub expiration: String,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
    #[serde(default)]
    pub context_free_actions: Vec<PackedAction>,
    pub actions: Vec<PackedAction>,
    #[serde(default)]
    pub transaction_extensions: Vec<Value>,
}

/// A serialized transaction together with its signatures, ready to send.
///
/// `serialized` is what gets broadcast. When the signer was allowed to modify
/// the transaction, `transaction` is still the form built by `prepare`.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub serialized: Vec<u8>,
    pub signatures: Vec<String>,
}

impl SignedTransaction {
    /// Wire body of `send_transaction`. Compression is never applied.
    pub fn to_send_request(&self) -> SendTransactionRequest {
        SendTransactionRequest {
            signatures: self.signatures.clone(),
            compression: 0,
            packed_context_free_data: String::new(),
            packed_trx: hex::encode(&self.serialized),
        }
    }
}

/// Digest a signer signs: `sha256(chain_id || serialized_trx || 32 zero bytes)`,
/// the trailing zeros standing in for the absent context free data hash.
pub fn signing_digest(chain_id: &[u8], serialized_transaction: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(chain_id);
    hasher.update(serialized_transaction);
    hasher.update([0u8; 32]);
    hasher.finalize().into()
}
