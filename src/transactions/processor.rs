//! Single-use transaction state machine.
//!
//! ```text
//! Created --prepare--> Prepared --sign--> Signed --broadcast--> Broadcast
//!    \                    \                  \
//!     `-------------------`------------------`--> Failed
//! ```
//!
//! A step that fails moves the processor to `Failed`. Calling a step in the
//! wrong state, or preparing an empty action list, is rejected and leaves the
//! state untouched. `reset` returns any state to `Created`.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::{Duration as ChronoDuration, NaiveDateTime};
use log::{debug, info, warn};
use serde_json::Value;

use crate::abi::{Abi, AbiProvider};
use crate::config::TransactionConfig;
use crate::rpc::{GetInfoResponse, GetRequiredKeysRequest, RpcProvider, SendTransactionResponse};
use crate::serialization::{SerializationContext, SerializationProvider};
use crate::signature::{SignatureProvider, SigningRequest};

use super::action::{Action, ActionData};
use super::error::{TransactionPrepareError, TransactionSignAndBroadcastError};
use super::transaction::{PackedAction, SignedTransaction, Transaction, signing_digest};

const NODE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const EXPIRATION_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Created,
    Prepared,
    Signed,
    Broadcast,
    Failed,
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProcessorState::Created => "created",
            ProcessorState::Prepared => "prepared",
            ProcessorState::Signed => "signed",
            ProcessorState::Broadcast => "broadcast",
            ProcessorState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Output of `prepare` that later stages read but never change.
#[derive(Debug)]
struct PreparedTransaction {
    chain_id: String,
    transaction: Transaction,
    serialized: Vec<u8>,
    abis: BTreeMap<String, Arc<Abi>>,
}

enum Stage {
    Created,
    Prepared {
        prepared: Box<PreparedTransaction>,
        context: Box<dyn SerializationContext>,
    },
    Signed {
        prepared: Box<PreparedTransaction>,
        signed: SignedTransaction,
        context: Box<dyn SerializationContext>,
    },
    Broadcast {
        prepared: Box<PreparedTransaction>,
        signed: SignedTransaction,
        transaction_id: String,
    },
    Failed,
}

impl Stage {
    fn state(&self) -> ProcessorState {
        match self {
            Stage::Created => ProcessorState::Created,
            Stage::Prepared { .. } => ProcessorState::Prepared,
            Stage::Signed { .. } => ProcessorState::Signed,
            Stage::Broadcast { .. } => ProcessorState::Broadcast,
            Stage::Failed => ProcessorState::Failed,
        }
    }

    fn prepared(&self) -> Option<&PreparedTransaction> {
        match self {
            Stage::Prepared { prepared, .. } | Stage::Signed { prepared, .. } | Stage::Broadcast { prepared, .. } => {
                Some(&**prepared)
            },
            Stage::Created | Stage::Failed => None,
        }
    }

    fn signed(&self) -> Option<&SignedTransaction> {
        match self {
            Stage::Signed { signed, .. } | Stage::Broadcast { signed, .. } => Some(signed),
            _ => None,
        }
    }
}

/// Drives one transaction from a list of actions to a broadcast receipt.
///
/// Collaborators are shared trait objects, so any number of processors may
/// run concurrently against the same node, ABI cache and signer. The
/// serialization context opened by `prepare` lives in the processor until the
/// transaction is broadcast, fails, is reset, or the processor is dropped.
pub struct TransactionProcessor {
    rpc: Arc<dyn RpcProvider>,
    abi_provider: Arc<dyn AbiProvider>,
    serialization_provider: Arc<dyn SerializationProvider>,
    signature_provider: Arc<dyn SignatureProvider>,
    config: TransactionConfig,
    required_keys: Option<Vec<String>>,
    stage: Stage,
}

impl TransactionProcessor {
    pub fn new(
        rpc: Arc<dyn RpcProvider>,
        abi_provider: Arc<dyn AbiProvider>,
        serialization_provider: Arc<dyn SerializationProvider>,
        signature_provider: Arc<dyn SignatureProvider>,
        config: TransactionConfig,
    ) -> Self {
        Self {
            rpc,
            abi_provider,
            serialization_provider,
            signature_provider,
            config,
            required_keys: None,
            stage: Stage::Created,
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.stage.state()
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }

    /// The prepared transaction, once `prepare` succeeded.
    ///
    /// Signing never changes it. If the signer modified the transaction,
    /// [`Self::serialized_transaction`] holds what is actually broadcast.
    pub fn transaction(&self) -> Option<&Transaction> {
        self.stage.prepared().map(|p| &p.transaction)
    }

    /// Bytes that are signed and broadcast. After signing these are the
    /// bytes returned by the signature provider.
    pub fn serialized_transaction(&self) -> Option<&[u8]> {
        match self.stage.signed() {
            Some(signed) => Some(signed.serialized.as_slice()),
            None => self.stage.prepared().map(|p| p.serialized.as_slice()),
        }
    }

    pub fn chain_id(&self) -> Option<&str> {
        self.stage.prepared().map(|p| p.chain_id.as_str())
    }

    pub fn signatures(&self) -> Option<&[String]> {
        self.stage.signed().map(|s| s.signatures.as_slice())
    }

    pub fn transaction_id(&self) -> Option<&str> {
        match &self.stage {
            Stage::Broadcast { transaction_id, .. } => Some(transaction_id.as_str()),
            _ => None,
        }
    }

    /// Skips the `get_required_keys` round trip on the next `sign`.
    pub fn set_required_keys(&mut self, keys: Vec<String>) {
        self.required_keys = Some(keys);
    }

    /// Returns to `Created`, releasing any serialization context.
    pub fn reset(&mut self) {
        debug!(state:% = self.state(); "Transaction processor reset");
        self.stage = Stage::Created;
        self.required_keys = None;
    }

    /// Builds and serializes a transaction from `actions`.
    pub async fn prepare(&mut self, actions: Vec<Action>) -> Result<(), TransactionPrepareError> {
        let state = self.state();
        if state != ProcessorState::Created {
            return Err(TransactionPrepareError::InvalidState(state));
        }
        if actions.is_empty() {
            return Err(TransactionPrepareError::EmptyActions);
        }

        // Stays failed if this future is dropped before completion.
        self.stage = Stage::Failed;

        match self.build(&actions).await {
            Ok((prepared, context)) => {
                info!(
                    target: "audit",
                    actions = prepared.transaction.actions.len(),
                    ref_block_num = prepared.transaction.ref_block_num,
                    expiration = prepared.transaction.expiration.as_str();
                    "Transaction prepared"
                );
                self.stage = Stage::Prepared {
                    prepared: Box::new(prepared),
                    context,
                };
                Ok(())
            },
            Err(e) => {
                warn!(error:% = e; "Transaction preparation failed");
                Err(e)
            },
        }
    }

    /// Collects signatures for the prepared transaction.
    pub async fn sign(&mut self) -> Result<(), TransactionSignAndBroadcastError> {
        let (prepared, context) = match std::mem::replace(&mut self.stage, Stage::Failed) {
            Stage::Prepared { prepared, context } => (prepared, context),
            other => {
                let state = other.state();
                self.stage = other;
                return Err(TransactionSignAndBroadcastError::InvalidState {
                    operation: "sign",
                    state,
                });
            },
        };

        match self.collect_signatures(&prepared).await {
            Ok(signed) => {
                info!(target: "audit", signatures = signed.signatures.len(); "Transaction signed");
                self.stage = Stage::Signed {
                    prepared,
                    signed,
                    context,
                };
                Ok(())
            },
            Err(e) => {
                warn!(error:% = e; "Transaction signing failed");
                Err(e)
            },
        }
    }

    /// Submits the signed transaction and decodes the action return values.
    pub async fn broadcast(&mut self) -> Result<SendTransactionResponse, TransactionSignAndBroadcastError> {
        let (prepared, signed, mut context) = match std::mem::replace(&mut self.stage, Stage::Failed) {
            Stage::Signed {
                prepared,
                signed,
                context,
            } => (prepared, signed, context),
            other => {
                let state = other.state();
                self.stage = other;
                return Err(TransactionSignAndBroadcastError::InvalidState {
                    operation: "broadcast",
                    state,
                });
            },
        };

        let request = signed.to_send_request();
        let mut response = match self.rpc.send_transaction(&request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error:% = e, kind:% = e.kind(); "Transaction broadcast failed");
                return Err(TransactionSignAndBroadcastError::Broadcast(e));
            },
        };

        response.action_values = decode_action_values(&response, &prepared.abis, context.as_mut());
        drop(context);

        info!(
            target: "audit",
            transaction_id = response.transaction_id.as_str(),
            block_num = response.processed.block_num;
            "Transaction broadcast"
        );
        self.stage = Stage::Broadcast {
            prepared,
            signed,
            transaction_id: response.transaction_id.clone(),
        };
        Ok(response)
    }

    pub async fn sign_and_broadcast(&mut self) -> Result<SendTransactionResponse, TransactionSignAndBroadcastError> {
        self.sign().await?;
        self.broadcast().await
    }

    async fn build(
        &mut self,
        actions: &[Action],
    ) -> Result<(PreparedTransaction, Box<dyn SerializationContext>), TransactionPrepareError> {
        let mut context = self
            .serialization_provider
            .open_context()
            .map_err(TransactionPrepareError::SerializationContext)?;

        let info = self.rpc.get_info().await.map_err(TransactionPrepareError::ChainInfo)?;
        let block_num = self.reference_block_num(&info);
        let block = self
            .rpc
            .get_block_info(block_num)
            .await
            .map_err(|source| TransactionPrepareError::ReferenceBlock { block_num, source })?;
        let expiration = expiration_after(&info.head_block_time, self.config.expire_seconds)?;

        let mut abis: BTreeMap<String, Arc<Abi>> = BTreeMap::new();
        let mut packed = Vec::with_capacity(actions.len());
        for action in actions {
            let abi = match abis.get(action.account()) {
                Some(abi) => abi.clone(),
                None => {
                    let abi = self.abi_provider.get_abi(action.account()).await?;
                    abis.insert(action.account().to_string(), abi.clone());
                    abi
                },
            };

            let data = match action.data() {
                ActionData::Json(json) => context
                    .serialize_action_data(&abi, action.account(), action.name(), json)
                    .map_err(|source| TransactionPrepareError::ActionSerialization {
                        account: action.account().to_string(),
                        name: action.name().to_string(),
                        source,
                    })?,
                ActionData::Serialized(bytes) => bytes.clone(),
            };

            packed.push(PackedAction {
                account: action.account().to_string(),
                name: action.name().to_string(),
                authorization: action.authorization().to_vec(),
                data: hex::encode(data),
            });
        }

        let transaction = Transaction {
            expiration,
            ref_block_num: (block.block_num & 0xffff) as u16,
            ref_block_prefix: block.ref_block_prefix,
            max_net_usage_words: self.config.max_net_usage_words,
            max_cpu_usage_ms: self.config.max_cpu_usage_ms,
            delay_sec: self.config.delay_sec,
            context_free_actions: Vec::new(),
            actions: packed,
            transaction_extensions: Vec::new(),
        };

        let serialized = context
            .serialize_transaction(&transaction)
            .map_err(TransactionPrepareError::TransactionSerialization)?;

        let prepared = PreparedTransaction {
            chain_id: info.chain_id,
            transaction,
            serialized,
            abis,
        };
        Ok((prepared, context))
    }

    fn reference_block_num(&self, info: &GetInfoResponse) -> u32 {
        if self.config.use_last_irreversible {
            info.last_irreversible_block_num
        } else {
            info.head_block_num.saturating_sub(self.config.blocks_behind)
        }
    }

    async fn collect_signatures(
        &mut self,
        prepared: &PreparedTransaction,
    ) -> Result<SignedTransaction, TransactionSignAndBroadcastError> {
        let chain_id = hex::decode(&prepared.chain_id).map_err(TransactionSignAndBroadcastError::InvalidChainId)?;

        let signing_public_keys = match self.required_keys.clone() {
            Some(keys) => keys,
            None => {
                let available_keys = self
                    .signature_provider
                    .available_keys()
                    .await
                    .map_err(TransactionSignAndBroadcastError::AvailableKeys)?;
                let request = GetRequiredKeysRequest {
                    transaction: prepared.transaction.clone(),
                    available_keys,
                };
                self.rpc
                    .get_required_keys(&request)
                    .await
                    .map_err(TransactionSignAndBroadcastError::RequiredKeys)?
                    .required_keys
            },
        };

        let request = SigningRequest {
            digest: signing_digest(&chain_id, &prepared.serialized),
            chain_id,
            serialized_transaction: prepared.serialized.clone(),
            signing_public_keys,
            abis: prepared.abis.values().cloned().collect(),
            is_modifiable: self.config.allow_transaction_modification,
        };

        let response = self
            .signature_provider
            .sign_transaction(request)
            .await
            .map_err(TransactionSignAndBroadcastError::Signing)?;

        if response.signatures.is_empty() {
            return Err(TransactionSignAndBroadcastError::NoSignatures);
        }
        if response.serialized_transaction != prepared.serialized && !self.config.allow_transaction_modification {
            return Err(TransactionSignAndBroadcastError::TransactionModified);
        }

        Ok(SignedTransaction {
            transaction: prepared.transaction.clone(),
            serialized: response.serialized_transaction,
            signatures: response.signatures,
        })
    }
}

fn expiration_after(head_block_time: &str, expire_seconds: u32) -> Result<String, TransactionPrepareError> {
    let head = NaiveDateTime::parse_from_str(head_block_time.trim_end_matches('Z'), NODE_TIME_FORMAT)
        .map_err(|e| TransactionPrepareError::InvalidChainMetadata(format!("head_block_time {head_block_time}: {e}")))?;
    let expiration = head
        .checked_add_signed(ChronoDuration::seconds(i64::from(expire_seconds)))
        .ok_or_else(|| {
            TransactionPrepareError::InvalidChainMetadata(format!("head_block_time {head_block_time} is out of range"))
        })?;
    Ok(expiration.format(EXPIRATION_FORMAT).to_string())
}

/// Return values of the top level actions. A value the node already decoded
/// is used as is; otherwise the hex value is decoded with the contract ABI.
/// The transaction is already on chain, so an undecodable value becomes null.
fn decode_action_values(
    response: &SendTransactionResponse,
    abis: &BTreeMap<String, Arc<Abi>>,
    context: &mut dyn SerializationContext,
) -> Vec<Value> {
    response
        .top_level_traces()
        .into_iter()
        .map(|trace| {
            if let Some(value) = trace.return_value_data.as_ref().filter(|v| !v.is_null()) {
                return value.clone();
            }
            let Some(encoded) = trace.return_value_hex_data.as_deref().filter(|h| !h.is_empty()) else {
                return Value::Null;
            };
            let Some(abi) = abis.get(&trace.act.account) else {
                warn!(account = trace.act.account.as_str(); "No ABI for action return value");
                return Value::Null;
            };
            let decoded = hex::decode(encoded)
                .map_err(|e| e.to_string())
                .and_then(|bytes| {
                    context
                        .deserialize_action_return_value(abi, &trace.act.name, &bytes)
                        .map_err(|e| e.to_string())
                });
            match decoded {
                Ok(value) => value,
                Err(e) => {
                    warn!(action = trace.act.name.as_str(), error = e.as_str(); "Failed to decode action return value");
                    Value::Null
                },
            }
        })
        .collect()
}
