//! In-process collaborators for unit tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};

use crate::abi::{Abi, AbiProvider, AbiProviderError};
use crate::config::TransactionConfig;
use crate::rpc::{
    CallError, CallFault, Endpoint, GetBlockInfoResponse, GetInfoResponse, GetRawAbiResponse, GetRequiredKeysRequest,
    GetRequiredKeysResponse, RpcProvider, RpcResponseError, SendTransactionRequest, SendTransactionResponse,
    TableRowsResponse,
};
use crate::serialization::{SerializationContext, SerializationError, SerializationProvider};
use crate::signature::{SignatureProvider, SignatureProviderError, SigningRequest, SigningResponse};
use crate::transactions::{Transaction, TransactionProcessor};

pub(crate) const CHAIN_ID: &str = "8a34ec7df1b8cd06ff4a8abbaa7cc50300823350cadc59ab296cb00d104d2b8f";
pub(crate) const PUBLIC_KEY: &str = "PUB_K1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq63";
pub(crate) const SIGNATURE: &str = "SIG_K1_KfPLgpw35iX8nfDzhbcmSBCr7nEGNEYXgmmempQspDJYBCKuAEs5rm3s4ZuLJY428Ca8ZhvR2Dkwu118y3NAoMDxhicRj9";
pub(crate) const TRANSACTION_ID: &str = "2de4cd382c2e231c8a3ac80acfcea493dd2d9e7178b46d165283cf91c2ce6121";

pub(crate) fn node_error() -> RpcResponseError {
    serde_json::from_value(json!({
        "code": 500,
        "message": "Internal Service Error",
        "error": {
            "code": 3040005,
            "name": "expired_tx_exception",
            "what": "Expired Transaction",
            "details": [
                {"message": "expired transaction 2de4cd38", "file": "producer_plugin.cpp", "line_number": 378, "method": "process_incoming_transaction_async"}
            ]
        }
    }))
    .unwrap()
}

fn unavailable(endpoint: Endpoint) -> CallError {
    CallError::unclassified(
        endpoint,
        CallFault::Status {
            status: StatusCode::NOT_IMPLEMENTED,
            body: String::new(),
        },
    )
}

/// How [`FakeRpc::send_transaction`] answers.
pub(crate) enum SendOutcome {
    Success(Value),
    NodeError,
}

pub(crate) struct FakeRpc {
    pub head_block_num: u32,
    pub head_block_time: String,
    pub fail_chain_info: bool,
    pub fail_block_info: bool,
    pub last_irreversible_block_num: u32,
    pub send_outcome: SendOutcome,
    pub block_requests: Mutex<Vec<u32>>,
    pub required_keys_requests: AtomicUsize,
    pub sent: Mutex<Vec<SendTransactionRequest>>,
}

impl FakeRpc {
    pub fn new() -> Self {
        Self {
            head_block_num: 1_000_005,
            head_block_time: "2026-10-16T12:00:00.500".to_string(),
            fail_chain_info: false,
            fail_block_info: false,
            last_irreversible_block_num: 1_000_000,
            send_outcome: SendOutcome::Success(json!({
                "transaction_id": TRANSACTION_ID,
                "processed": {
                    "id": TRANSACTION_ID,
                    "block_num": 1_000_006,
                    "action_traces": [
                        {
                            "action_ordinal": 2,
                            "creator_action_ordinal": 0,
                            "receiver": "eosio.token",
                            "act": {"account": "eosio.token", "name": "issue", "data": {}},
                            "return_value_hex_data": hex::encode(b"{\"issued\":7}")
                        },
                        {
                            "action_ordinal": 1,
                            "creator_action_ordinal": 0,
                            "receiver": "eosio.token",
                            "act": {"account": "eosio.token", "name": "transfer", "data": {}},
                            "return_value_data": 10.0
                        },
                        {
                            "action_ordinal": 3,
                            "creator_action_ordinal": 1,
                            "receiver": "alice",
                            "act": {"account": "eosio.token", "name": "transfer", "data": {}},
                            "return_value_data": "notification"
                        }
                    ]
                }
            })),
            block_requests: Mutex::new(Vec::new()),
            required_keys_requests: AtomicUsize::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_broadcast() -> Self {
        Self {
            send_outcome: SendOutcome::NodeError,
            ..Self::new()
        }
    }

    pub fn failing_chain_info() -> Self {
        Self {
            fail_chain_info: true,
            ..Self::new()
        }
    }

    pub fn failing_block_info() -> Self {
        Self {
            fail_block_info: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl RpcProvider for FakeRpc {
    async fn get_info(&self) -> Result<GetInfoResponse, CallError> {
        if self.fail_chain_info {
            return Err(CallError::backend(Endpoint::GetInfo, node_error()));
        }
        Ok(serde_json::from_value(json!({
            "server_version": "d1bc8d3",
            "chain_id": CHAIN_ID,
            "head_block_num": self.head_block_num,
            "last_irreversible_block_num": self.last_irreversible_block_num,
            "head_block_id": "000f4245",
            "head_block_time": self.head_block_time,
            "head_block_producer": "eosio"
        }))
        .unwrap())
    }

    async fn get_block_info(&self, block_num: u32) -> Result<GetBlockInfoResponse, CallError> {
        self.block_requests.lock().unwrap().push(block_num);
        if self.fail_block_info {
            return Err(CallError::backend(Endpoint::GetBlockInfo, node_error()));
        }
        Ok(serde_json::from_value(json!({
            "block_num": block_num,
            "id": "000f424066a8b5ba",
            "timestamp": "2026-10-16T11:59:58.000",
            "ref_block_prefix": 3_132_434_022u32
        }))
        .unwrap())
    }

    async fn get_raw_abi(&self, _account: &str) -> Result<GetRawAbiResponse, CallError> {
        Err(unavailable(Endpoint::GetRawAbi))
    }

    async fn get_required_keys(&self, request: &GetRequiredKeysRequest) -> Result<GetRequiredKeysResponse, CallError> {
        self.required_keys_requests.fetch_add(1, Ordering::SeqCst);
        Ok(GetRequiredKeysResponse {
            required_keys: request.available_keys.iter().take(1).cloned().collect(),
        })
    }

    async fn send_transaction(&self, request: &SendTransactionRequest) -> Result<SendTransactionResponse, CallError> {
        self.sent.lock().unwrap().push(request.clone());
        match &self.send_outcome {
            SendOutcome::Success(body) => Ok(serde_json::from_value(body.clone()).unwrap()),
            SendOutcome::NodeError => Err(CallError::backend(Endpoint::SendTransaction, node_error())),
        }
    }

    async fn get_table_rows(&self, _request: &Value) -> Result<TableRowsResponse, CallError> {
        Err(unavailable(Endpoint::GetTableRows))
    }
}

pub(crate) struct StaticAbiProvider {
    abis: HashMap<String, Arc<Abi>>,
}

impl StaticAbiProvider {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        let abis = accounts
            .iter()
            .map(|account| (account.to_string(), Arc::new(Abi::new(*account, b"abi".to_vec()))))
            .collect();
        Self { abis }
    }
}

#[async_trait]
impl AbiProvider for StaticAbiProvider {
    async fn get_abi(&self, account: &str) -> Result<Arc<Abi>, AbiProviderError> {
        self.abis
            .get(account)
            .cloned()
            .ok_or_else(|| AbiProviderError::NotFound(account.to_string()))
    }
}

/// Serializer that encodes everything as JSON and counts live contexts.
#[derive(Default)]
pub(crate) struct JsonSerializer {
    pub live_contexts: Arc<AtomicUsize>,
    pub opened_contexts: AtomicUsize,
}

impl JsonSerializer {
    pub fn live(&self) -> usize {
        self.live_contexts.load(Ordering::SeqCst)
    }
}

impl SerializationProvider for JsonSerializer {
    fn open_context(&self) -> Result<Box<dyn SerializationContext>, SerializationError> {
        self.opened_contexts.fetch_add(1, Ordering::SeqCst);
        self.live_contexts.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(JsonContext {
            live: self.live_contexts.clone(),
        }))
    }
}

struct JsonContext {
    live: Arc<AtomicUsize>,
}

impl SerializationContext for JsonContext {
    fn serialize_action_data(
        &mut self,
        _abi: &Abi,
        _account: &str,
        _action_name: &str,
        data: &Value,
    ) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(data).map_err(|e| SerializationError::with_source("action data", e))
    }

    fn serialize_transaction(&mut self, transaction: &Transaction) -> Result<Vec<u8>, SerializationError> {
        serde_json::to_vec(transaction).map_err(|e| SerializationError::with_source("transaction", e))
    }

    fn deserialize_action_return_value(
        &mut self,
        _abi: &Abi,
        _action_name: &str,
        data: &[u8],
    ) -> Result<Value, SerializationError> {
        serde_json::from_slice(data).map_err(|e| SerializationError::with_source("return value", e))
    }
}

impl Drop for JsonContext {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// How [`FakeSigner::sign_transaction`] answers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignerBehavior {
    Sign,
    /// Appends a byte to the transaction before signing it.
    Modify,
    Fail,
    NoSignatures,
}

pub(crate) struct FakeSigner {
    pub behavior: SignerBehavior,
    pub requests: Mutex<Vec<SigningRequest>>,
}

impl FakeSigner {
    pub fn new() -> Self {
        Self::with_behavior(SignerBehavior::Sign)
    }

    pub fn modifying() -> Self {
        Self::with_behavior(SignerBehavior::Modify)
    }

    pub fn with_behavior(behavior: SignerBehavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl SignatureProvider for FakeSigner {
    async fn available_keys(&self) -> Result<Vec<String>, SignatureProviderError> {
        Ok(vec![PUBLIC_KEY.to_string(), "PUB_K1_unused".to_string()])
    }

    async fn sign_transaction(&self, request: SigningRequest) -> Result<SigningResponse, SignatureProviderError> {
        let mut serialized_transaction = request.serialized_transaction.clone();
        self.requests.lock().unwrap().push(request);
        let signatures = match self.behavior {
            SignerBehavior::Sign => vec![SIGNATURE.to_string()],
            SignerBehavior::Modify => {
                serialized_transaction.push(0);
                vec![SIGNATURE.to_string()]
            },
            SignerBehavior::Fail => return Err(SignatureProviderError::new("key is locked")),
            SignerBehavior::NoSignatures => Vec::new(),
        };
        Ok(SigningResponse {
            serialized_transaction,
            signatures,
        })
    }
}

/// Collaborators of one processor, kept so tests can inspect them.
pub(crate) struct Harness {
    pub rpc: Arc<FakeRpc>,
    pub serializer: Arc<JsonSerializer>,
    pub signer: Arc<FakeSigner>,
}

impl Harness {
    pub fn new(rpc: FakeRpc, signer: FakeSigner) -> Self {
        Self {
            rpc: Arc::new(rpc),
            serializer: Arc::new(JsonSerializer::default()),
            signer: Arc::new(signer),
        }
    }

    pub fn processor(&self, config: TransactionConfig) -> TransactionProcessor {
        TransactionProcessor::new(
            self.rpc.clone(),
            Arc::new(StaticAbiProvider::with_accounts(&["eosio.token"])),
            self.serializer.clone(),
            self.signer.clone(),
            config,
        )
    }
}
