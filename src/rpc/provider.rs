//! Node RPC provider.
//!
//! [`RpcProvider`] is the seam the transaction processor and the ABI provider
//! depend on; [`NodeRpcProvider`] implements it over HTTP/JSON against a
//! single node.
//!
//! Every call follows the same classification:
//!
//! 1. A failed exchange becomes a [`CallErrorKind::Transport`](super::CallErrorKind::Transport) error.
//! 2. A 2xx body that parses as the expected success shape is returned.
//! 3. Otherwise a body that parses as the node error shape becomes a
//!    [`CallErrorKind::Backend`](super::CallErrorKind::Backend) error.
//! 4. Anything else becomes a
//!    [`CallErrorKind::Unclassified`](super::CallErrorKind::Unclassified)
//!    error carrying the parse fault or the status and raw body.
//!
//! Nothing is retried here; the error kind tells the caller whether a retry
//! could make sense.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::config::RpcConfig;

use super::endpoint::Endpoint;
use super::error::{CallError, CallFault, InitializerError};
use super::http_client::{DEFAULT_TIMEOUT_SECS, HttpClient, RawResponse};
use super::types::{
    GetAccountResponse, GetBlockInfoResponse, GetInfoResponse, GetRawAbiResponse, GetRequiredKeysRequest,
    GetRequiredKeysResponse, RpcResponseError, SendTransactionRequest, SendTransactionResponse, TableRowsResponse,
};

/// Operations the transaction pipeline needs from a node.
///
/// Implementations must be safe to share between concurrently running
/// transaction processors.
#[async_trait]
pub trait RpcProvider: Send + Sync {
    async fn get_info(&self) -> Result<GetInfoResponse, CallError>;

    async fn get_block_info(&self, block_num: u32) -> Result<GetBlockInfoResponse, CallError>;

    async fn get_raw_abi(&self, account: &str) -> Result<GetRawAbiResponse, CallError>;

    async fn get_required_keys(&self, request: &GetRequiredKeysRequest) -> Result<GetRequiredKeysResponse, CallError>;

    async fn send_transaction(&self, request: &SendTransactionRequest) -> Result<SendTransactionResponse, CallError>;

    /// Queries table rows without interpreting them. Key-value queries
    /// (requests naming an `index_name`) go to the key-value endpoint.
    async fn get_table_rows(&self, request: &Value) -> Result<TableRowsResponse, CallError>;
}

/// HTTP/JSON RPC provider bound to one node.
pub struct NodeRpcProvider {
    http_client: HttpClient,
}

impl NodeRpcProvider {
    /// Creates a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`InitializerError`] when the node URL is invalid or not
    /// http(s), or when the HTTP transport cannot be built.
    pub fn new(config: &RpcConfig) -> Result<Self, InitializerError> {
        let http_client = HttpClient::new(
            &config.node_url,
            Duration::from_secs(config.timeout_secs),
            config.enable_network_log,
        )?;
        info!(
            node_url = config.node_url.as_str(),
            timeout_secs = config.timeout_secs,
            network_log = config.enable_network_log;
            "RPC provider initialized"
        );
        Ok(Self { http_client })
    }

    /// Creates a provider with the default timeout and network logging off.
    ///
    /// # Errors
    ///
    /// See [`NodeRpcProvider::new`].
    pub fn with_url(node_url: &str) -> Result<Self, InitializerError> {
        Self::with_options(node_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS), false)
    }

    /// # Errors
    ///
    /// See [`NodeRpcProvider::new`].
    pub fn with_options(node_url: &str, timeout: Duration, enable_network_log: bool) -> Result<Self, InitializerError> {
        let http_client = HttpClient::new(node_url, timeout, enable_network_log)?;
        Ok(Self { http_client })
    }

    /// Returns the node base URL as a string.
    pub fn get_address(&self) -> String {
        self.http_client.base_url().to_string()
    }

    /// Round trip time of the most recent completed exchange.
    pub async fn last_request_latency(&self) -> Option<Duration> {
        self.http_client.get_latency().await
    }

    /// Submits a transaction through the legacy `push_transaction` endpoint.
    pub async fn push_transaction(
        &self,
        request: &SendTransactionRequest,
    ) -> Result<SendTransactionResponse, CallError> {
        info!(target: "audit", "RPC: Pushing transaction");
        let response: SendTransactionResponse = self.call(Endpoint::PushTransaction, Some(request)).await?;
        info!(target: "audit", transaction_id = response.transaction_id.as_str(); "RPC: Transaction pushed");
        Ok(response)
    }

    /// Queries a key-value table regardless of the request shape.
    pub async fn get_kv_table_rows(&self, request: &Value) -> Result<TableRowsResponse, CallError> {
        self.call(Endpoint::GetKvTableRows, Some(request)).await
    }

    pub async fn get_account(&self, account: &str) -> Result<GetAccountResponse, CallError> {
        self.call(Endpoint::GetAccount, Some(&json!({ "account_name": account })))
            .await
    }

    /// Balances of `account` in the token contract `code`, optionally filtered
    /// by `symbol`.
    pub async fn get_currency_balance(
        &self,
        code: &str,
        account: &str,
        symbol: Option<&str>,
    ) -> Result<Vec<String>, CallError> {
        let mut body = json!({ "code": code, "account": account });
        if let Some(symbol) = symbol {
            body["symbol"] = Value::String(symbol.to_string());
        }
        self.call(Endpoint::GetCurrencyBalance, Some(&body)).await
    }

    async fn call<B, T>(&self, endpoint: Endpoint, body: Option<&B>) -> Result<T, CallError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| CallError::transport(endpoint, CallFault::Encode(e)))?;

        debug!(endpoint = endpoint.path(); "RPC: Calling node");
        let raw = match self.http_client.post(endpoint.path(), body.as_ref()).await {
            Ok(raw) => raw,
            Err(fault) => {
                warn!(endpoint = endpoint.path(), error:% = fault; "RPC: Transport failure");
                return Err(CallError::transport(endpoint, fault));
            },
        };

        classify(endpoint, raw)
    }
}

/// Turns a completed exchange into the success value or a classified error.
pub(crate) fn classify<T: DeserializeOwned>(endpoint: Endpoint, raw: RawResponse) -> Result<T, CallError> {
    let success_fault = if raw.status.is_success() {
        match serde_json::from_str::<T>(&raw.body) {
            Ok(value) => return Ok(value),
            Err(e) => Some(e),
        }
    } else {
        None
    };

    if let Ok(rpc_response_error) = serde_json::from_str::<RpcResponseError>(&raw.body) {
        warn!(
            endpoint = endpoint.path(),
            status = raw.status.as_u16(),
            code = rpc_response_error.error.code,
            name = rpc_response_error.error.name.as_str();
            "RPC: Node reported an error"
        );
        return Err(CallError::backend(endpoint, rpc_response_error));
    }

    let fault = match success_fault {
        Some(e) => CallFault::Body(e),
        None => CallFault::Status {
            status: raw.status,
            body: raw.body,
        },
    };
    warn!(endpoint = endpoint.path(), error:% = fault; "RPC: Unrecognized response");
    Err(CallError::unclassified(endpoint, fault))
}

#[async_trait]
impl RpcProvider for NodeRpcProvider {
    async fn get_info(&self) -> Result<GetInfoResponse, CallError> {
        self.call::<Value, _>(Endpoint::GetInfo, None).await
    }

    async fn get_block_info(&self, block_num: u32) -> Result<GetBlockInfoResponse, CallError> {
        self.call(Endpoint::GetBlockInfo, Some(&json!({ "block_num": block_num })))
            .await
    }

    async fn get_raw_abi(&self, account: &str) -> Result<GetRawAbiResponse, CallError> {
        self.call(Endpoint::GetRawAbi, Some(&json!({ "account_name": account })))
            .await
    }

    async fn get_required_keys(&self, request: &GetRequiredKeysRequest) -> Result<GetRequiredKeysResponse, CallError> {
        self.call(Endpoint::GetRequiredKeys, Some(request)).await
    }

    async fn send_transaction(&self, request: &SendTransactionRequest) -> Result<SendTransactionResponse, CallError> {
        info!(target: "audit", "RPC: Sending transaction");
        let response: SendTransactionResponse = self.call(Endpoint::SendTransaction, Some(request)).await?;
        info!(target: "audit", transaction_id = response.transaction_id.as_str(); "RPC: Transaction sent");
        Ok(response)
    }

    async fn get_table_rows(&self, request: &Value) -> Result<TableRowsResponse, CallError> {
        self.call(Endpoint::for_table_query(request), Some(request)).await
    }
}
