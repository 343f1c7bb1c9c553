use std::sync::Arc;

use crate::abi::{AbiProvider, CachingAbiProvider};
use crate::config::{ClientConfig, TransactionConfig};
use crate::rpc::{InitializerError, NodeRpcProvider, RpcProvider};
use crate::serialization::SerializationProvider;
use crate::signature::SignatureProvider;

use super::processor::TransactionProcessor;

/// Shared collaborators from which transaction processors are created.
///
/// A session is cheap to clone; every processor it hands out shares the same
/// node connection, ABI cache, serializer and signer.
#[derive(Clone)]
pub struct TransactionSession {
    rpc: Arc<dyn RpcProvider>,
    abi_provider: Arc<dyn AbiProvider>,
    serialization_provider: Arc<dyn SerializationProvider>,
    signature_provider: Arc<dyn SignatureProvider>,
    config: TransactionConfig,
}

impl TransactionSession {
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
        }
    }

    /// Connects to the configured node with a fresh ABI cache.
    pub fn from_config(
        config: &ClientConfig,
        serialization_provider: Arc<dyn SerializationProvider>,
        signature_provider: Arc<dyn SignatureProvider>,
    ) -> Result<Self, InitializerError> {
        let rpc: Arc<dyn RpcProvider> = Arc::new(NodeRpcProvider::new(&config.rpc)?);
        let abi_provider = Arc::new(CachingAbiProvider::new(rpc.clone()));
        Ok(Self::new(
            rpc,
            abi_provider,
            serialization_provider,
            signature_provider,
            config.transaction.clone(),
        ))
    }

    pub fn rpc(&self) -> &Arc<dyn RpcProvider> {
        &self.rpc
    }

    pub fn transaction_processor(&self) -> TransactionProcessor {
        TransactionProcessor::new(
            self.rpc.clone(),
            self.abi_provider.clone(),
            self.serialization_provider.clone(),
            self.signature_provider.clone(),
            self.config.clone(),
        )
    }
}
