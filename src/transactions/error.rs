use thiserror::Error;

use crate::abi::AbiProviderError;
use crate::rpc::CallError;
use crate::serialization::SerializationError;
use crate::signature::SignatureProviderError;

use super::processor::ProcessorState;

/// Failure while preparing a transaction.
#[derive(Debug, Error)]
pub enum TransactionPrepareError {
    #[error("Cannot prepare a transaction in state {0}")]
    InvalidState(ProcessorState),

    #[error("A transaction needs at least one action")]
    EmptyActions,

    #[error("Failed to open a serialization context")]
    SerializationContext(#[source] SerializationError),

    #[error("Failed to fetch chain info")]
    ChainInfo(#[source] CallError),

    #[error("Failed to fetch reference block {block_num}")]
    ReferenceBlock {
        block_num: u32,
        #[source]
        source: CallError,
    },

    #[error("Node returned unusable chain metadata: {0}")]
    InvalidChainMetadata(String),

    #[error("Failed to resolve contract ABI")]
    Abi(#[from] AbiProviderError),

    #[error("Failed to serialize action {account}::{name}")]
    ActionSerialization {
        account: String,
        name: String,
        #[source]
        source: SerializationError,
    },

    #[error("Failed to serialize transaction")]
    TransactionSerialization(#[source] SerializationError),
}

/// Failure while signing or broadcasting a prepared transaction.
#[derive(Debug, Error)]
pub enum TransactionSignAndBroadcastError {
    #[error("Cannot {operation} a transaction in state {state}")]
    InvalidState {
        operation: &'static str,
        state: ProcessorState,
    },

    #[error("Failed to list available keys")]
    AvailableKeys(#[source] SignatureProviderError),

    #[error("Failed to resolve required keys")]
    RequiredKeys(#[source] CallError),

    #[error("Chain id is not valid hex")]
    InvalidChainId(#[source] hex::FromHexError),

    #[error("Failed to sign transaction")]
    Signing(#[source] SignatureProviderError),

    #[error("Signature provider modified the transaction")]
    TransactionModified,

    #[error("Signature provider returned no signatures")]
    NoSignatures,

    #[error("Failed to broadcast transaction")]
    Broadcast(#[source] CallError),
}
