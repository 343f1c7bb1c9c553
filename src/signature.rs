//! Signature provider seam. Key material never passes through this crate.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::abi::Abi;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct SignatureProviderError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl SignatureProviderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Everything a signer needs to produce signatures for one transaction.
#[derive(Debug, Clone)]
pub struct SigningRequest {
    pub chain_id: Vec<u8>,
    pub serialized_transaction: Vec<u8>,
    /// `sha256(chain_id || serialized_transaction || 32 zero bytes)`.
    pub digest: [u8; 32],
    pub signing_public_keys: Vec<String>,
    pub abis: Vec<Arc<Abi>>,
    /// Whether the signer may return a different serialized transaction.
    pub is_modifiable: bool,
}

#[derive(Debug, Clone)]
pub struct SigningResponse {
    /// The transaction as signed. Must equal the request's bytes unless
    /// modification was allowed.
    pub serialized_transaction: Vec<u8>,
    pub signatures: Vec<String>,
}

#[async_trait]
pub trait SignatureProvider: Send + Sync {
    /// Public keys this provider can sign with.
    async fn available_keys(&self) -> Result<Vec<String>, SignatureProviderError>;

    async fn sign_transaction(&self, request: SigningRequest) -> Result<SigningResponse, SignatureProviderError>;
}
