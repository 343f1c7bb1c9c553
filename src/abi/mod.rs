//! Contract ABI retrieval with an in-memory cache.
//!
//! ABIs are fetched through [`RpcProvider::get_raw_abi`], decoded from
//! base64, checked against the node-reported hash, and cached per account.
//! Concurrent requests for the same account share one fetch.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::{OnceCell, RwLock};

use crate::rpc::{CallError, RpcProvider};

const ABI_BASE64: GeneralPurpose = GeneralPurpose::new(
    &base64::alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Binary ABI of one contract account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Abi {
    pub account: String,
    pub bytes: Vec<u8>,
    /// Hex encoded sha256 of `bytes`.
    pub hash: String,
}

impl Abi {
    pub fn new(account: impl Into<String>, bytes: Vec<u8>) -> Self {
        let hash = hex::encode(Sha256::digest(&bytes));
        Self {
            account: account.into(),
            bytes,
            hash,
        }
    }
}

#[derive(Debug, Error)]
pub enum AbiProviderError {
    #[error("Error fetching ABI")]
    Rpc(#[from] CallError),

    #[error("No ABI deployed for account {0}")]
    NotFound(String),

    #[error("Invalid base64 ABI for account {account}")]
    Decode {
        account: String,
        #[source]
        source: base64::DecodeError,
    },

    #[error("ABI hash mismatch for account {account}: node reported {expected}, computed {actual}")]
    HashMismatch {
        account: String,
        expected: String,
        actual: String,
    },
}

/// Source of contract ABIs for the transaction processor.
#[async_trait]
pub trait AbiProvider: Send + Sync {
    async fn get_abi(&self, account: &str) -> Result<Arc<Abi>, AbiProviderError>;
}

type AbiSlot = Arc<OnceCell<Arc<Abi>>>;

/// [`AbiProvider`] backed by an [`RpcProvider`], caching every ABI it fetches.
///
/// Failed fetches are not cached.
pub struct CachingAbiProvider {
    rpc: Arc<dyn RpcProvider>,
    cache: RwLock<HashMap<String, AbiSlot>>,
}

impl CachingAbiProvider {
    pub fn new(rpc: Arc<dyn RpcProvider>) -> Self {
        Self {
            rpc,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Drops the cached ABI of `account`, e.g. after a contract upgrade.
    pub async fn invalidate(&self, account: &str) {
        self.cache.write().await.remove(account);
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    async fn slot(&self, account: &str) -> AbiSlot {
        if let Some(slot) = self.cache.read().await.get(account) {
            return slot.clone();
        }
        self.cache
            .write()
            .await
            .entry(account.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Forgets `slot` if it is still the cached, uninitialized slot of `account`.
    async fn release_empty_slot(&self, account: &str, slot: &AbiSlot) {
        let mut cache = self.cache.write().await;
        if cache
            .get(account)
            .is_some_and(|cached| Arc::ptr_eq(cached, slot) && !cached.initialized())
        {
            cache.remove(account);
        }
    }

    async fn fetch(&self, account: &str) -> Result<Arc<Abi>, AbiProviderError> {
        let response = self.rpc.get_raw_abi(account).await?;

        let encoded = response
            .abi
            .as_deref()
            .filter(|abi| !abi.is_empty())
            .ok_or_else(|| AbiProviderError::NotFound(account.to_string()))?;

        let bytes = ABI_BASE64.decode(encoded).map_err(|source| AbiProviderError::Decode {
            account: account.to_string(),
            source,
        })?;

        let abi = Abi::new(account, bytes);
        if !response.abi_hash.eq_ignore_ascii_case(&abi.hash) {
            warn!(account = account, expected = response.abi_hash.as_str(), actual = abi.hash.as_str(); "ABI hash mismatch");
            return Err(AbiProviderError::HashMismatch {
                account: account.to_string(),
                expected: response.abi_hash,
                actual: abi.hash,
            });
        }

        debug!(account = account, size = abi.bytes.len(); "Fetched ABI");
        Ok(Arc::new(abi))
    }
}

#[async_trait]
impl AbiProvider for CachingAbiProvider {
    async fn get_abi(&self, account: &str) -> Result<Arc<Abi>, AbiProviderError> {
        let slot = self.slot(account).await;
        let result = slot.get_or_try_init(|| self.fetch(account)).await.cloned();
        if result.is_err() {
            self.release_empty_slot(account, &slot).await;
        }
        result
    }
}
