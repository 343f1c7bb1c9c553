//! Binary serialization seam.
//!
//! The processor never encodes Antelope binary formats itself. It opens a
//! [`SerializationContext`] at the start of `prepare` and keeps it alive in
//! its stage data; dropping the context is the release, so a context is torn
//! down on success, failure, `reset`, drop, or a cancelled future alike.

use std::error::Error as StdError;

use serde_json::Value;
use thiserror::Error;

use crate::abi::Abi;
use crate::transactions::Transaction;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
#[error("{message}")]
pub struct SerializationError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl SerializationError {
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

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Factory of serialization contexts.
pub trait SerializationProvider: Send + Sync {
    fn open_context(&self) -> Result<Box<dyn SerializationContext>, SerializationError>;
}

/// A live serializer session. Released when dropped.
pub trait SerializationContext: Send {
    /// Encodes a JSON action payload using the contract ABI.
    fn serialize_action_data(
        &mut self,
        abi: &Abi,
        account: &str,
        action_name: &str,
        data: &Value,
    ) -> Result<Vec<u8>, SerializationError>;

    fn serialize_transaction(&mut self, transaction: &Transaction) -> Result<Vec<u8>, SerializationError>;

    /// Decodes an action return value into JSON using the contract ABI.
    fn deserialize_action_return_value(
        &mut self,
        abi: &Abi,
        action_name: &str,
        data: &[u8],
    ) -> Result<Value, SerializationError>;
}
