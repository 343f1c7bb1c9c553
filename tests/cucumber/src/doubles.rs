// In-process serialization and signature providers.
//
// The serializer encodes JSON as bytes, which is enough for a mock node that
// never decodes what it receives.

use async_trait::async_trait;
use serde_json::Value;

use antelope_rpc::abi::Abi;
use antelope_rpc::serialization::{SerializationContext, SerializationError, SerializationProvider};
use antelope_rpc::signature::{SignatureProvider, SignatureProviderError, SigningRequest, SigningResponse};
use antelope_rpc::transactions::Transaction;

pub const PUBLIC_KEY: &str = "PUB_K1_6MRyAjQq8ud7hVNYcfnVPJqcVpscN5So8BhtHuGYqET5BoDq63";
pub const SIGNATURE: &str = "SIG_K1_KfPLgpw35iX8nfDzhbcmSBCr7nEGNEYXgmmempQspDJYBCKuAEs5rm3s4ZuLJY428Ca8ZhvR2Dkwu118y3NAoMDxhicRj9";

pub struct JsonSerializer;

impl SerializationProvider for JsonSerializer {
    fn open_context(&self) -> Result<Box<dyn SerializationContext>, SerializationError> {
        Ok(Box::new(JsonContext))
    }
}

struct JsonContext;

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

/// Signs every request with one fixed signature.
pub struct StaticSigner;

#[async_trait]
impl SignatureProvider for StaticSigner {
    async fn available_keys(&self) -> Result<Vec<String>, SignatureProviderError> {
        Ok(vec![PUBLIC_KEY.to_string()])
    }

    async fn sign_transaction(&self, request: SigningRequest) -> Result<SigningResponse, SignatureProviderError> {
        if !request.signing_public_keys.iter().any(|key| key == PUBLIC_KEY) {
            return Err(SignatureProviderError::new("required key is not available"));
        }
        Ok(SigningResponse {
            serialized_transaction: request.serialized_transaction,
            signatures: vec![SIGNATURE.to_string()],
        })
    }
}
