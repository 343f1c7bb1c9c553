use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Permission an action is authorized with, e.g. `bob@active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    pub actor: String,
    pub permission: String,
}

impl Authorization {
    pub fn new(actor: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            actor: actor.into(),
            permission: permission.into(),
        }
    }
}

/// Payload of an action: JSON that still needs the contract ABI, or bytes
/// that were serialized by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionData {
    Json(Value),
    Serialized(Vec<u8>),
}

/// A contract call. Fields cannot change after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    account: String,
    name: String,
    authorization: Vec<Authorization>,
    data: ActionData,
}

impl Action {
    pub fn new(
        account: impl Into<String>,
        name: impl Into<String>,
        authorization: Vec<Authorization>,
        data: Value,
    ) -> Self {
        Self {
            account: account.into(),
            name: name.into(),
            authorization,
            data: ActionData::Json(data),
        }
    }

    pub fn with_serialized_data(
        account: impl Into<String>,
        name: impl Into<String>,
        authorization: Vec<Authorization>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            account: account.into(),
            name: name.into(),
            authorization,
            data: ActionData::Serialized(data),
        }
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn authorization(&self) -> &[Authorization] {
        &self.authorization
    }

    pub fn data(&self) -> &ActionData {
        &self.data
    }
}
