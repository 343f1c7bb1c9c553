use std::fmt;

use serde_json::Value;

/// Node endpoints reachable through the RPC provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    GetInfo,
    GetBlockInfo,
    GetRawAbi,
    GetRequiredKeys,
    SendTransaction,
    PushTransaction,
    GetTableRows,
    GetKvTableRows,
    GetAccount,
    GetCurrencyBalance,
}

impl Endpoint {
    /// Path relative to the node base URL.
    pub const fn path(self) -> &'static str {
        match self {
            Endpoint::GetInfo => "v1/chain/get_info",
            Endpoint::GetBlockInfo => "v1/chain/get_block_info",
            Endpoint::GetRawAbi => "v1/chain/get_raw_abi",
            Endpoint::GetRequiredKeys => "v1/chain/get_required_keys",
            Endpoint::SendTransaction => "v1/chain/send_transaction",
            Endpoint::PushTransaction => "v1/chain/push_transaction",
            Endpoint::GetTableRows => "v1/chain/get_table_rows",
            Endpoint::GetKvTableRows => "v1/chain/get_kv_table_rows",
            Endpoint::GetAccount => "v1/chain/get_account",
            Endpoint::GetCurrencyBalance => "v1/chain/get_currency_balance",
        }
    }

    /// Human readable description used in error messages.
    pub const fn action(self) -> &'static str {
        match self {
            Endpoint::GetInfo => "getting chain info",
            Endpoint::GetBlockInfo => "getting block info",
            Endpoint::GetRawAbi => "getting raw abi",
            Endpoint::GetRequiredKeys => "getting required keys",
            Endpoint::SendTransaction => "sending transaction",
            Endpoint::PushTransaction => "pushing transaction",
            Endpoint::GetTableRows => "getting table rows",
            Endpoint::GetKvTableRows => "getting kv table rows",
            Endpoint::GetAccount => "getting account",
            Endpoint::GetCurrencyBalance => "getting currency balance",
        }
    }

    /// Picks the table query endpoint from the request shape.
    ///
    /// Key-value queries name their index (`index_name`); legacy multi-index
    /// queries address it by position. A null `index_name` counts as absent.
    pub fn for_table_query(request: &Value) -> Endpoint {
        if request.get("index_name").is_some_and(|index| !index.is_null()) {
            Endpoint::GetKvTableRows
        } else {
            Endpoint::GetTableRows
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}
