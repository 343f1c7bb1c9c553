use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "antelope-rpc")]
#[command(about = "Antelope node RPC client", long_about = None)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        help = "Path to the configuration file",
        default_value = "data/config.toml"
    )]
    pub config: String,
    #[command(flatten)]
    pub node: NodeArgs,
    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the `[rpc]` configuration section.
#[derive(Args, Debug, Clone, Default)]
pub struct NodeArgs {
    #[arg(short = 'u', long, global = true, help = "The base URL of the node HTTP API")]
    pub node_url: Option<String>,
    #[arg(long, global = true, help = "Log every request and response")]
    pub network_log: bool,
    #[arg(long, global = true, help = "Per call timeout in seconds")]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show chain info of the node
    Info,
    /// Show a block by number
    BlockInfo {
        #[arg(help = "Block number")]
        block_num: u32,
    },
    /// Show the raw ABI of a contract account
    Abi {
        #[arg(help = "Contract account name")]
        account: String,
    },
    /// Query table rows. A request with `index_name` is sent as a key-value query
    TableRows {
        #[arg(help = "Request body as JSON, e.g. '{\"code\":\"eosio.token\",\"table\":\"accounts\",\"scope\":\"bob\",\"json\":true}'")]
        request: String,
    },
    /// Show an account
    Account {
        #[arg(help = "Account name")]
        name: String,
    },
    /// Show token balances of an account
    CurrencyBalance {
        #[arg(long, default_value = "eosio.token", help = "Token contract")]
        code: String,
        #[arg(help = "Account name")]
        account: String,
        #[arg(short, long, help = "Only this symbol, e.g. SYS")]
        symbol: Option<String>,
    },
}
