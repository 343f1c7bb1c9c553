use std::path::Path;

use anyhow::{Context, anyhow};
use clap::Parser;
use log::{debug, error};
use serde_json::Value;

use antelope_rpc::cli::{Cli, Commands};
use antelope_rpc::config::{ApplyArgs, loader::load_configuration};
use antelope_rpc::errors::describe;
use antelope_rpc::log::init_logging;
use antelope_rpc::rpc::{CallError, NodeRpcProvider, RpcProvider};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    init_logging()?;
    let cli = Cli::parse();

    let mut config = load_configuration(Path::new(&cli.config))?;
    config.apply_node(&cli.node);
    debug!(node_url = config.rpc.node_url.as_str(); "Using node");

    let provider = NodeRpcProvider::new(&config.rpc)?;

    match run(&provider, cli.command).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        },
        Err(e) => match e.downcast_ref::<CallError>() {
            Some(call) => {
                error!(endpoint:% = call.endpoint(), kind:% = call.kind(); "{}", call);
                Err(anyhow!(describe(call)))
            },
            None => Err(e),
        },
    }
}

async fn run(provider: &NodeRpcProvider, command: Commands) -> anyhow::Result<String> {
    let value = match command {
        Commands::Info => serde_json::to_value(provider.get_info().await?)?,
        Commands::BlockInfo { block_num } => serde_json::to_value(provider.get_block_info(block_num).await?)?,
        Commands::Abi { account } => serde_json::to_value(provider.get_raw_abi(&account).await?)?,
        Commands::TableRows { request } => {
            let request: Value = serde_json::from_str(&request).context("Table rows request is not valid JSON")?;
            provider.get_table_rows(&request).await?.into_json()
        },
        Commands::Account { name } => serde_json::to_value(provider.get_account(&name).await?)?,
        Commands::CurrencyBalance { code, account, symbol } => {
            serde_json::to_value(provider.get_currency_balance(&code, &account, symbol.as_deref()).await?)?
        },
    };

    Ok(serde_json::to_string_pretty(&value)?)
}
