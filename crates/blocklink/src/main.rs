mod cli;

use blocklink_core::rpc::FeeEstimateMode;
use blocklink_core::{BitcoinRpc, CoreError, ErrorKind, RpcClient};
use clap::Parser;
use eyre::{eyre, WrapErr};
use serde_json::json;

use cli::{BlockMode, Command};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let args = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .init();

    // Construction calls getblockchaininfo, so a bad endpoint fails here.
    let client = RpcClient::connect(&args.rpc_config())
        .await
        .map_err(|err| {
            let message = format_rpc_connect_error(&args.rpc_url, &err);
            eyre!(message).wrap_err("while attempting to connect to Bitcoin Core RPC")
        })?;

    let output = run(&client, args.command).await?;
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("serialize output")?
    );
    Ok(())
}

async fn run(client: &RpcClient, command: Command) -> eyre::Result<serde_json::Value> {
    let value = match command {
        Command::Info => {
            let info = client.get_blockchain_info().await?;
            if info.pruned {
                tracing::warn!("node is pruned; old blocks may be unavailable");
            }
            json!({
                "identity": client.identity(),
                "network": client.identity().kind.legacy_name(),
                "info": info,
            })
        }
        Command::Best => {
            let hash = client.get_best_block_hash().await?;
            let height = client.get_best_block_height().await?;
            json!({ "hash": hash, "height": height })
        }
        Command::BlockHash { height } => json!(client.get_block_hash(height).await?),
        Command::Header { hash } => json!(client.get_block_header(&hash).await?),
        Command::Block { hash, mode, height } => {
            let block = match (mode, height) {
                (BlockMode::Local, Some(height)) => {
                    client.get_block_without_header(&hash, height).await?
                }
                (BlockMode::Local, None) => client.get_block(&hash).await?,
                (BlockMode::List, _) => client.get_block_list(&hash).await?,
                (BlockMode::Full, _) => client.get_block_full(&hash).await?,
            };
            json!(block)
        }
        Command::Tx { txid } => json!(client.get_transaction(&txid).await?),
        Command::Mempool => json!(client.get_mempool().await?),
        Command::Fee { blocks, economical } => {
            let mode = if economical {
                FeeEstimateMode::Economical
            } else {
                FeeEstimateMode::Conservative
            };
            let estimate = client.estimate_smart_fee(blocks, mode).await?;
            json!({
                "fee_per_kvb_btc": estimate.fee_per_kvb.map(|fee| fee.to_btc()),
                "blocks": estimate.blocks,
                "errors": estimate.errors,
            })
        }
        Command::Send { hex } => json!({ "txid": client.send_raw_transaction(&hex).await? }),
    };
    Ok(value)
}

fn format_rpc_connect_error(rpc_url: &str, err: &CoreError) -> String {
    let source_error = err.to_string();
    let mut lines = vec![
        format!("could not connect to RPC endpoint `{rpc_url}`"),
        format!("RPC error: {source_error}"),
    ];

    if let Some(hint) = connect_hint(err, &source_error) {
        lines.push(format!("hint: {hint}"));
    }

    lines.join("\n")
}

fn connect_hint(err: &CoreError, source_error: &str) -> Option<&'static str> {
    if let CoreError::UnknownChain(_) = err.root() {
        return Some("the node reports a chain this build has no parameters for");
    }
    if err.kind() == ErrorKind::Config {
        return Some("check --rpc-url, --rpc-user/--rpc-pass, and --rpc-cookie");
    }
    if err.kind() == ErrorKind::Protocol {
        return Some("the node answered but refused the request; it may still be starting up");
    }

    if source_error.contains("dns error") {
        Some("hostname resolution failed; verify the endpoint hostname and your DNS/network")
    } else if source_error.contains("tls")
        || source_error.contains("certificate")
        || source_error.contains("SSL")
    {
        Some("TLS handshake failed; verify certificate trust and that the endpoint uses HTTPS")
    } else if source_error.contains("401") || source_error.contains("403") {
        Some("authentication failed; verify --rpc-user/--rpc-pass or the cookie file")
    } else if source_error.contains("404") {
        Some("endpoint path is invalid; verify the full RPC URL")
    } else if err.is_timeout() {
        Some("the node did not answer in time; raise --timeout-secs or check node load")
    } else if source_error.contains("error sending request for url") {
        Some("request could not be sent; verify the URL, network access, and that bitcoind is running with -server")
    } else {
        None
    }
}
