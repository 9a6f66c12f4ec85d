use std::path::PathBuf;
use std::time::Duration;

use blocklink_core::{BlockParsing, RpcConfig};
use clap::{Parser, Subcommand, ValueEnum};

/// blocklink: fetch blocks, transactions, and fee estimates from a Bitcoin Core node.
#[derive(Parser, Debug)]
#[command(version, about)]
pub struct Cli {
    /// Bitcoin Core RPC URL.
    #[arg(long, default_value = "http://127.0.0.1:8332", env = "BLOCKLINK_RPC_URL")]
    pub rpc_url: String,

    /// RPC username. Must be given together with --rpc-pass.
    #[arg(long, env = "BLOCKLINK_RPC_USER")]
    pub rpc_user: Option<String>,

    /// RPC password. Must be given together with --rpc-user.
    #[arg(long, env = "BLOCKLINK_RPC_PASS")]
    pub rpc_pass: Option<String>,

    /// Path to the node's `.cookie` file, used when no user/pass is given.
    #[arg(long, env = "BLOCKLINK_RPC_COOKIE")]
    pub rpc_cookie: Option<PathBuf>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value = "30")]
    pub timeout_secs: u64,

    /// Let the node decode blocks instead of parsing raw bytes locally.
    #[arg(long)]
    pub node_decode: bool,

    /// Client-side request rate limit.
    #[arg(long)]
    pub requests_per_second: Option<u32>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Chain name, identity, and tip as seen by the node.
    Info,
    /// Hash and height of the best block.
    Best,
    /// Hash of the block at a height.
    BlockHash { height: u32 },
    /// Verbose block header.
    Header { hash: String },
    /// A block with all of its transactions.
    Block {
        hash: String,
        /// How transactions are retrieved.
        #[arg(long, value_enum, default_value_t = BlockMode::Local)]
        mode: BlockMode,
        /// Known height; skips the header fetch in `local` mode.
        #[arg(long)]
        height: Option<u32>,
    },
    /// A transaction by txid.
    Tx { txid: String },
    /// Txids in the mempool.
    Mempool,
    /// Smart fee estimate for a confirmation target.
    Fee {
        blocks: u32,
        #[arg(long)]
        economical: bool,
    },
    /// Broadcast a raw transaction.
    Send { hex: String },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockMode {
    /// Node header plus locally parsed raw block.
    Local,
    /// Thin block, then one request per transaction.
    List,
    /// Node-decoded block.
    Full,
}

impl Cli {
    pub fn rpc_config(&self) -> RpcConfig {
        RpcConfig {
            url: self.rpc_url.clone(),
            user: self.rpc_user.clone(),
            pass: self.rpc_pass.clone(),
            cookie_file: self.rpc_cookie.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            requests_per_second: self.requests_per_second,
            block_parsing: if self.node_decode {
                BlockParsing::Node
            } else {
                BlockParsing::Local
            },
            ..RpcConfig::default()
        }
    }
}
