//! Client configuration.

use std::path::PathBuf;
use std::time::Duration;

/// How `get_block` reconstructs blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BlockParsing {
    /// Fetch raw block bytes and decode them with the local parser.
    #[default]
    Local,
    /// Let the node decode everything (`getblock` verbosity 2).
    Node,
}

/// Settings for connecting to a node's JSON-RPC endpoint.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    pub url: String,
    pub user: Option<String>,
    pub pass: Option<String>,
    /// Used only when `user`/`pass` are both unset.
    pub cookie_file: Option<PathBuf>,
    /// Upper bound on one whole request, including reading the body.
    pub timeout: Duration,
    pub connect_timeout: Duration,
    /// Idle keep-alive connections kept per host. Sized generously so
    /// sustained request volume does not exhaust ephemeral ports.
    pub max_idle_connections: usize,
    pub tcp_keepalive: Duration,
    /// Optional client-side throttle, counted per outbound HTTP request.
    pub requests_per_second: Option<u32>,
    pub block_parsing: BlockParsing,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8332".to_owned(),
            user: None,
            pass: None,
            cookie_file: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_idle_connections: 100,
            tcp_keepalive: Duration::from_secs(600),
            requests_per_second: None,
            block_parsing: BlockParsing::Local,
        }
    }
}
