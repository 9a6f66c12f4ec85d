//! Bitcoin Core RPC abstraction layer.
//!
//! [`Transport`] executes one JSON-RPC call. [`RpcClient`] sits on top of
//! it, resolves chain parameters once at construction, and implements
//! [`BitcoinRpc`], choosing how blocks are reconstructed from the strategy
//! picked at that point.

mod client;
mod http_adapter;
#[cfg(test)]
pub mod mock;
mod parsing;
mod strategy;
pub mod types;

pub use client::RpcClient;
pub use http_adapter::HttpTransport;
pub(crate) use parsing::parse_btc_amount;
pub use types::{ChainInfo, FeeEstimate, FeeEstimateMode};

use async_trait::async_trait;

use crate::error::{CoreError, RpcError};
use crate::types::{Block, BlockHeader, BlockHeight, Tx};

/// Executes a single JSON-RPC call and returns the envelope's `result`.
///
/// A populated `error` field is reported as [`RpcError::ServerError`];
/// anything that prevented a usable envelope is a transport or decode
/// failure. Implementations must not retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, RpcError>;
}

/// The node operations exposed to callers.
///
/// Every method issues its sub-calls strictly in sequence and returns either
/// a complete value or an error annotated with the request's key.
#[async_trait]
pub trait BitcoinRpc: Send + Sync {
    /// Hash of the tip of the best chain.
    async fn get_best_block_hash(&self) -> Result<String, CoreError>;

    /// Height of the tip of the best chain.
    async fn get_best_block_height(&self) -> Result<BlockHeight, CoreError>;

    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError>;

    /// Hash of the best-chain block at `height`.
    async fn get_block_hash(&self, height: u32) -> Result<String, CoreError>;

    /// Verbose header, including prev/next linkage.
    async fn get_block_header(&self, hash: &str) -> Result<BlockHeader, CoreError>;

    /// Undecoded block bytes (`getblock` verbosity 0).
    async fn get_block_raw(&self, hash: &str) -> Result<Vec<u8>, CoreError>;

    /// Canonical block fetch: header from the node, transactions from the
    /// local parser. Without a local parser this is [`Self::get_block_full`].
    async fn get_block(&self, hash: &str) -> Result<Block, CoreError>;

    /// Like [`Self::get_block`] but skips the header fetch. Only `hash` and
    /// `height` are stamped on the header; prev/next hashes stay unset.
    async fn get_block_without_header(&self, hash: &str, height: u32) -> Result<Block, CoreError>;

    /// Thin block from the node, then each transaction fetched one by one.
    async fn get_block_list(&self, hash: &str) -> Result<Block, CoreError>;

    /// Fully node-decoded block (`getblock` verbosity 2).
    async fn get_block_full(&self, hash: &str) -> Result<Block, CoreError>;

    /// Txids currently in the node's mempool.
    async fn get_mempool(&self) -> Result<Vec<String>, CoreError>;

    async fn get_transaction(&self, txid: &str) -> Result<Tx, CoreError>;

    async fn estimate_smart_fee(
        &self,
        conf_target: u32,
        mode: FeeEstimateMode,
    ) -> Result<FeeEstimate, CoreError>;

    /// Broadcast a serialized transaction; returns its txid.
    async fn send_raw_transaction(&self, hex: &str) -> Result<String, CoreError>;
}
