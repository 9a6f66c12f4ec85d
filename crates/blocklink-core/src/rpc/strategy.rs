//! Block retrieval strategies.
//!
//! The same logical block can be rebuilt three ways: decoded by the node
//! (verbosity 2), decoded locally from raw bytes (verbosity 0 plus the
//! parser), or assembled from a thin block (verbosity 1) and one
//! `getrawtransaction` per txid. Which one `get_block` uses is fixed when
//! the client is constructed. Sub-calls are always awaited in sequence.

use std::sync::Arc;

use serde_json::json;

use crate::error::{CoreError, RequestKey, ResultExt};
use crate::parser::BlockParser;
use crate::types::{Block, BlockHeader, BlockHeight, ThinBlock};

use super::client::RpcClient;
use super::parsing::decode_hex_bytes;
use super::BitcoinRpc;

/// How `get_block` rebuilds a block, chosen once at construction.
pub(crate) enum BlockStrategy {
    /// Verbose header from the node, transactions from the local parser.
    LocalParse(Arc<dyn BlockParser>),
    /// No local parser: the node decodes everything.
    NodeDecoded,
}

impl BlockStrategy {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::LocalParse(_) => "local_parse",
            Self::NodeDecoded => "node_decoded",
        }
    }
}

impl RpcClient {
    pub(super) async fn fetch_block_raw(&self, hash: &str) -> Result<Vec<u8>, CoreError> {
        let key = || RequestKey::Hash(hash.to_owned());
        let raw = self
            .call("getblock", &[json!(hash), json!(0)])
            .await
            .with_key(key)?;
        decode_hex_bytes("getblock", raw).with_key(key)
    }

    /// Header first, then the raw bytes. The node's header replaces
    /// whatever the parser recovered; the parser's tx list is kept as is.
    pub(super) async fn block_with_header(
        &self,
        parser: &dyn BlockParser,
        hash: &str,
    ) -> Result<Block, CoreError> {
        let header = self.get_block_header(hash).await?;
        let raw = self.fetch_block_raw(hash).await?;
        let parsed = parser
            .parse_block(&raw)
            .with_key(|| RequestKey::Hash(hash.to_owned()))?;

        Ok(Block {
            header,
            txs: parsed.txs,
        })
    }

    /// Raw bytes only. Prev/next linkage and confirmations stay unset.
    pub(super) async fn block_stamped(
        &self,
        parser: &dyn BlockParser,
        hash: &str,
        height: u32,
    ) -> Result<Block, CoreError> {
        let raw = self.fetch_block_raw(hash).await?;
        let parsed = parser.parse_block(&raw).with_key(|| RequestKey::Block {
            height,
            hash: hash.to_owned(),
        })?;

        Ok(Block {
            header: BlockHeader {
                hash: hash.to_owned(),
                height: BlockHeight(height),
                prev_hash: None,
                next_hash: None,
                confirmations: None,
                consensus: parsed.consensus,
            },
            txs: parsed.txs,
        })
    }

    pub(super) async fn block_thin_then_txs(&self, hash: &str) -> Result<Block, CoreError> {
        let thin: ThinBlock = self
            .call_decode("getblock", &[json!(hash), json!(1)])
            .await
            .with_key(|| RequestKey::Hash(hash.to_owned()))?;

        let mut txs = Vec::with_capacity(thin.txids.len());
        for txid in &thin.txids {
            // Already carries the txid; stop at the first failure.
            txs.push(self.get_transaction(txid).await?);
        }

        Ok(Block {
            header: thin.header,
            txs,
        })
    }
}
