use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::chain::{BitcoinParamsResolver, ChainParamsResolver, ParameterSet};
use crate::config::{BlockParsing, RpcConfig};
use crate::error::{CoreError, RequestKey, ResultExt};
use crate::parser::{BitcoinBlockParser, BlockParser};
use crate::types::{Block, BlockHeader, BlockHeight, ChainIdentity, Tx};

use super::http_adapter::HttpTransport;
use super::parsing::{decode_result, parse_btc_amount};
use super::strategy::BlockStrategy;
use super::types::{ChainInfo, FeeEstimate, FeeEstimateMode};
use super::{BitcoinRpc, Transport};

// ==============================================================================
// RpcClient
// ==============================================================================

/// Node client with chain parameters and block strategy fixed at construction.
///
/// Construction calls `getblockchaininfo`; if that fails no client exists.
/// Afterwards the client holds no mutable state, so one instance can serve
/// concurrent callers.
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    params: ParameterSet,
    identity: ChainIdentity,
    strategy: BlockStrategy,
}

impl RpcClient {
    /// Connect over HTTP using `config` and the built-in chain parameters.
    pub async fn connect(config: &RpcConfig) -> Result<Self, CoreError> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Self::with_transport(transport, &BitcoinParamsResolver, config.block_parsing).await
    }

    pub async fn with_transport(
        transport: Arc<dyn Transport>,
        resolver: &dyn ChainParamsResolver,
        parsing: BlockParsing,
    ) -> Result<Self, CoreError> {
        Self::with_parser(transport, resolver, |params| match parsing {
            BlockParsing::Local => {
                Some(Arc::new(BitcoinBlockParser::new(params.clone())) as Arc<dyn BlockParser>)
            }
            BlockParsing::Node => None,
        })
        .await
    }

    /// Construct with a caller-supplied parser, built from the resolved
    /// parameters. Returning `None` selects node-side decoding.
    pub async fn with_parser<F>(
        transport: Arc<dyn Transport>,
        resolver: &dyn ChainParamsResolver,
        make_parser: F,
    ) -> Result<Self, CoreError>
    where
        F: FnOnce(&ParameterSet) -> Option<Arc<dyn BlockParser>>,
    {
        let info = fetch_chain_info(transport.as_ref()).await?;
        let params = resolver.resolve(&info.chain)?;
        let identity = params.identity();
        let strategy = match make_parser(&params) {
            Some(parser) => BlockStrategy::LocalParse(parser),
            None => BlockStrategy::NodeDecoded,
        };

        info!(
            chain = %identity.chain,
            network = identity.kind.legacy_name(),
            blocks = info.blocks,
            strategy = strategy.name(),
            "rpc: resolved block chain"
        );

        Ok(Self {
            transport,
            params,
            identity,
            strategy,
        })
    }

    pub fn identity(&self) -> &ChainIdentity {
        &self.identity
    }

    pub fn params(&self) -> &ParameterSet {
        &self.params
    }

    pub fn is_testnet(&self) -> bool {
        self.identity.kind.is_testnet()
    }

    /// `true` when blocks are decoded locally from raw bytes.
    pub fn parses_locally(&self) -> bool {
        matches!(self.strategy, BlockStrategy::LocalParse(_))
    }

    pub(super) async fn call(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, CoreError> {
        Ok(self.transport.execute(method, params).await?)
    }

    pub(super) async fn call_decode<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<T, CoreError> {
        let raw = self.call(method, params).await?;
        decode_result(method, raw)
    }
}

async fn fetch_chain_info(transport: &dyn Transport) -> Result<ChainInfo, CoreError> {
    let raw = transport.execute("getblockchaininfo", &[]).await?;
    decode_result("getblockchaininfo", raw)
}

#[derive(Deserialize)]
struct SmartFeeResult {
    #[serde(default)]
    feerate: Option<serde_json::Value>,
    #[serde(default)]
    errors: Vec<String>,
    blocks: u32,
}

#[async_trait]
impl BitcoinRpc for RpcClient {
    async fn get_best_block_hash(&self) -> Result<String, CoreError> {
        self.call_decode("getbestblockhash", &[]).await
    }

    async fn get_best_block_height(&self) -> Result<BlockHeight, CoreError> {
        self.call_decode("getblockcount", &[]).await
    }

    async fn get_blockchain_info(&self) -> Result<ChainInfo, CoreError> {
        fetch_chain_info(self.transport.as_ref()).await
    }

    async fn get_block_hash(&self, height: u32) -> Result<String, CoreError> {
        self.call_decode("getblockhash", &[json!(height)])
            .await
            .with_key(|| RequestKey::Height(height))
    }

    async fn get_block_header(&self, hash: &str) -> Result<BlockHeader, CoreError> {
        self.call_decode("getblockheader", &[json!(hash), json!(true)])
            .await
            .with_key(|| RequestKey::Hash(hash.to_owned()))
    }

    async fn get_block_raw(&self, hash: &str) -> Result<Vec<u8>, CoreError> {
        self.fetch_block_raw(hash).await
    }

    async fn get_block(&self, hash: &str) -> Result<Block, CoreError> {
        match &self.strategy {
            BlockStrategy::LocalParse(parser) => self.block_with_header(parser.as_ref(), hash).await,
            BlockStrategy::NodeDecoded => self.get_block_full(hash).await,
        }
    }

    async fn get_block_without_header(&self, hash: &str, height: u32) -> Result<Block, CoreError> {
        match &self.strategy {
            BlockStrategy::LocalParse(parser) => {
                self.block_stamped(parser.as_ref(), hash, height).await
            }
            BlockStrategy::NodeDecoded => self.get_block_full(hash).await,
        }
    }

    async fn get_block_list(&self, hash: &str) -> Result<Block, CoreError> {
        self.block_thin_then_txs(hash).await
    }

    async fn get_block_full(&self, hash: &str) -> Result<Block, CoreError> {
        self.call_decode("getblock", &[json!(hash), json!(2)])
            .await
            .with_key(|| RequestKey::Hash(hash.to_owned()))
    }

    async fn get_mempool(&self) -> Result<Vec<String>, CoreError> {
        self.call_decode("getrawmempool", &[]).await
    }

    async fn get_transaction(&self, txid: &str) -> Result<Tx, CoreError> {
        self.call_decode("getrawtransaction", &[json!(txid), json!(true)])
            .await
            .with_key(|| RequestKey::Txid(txid.to_owned()))
    }

    async fn estimate_smart_fee(
        &self,
        conf_target: u32,
        mode: FeeEstimateMode,
    ) -> Result<FeeEstimate, CoreError> {
        let res: SmartFeeResult = self
            .call_decode("estimatesmartfee", &[json!(conf_target), json!(mode.as_str())])
            .await?;
        let fee_per_kvb = res.feerate.as_ref().map(parse_btc_amount).transpose()?;
        Ok(FeeEstimate {
            fee_per_kvb,
            blocks: res.blocks,
            errors: res.errors,
        })
    }

    async fn send_raw_transaction(&self, hex: &str) -> Result<String, CoreError> {
        self.call_decode("sendrawtransaction", &[json!(hex)]).await
    }
}
