//! Shared test helpers for `blocklink-core` unit tests.
//!
//! JSON fixtures mirror what Bitcoin Core returns for the verbose RPC calls,
//! so strategy tests can assemble blocks without a running node.

use std::sync::Arc;

use bitcoin::blockdata::constants::genesis_block;
use bitcoin::consensus::encode::{serialize, serialize_hex};
use bitcoin::Network;
use serde_json::{json, Value};

use crate::chain::BitcoinParamsResolver;
use crate::config::BlockParsing;
use crate::rpc::mock::{MockTransport, MockTransportBuilder};
use crate::rpc::RpcClient;

// ==============================================================================
// Genesis Block
// ==============================================================================

pub const GENESIS_HASH: &str = "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f";
pub const GENESIS_COINBASE_TXID: &str =
    "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";

/// Mainnet genesis block in consensus encoding.
pub fn genesis_block_bytes() -> Vec<u8> {
    serialize(&genesis_block(Network::Bitcoin))
}

/// Same bytes as `getblock <hash> 0` would return them.
pub fn genesis_block_hex() -> String {
    serialize_hex(&genesis_block(Network::Bitcoin))
}

// ==============================================================================
// RPC Result Fixtures
// ==============================================================================

pub fn blockchain_info(chain: &str) -> Value {
    json!({
        "chain": chain,
        "blocks": 110,
        "headers": 110,
        "bestblockhash": "0f9188f13cb7b2c71f2a335e3a4fc328bf5beb436012afca590b1a11466e2206",
        "pruned": false,
    })
}

/// `getblockheader <hash> true`.
pub fn verbose_header_json(hash: &str, height: u32, prev: Option<&str>, next: Option<&str>) -> Value {
    let mut header = json!({
        "hash": hash,
        "confirmations": 1,
        "height": height,
        "version": 0x2000_0000,
        "merkleroot": "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b",
        "time": 1_231_006_505,
        "bits": "1d00ffff",
        "nonce": 2_083_236_893,
    });
    if let Some(prev) = prev {
        header["previousblockhash"] = json!(prev);
    }
    if let Some(next) = next {
        header["nextblockhash"] = json!(next);
    }
    header
}

/// `getblock <hash> 1`: header fields plus txids.
pub fn thin_block_json(hash: &str, height: u32, txids: &[&str]) -> Value {
    let mut block = verbose_header_json(hash, height, None, None);
    block["tx"] = json!(txids);
    block
}

/// A minimal non-coinbase transaction as `getrawtransaction <txid> true` returns it.
pub fn tx_json(txid: &str) -> Value {
    json!({
        "txid": txid,
        "hex": "02000000",
        "version": 2,
        "locktime": 0,
        "vin": [{
            "txid": "0000000000000000000000000000000000000000000000000000000000000001",
            "vout": 0,
            "scriptSig": {"hex": ""},
            "sequence": 4_294_967_294u32,
        }],
        "vout": [{
            "value": 0.0005,
            "n": 0,
            "scriptPubKey": {
                "hex": "0014000102030405060708090a0b0c0d0e0f10111213",
                "type": "witness_v0_keyhash",
            },
        }],
    })
}

// ==============================================================================
// Client Builders
// ==============================================================================

/// A mock node that already answers the construction-time `getblockchaininfo` for `chain`.
pub fn mock_node(chain: &str) -> MockTransportBuilder {
    MockTransport::builder().result("getblockchaininfo", None, blockchain_info(chain))
}

/// Connect a client to a mock node configured by `configure`.
pub async fn connect_mock<F>(
    chain: &str,
    parsing: BlockParsing,
    configure: F,
) -> (RpcClient, Arc<MockTransport>)
where
    F: FnOnce(MockTransportBuilder) -> MockTransportBuilder,
{
    let mock = configure(mock_node(chain)).build();
    let client = RpcClient::with_transport(mock.clone(), &BitcoinParamsResolver, parsing)
        .await
        .expect("mock client must connect");
    (client, mock)
}
