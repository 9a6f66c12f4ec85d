//! Domain types for the uniform block/transaction model.
//!
//! Every retrieval path (node-decoded, locally parsed, thin + per-tx) lands
//! in the same `Block` / `Tx` structures. Field names follow the node's
//! verbose JSON so node-decoded results deserialize directly.

use bitcoin::Amount;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::rpc::parse_btc_amount;

// ==============================================================================
// Block Height
// ==============================================================================

/// A block height, wrapped for type safety.
///
/// `#[serde(transparent)]` keeps the JSON representation a bare integer.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BlockHeight(pub u32);

impl From<u32> for BlockHeight {
    fn from(h: u32) -> Self {
        Self(h)
    }
}

impl From<BlockHeight> for u32 {
    fn from(h: BlockHeight) -> Self {
        h.0
    }
}

impl std::ops::Deref for BlockHeight {
    type Target = u32;
    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl std::fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ==============================================================================
// Block Types
// ==============================================================================

/// Consensus header fields carried through unmodified.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusFields {
    #[serde(default)]
    pub version: i32,
    #[serde(default, rename = "merkleroot")]
    pub merkle_root: String,
    #[serde(default)]
    pub time: u32,
    #[serde(default)]
    pub bits: String,
    #[serde(default)]
    pub nonce: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub hash: String,
    pub height: BlockHeight,
    #[serde(
        default,
        rename = "previousblockhash",
        skip_serializing_if = "Option::is_none"
    )]
    pub prev_hash: Option<String>,
    /// Only known when the header was fetched from the node on its own.
    #[serde(
        default,
        rename = "nextblockhash",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<i64>,
    #[serde(flatten)]
    pub consensus: ConsensusFields,
}

/// Header plus txids only (`getblock` verbosity 1). Never handed to callers.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ThinBlock {
    #[serde(flatten)]
    pub header: BlockHeader,
    #[serde(rename = "tx", default)]
    pub txids: Vec<String>,
}

/// A block with its transactions, in the order the node returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(flatten)]
    pub header: BlockHeader,
    #[serde(rename = "tx", default)]
    pub txs: Vec<Tx>,
}

// ==============================================================================
// Transaction Types
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tx {
    pub txid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hex: String,
    #[serde(default)]
    pub version: i32,
    #[serde(default)]
    pub locktime: u32,
    #[serde(default)]
    pub vin: Vec<TxInput>,
    #[serde(default)]
    pub vout: Vec<TxOutput>,
    #[serde(default, rename = "blockhash", skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocktime: Option<i64>,
}

impl Tx {
    /// A coinbase transaction has exactly one input, carrying the coinbase script.
    pub fn is_coinbase(&self) -> bool {
        self.vin.len() == 1 && self.vin[0].coinbase.is_some()
    }
}

/// A transaction input. Coinbase inputs carry `coinbase` instead of a prevout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coinbase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub txid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vout: Option<u32>,
    #[serde(default, rename = "scriptSig", skip_serializing_if = "Option::is_none")]
    pub script_sig: Option<ScriptSig>,
    #[serde(default, rename = "txinwitness", skip_serializing_if = "Vec::is_empty")]
    pub witness: Vec<String>,
    pub sequence: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptSig {
    pub hex: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxOutput {
    #[serde(
        serialize_with = "serialize_btc_amount",
        deserialize_with = "deserialize_btc_amount"
    )]
    pub value: Amount,
    pub n: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pub_key: ScriptPubKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPubKey {
    pub hex: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub script_type: Option<String>,
}

fn serialize_btc_amount<S>(amount: &Amount, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(amount.to_btc())
}

fn deserialize_btc_amount<'de, D>(deserializer: D) -> Result<Amount, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    parse_btc_amount(&value).map_err(serde::de::Error::custom)
}

// ==============================================================================
// Chain Identity
// ==============================================================================

/// Network category a node is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    Main,
    Test,
}

impl NetworkKind {
    /// Legacy network label used by block explorers.
    pub fn legacy_name(self) -> &'static str {
        match self {
            Self::Main => "livenet",
            Self::Test => "testnet",
        }
    }

    pub fn is_testnet(self) -> bool {
        self == Self::Test
    }
}

/// Resolved once at client construction and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainIdentity {
    pub kind: NetworkKind,
    /// Chain name as reported by `getblockchaininfo` (`main`, `test`, ...).
    pub chain: String,
}
