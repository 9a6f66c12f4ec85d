//! RPC-specific types that do not belong to the shared block/tx model.

use bitcoin::Amount;
use serde::{Deserialize, Serialize};

// ==============================================================================
// Chain Info
// ==============================================================================

/// Basic chain information from `getblockchaininfo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainInfo {
    pub chain: String,
    pub blocks: u64,
    pub headers: u64,
    #[serde(rename = "bestblockhash")]
    pub best_block_hash: String,
    #[serde(default)]
    pub pruned: bool,
}

// ==============================================================================
// Fee Estimation
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeeEstimateMode {
    Conservative,
    Economical,
}

impl FeeEstimateMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Conservative => "CONSERVATIVE",
            Self::Economical => "ECONOMICAL",
        }
    }
}

/// Result of `estimatesmartfee`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeeEstimate {
    /// Fee rate per 1000 virtual bytes. `None` when the node has too little
    /// data to estimate; `errors` then says why.
    pub fee_per_kvb: Option<Amount>,
    /// Confirmation target the estimate was actually computed for.
    pub blocks: u32,
    pub errors: Vec<String>,
}
