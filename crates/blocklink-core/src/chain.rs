//! Chain parameters keyed by the chain name a node reports.

use bitcoin::Network;

use crate::error::CoreError;
use crate::types::{ChainIdentity, NetworkKind};

/// Chain name Bitcoin Core reports for the production network.
pub const MAIN_CHAIN: &str = "main";

/// Network parameters the local parser needs to interpret raw data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSet {
    pub chain: String,
    pub network: Network,
    /// P2P message start bytes.
    pub magic: [u8; 4],
    pub pubkey_address_prefix: u8,
    pub script_address_prefix: u8,
    pub bech32_hrp: &'static str,
}

impl ParameterSet {
    pub fn identity(&self) -> ChainIdentity {
        ChainIdentity {
            kind: network_kind(&self.chain),
            chain: self.chain.clone(),
        }
    }
}

/// Maps a chain name into its parameter set.
pub trait ChainParamsResolver: Send + Sync {
    fn resolve(&self, chain: &str) -> Result<ParameterSet, CoreError>;
}

/// Resolver backed by the `bitcoin` crate's built-in network constants.
#[derive(Debug, Clone, Copy, Default)]
pub struct BitcoinParamsResolver;

impl ChainParamsResolver for BitcoinParamsResolver {
    fn resolve(&self, chain: &str) -> Result<ParameterSet, CoreError> {
        let network = Network::from_core_arg(chain)
            .map_err(|_| CoreError::UnknownChain(chain.to_owned()))?;

        let (pubkey_address_prefix, script_address_prefix) = match network {
            Network::Bitcoin => (0x00, 0x05),
            _ => (0x6f, 0xc4),
        };
        let bech32_hrp = match network {
            Network::Bitcoin => "bc",
            Network::Regtest => "bcrt",
            _ => "tb",
        };

        Ok(ParameterSet {
            chain: chain.to_owned(),
            network,
            magic: network.magic().to_bytes(),
            pubkey_address_prefix,
            script_address_prefix,
            bech32_hrp,
        })
    }
}

/// Only the canonical main chain is production; every other name is test-like.
pub fn network_kind(chain: &str) -> NetworkKind {
    if chain == MAIN_CHAIN {
        NetworkKind::Main
    } else {
        NetworkKind::Test
    }
}
