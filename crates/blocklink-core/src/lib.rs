pub mod chain;
pub mod config;
pub mod error;
pub mod parser;
pub mod rpc;
#[cfg(test)]
pub(crate) mod test_util;
pub mod types;

pub use chain::{BitcoinParamsResolver, ChainParamsResolver, ParameterSet};
pub use config::{BlockParsing, RpcConfig};
pub use error::{CoreError, ErrorKind, RequestKey, RpcError};
pub use parser::{BitcoinBlockParser, BlockParser, ParsedBlock};
pub use rpc::{BitcoinRpc, RpcClient};
pub use types::{Block, BlockHeader, BlockHeight, ChainIdentity, NetworkKind, Tx};
