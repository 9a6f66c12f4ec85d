//! Local decoding of raw block bytes.
//!
//! Bitcoin Core returns undecoded blocks at `getblock` verbosity 0. Decoding
//! them locally is much cheaper for the node than verbosity 2, but the raw
//! bytes carry no height or chain linkage, so the parser only produces the
//! consensus header fields and the ordered transaction list.

use bitcoin::consensus::encode::{deserialize, serialize_hex};
use bitcoin::hex::DisplayHex;
use bitcoin::{Address, Script, Transaction};

use crate::chain::ParameterSet;
use crate::error::CoreError;
use crate::types::{ConsensusFields, ScriptPubKey, ScriptSig, Tx, TxInput, TxOutput};

/// Output of the local parser: everything recoverable from block bytes alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedBlock {
    pub consensus: ConsensusFields,
    pub txs: Vec<Tx>,
}

pub trait BlockParser: Send + Sync {
    fn parse_block(&self, raw: &[u8]) -> Result<ParsedBlock, CoreError>;
}

/// Consensus decoder built on the `bitcoin` crate.
#[derive(Debug, Clone)]
pub struct BitcoinBlockParser {
    params: ParameterSet,
}

impl BitcoinBlockParser {
    pub fn new(params: ParameterSet) -> Self {
        Self { params }
    }

    fn convert_tx(&self, tx: &Transaction) -> Tx {
        let coinbase = tx.is_coinbase();
        let vin = tx
            .input
            .iter()
            .map(|input| {
                let script_hex = input.script_sig.to_hex_string();
                let witness = input
                    .witness
                    .iter()
                    .map(|item| item.to_lower_hex_string())
                    .collect();
                if coinbase {
                    TxInput {
                        coinbase: Some(script_hex),
                        txid: None,
                        vout: None,
                        script_sig: None,
                        witness,
                        sequence: input.sequence.0,
                    }
                } else {
                    TxInput {
                        coinbase: None,
                        txid: Some(input.previous_output.txid.to_string()),
                        vout: Some(input.previous_output.vout),
                        script_sig: Some(ScriptSig { hex: script_hex }),
                        witness,
                        sequence: input.sequence.0,
                    }
                }
            })
            .collect();

        let vout = tx
            .output
            .iter()
            .zip(0u32..)
            .map(|(output, n)| TxOutput {
                value: output.value,
                n,
                script_pub_key: ScriptPubKey {
                    hex: output.script_pubkey.to_hex_string(),
                    address: Address::from_script(&output.script_pubkey, self.params.network)
                        .ok()
                        .map(|address| address.to_string()),
                    script_type: Some(script_type_name(&output.script_pubkey).to_owned()),
                },
            })
            .collect();

        Tx {
            txid: tx.compute_txid().to_string(),
            hex: serialize_hex(tx),
            version: tx.version.0,
            locktime: tx.lock_time.to_consensus_u32(),
            vin,
            vout,
            block_hash: None,
            confirmations: None,
            time: None,
            blocktime: None,
        }
    }
}

/// Output script category, named the way Bitcoin Core's `scriptPubKey.type` does.
fn script_type_name(script: &Script) -> &'static str {
    if script.is_p2pk() {
        "pubkey"
    } else if script.is_p2pkh() {
        "pubkeyhash"
    } else if script.is_p2sh() {
        "scripthash"
    } else if script.is_p2wpkh() {
        "witness_v0_keyhash"
    } else if script.is_p2wsh() {
        "witness_v0_scripthash"
    } else if script.is_p2tr() {
        "witness_v1_taproot"
    } else if script.is_witness_program() {
        "witness_unknown"
    } else if script.is_multisig() {
        "multisig"
    } else if script.is_op_return() {
        "nulldata"
    } else {
        "nonstandard"
    }
}

impl BlockParser for BitcoinBlockParser {
    fn parse_block(&self, raw: &[u8]) -> Result<ParsedBlock, CoreError> {
        let block: bitcoin::Block = deserialize(raw)
            .map_err(|e| CoreError::Decode(format!("invalid block bytes: {e}")))?;

        let header = &block.header;
        let consensus = ConsensusFields {
            version: header.version.to_consensus(),
            merkle_root: header.merkle_root.to_string(),
            time: header.time,
            bits: format!("{:08x}", header.bits.to_consensus()),
            nonce: header.nonce,
        };

        Ok(ParsedBlock {
            consensus,
            txs: block.txdata.iter().map(|tx| self.convert_tx(tx)).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use bitcoin::Amount;

    use super::*;
    use crate::chain::{BitcoinParamsResolver, ChainParamsResolver};
    use crate::test_util::{genesis_block_bytes, GENESIS_COINBASE_TXID};

    fn mainnet_parser() -> BitcoinBlockParser {
        BitcoinBlockParser::new(BitcoinParamsResolver.resolve("main").expect("main is known"))
    }

    #[test]
    fn parses_genesis_block() {
        let parsed = mainnet_parser()
            .parse_block(&genesis_block_bytes())
            .expect("genesis must parse");

        assert_eq!(
            parsed.consensus.merkle_root,
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
        assert_eq!(parsed.consensus.version, 1);
        assert_eq!(parsed.consensus.time, 1_231_006_505);
        assert_eq!(parsed.consensus.bits, "1d00ffff");
        assert_eq!(parsed.consensus.nonce, 2_083_236_893);
        assert_eq!(parsed.txs.len(), 1);

        let coinbase = &parsed.txs[0];
        assert_eq!(coinbase.txid, GENESIS_COINBASE_TXID);
        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.vin[0].sequence, 0xFFFF_FFFF);
        assert_eq!(coinbase.vout.len(), 1);
        assert_eq!(coinbase.vout[0].value, Amount::from_btc(50.0).expect("valid"));
        // Genesis pays to a bare pubkey, which has no address form.
        assert!(coinbase.vout[0].script_pub_key.address.is_none());
        assert_eq!(
            coinbase.vout[0].script_pub_key.script_type.as_deref(),
            Some("pubkey")
        );
    }

    #[test]
    fn script_types_use_node_names() {
        let hash20 = "00".repeat(20);
        let hash32 = "00".repeat(32);
        let cases = [
            (format!("76a914{hash20}88ac"), "pubkeyhash"),
            (format!("a914{hash20}87"), "scripthash"),
            (format!("0014{hash20}"), "witness_v0_keyhash"),
            (format!("0020{hash32}"), "witness_v0_scripthash"),
            (format!("5120{hash32}"), "witness_v1_taproot"),
            ("52020000".to_owned(), "witness_unknown"),
            ("6a04deadbeef".to_owned(), "nulldata"),
            ("51".to_owned(), "nonstandard"),
        ];
        for (hex, expected) in cases {
            let script = bitcoin::ScriptBuf::from_hex(&hex).expect("valid script hex");
            assert_eq!(script_type_name(&script), expected, "{hex}");
        }
    }

    #[test]
    fn truncated_bytes_are_decode_error() {
        let mut raw = genesis_block_bytes();
        raw.truncate(raw.len() / 2);
        let err = mainnet_parser()
            .parse_block(&raw)
            .expect_err("truncated block must fail");
        assert!(matches!(err, CoreError::Decode(_)));
    }
}
