use bitcoin::hex::FromHex;
use bitcoin::Amount;
use serde::de::DeserializeOwned;

use crate::error::CoreError;

/// Decode a JSON-RPC `result` value into a typed structure.
pub(crate) fn decode_result<T: DeserializeOwned>(
    method: &str,
    raw: serde_json::Value,
) -> Result<T, CoreError> {
    serde_json::from_value(raw)
        .map_err(|e| CoreError::Decode(format!("invalid {method} result: {e}")))
}

/// Decode the hex string returned by `getblock` at verbosity 0.
pub(crate) fn decode_hex_bytes(method: &str, raw: serde_json::Value) -> Result<Vec<u8>, CoreError> {
    let hex_str = raw.as_str().ok_or_else(|| {
        CoreError::Decode(format!("invalid {method} result: expected hex string, got {raw}"))
    })?;
    Vec::<u8>::from_hex(hex_str)
        .map_err(|e| CoreError::Decode(format!("invalid {method} hex payload: {e}")))
}

/// Parse a BTC amount from a JSON value.
///
/// Number values are parsed via `Amount::from_float_in` to support scientific
/// notation, while string values are parsed via `Amount::from_str_in`.
pub(crate) fn parse_btc_amount(value: &serde_json::Value) -> Result<Amount, CoreError> {
    match value {
        serde_json::Value::Number(n) => {
            let parsed = n
                .as_f64()
                .ok_or_else(|| CoreError::Decode(format!("invalid BTC amount `{value}`")))?;
            Amount::from_float_in(parsed, bitcoin::Denomination::Bitcoin)
                .map_err(|e| CoreError::Decode(format!("invalid BTC amount `{value}`: {e}")))
        }
        serde_json::Value::String(s) => Amount::from_str_in(s, bitcoin::Denomination::Bitcoin)
            .map_err(|e| CoreError::Decode(format!("invalid BTC amount `{s}`: {e}"))),
        _ => Err(CoreError::Decode(format!(
            "expected numeric BTC amount, got: {value}"
        ))),
    }
}
