use crate::error::RpcError;

#[derive(serde::Serialize)]
pub(super) struct JsonRpcRequest<'a> {
    pub(super) jsonrpc: &'static str,
    pub(super) id: u64,
    pub(super) method: &'a str,
    pub(super) params: &'a [serde_json::Value],
}

pub(super) struct JsonRpcResponse {
    pub(super) result: Option<serde_json::Value>,
    pub(super) error: Option<serde_json::Value>,
}

impl JsonRpcResponse {
    /// Decode a response body as an envelope. A JSON object counts only if it
    /// carries a `result` or an `error` key; gateway error pages that happen
    /// to be JSON do not.
    pub(super) fn decode(body: &[u8]) -> Result<Self, String> {
        let mut object: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(body).map_err(|e| e.to_string())?;
        if !object.contains_key("result") && !object.contains_key("error") {
            return Err("object has neither `result` nor `error`".to_owned());
        }
        Ok(Self {
            result: object.remove("result"),
            error: object.remove("error"),
        })
    }

    /// `true` when the node reported an error in the envelope.
    pub(super) fn has_error(&self) -> bool {
        self.error.as_ref().is_some_and(|err| !err.is_null())
    }

    /// Split the envelope into its result, or the node-reported error.
    /// A `null` error field counts as absent.
    pub(super) fn into_result(self) -> Result<serde_json::Value, RpcError> {
        match self.error {
            Some(err) if !err.is_null() => Err(parse_jsonrpc_error(err)),
            _ => Ok(self.result.unwrap_or(serde_json::Value::Null)),
        }
    }
}

/// Parse a JSON-RPC error value into a structured `RpcError`.
///
/// JSON-RPC 2.0 defines errors as `{"code": <int>, "message": <string>}`.
/// If the error value matches that shape, we produce a `ServerError`;
/// otherwise we fall back to `InvalidResponse` with the raw JSON.
pub(super) fn parse_jsonrpc_error(err: serde_json::Value) -> RpcError {
    #[derive(serde::Deserialize)]
    struct JsonRpcError {
        code: i64,
        message: String,
    }

    match serde_json::from_value::<JsonRpcError>(err.clone()) {
        Ok(parsed) => RpcError::ServerError {
            code: parsed.code,
            message: parsed.message,
        },
        Err(_) => RpcError::InvalidResponse(format!("non-standard JSON-RPC error: {err}")),
    }
}
