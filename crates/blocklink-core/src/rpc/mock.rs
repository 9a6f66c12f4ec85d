use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::error::RpcError;

use super::Transport;

/// What a routed call answers with. Errors are rebuilt on every call since
/// `RpcError` is not `Clone`.
#[derive(Debug, Clone)]
enum Reply {
    Result(Value),
    ServerError { code: i64, message: String },
    InvalidResponse(String),
    HttpStatus(u16),
}

impl Reply {
    fn produce(&self) -> Result<Value, RpcError> {
        match self {
            Self::Result(value) => Ok(value.clone()),
            Self::ServerError { code, message } => Err(RpcError::ServerError {
                code: *code,
                message: message.clone(),
            }),
            Self::InvalidResponse(detail) => Err(RpcError::InvalidResponse(detail.clone())),
            Self::HttpStatus(status) => Err(RpcError::HttpStatus { status: *status }),
        }
    }
}

struct Route {
    method: String,
    first_param: Option<Value>,
    reply: Reply,
}

impl Route {
    fn matches(&self, method: &str, params: &[Value]) -> bool {
        self.method == method
            && self
                .first_param
                .as_ref()
                .map_or(true, |expected| params.first() == Some(expected))
    }
}

/// An in-memory node for unit tests. Routes are matched on method name and,
/// optionally, the first positional parameter; the first registered match
/// wins. Unrouted calls fail the way Bitcoin Core does for unknown methods.
pub struct MockTransport {
    routes: Vec<Route>,
    calls: Mutex<Vec<(String, Vec<Value>)>>,
}

impl MockTransport {
    pub fn builder() -> MockTransportBuilder {
        MockTransportBuilder { routes: Vec::new() }
    }

    /// Every call seen so far, in order.
    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().expect("call log poisoned").clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }
}

pub struct MockTransportBuilder {
    routes: Vec<Route>,
}

impl MockTransportBuilder {
    fn route(mut self, method: &str, first_param: Option<Value>, reply: Reply) -> Self {
        self.routes.push(Route {
            method: method.to_owned(),
            first_param,
            reply,
        });
        self
    }

    pub fn result(self, method: &str, first_param: Option<Value>, value: Value) -> Self {
        self.route(method, first_param, Reply::Result(value))
    }

    pub fn server_error(
        self,
        method: &str,
        first_param: Option<Value>,
        code: i64,
        message: &str,
    ) -> Self {
        self.route(
            method,
            first_param,
            Reply::ServerError {
                code,
                message: message.to_owned(),
            },
        )
    }

    pub fn invalid_response(self, method: &str, first_param: Option<Value>, detail: &str) -> Self {
        self.route(method, first_param, Reply::InvalidResponse(detail.to_owned()))
    }

    pub fn http_status(self, method: &str, first_param: Option<Value>, status: u16) -> Self {
        self.route(method, first_param, Reply::HttpStatus(status))
    }

    pub fn build(self) -> Arc<MockTransport> {
        Arc::new(MockTransport {
            routes: self.routes,
            calls: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, method: &str, params: &[Value]) -> Result<Value, RpcError> {
        self.calls
            .lock()
            .expect("call log poisoned")
            .push((method.to_owned(), params.to_vec()));

        match self.routes.iter().find(|route| route.matches(method, params)) {
            Some(route) => route.reply.produce(),
            None => Err(RpcError::ServerError {
                code: -32601,
                message: "Method not found".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn first_matching_route_wins() {
        let mock = MockTransport::builder()
            .result("getrawtransaction", Some(json!("a")), json!("first"))
            .result("getrawtransaction", None, json!("fallback"))
            .build();

        let specific = mock.execute("getrawtransaction", &[json!("a")]).await;
        let other = mock.execute("getrawtransaction", &[json!("z")]).await;
        assert_eq!(specific.expect("routed"), json!("first"));
        assert_eq!(other.expect("routed"), json!("fallback"));
        assert_eq!(mock.methods().len(), 2);
    }

    #[tokio::test]
    async fn unrouted_method_is_method_not_found() {
        let mock = MockTransport::builder().build();
        let err = mock
            .execute("getchaintips", &[])
            .await
            .expect_err("no route");
        assert!(matches!(err, RpcError::ServerError { code: -32601, .. }));
    }

    #[tokio::test]
    async fn transport_failures_are_replayed() {
        let mock = MockTransport::builder()
            .http_status("getblockcount", None, 401)
            .invalid_response("getbestblockhash", None, "truncated body")
            .build();

        for _ in 0..2 {
            let err = mock.execute("getblockcount", &[]).await.expect_err("401");
            assert!(matches!(err, RpcError::HttpStatus { status: 401 }));
        }
        let err = mock
            .execute("getbestblockhash", &[])
            .await
            .expect_err("bad body");
        assert!(matches!(err, RpcError::InvalidResponse(_)));
    }
}
