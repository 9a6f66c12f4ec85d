use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::{header, Url};
use tracing::{debug, trace};

use crate::config::RpcConfig;
use crate::error::{CoreError, RpcError};

use super::super::Transport;
use super::connection::{parse_endpoint, resolve_auth, Credentials};
use super::protocol::{JsonRpcRequest, JsonRpcResponse};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// JSON-RPC transport over HTTP(S) with basic auth.
///
/// One pooled `reqwest::Client` is shared by every call, so idle keep-alive
/// connections are reused across requests and across tasks. The response
/// body is always read to the end before the envelope is inspected, which
/// returns the connection to the pool whatever the outcome.
pub struct HttpTransport {
    client: reqwest::Client,
    url: Url,
    auth: Option<Credentials>,
    limiter: Option<DirectRateLimiter>,
    next_id: AtomicU64,
}

impl HttpTransport {
    /// Build a transport from `config`.
    ///
    /// Authentication precedence:
    /// 1. explicit `user` + `pass`
    /// 2. cookie file (`username:password`)
    /// 3. no auth
    pub fn new(config: &RpcConfig) -> Result<Self, CoreError> {
        let url = parse_endpoint(&config.url)?;
        let auth = resolve_auth(
            config.user.as_deref(),
            config.pass.as_deref(),
            config.cookie_file.as_deref(),
        )?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.timeout)
            .pool_max_idle_per_host(config.max_idle_connections)
            .tcp_keepalive(config.tcp_keepalive)
            .tcp_nodelay(true)
            .build()
            .map_err(|e| CoreError::Config(format!("build HTTP client: {e}")))?;

        let limiter = match config.requests_per_second {
            None => None,
            Some(limit) => {
                let limit = NonZeroU32::new(limit).ok_or_else(|| {
                    CoreError::Config("requests_per_second must be at least 1".to_owned())
                })?;
                Some(RateLimiter::direct(Quota::per_second(limit)))
            }
        };

        Ok(Self {
            client,
            url,
            auth,
            limiter,
            next_id: AtomicU64::new(initial_request_id()),
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    async fn wait_for_rate_limit(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(
        &self,
        method: &str,
        params: &[serde_json::Value],
    ) -> Result<serde_json::Value, RpcError> {
        self.wait_for_rate_limit().await;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        debug!(
            rpc.id = id,
            rpc.method = method,
            rpc.params = params.len(),
            "rpc call"
        );
        let req = JsonRpcRequest {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        let mut builder = self
            .client
            .post(self.url.clone())
            .header(header::CONTENT_TYPE, "application/json")
            .json(&req);
        if let Some(auth) = &self.auth {
            builder = builder.basic_auth(&auth.user, Some(&auth.pass));
        }

        let response = builder.send().await.map_err(RpcError::Transport)?;
        let status = response.status();

        // Drain the whole body before looking at it, on every path.
        let body = response.bytes().await.map_err(RpcError::Transport)?;
        debug!(rpc.id = id, rpc.method = method, %status, body_len = body.len(), "rpc response");
        trace!(
            rpc.id = id,
            rpc.method = method,
            body = %String::from_utf8_lossy(&body),
            "rpc response body"
        );

        // Bitcoin Core reports RPC errors with HTTP 500 and a valid envelope,
        // so on a non-2xx status only an envelope with a populated error wins.
        match JsonRpcResponse::decode(&body) {
            Ok(envelope) if status.is_success() || envelope.has_error() => envelope.into_result(),
            Err(e) if status.is_success() => Err(RpcError::InvalidResponse(format!(
                "decode JSON-RPC response: {e}; body={}",
                String::from_utf8_lossy(&body)
            ))),
            _ => Err(RpcError::HttpStatus {
                status: status.as_u16(),
            }),
        }
    }
}

fn initial_request_id() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(1)
}
