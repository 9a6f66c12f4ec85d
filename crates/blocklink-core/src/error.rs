use std::fmt;

/// Failures raised while talking to the node over JSON-RPC.
///
/// Transport failures (`Transport`, `HttpStatus`) never produced a usable
/// envelope. `ServerError` means the node answered and reported an error in
/// the envelope's `error` field. The two are kept apart so callers can decide
/// whether retrying makes sense.
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("unexpected HTTP status {status} from RPC endpoint")]
    HttpStatus { status: u16 },

    #[error("invalid JSON-RPC response: {0}")]
    InvalidResponse(String),

    #[error("{code}: {message}")]
    ServerError { code: i64, message: String },
}

/// The natural key of a request, attached to failures as context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKey {
    Height(u32),
    Hash(String),
    Txid(String),
    Block { height: u32, hash: String },
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Height(height) => write!(f, "height {height}"),
            Self::Hash(hash) => write!(f, "hash {hash}"),
            Self::Txid(txid) => write!(f, "txid {txid}"),
            Self::Block { height, hash } => write!(f, "height {height} hash {hash}"),
        }
    }
}

/// Coarse failure category, stable across context layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    Protocol,
    Config,
}

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("{key}: {source}")]
    Context {
        key: RequestKey,
        #[source]
        source: Box<CoreError>,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("unrecognized chain `{0}` reported by node")]
    UnknownChain(String),
}

impl CoreError {
    /// Annotate this error with the key of the request that produced it.
    pub fn with_key(self, key: RequestKey) -> Self {
        Self::Context {
            key,
            source: Box::new(self),
        }
    }

    /// The error with all context layers peeled off.
    pub fn root(&self) -> &CoreError {
        let mut current = self;
        while let Self::Context { source, .. } = current {
            current = source;
        }
        current
    }

    /// The outermost request key, if any layer carries one.
    pub fn request_key(&self) -> Option<&RequestKey> {
        match self {
            Self::Context { key, .. } => Some(key),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.root() {
            Self::Rpc(RpcError::Transport(_) | RpcError::HttpStatus { .. }) => ErrorKind::Transport,
            Self::Rpc(RpcError::InvalidResponse(_)) | Self::Decode(_) => ErrorKind::Decode,
            Self::Rpc(RpcError::ServerError { .. }) => ErrorKind::Protocol,
            Self::Config(_) | Self::UnknownChain(_) => ErrorKind::Config,
            Self::Context { .. } => unreachable!("root() strips context layers"),
        }
    }

    /// Code and message reported by the node, for protocol-level failures.
    pub fn protocol_error(&self) -> Option<(i64, &str)> {
        match self.root() {
            Self::Rpc(RpcError::ServerError { code, message }) => Some((*code, message.as_str())),
            _ => None,
        }
    }

    /// `true` when the request never produced a usable envelope, so an
    /// identical request may succeed later. The core itself never retries.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self.root(), Self::Rpc(RpcError::Transport(e)) if e.is_timeout())
    }
}

pub(crate) trait ResultExt<T> {
    fn with_key(self, key: impl FnOnce() -> RequestKey) -> Result<T, CoreError>;
}

impl<T, E: Into<CoreError>> ResultExt<T> for Result<T, E> {
    fn with_key(self, key: impl FnOnce() -> RequestKey) -> Result<T, CoreError> {
        self.map_err(|e| e.into().with_key(key()))
    }
}
