//! JSON-RPC transport over HTTP.
//!
//! Implements [`Transport`](super::Transport) with `reqwest`: one pooled
//! keep-alive client, basic or cookie-file auth, an optional request rate
//! limit, and envelope decoding that keeps node-reported errors apart from
//! transport failures.

mod connection;
mod protocol;
mod transport;

pub use transport::HttpTransport;
