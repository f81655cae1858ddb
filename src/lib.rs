//! Transparent RESP forwarding proxy with per-command observability.
//!
//! Every client request is decoded just far enough to be classified and
//! recorded, then its original bytes are forwarded to the backend unchanged.
//! Backend replies are relayed back byte-for-byte.

pub mod classify;
pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod protocol;
pub mod server;
pub mod session;

pub use config::ProxyConfig;
pub use lifecycle::Shutdown;
pub use server::ProxyServer;
