//! Session-scoped errors.

use thiserror::Error;

use crate::protocol::DecodeError;

/// Why a session ended abnormally. Never escapes the session's task.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Backend refused or failed the connection.
    #[error("failed to connect to backend {address}: {source}")]
    BackendDial {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Backend did not accept within the configured timeout.
    #[error("backend {address} did not accept within {timeout_ms} ms")]
    BackendDialTimeout { address: String, timeout_ms: u64 },

    /// Client sent something that is not valid protocol.
    #[error("failed to decode client command: {0}")]
    Decode(#[from] DecodeError),

    /// Read or write failure on either leg.
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),
}

impl SessionError {
    /// True for failures to establish the backend leg.
    pub fn is_dial_failure(&self) -> bool {
        matches!(
            self,
            SessionError::BackendDial { .. } | SessionError::BackendDialTimeout { .. }
        )
    }
}
