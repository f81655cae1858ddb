//! Proxy server: accept loop and session dispatch.
//!
//! # Responsibilities
//! - Bind the client-facing listener
//! - Spawn one session per accepted connection
//! - Stop accepting when shutdown is signalled
//! - Log session outcomes; nothing from a session propagates further

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::config::ProxyConfig;
use crate::net::{ConnectionPermit, ConnectionTracker, Listener, ListenerError};
use crate::observability::metrics;
use crate::observability::{CommandSink, TracingSink};
use crate::session::Session;

/// The proxy server.
pub struct ProxyServer {
    config: ProxyConfig,
    sink: Arc<dyn CommandSink>,
    tracker: ConnectionTracker,
}

impl ProxyServer {
    /// Create a server that records commands through `tracing`.
    pub fn new(config: ProxyConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// Create a server with a custom command sink.
    pub fn with_sink(config: ProxyConfig, sink: Arc<dyn CommandSink>) -> Self {
        Self {
            config,
            sink,
            tracker: ConnectionTracker::new(),
        }
    }

    /// Handle on the live-session count, for draining after shutdown.
    pub fn tracker(&self) -> ConnectionTracker {
        self.tracker.clone()
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn start(self, shutdown: broadcast::Receiver<()>) -> Result<(), ListenerError> {
        let listener = Listener::bind(&self.config.listener).await?;
        self.run(listener, shutdown).await
    }

    /// Serve on an already bound listener until shutdown.
    ///
    /// Accept errors are logged and the loop continues. Sessions already
    /// running are left to finish on their own.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        tracing::info!(
            address = ?listener.local_addr().ok(),
            backend = %self.config.backend.address,
            "Proxy started"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!(
                        active_sessions = self.tracker.active_count(),
                        "Shutdown signal received, no longer accepting"
                    );
                    break;
                }
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer_addr, permit)) => self.spawn_session(stream, peer_addr, permit),
                    Err(ListenerError::Accept(e)) => {
                        metrics::record_accept_error();
                        tracing::error!(error = %e, "Failed to accept connection");
                    }
                    Err(e) => return Err(e),
                },
            }
        }

        Ok(())
    }

    fn spawn_session(&self, stream: TcpStream, peer_addr: SocketAddr, permit: ConnectionPermit) {
        let guard = self.tracker.track();
        let connection_id = guard.id();
        let session = Session::new(
            connection_id,
            peer_addr,
            stream,
            self.config.backend.clone(),
            Arc::clone(&self.sink),
        );

        tokio::spawn(async move {
            let _permit = permit;
            let _guard = guard;
            match session.run().await {
                Ok(()) => {}
                Err(e) if e.is_dial_failure() => {
                    tracing::error!(%connection_id, %peer_addr, error = %e, "Failed to connect to backend");
                }
                Err(e) => {
                    tracing::error!(%connection_id, %peer_addr, error = %e, "Session ended with error");
                }
            }
        });
    }
}
