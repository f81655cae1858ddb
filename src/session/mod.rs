//! Per-connection proxy session.
//!
//! # Data Flow
//! ```text
//! client ──▶ inbound.rs  (decode → classify → CommandSink → raw bytes) ──▶ backend
//! client ◀── outbound.rs (raw byte copy)                               ◀── backend
//! ```
//!
//! # Design Decisions
//! - Backend is dialed before any relaying; a failed dial closes the client
//! - Each direction owns one read half and one write half, nothing else is shared
//! - Both directions run in a `JoinSet` owned by the session; the first to end
//!   signals the other, and both are joined before the session reports `Closed`
//! - Errors end the session only; they never reach the listener

mod error;
mod inbound;
mod outbound;
mod state;

pub use error::SessionError;
pub use state::SessionState;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::BackendConfig;
use crate::net::ConnectionId;
use crate::observability::metrics;
use crate::observability::CommandSink;

/// One client connection paired with one backend connection.
pub struct Session {
    id: ConnectionId,
    peer_addr: SocketAddr,
    client: TcpStream,
    backend: BackendConfig,
    sink: Arc<dyn CommandSink>,
    state: watch::Sender<SessionState>,
}

impl Session {
    /// Create a session for an accepted client. Nothing is dialed yet.
    pub fn new(
        id: ConnectionId,
        peer_addr: SocketAddr,
        client: TcpStream,
        backend: BackendConfig,
        sink: Arc<dyn CommandSink>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Open);
        Self {
            id,
            peer_addr,
            client,
            backend,
            sink,
            state,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Observe state transitions. Stays readable after [`run`](Self::run) consumes the session.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Dial the backend and relay until either side ends.
    ///
    /// Returns once both directions have stopped and both connections are released.
    pub async fn run(self) -> Result<(), SessionError> {
        let Session {
            id,
            peer_addr,
            client,
            backend,
            sink,
            state,
        } = self;

        tracing::info!(connection_id = %id, peer_addr = %peer_addr, "New connection established");

        let backend_stream = match dial(&backend).await {
            Ok(stream) => stream,
            Err(e) => {
                metrics::record_dial_failure();
                drop(client);
                transition(&state, id, SessionState::Closed);
                return Err(e);
            }
        };
        if let Err(e) = client.set_nodelay(true) {
            tracing::debug!(connection_id = %id, error = %e, "Failed to set TCP_NODELAY on client");
        }
        if let Err(e) = backend_stream.set_nodelay(true) {
            tracing::debug!(connection_id = %id, error = %e, "Failed to set TCP_NODELAY on backend");
        }

        transition(&state, id, SessionState::Relaying);

        let (client_read, client_write) = client.into_split();
        let (backend_read, backend_write) = backend_stream.into_split();
        let (closing_tx, closing_rx) = watch::channel(false);

        let mut directions = JoinSet::new();
        directions.spawn(inbound::client_to_backend(
            id,
            client_read,
            backend_write,
            sink,
            closing_rx.clone(),
        ));
        directions.spawn(outbound::backend_to_client(
            id,
            backend_read,
            client_write,
            closing_rx,
        ));

        let mut first_error = None;
        while let Some(joined) = directions.join_next().await {
            if *state.borrow() == SessionState::Relaying {
                transition(&state, id, SessionState::Closing);
                closing_tx.send_replace(true);
            }
            match joined {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_error.get_or_insert(e);
                }
                Err(join_error) => {
                    tracing::error!(connection_id = %id, error = %join_error, "Relay task failed");
                }
            }
        }

        transition(&state, id, SessionState::Closed);
        tracing::info!(connection_id = %id, peer_addr = %peer_addr, "Connection closed");

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

async fn dial(backend: &BackendConfig) -> Result<TcpStream, SessionError> {
    let timeout = Duration::from_millis(backend.connect_timeout_ms);
    match tokio::time::timeout(timeout, TcpStream::connect(backend.address.as_str())).await {
        Ok(Ok(stream)) => Ok(stream),
        Ok(Err(source)) => Err(SessionError::BackendDial {
            address: backend.address.clone(),
            source,
        }),
        Err(_) => Err(SessionError::BackendDialTimeout {
            address: backend.address.clone(),
            timeout_ms: backend.connect_timeout_ms,
        }),
    }
}

fn transition(state: &watch::Sender<SessionState>, id: ConnectionId, next: SessionState) {
    let previous = state.send_replace(next);
    tracing::trace!(connection_id = %id, from = %previous, to = %next, "Session state");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    struct NullSink;

    impl CommandSink for NullSink {
        fn record(&self, _record: &crate::observability::CommandRecord) {}
    }

    async fn client_pair() -> (TcpStream, TcpStream, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let outside = TcpStream::connect(addr).await.unwrap();
        let (inside, peer) = listener.accept().await.unwrap();
        (outside, inside, peer)
    }

    fn backend_config(address: String) -> BackendConfig {
        BackendConfig {
            address,
            connect_timeout_ms: 1000,
        }
    }

    #[tokio::test]
    async fn dial_failure_closes_client() {
        // Bind then drop to get a port with nothing listening.
        let unused = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let dead_addr = unused.local_addr().unwrap().to_string();
        drop(unused);

        let (mut outside, inside, peer) = client_pair().await;
        let session = Session::new(
            ConnectionId::new(),
            peer,
            inside,
            backend_config(dead_addr),
            Arc::new(NullSink),
        );
        let states = session.subscribe_state();
        assert_eq!(session.state(), SessionState::Open);

        let err = session.run().await.unwrap_err();
        assert!(err.is_dial_failure());
        assert!(states.borrow().is_closed());

        let mut buf = [0u8; 1];
        assert_eq!(outside.read(&mut buf).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn relays_until_client_closes() {
        let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let backend_addr = backend.local_addr().unwrap().to_string();

        let (mut outside, inside, peer) = client_pair().await;
        let session = Session::new(
            ConnectionId::new(),
            peer,
            inside,
            backend_config(backend_addr),
            Arc::new(NullSink),
        );
        let mut states = session.subscribe_state();
        let running = tokio::spawn(session.run());

        let (mut backend_conn, _) = backend.accept().await.unwrap();
        states.wait_for(|s| *s == SessionState::Relaying).await.unwrap();

        outside.write_all(b"*1\r\n$4\r\nPING\r\n").await.unwrap();
        let mut received = [0u8; 14];
        backend_conn.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"*1\r\n$4\r\nPING\r\n");

        backend_conn.write_all(b"+PONG\r\n").await.unwrap();
        let mut reply = [0u8; 7];
        outside.read_exact(&mut reply).await.unwrap();
        assert_eq!(&reply, b"+PONG\r\n");

        drop(outside);
        running.await.unwrap().unwrap();
        assert_eq!(*states.borrow(), SessionState::Closed);

        let mut rest = Vec::new();
        backend_conn.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty());
    }

    #[tokio::test]
    async fn decode_error_ends_session() {
        let backend = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let backend_addr = backend.local_addr().unwrap().to_string();

        let (mut outside, inside, peer) = client_pair().await;
        let session = Session::new(
            ConnectionId::new(),
            peer,
            inside,
            backend_config(backend_addr),
            Arc::new(NullSink),
        );
        let running = tokio::spawn(session.run());
        let (mut backend_conn, _) = backend.accept().await.unwrap();

        outside.write_all(b"*0\r\n").await.unwrap();

        let err = running.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            SessionError::Decode(crate::protocol::DecodeError::InvalidArgumentCount(0))
        ));

        let mut rest = Vec::new();
        backend_conn.read_to_end(&mut rest).await.unwrap();
        assert!(rest.is_empty(), "invalid command must not be forwarded");
    }
}
