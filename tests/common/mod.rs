//! Shared utilities for proxy integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use resp_proxy::config::ProxyConfig;
use resp_proxy::lifecycle::Shutdown;
use resp_proxy::net::{ConnectionTracker, Listener, ListenerError};
use resp_proxy::observability::{CommandRecord, CommandSink};
use resp_proxy::ProxyServer;

/// Upper bound for any single wait in these tests.
pub const WAIT: Duration = Duration::from_secs(5);

/// Sink that forwards every record to a channel.
pub struct CapturingSink {
    tx: mpsc::UnboundedSender<CommandRecord>,
}

impl CapturingSink {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<CommandRecord>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

impl CommandSink for CapturingSink {
    fn record(&self, record: &CommandRecord) {
        let _ = self.tx.send(record.clone());
    }
}

/// Receive the next record or fail the test.
pub async fn next_record(rx: &mut mpsc::UnboundedReceiver<CommandRecord>) -> CommandRecord {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for command record")
        .expect("sink channel closed")
}

/// Backend that collects everything each connection sends until EOF.
///
/// One `Vec<u8>` is delivered per closed connection.
pub async fn start_recording_backend() -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut received = Vec::new();
                let _ = socket.read_to_end(&mut received).await;
                let _ = tx.send(received);
            });
        }
    });

    (addr, rx)
}

/// Backend that writes every received byte straight back.
pub async fn start_echo_backend() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let (mut read, mut write) = socket.into_split();
                let _ = tokio::io::copy(&mut read, &mut write).await;
                let _ = write.shutdown().await;
            });
        }
    });

    addr
}

/// An address nothing is listening on.
pub async fn unreachable_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// A proxy running on an ephemeral port.
pub struct TestProxy {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
    pub handle: JoinHandle<Result<(), ListenerError>>,
}

/// Start a proxy in front of `backend`, recording commands into `sink`.
pub async fn start_proxy(backend: SocketAddr, sink: Arc<dyn CommandSink>) -> TestProxy {
    let mut config = ProxyConfig::default();
    config.backend.address = backend.to_string();
    config.backend.connect_timeout_ms = 1000;

    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = tcp.local_addr().unwrap();
    let listener = Listener::from_tcp(tcp, config.listener.max_connections);

    let shutdown = Shutdown::new();
    let server = ProxyServer::with_sink(config, sink);
    let tracker = server.tracker();
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    TestProxy {
        addr,
        shutdown,
        tracker,
        handle,
    }
}

/// Build a RESP request array from string parts.
pub fn request(parts: &[&str]) -> Vec<u8> {
    let mut out = format!("*{}\r\n", parts.len()).into_bytes();
    for part in parts {
        out.extend_from_slice(format!("${}\r\n{}\r\n", part.len(), part).as_bytes());
    }
    out
}
