//! Backend → client direction: unmediated byte copy.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::net::ConnectionId;
use crate::observability::metrics;

use super::error::SessionError;

/// Read buffer for one relay step.
const RELAY_CHUNK: usize = 16 * 1024;

/// Copy backend bytes to the client until EOF, error, or `closing` fires.
///
/// Bytes are counted as each chunk is written, so a copy cut short by
/// `closing` still reports what it relayed. The client write half is shut
/// down on the way out.
pub(super) async fn backend_to_client<R, W>(
    connection_id: ConnectionId,
    mut backend_read: R,
    mut client_write: W,
    mut closing: watch::Receiver<bool>,
) -> Result<(), SessionError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut buf = vec![0u8; RELAY_CHUNK];
    let mut relayed: u64 = 0;

    let result = loop {
        let read = tokio::select! {
            biased;
            _ = closing.wait_for(|closed| *closed) => {
                tracing::trace!(%connection_id, relayed, "backend→client: session closing");
                break Ok(());
            }
            read = backend_read.read(&mut buf) => read,
        };

        let n = match read {
            Ok(0) => {
                tracing::debug!(%connection_id, relayed, "backend→client: backend closed connection");
                break Ok(());
            }
            Ok(n) => n,
            Err(e) => break Err(SessionError::Transport(e)),
        };

        if let Err(e) = client_write.write_all(&buf[..n]).await {
            break Err(SessionError::Transport(e));
        }
        relayed += n as u64;
        metrics::record_bytes_relayed(metrics::OUTBOUND, n as u64);
    };

    let _ = client_write.shutdown().await;
    result
}
