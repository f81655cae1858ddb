//! Client → backend direction: decode, classify, record, forward.

use std::sync::Arc;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::watch;

use crate::classify::{classify, metric_label};
use crate::net::ConnectionId;
use crate::observability::metrics;
use crate::observability::{CommandRecord, CommandSink};
use crate::protocol::{Command, Decoder};

use super::error::SessionError;

/// Decode commands from the client and forward their raw bytes to the backend.
///
/// Ends on client EOF, on any decode or write error, or when `closing` fires.
/// The backend write half is shut down on the way out.
pub(super) async fn client_to_backend(
    connection_id: ConnectionId,
    client_read: OwnedReadHalf,
    mut backend_write: OwnedWriteHalf,
    sink: Arc<dyn CommandSink>,
    mut closing: watch::Receiver<bool>,
) -> Result<(), SessionError> {
    let mut decoder = Decoder::new(BufReader::new(client_read));

    let result = loop {
        let next = tokio::select! {
            biased;
            _ = closing.wait_for(|closed| *closed) => {
                tracing::trace!(%connection_id, "client→backend: session closing");
                break Ok(());
            }
            next = decoder.read_command() => next,
        };

        match next {
            Ok(Some(command)) => {
                observe(connection_id, &command, sink.as_ref());
                if let Err(e) = forward(&mut backend_write, &command).await {
                    break Err(SessionError::Transport(e));
                }
            }
            Ok(None) => {
                tracing::debug!(%connection_id, "client→backend: client closed connection");
                break Ok(());
            }
            Err(e) => {
                metrics::record_decode_error(e.kind());
                break Err(SessionError::Decode(e));
            }
        }
    };

    let _ = backend_write.shutdown().await;
    result
}

fn observe(connection_id: ConnectionId, command: &Command, sink: &dyn CommandSink) {
    metrics::record_command(metric_label(&command.name));
    sink.record(&CommandRecord {
        connection_id,
        command: command.name.clone(),
        fields: classify(command),
    });
}

async fn forward(backend: &mut OwnedWriteHalf, command: &Command) -> std::io::Result<()> {
    backend.write_all(&command.raw_bytes).await?;
    backend.flush().await?;
    metrics::record_bytes_relayed(metrics::INBOUND, command.wire_len() as u64);
    Ok(())
}
