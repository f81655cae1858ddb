//! Buffered byte reader over a connection.
//!
//! Exposes exactly what the decoder needs: one byte, one CRLF-terminated
//! line, or an exact number of bytes. Short reads surface as
//! `UnexpectedEof`; nothing is padded.

use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

/// Longest line accepted for simple strings and length headers (64 KiB).
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Upper bound on up-front allocation for a payload; larger payloads grow as they arrive.
const PREALLOC_LIMIT: usize = 64 * 1024;

/// Reads framing units from a buffered async stream.
#[derive(Debug)]
pub struct ByteReader<R> {
    inner: R,
}

impl<R: AsyncBufRead + Unpin> ByteReader<R> {
    /// Wrap a buffered stream.
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    /// Read one byte. Returns `None` if the stream is already at EOF.
    pub async fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let buf = self.inner.fill_buf().await?;
        let Some(&byte) = buf.first() else {
            return Ok(None);
        };
        self.inner.consume(1);
        Ok(Some(byte))
    }

    /// Read exactly `len` bytes.
    pub async fn read_exact(&mut self, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(len.min(PREALLOC_LIMIT));
        (&mut self.inner)
            .take(len as u64)
            .read_to_end(&mut buf)
            .await?;

        if buf.len() < len {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("expected {} bytes, stream ended after {}", len, buf.len()),
            ));
        }
        Ok(buf)
    }

    /// Read up to and including the next `\n`.
    ///
    /// The returned bytes keep their terminator so the caller can validate
    /// it and account for every consumed byte.
    pub async fn read_line(&mut self) -> io::Result<Vec<u8>> {
        let mut line = Vec::new();
        (&mut self.inner)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut line)
            .await?;

        if line.last() != Some(&b'\n') {
            if line.len() >= MAX_LINE_BYTES {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("line exceeds {} bytes", MAX_LINE_BYTES),
                ));
            }
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended before line terminator",
            ));
        }
        Ok(line)
    }
}
