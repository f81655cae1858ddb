//! Streaming RESP decoder.
//!
//! Reads one message per call and records every consumed byte so the
//! message can be forwarded to the backend without re-encoding.

use bytes::{BufMut, BytesMut};
use tokio::io::AsyncBufRead;

use super::command::{Command, CommandKind};
use super::error::DecodeError;
use super::reader::ByteReader;

/// Largest bulk payload accepted (512 MiB, the usual server-side limit).
pub const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;

/// Largest request array accepted.
pub const MAX_ARRAY_LEN: i64 = 1024 * 1024;

const CRLF: &[u8] = b"\r\n";

/// Decodes messages from a buffered stream.
#[derive(Debug)]
pub struct Decoder<R> {
    reader: ByteReader<R>,
}

impl<R: AsyncBufRead + Unpin> Decoder<R> {
    /// Create a decoder over a buffered stream.
    pub fn new(inner: R) -> Self {
        Self {
            reader: ByteReader::new(inner),
        }
    }

    /// Read the next complete message.
    ///
    /// Returns `Ok(None)` when the stream ends cleanly between messages.
    /// A stream that ends inside a message is an error.
    pub async fn read_command(&mut self) -> Result<Option<Command>, DecodeError> {
        let Some(tag) = self.reader.read_byte().await? else {
            return Ok(None);
        };

        let mut raw = BytesMut::with_capacity(64);
        raw.put_u8(tag);

        let (kind, name, args) = match tag {
            b'*' => {
                let (name, args) = self.read_request(&mut raw).await?;
                (CommandKind::Request, name, args)
            }
            b'$' => match self.read_bulk(&mut raw).await? {
                Some(payload) => (CommandKind::BulkString, payload, Vec::new()),
                None => (CommandKind::NilBulk, "nil".to_string(), Vec::new()),
            },
            b'+' => (CommandKind::SimpleString, self.read_text(&mut raw).await?, Vec::new()),
            b'-' => {
                let text = self.read_text(&mut raw).await?;
                (CommandKind::Error, format!("ERROR: {}", text), Vec::new())
            }
            b':' => (CommandKind::Integer, self.read_text(&mut raw).await?, Vec::new()),
            other => return Err(DecodeError::UnknownMessageType(other)),
        };

        Ok(Some(Command {
            kind,
            name,
            args,
            raw_bytes: raw.freeze(),
        }))
    }

    async fn read_request(
        &mut self,
        raw: &mut BytesMut,
    ) -> Result<(String, Vec<String>), DecodeError> {
        let count = self.read_length(raw).await?;
        if count < 1 {
            return Err(DecodeError::InvalidArgumentCount(count));
        }
        if count > MAX_ARRAY_LEN {
            return Err(DecodeError::MalformedLength(format!(
                "array of {} elements exceeds limit of {}",
                count, MAX_ARRAY_LEN
            )));
        }

        let name = self.read_element(raw).await?;
        let mut args = Vec::with_capacity((count - 1).min(64) as usize);
        for _ in 1..count {
            args.push(self.read_element(raw).await?);
        }
        Ok((name, args))
    }

    /// One `$<len>\r\n<payload>\r\n` inside a request. Nil is not allowed here.
    async fn read_element(&mut self, raw: &mut BytesMut) -> Result<String, DecodeError> {
        let tag = self.reader.read_byte().await?.ok_or_else(truncated)?;
        raw.put_u8(tag);
        if tag != b'$' {
            return Err(DecodeError::ExpectedBulkString(tag));
        }

        let len = self.read_length(raw).await?;
        if len < 0 {
            return Err(DecodeError::MalformedLength(format!(
                "negative bulk length {} inside request",
                len
            )));
        }
        self.read_payload(len, raw).await
    }

    /// Top-level bulk string; `None` for `$-1`.
    async fn read_bulk(&mut self, raw: &mut BytesMut) -> Result<Option<String>, DecodeError> {
        let len = self.read_length(raw).await?;
        match len {
            -1 => Ok(None),
            len if len < 0 => Err(DecodeError::MalformedLength(format!(
                "bulk length {}",
                len
            ))),
            len => self.read_payload(len, raw).await.map(Some),
        }
    }

    async fn read_payload(&mut self, len: i64, raw: &mut BytesMut) -> Result<String, DecodeError> {
        if len > MAX_BULK_LEN {
            return Err(DecodeError::MalformedLength(format!(
                "bulk length {} exceeds limit of {}",
                len, MAX_BULK_LEN
            )));
        }

        let payload = self.reader.read_exact(len as usize).await?;
        raw.extend_from_slice(&payload);

        let terminator = self.reader.read_exact(CRLF.len()).await?;
        raw.extend_from_slice(&terminator);
        if terminator != CRLF {
            return Err(DecodeError::MissingTerminator);
        }

        Ok(String::from_utf8_lossy(&payload).into_owned())
    }

    async fn read_length(&mut self, raw: &mut BytesMut) -> Result<i64, DecodeError> {
        let line = self.read_line(raw).await?;
        parse_decimal(&line)
    }

    async fn read_text(&mut self, raw: &mut BytesMut) -> Result<String, DecodeError> {
        let line = self.read_line(raw).await?;
        Ok(String::from_utf8_lossy(&line).into_owned())
    }

    /// Line content without its CRLF. The full line is appended to `raw`.
    async fn read_line(&mut self, raw: &mut BytesMut) -> Result<Vec<u8>, DecodeError> {
        let mut line = self.reader.read_line().await?;
        raw.extend_from_slice(&line);
        if !line.ends_with(CRLF) {
            return Err(DecodeError::MissingTerminator);
        }
        line.truncate(line.len() - CRLF.len());
        Ok(line)
    }
}

fn truncated() -> DecodeError {
    DecodeError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "stream ended inside request",
    ))
}

/// Strict ASCII decimal: optional leading `-`, then one or more digits.
fn parse_decimal(digits: &[u8]) -> Result<i64, DecodeError> {
    let malformed = || DecodeError::MalformedLength(String::from_utf8_lossy(digits).into_owned());

    let (negative, body) = match digits.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, digits),
    };
    if body.is_empty() || !body.iter().all(u8::is_ascii_digit) {
        return Err(malformed());
    }

    let mut value: i64 = 0;
    for &d in body {
        value = value
            .checked_mul(10)
            .and_then(|v| v.checked_add(i64::from(d - b'0')))
            .ok_or_else(malformed)?;
    }
    Ok(if negative { -value } else { value })
}
