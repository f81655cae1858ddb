//! Decode-time error definitions.

use thiserror::Error;

/// Errors produced while decoding a message from the client stream.
///
/// A clean end of stream before a message starts is not an error; see
/// [`Decoder::read_command`](super::Decoder::read_command).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Read failure, including a stream that ends in the middle of a message.
    #[error("transport error: {0}")]
    Io(#[from] std::io::Error),

    /// Count or length field is not a plain ASCII decimal, or is out of range.
    #[error("malformed length: {0:?}")]
    MalformedLength(String),

    /// Request array announced fewer than one element.
    #[error("invalid argument count: {0}")]
    InvalidArgumentCount(i64),

    /// Leading byte does not name a supported message type.
    #[error("unknown message type: 0x{0:02x}")]
    UnknownMessageType(u8),

    /// Request array element that is not a bulk string.
    #[error("expected bulk string inside request, found 0x{0:02x}")]
    ExpectedBulkString(u8),

    /// Line or payload not followed by `\r\n`.
    #[error("missing CRLF terminator")]
    MissingTerminator,
}

impl DecodeError {
    /// Stable label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DecodeError::Io(_) => "transport",
            DecodeError::MalformedLength(_) => "malformed_length",
            DecodeError::InvalidArgumentCount(_) => "invalid_argument_count",
            DecodeError::UnknownMessageType(_) => "unknown_message_type",
            DecodeError::ExpectedBulkString(_) => "expected_bulk_string",
            DecodeError::MissingTerminator => "missing_terminator",
        }
    }

    /// True when the stream ended in the middle of a message.
    pub fn is_truncated(&self) -> bool {
        matches!(self, DecodeError::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof)
    }
}
