//! Decoded protocol messages.

use bytes::Bytes;

/// Message type, selected by the leading byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    /// `*` array of bulk strings (a client request).
    Request,
    /// `$` bulk string with a payload.
    BulkString,
    /// `+` simple string.
    SimpleString,
    /// `-` error line.
    Error,
    /// `:` integer line.
    Integer,
    /// `$-1` nil bulk string.
    NilBulk,
}

/// A single decoded message together with the exact bytes it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub kind: CommandKind,
    /// Verb for requests, payload for scalar messages.
    pub name: String,
    /// Request arguments after the verb. Empty for every other kind.
    pub args: Vec<String>,
    /// Every byte consumed for this message, delimiters included.
    pub raw_bytes: Bytes,
}

impl Command {
    /// Whether this message is a client request (`*` array).
    pub fn is_request(&self) -> bool {
        self.kind == CommandKind::Request
    }

    /// Number of bytes this message occupied on the wire.
    pub fn wire_len(&self) -> usize {
        self.raw_bytes.len()
    }
}
