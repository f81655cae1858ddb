//! RESP protocol subsystem.
//!
//! # Data Flow
//! ```text
//! client socket (AsyncBufRead)
//!     → reader.rs (single bytes, CRLF lines, exact-length payloads)
//!     → decoder.rs (one message per call, raw bytes accumulated)
//!     → Command { kind, name, args, raw_bytes }
//! ```
//!
//! # Wire Subset
//! - `*<n>\r\n` followed by `n` bulk strings (request, first element is the verb)
//! - `$<len>\r\n<payload>\r\n` or `$-1\r\n`
//! - `+<text>\r\n`, `-<text>\r\n`, `:<text>\r\n`
//!
//! # Design Decisions
//! - Only `raw_bytes` is ever forwarded; `name`/`args` exist for observability
//! - Terminators are checked strictly, a bad CRLF is a protocol violation
//! - Truncated input is an error, never a partially populated command

pub mod command;
pub mod decoder;
pub mod error;
pub mod reader;

pub use command::{Command, CommandKind};
pub use decoder::Decoder;
pub use error::DecodeError;
pub use reader::ByteReader;
