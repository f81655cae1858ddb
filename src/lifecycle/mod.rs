//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → resolve wait_for_signal()
//!
//! Shutdown (shutdown.rs):
//!     trigger() → listener stops accepting → binary drains live sessions → exit
//! ```
//!
//! # Design Decisions
//! - Shutdown stops the accept loop only; live sessions end on their own I/O
//! - Draining has a deadline, after which remaining sessions are dropped

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
