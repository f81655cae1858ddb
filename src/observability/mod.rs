//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Session inbound direction:
//!     → sink.rs (one CommandRecord per decoded request)
//!     → metrics.rs (command / error / byte counters)
//!
//! All subsystems:
//!     → logging.rs (structured tracing events, pretty or JSON)
//! ```
//!
//! # Design Decisions
//! - The command record sink is injected, never a process-wide singleton
//! - Connection ID flows through every session event
//! - Metrics are cheap and optional

pub mod logging;
pub mod metrics;
pub mod sink;

pub use sink::{CommandRecord, CommandSink, TracingSink};
