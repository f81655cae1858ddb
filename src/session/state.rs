//! Session lifecycle states.

/// Lifecycle of one proxied connection pair.
///
/// ```text
/// Open ──dial ok──▶ Relaying ──either direction ends──▶ Closing ──both joined──▶ Closed
///   └────────────────────dial failed────────────────────────────────────────────▶ Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Client accepted, backend not yet dialed.
    Open,
    /// Both directions running.
    Relaying,
    /// One direction ended; waiting for the other to stop.
    Closing,
    /// Both connections released.
    Closed,
}

impl SessionState {
    pub fn is_closed(&self) -> bool {
        matches!(self, SessionState::Closed)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Open => "open",
            SessionState::Relaying => "relaying",
            SessionState::Closing => "closing",
            SessionState::Closed => "closed",
        };
        f.write_str(name)
    }
}
