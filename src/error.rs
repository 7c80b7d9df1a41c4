//! Unified error handling for slirc-notify.
//!
//! Library layers return these typed errors; `main` folds everything into
//! `anyhow` at the process boundary.

use thiserror::Error;

use crate::config::ConfigError;
use crate::irc::IrcError;
use crate::session::Phase;

// ============================================================================
// Event Errors (payload loading and formatting)
// ============================================================================

/// Errors raised while turning an event payload into notification text.
///
/// Any of these aborts the run before a connection is attempted.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("failed to read event file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed event payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("event payload is missing required field `{0}`")]
    MissingField(&'static str),
}

impl EventError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "event_io",
            Self::Payload(_) => "event_payload",
            Self::MissingField(_) => "event_missing_field",
        }
    }
}

// ============================================================================
// Session Errors (delivery lifecycle)
// ============================================================================

/// Errors that end a delivery session early.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Wire(#[from] IrcError),

    #[error("unexpected {event} while {phase:?}")]
    Unexpected { phase: Phase, event: &'static str },

    #[error("cannot join {channel}: {reason}")]
    JoinRejected { channel: String, reason: String },

    #[error("acknowledgement token dropped before it resolved")]
    AckDropped,

    #[error("server closed the connection while {phase:?}{}", reason_suffix(.reason))]
    Disconnected {
        phase: Phase,
        reason: Option<String>,
    },
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason.as_deref().map(|r| format!(": {r}")).unwrap_or_default()
}

impl SessionError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Wire(_) => "wire",
            Self::Unexpected { .. } => "unexpected_event",
            Self::JoinRejected { .. } => "join_rejected",
            Self::AckDropped => "ack_dropped",
            Self::Disconnected { .. } => "disconnected",
        }
    }
}

// ============================================================================
// Top-level Errors
// ============================================================================

/// Anything that aborts a notifier run.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Event(#[from] EventError),

    #[error("failed to connect: {0}")]
    Connect(#[from] IrcError),

    #[error("delivery failed: {0}")]
    Session(#[from] SessionError),
}

impl NotifyError {
    /// Get a static error code string for log labeling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Event(e) => e.error_code(),
            Self::Connect(_) => "connect",
            Self::Session(e) => e.error_code(),
        }
    }
}
