//! Wire-level error types.

use thiserror::Error;

/// Errors produced while parsing a single IRC line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty message")]
    Empty,

    #[error("missing command in line {0:?}")]
    MissingCommand(String),
}

/// Errors that can occur on the IRC connection.
#[derive(Debug, Error)]
pub enum IrcError {
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("protocol error: {0}")]
    Parse(#[from] ParseError),

    #[error("message too long: {actual} bytes (limit: {limit})")]
    LineTooLong { actual: usize, limit: usize },

    #[error("outgoing line contains a line break or NUL: {0:?}")]
    IllegalControlChar(String),

    #[error("SASL authentication failed: {0}")]
    SaslFailed(String),

    #[error("registration failed: {0}")]
    Registration(String),

    #[error("connection closed by server")]
    ConnectionClosed,

    #[error("timed out connecting to {0}")]
    Timeout(String),
}
