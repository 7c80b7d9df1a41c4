//! Minimal IRC client wire layer.
//!
//! Just enough protocol for a short-lived notifier: registration (with
//! optional server password and SASL PLAIN), keepalive, and the handful of
//! commands the delivery session issues.

mod codec;
mod connection;
mod error;
mod message;
mod sasl;
mod stream;
mod tls;

pub use codec::IrcCodec;
pub use connection::{ConnectOptions, Connection, connect};
pub use error::{IrcError, ParseError};
pub use message::{Command, Message, Prefix, irc_eq};
pub use stream::IrcStream;

/// Maximum length of an outbound IRC line, CRLF included (RFC 1459).
pub const MAX_IRC_LINE_LEN: usize = 512;
