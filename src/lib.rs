//! slirc-notify - one-shot IRC notifications for CI events.
//!
//! A CI event payload is formatted into a few lines of text and delivered to
//! a channel over a short-lived IRC connection, either as a NOTICE or by
//! joining and sending a PRIVMSG.

pub mod app;
pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod format;
pub mod irc;
pub mod session;

pub use app::{Outcome, deliver, run};
pub use error::{EventError, NotifyError, SessionError};
