//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use thiserror::Error;

/// Longest accepted channel name, in bytes.
pub const MAX_CHANNEL_LEN: usize = 200;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("irc.channel is required")]
    MissingChannel,
    #[error("irc.server is required")]
    MissingServer,
    #[error("irc.nickname is required")]
    MissingNickname,
    #[error("irc.nickname must not contain spaces or start with ':' or '#', got '{0}'")]
    InvalidNickname(String),
    #[error("irc.channel must not contain spaces, commas or control characters, got '{0}'")]
    InvalidChannel(String),
    #[error("irc.channel must be at most 200 bytes, got {0}")]
    ChannelTooLong(usize),
    #[error("irc.port must be non-zero")]
    InvalidPort,
    #[error("irc.connect_timeout_secs must be non-zero")]
    InvalidConnectTimeout,
}

/// Validate a configuration, returning all errors found.
///
/// Expects [`Config::normalize`] to have run.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let irc = &config.irc;

    // Required fields
    if irc.server.trim().is_empty() {
        errors.push(ValidationError::MissingServer);
    }
    if irc.channel.is_empty() {
        errors.push(ValidationError::MissingChannel);
    } else if irc
        .channel
        .chars()
        .any(|c| c == ' ' || c == ',' || c.is_control())
    {
        errors.push(ValidationError::InvalidChannel(irc.channel.clone()));
    } else if irc.channel.len() > MAX_CHANNEL_LEN {
        errors.push(ValidationError::ChannelTooLong(irc.channel.len()));
    }

    // Nickname syntax (RFC 2812 forbids these as leading/embedded characters)
    if irc.nickname.is_empty() {
        errors.push(ValidationError::MissingNickname);
    } else if irc.nickname.contains(' ')
        || irc.nickname.starts_with(':')
        || irc.nickname.starts_with('#')
    {
        errors.push(ValidationError::InvalidNickname(irc.nickname.clone()));
    }

    if irc.port == 0 {
        errors.push(ValidationError::InvalidPort);
    }
    if irc.connect_timeout_secs == 0 {
        errors.push(ValidationError::InvalidConnectTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
