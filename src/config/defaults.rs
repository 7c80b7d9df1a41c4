//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

pub const DEFAULT_SERVER: &str = "irc.libera.chat";
pub const DEFAULT_PORT: u16 = 6667;
pub const DEFAULT_NICKNAME: &str = "github-notify";

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// IRC Defaults
// =============================================================================

pub fn default_server() -> String {
    DEFAULT_SERVER.to_string()
}

pub fn default_port() -> u16 {
    DEFAULT_PORT
}

pub fn default_nickname() -> String {
    DEFAULT_NICKNAME.to_string()
}

/// TCP/TLS establishment timeout in seconds.
pub fn default_connect_timeout_secs() -> u64 {
    30
}
