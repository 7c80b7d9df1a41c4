//! Core configuration types.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::defaults::{
    default_connect_timeout_secs, default_nickname, default_port, default_server, default_true,
};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Notifier configuration, as read from TOML and then overlaid by the CLI.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Connection and delivery settings.
    #[serde(default)]
    pub irc: IrcConfig,
    /// Rendering and logging settings.
    #[serde(default)]
    pub output: OutputConfig,
}

/// IRC connection and delivery settings.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcConfig {
    #[serde(default = "default_server")]
    pub server: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Server password (`PASS`).
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_nickname")]
    pub nickname: String,
    /// Realname sent in `USER`; the nickname when unset.
    #[serde(default)]
    pub realname: Option<String>,
    /// SASL PLAIN password, authenticated as the nickname.
    #[serde(default)]
    pub sasl_password: Option<String>,
    /// Target channel; `#` is prepended when missing.
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub channel_key: Option<String>,
    #[serde(default)]
    pub tls: bool,
    /// Verify the server certificate when `tls` is on.
    #[serde(default = "default_true")]
    pub tls_verify: bool,
    /// Deliver with NOTICE from outside the channel instead of JOIN + PRIVMSG.
    #[serde(default)]
    pub notice: bool,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for IrcConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            port: default_port(),
            password: None,
            nickname: default_nickname(),
            realname: None,
            sasl_password: None,
            channel: String::new(),
            channel_key: None,
            tls: false,
            tls_verify: default_true(),
            notice: false,
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl IrcConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn realname(&self) -> &str {
        self.realname.as_deref().unwrap_or(&self.nickname)
    }
}

/// Rendering and logging settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Wrap notification fragments in ANSI colors.
    #[serde(default)]
    pub ansicolor: bool,
    /// Debug-level logging.
    #[serde(default)]
    pub verbose: bool,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Canonicalize values that have more than one accepted spelling.
    ///
    /// Empty optional strings count as absent, and the channel gains its `#`.
    pub fn normalize(&mut self) {
        let irc = &mut self.irc;
        for field in [
            &mut irc.password,
            &mut irc.sasl_password,
            &mut irc.channel_key,
            &mut irc.realname,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
        irc.channel = normalize_channel(&irc.channel);
    }
}

/// Prefix `channel` with `#` unless it already starts with one.
///
/// Empty input stays empty so validation can report it.
pub fn normalize_channel(channel: &str) -> String {
    let channel = channel.trim();
    if channel.is_empty() || channel.starts_with('#') {
        channel.to_string()
    } else {
        format!("#{channel}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.irc.server, "irc.libera.chat");
        assert_eq!(config.irc.port, 6667);
        assert_eq!(config.irc.nickname, "github-notify");
        assert_eq!(config.irc.realname(), "github-notify");
        assert!(config.irc.tls_verify);
        assert!(!config.irc.notice);
        assert_eq!(config.irc.connect_timeout(), Duration::from_secs(30));
        assert!(!config.output.ansicolor);
    }

    #[test]
    fn test_load_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.toml");
        std::fs::write(
            &path,
            r#"
[irc]
server = "irc.oftc.net"
port = 6697
tls = true
nickname = "ci-bot"
channel = "builds"
channel_key = ""
notice = true

[output]
ansicolor = true
"#,
        )
        .unwrap();

        let mut config = Config::load(&path).unwrap();
        config.normalize();
        assert_eq!(config.irc.server, "irc.oftc.net");
        assert_eq!(config.irc.port, 6697);
        assert!(config.irc.tls);
        assert!(config.irc.notice);
        assert_eq!(config.irc.channel, "#builds");
        assert_eq!(config.irc.channel_key, None);
        assert!(config.output.ansicolor);
        assert!(!config.output.verbose);
    }

    #[test]
    fn test_load_rejects_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[irc]\nport = \"not a number\"\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_normalize_channel() {
        assert_eq!(normalize_channel("ci"), "#ci");
        assert_eq!(normalize_channel("#ci"), "#ci");
        assert_eq!(normalize_channel(" ci "), "#ci");
        assert_eq!(normalize_channel(""), "");
    }
}
