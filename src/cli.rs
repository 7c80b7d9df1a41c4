//! Command-line interface.
//!
//! Every connection option can also come from the `--config` TOML file;
//! values given on the command line win.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, ConfigError, validate};
use crate::event::EventKind;

#[derive(Debug, Parser)]
#[command(
    name = "notify-irc",
    version,
    about = "Send a one-line summary of a CI event to an IRC channel"
)]
pub struct Cli {
    /// IRC server hostname [default: irc.libera.chat]
    #[arg(long)]
    pub server: Option<String>,
    /// IRC server port [default: 6667]
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Optional server password
    #[arg(long)]
    pub password: Option<String>,
    /// Nickname, also used as the SASL username [default: github-notify]
    #[arg(long)]
    pub nickname: Option<String>,
    /// Nickname password for SASL authentication
    #[arg(long)]
    pub sasl_password: Option<String>,
    /// IRC #channel
    #[arg(long)]
    pub channel: Option<String>,
    /// IRC #channel password
    #[arg(long)]
    pub channel_key: Option<String>,
    /// Connect with TLS
    #[arg(long)]
    pub tls: bool,
    /// Skip TLS certificate verification
    #[arg(long)]
    pub tls_insecure: bool,
    /// Use NOTICE instead of PRIVMSG
    #[arg(long)]
    pub notice: bool,
    /// Path to the GitHub event file
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub eventpath: PathBuf,
    /// Name of the event that triggered the workflow
    #[arg(long, env = "GITHUB_EVENT_NAME", default_value = "unknown")]
    pub event_name: String,
    /// Enable ANSI color text
    #[arg(long)]
    pub ansicolor: bool,
    /// Debug-level logging
    #[arg(long)]
    pub verbose: bool,
    /// TOML file with `[irc]` and `[output]` sections
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Cli {
    pub fn event_kind(&self) -> EventKind {
        EventKind::from_name(&self.event_name)
    }

    /// Load the config file (if any), overlay command-line values, then
    /// normalize and validate the result.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        let base = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        let mut config = self.overlay(base);
        config.normalize();
        validate(&config).map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            ConfigError::Invalid(messages.join("; "))
        })?;
        Ok(config)
    }

    fn overlay(&self, mut config: Config) -> Config {
        let irc = &mut config.irc;
        if let Some(server) = &self.server {
            irc.server = server.clone();
        }
        if let Some(port) = self.port {
            irc.port = port;
        }
        if let Some(nickname) = &self.nickname {
            irc.nickname = nickname.clone();
        }
        if let Some(channel) = &self.channel {
            irc.channel = channel.clone();
        }
        if self.password.is_some() {
            irc.password = self.password.clone();
        }
        if self.sasl_password.is_some() {
            irc.sasl_password = self.sasl_password.clone();
        }
        if self.channel_key.is_some() {
            irc.channel_key = self.channel_key.clone();
        }
        irc.tls |= self.tls;
        irc.tls_verify &= !self.tls_insecure;
        irc.notice |= self.notice;

        config.output.ansicolor |= self.ansicolor;
        config.output.verbose |= self.verbose;
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["notify-irc", "--eventpath", "/tmp/event.json"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_config_file() {
        let cli = parse(&["--channel", "ci"]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.irc.server, "irc.libera.chat");
        assert_eq!(config.irc.port, 6667);
        assert_eq!(config.irc.nickname, "github-notify");
        assert_eq!(config.irc.channel, "#ci");
        assert!(config.irc.tls_verify);
        assert!(!config.irc.notice);
    }

    #[test]
    fn test_empty_secrets_are_absent() {
        let cli = parse(&[
            "--channel",
            "#ci",
            "--password",
            "",
            "--sasl-password",
            "",
            "--channel-key",
            "",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.irc.password, None);
        assert_eq!(config.irc.sasl_password, None);
        assert_eq!(config.irc.channel_key, None);
    }

    #[test]
    fn test_missing_channel_is_invalid() {
        let err = parse(&[]).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("irc.channel")));
    }

    #[test]
    fn test_command_line_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.toml");
        std::fs::write(
            &path,
            "[irc]\nserver = \"irc.oftc.net\"\nport = 6697\nchannel = \"file-chan\"\nnotice = true\n",
        )
        .unwrap();

        let cli = parse(&[
            "--config",
            path.to_str().unwrap(),
            "-p",
            "7000",
            "--channel",
            "cli-chan",
            "--tls",
            "--tls-insecure",
        ]);
        let config = cli.resolve().unwrap();
        assert_eq!(config.irc.server, "irc.oftc.net");
        assert_eq!(config.irc.port, 7000);
        assert_eq!(config.irc.channel, "#cli-chan");
        assert!(config.irc.notice);
        assert!(config.irc.tls);
        assert!(!config.irc.tls_verify);
    }

    #[test]
    fn test_event_kind_from_name() {
        let cli = parse(&["--channel", "ci", "--event-name", "pull_request"]);
        assert_eq!(cli.event_kind(), EventKind::PullRequest);
    }
}
