//! One notifier run: event file → notification → IRC.

use std::path::Path;

use tracing::info;

use crate::config::{Config, IrcConfig};
use crate::error::NotifyError;
use crate::event::{Event, EventKind};
use crate::format::{Notification, format};
use crate::irc::{self, ConnectOptions};
use crate::session::{DeliveryMode, Session, SessionParams, run_session};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Delivered,
    /// The event produced no text; no connection was made.
    NothingToSend,
}

/// Load, format and deliver a single event.
pub async fn run(config: &Config, kind: EventKind, event_path: &Path) -> Result<Outcome, NotifyError> {
    let event = Event::load(kind, event_path)?;
    let notification = format(&event, config.output.ansicolor)?;
    if notification.is_empty() {
        info!(kind = %event.kind(), "Nothing to send");
        return Ok(Outcome::NothingToSend);
    }

    deliver(&config.irc, &notification).await?;
    Ok(Outcome::Delivered)
}

/// Connect, deliver `notification` once, and disconnect.
pub async fn deliver(irc: &IrcConfig, notification: &Notification) -> Result<(), NotifyError> {
    let mut connection = irc::connect(&connect_options(irc)).await?;
    let session = Session::new(SessionParams {
        channel: irc.channel.clone(),
        channel_key: irc.channel_key.clone(),
        lines: notification.lines().to_vec(),
        mode: if irc.notice {
            DeliveryMode::Notice
        } else {
            DeliveryMode::Join
        },
    });
    run_session(&mut connection, session).await?;
    Ok(())
}

pub fn connect_options(irc: &IrcConfig) -> ConnectOptions {
    ConnectOptions {
        server: irc.server.clone(),
        port: irc.port,
        password: irc.password.clone(),
        tls: irc.tls,
        tls_verify: irc.tls_verify,
        nickname: irc.nickname.clone(),
        realname: irc.realname().to_string(),
        sasl_password: irc.sasl_password.clone(),
        connect_timeout: irc.connect_timeout(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_options_from_config() {
        let irc = IrcConfig {
            tls: true,
            tls_verify: false,
            sasl_password: Some("hunter2".to_string()),
            ..IrcConfig::default()
        };

        let opts = connect_options(&irc);
        assert_eq!(opts.server, "irc.libera.chat");
        assert_eq!(opts.port, 6667);
        assert_eq!(opts.realname, "github-notify");
        assert!(opts.tls);
        assert!(!opts.tls_verify);
        assert_eq!(opts.sasl_password.as_deref(), Some("hunter2"));
    }

    #[tokio::test]
    async fn test_malformed_event_fails_before_connecting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("event.json");
        std::fs::write(&path, r#"{"comment": {"user": {}}}"#).unwrap();

        let mut config = Config::default();
        config.irc.server = "127.0.0.1".to_string();
        config.irc.port = 1;
        let err = run(&config, EventKind::IssueComment, &path).await.unwrap_err();
        assert!(matches!(err, NotifyError::Event(_)));
    }
}
