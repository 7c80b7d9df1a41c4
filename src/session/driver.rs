//! Runs a [`Session`] against a live wire.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::oneshot;
use tracing::{info, warn};

use super::machine::{Effects, Session, SessionEvent};
use crate::error::SessionError;
use crate::irc::{Command, Connection, IrcError, Message};

/// The transport a session is driven over.
#[async_trait]
pub trait Wire: Send {
    /// Nickname confirmed at registration.
    fn nickname(&self) -> &str;

    async fn send(&mut self, command: Command) -> Result<(), IrcError>;

    /// Next inbound message, `None` at end of stream.
    async fn recv(&mut self) -> Result<Option<Message>, IrcError>;

    async fn close(&mut self) -> Result<(), IrcError>;
}

#[async_trait]
impl<S> Wire for Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    fn nickname(&self) -> &str {
        Connection::nickname(self)
    }

    async fn send(&mut self, command: Command) -> Result<(), IrcError> {
        Connection::send(self, command).await
    }

    async fn recv(&mut self) -> Result<Option<Message>, IrcError> {
        Connection::recv(self).await
    }

    async fn close(&mut self) -> Result<(), IrcError> {
        Connection::close(self).await
    }
}

enum Wake {
    Ack(Result<(), oneshot::error::RecvError>),
    Inbound(Option<Message>),
}

/// Drive `session` on an already registered `wire` until it closes.
///
/// Returns once QUIT has been flushed and the wire shut down.
pub async fn run_session<W: Wire>(wire: &mut W, mut session: Session) -> Result<(), SessionError> {
    let mut pending_ack: Option<oneshot::Receiver<()>> = None;
    let mut effects = session.step(SessionEvent::Registered {
        nick: wire.nickname().to_string(),
    })?;

    loop {
        for command in effects.commands.drain(..) {
            wire.send(command).await?;
        }
        if let Some(ack) = effects.ack.take() {
            pending_ack = Some(ack);
        }

        if session.is_closed() {
            if let Err(e) = wire.close().await {
                warn!(error = %e, "Error while closing connection");
            }
            info!(channel = %session.channel(), "Delivery complete");
            return Ok(());
        }

        let wake = tokio::select! {
            biased;
            ack = acknowledged(&mut pending_ack) => Wake::Ack(ack),
            inbound = wire.recv() => Wake::Inbound(inbound?),
        };

        effects = match wake {
            Wake::Ack(Ok(())) => {
                pending_ack = None;
                session.step(SessionEvent::Acknowledged)?
            }
            Wake::Ack(Err(_)) => return Err(SessionError::AckDropped),
            Wake::Inbound(None) => {
                return Err(SessionError::Disconnected {
                    phase: session.phase(),
                    reason: None,
                });
            }
            Wake::Inbound(Some(message)) => {
                if let Command::ERROR(reason) = message.command {
                    return Err(SessionError::Disconnected {
                        phase: session.phase(),
                        reason: Some(reason),
                    });
                }
                match SessionEvent::from_message(&message) {
                    Some(event) => session.step(event)?,
                    None => Effects::default(),
                }
            }
        };
    }
}

/// Resolves with the pending token, or never when there is none.
async fn acknowledged(
    pending: &mut Option<oneshot::Receiver<()>>,
) -> Result<(), oneshot::error::RecvError> {
    match pending {
        Some(ack) => ack.await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::session::{DeliveryMode, Phase, SessionParams};

    /// Records outgoing commands and answers them from a script.
    struct ScriptedWire {
        nickname: String,
        sent: Vec<Command>,
        inbound: VecDeque<Message>,
        respond: fn(&Command) -> Vec<&'static str>,
        closed: bool,
    }

    impl ScriptedWire {
        fn new(respond: fn(&Command) -> Vec<&'static str>) -> Self {
            Self {
                nickname: "notify".to_string(),
                sent: Vec::new(),
                inbound: VecDeque::new(),
                respond,
                closed: false,
            }
        }

        fn sent_lines(&self) -> Vec<String> {
            self.sent.iter().map(|c| c.to_string()).collect()
        }
    }

    #[async_trait]
    impl Wire for ScriptedWire {
        fn nickname(&self) -> &str {
            &self.nickname
        }

        async fn send(&mut self, command: Command) -> Result<(), IrcError> {
            for line in (self.respond)(&command) {
                self.inbound.push_back(line.parse().unwrap());
            }
            self.sent.push(command);
            Ok(())
        }

        async fn recv(&mut self) -> Result<Option<Message>, IrcError> {
            Ok(self.inbound.pop_front())
        }

        async fn close(&mut self) -> Result<(), IrcError> {
            self.closed = true;
            Ok(())
        }
    }

    fn session(mode: DeliveryMode, lines: &[&str]) -> Session {
        Session::new(SessionParams {
            channel: "#ci".to_string(),
            channel_key: None,
            lines: lines.iter().map(|l| l.to_string()).collect(),
            mode,
        })
    }

    fn cooperative_server(command: &Command) -> Vec<&'static str> {
        match command {
            Command::JOIN(..) => vec![
                ":someone!u@h JOIN #ci",
                ":irc.test 332 notify #ci :topic",
                ":notify!u@h JOIN #ci",
            ],
            Command::PART(..) => vec![":notify!u@h PART #ci"],
            Command::VERSION(_) => vec![":irc.test 351 notify ircd-1.0 irc.test :"],
            _ => vec![],
        }
    }

    #[tokio::test]
    async fn test_join_mode_orders_message_before_quit() {
        let mut wire = ScriptedWire::new(cooperative_server);
        run_session(&mut wire, session(DeliveryMode::Join, &["first", "second"]))
            .await
            .unwrap();

        assert_eq!(
            wire.sent_lines(),
            vec![
                "JOIN #ci",
                "PRIVMSG #ci :first",
                "PRIVMSG #ci :second",
                "PART #ci",
                "QUIT",
            ]
        );
        assert!(wire.closed);
    }

    #[tokio::test]
    async fn test_notice_mode_waits_for_version_reply() {
        let mut wire = ScriptedWire::new(cooperative_server);
        run_session(&mut wire, session(DeliveryMode::Notice, &["only line"]))
            .await
            .unwrap();

        assert_eq!(
            wire.sent_lines(),
            vec!["NOTICE #ci :only line", "VERSION", "QUIT"]
        );
        assert!(wire.closed);
    }

    #[tokio::test]
    async fn test_eof_before_join_is_disconnect() {
        let mut wire = ScriptedWire::new(|_| vec![]);
        let err = run_session(&mut wire, session(DeliveryMode::Join, &["x"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Disconnected {
                phase: Phase::Joining,
                reason: None
            }
        ));
        assert_eq!(wire.sent_lines(), vec!["JOIN #ci"]);
    }

    #[tokio::test]
    async fn test_server_error_reports_reason() {
        let mut wire = ScriptedWire::new(|command| match command {
            Command::VERSION(_) => vec!["ERROR :Closing Link: flood"],
            _ => vec![],
        });
        let err = run_session(&mut wire, session(DeliveryMode::Notice, &["x"]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Disconnected {
                phase: Phase::AwaitingAck,
                reason: Some(ref r)
            } if r == "Closing Link: flood"
        ));
        assert!(!wire.sent_lines().contains(&"QUIT".to_string()));
    }

    #[tokio::test]
    async fn test_join_rejection_stops_before_message() {
        let mut wire = ScriptedWire::new(|command| match command {
            Command::JOIN(..) => vec![":irc.test 475 notify #ci :Cannot join channel (+k)"],
            _ => vec![],
        });
        let err = run_session(&mut wire, session(DeliveryMode::Join, &["x"]))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::JoinRejected { .. }));
        assert_eq!(wire.sent_lines(), vec!["JOIN #ci"]);
    }
}
