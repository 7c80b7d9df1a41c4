//! Delivery session state machine.
//!
//! Every inbound signal is folded through [`Session::step`], which returns the
//! commands to put on the wire. The machine never touches the network itself.
//!
//! ```text
//! Disconnected --Registered--> Connected --+--(notice)--> AwaitingAck --VersionReply--> Disconnecting --Acknowledged--> Closed
//!                                          |
//!                                          +--(join)----> Joining --Joined(self)--> Parting --Parted(self)--> Closed
//! ```

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::error::SessionError;
use crate::irc::{Command, MAX_IRC_LINE_LEN, Message, irc_eq};

// Numerics the session reacts to.
const RPL_VERSION: u16 = 351;
const ERR_NOSUCHCHANNEL: u16 = 403;
const ERR_CHANNELISFULL: u16 = 471;
const ERR_INVITEONLYCHAN: u16 = 473;
const ERR_BANNEDFROMCHAN: u16 = 474;
const ERR_BADCHANNELKEY: u16 = 475;
const ERR_NEEDREGGEDNICK: u16 = 477;

/// Longest text chunk carried by a single PRIVMSG/NOTICE.
///
/// Leaves room for the relayed `:nick!user@host PRIVMSG #channel :` prefix
/// inside the 512-byte line limit.
pub const MESSAGE_CHUNK_LEN: usize = 400;

/// Chunk size for text sent to `channel`.
///
/// Never above [`MESSAGE_CHUNK_LEN`], and small enough that our own
/// `PRIVMSG <channel> :<text>\r\n` fits in [`MAX_IRC_LINE_LEN`].
pub fn chunk_len(channel: &str) -> usize {
    let overhead = "PRIVMSG  :\r\n".len() + channel.len();
    MAX_IRC_LINE_LEN
        .saturating_sub(overhead)
        .clamp(1, MESSAGE_CHUNK_LEN)
}

/// How the notification reaches the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    /// NOTICE from outside the channel, gated on a VERSION round-trip.
    Notice,
    /// JOIN, PRIVMSG, PART.
    Join,
}

/// Fixed inputs of one delivery.
#[derive(Debug, Clone)]
pub struct SessionParams {
    pub channel: String,
    pub channel_key: Option<String>,
    pub lines: Vec<String>,
    pub mode: DeliveryMode,
}

/// One-shot acknowledgement owned by [`SessionState::AwaitingAck`].
#[derive(Debug)]
pub struct AckToken(oneshot::Sender<()>);

impl AckToken {
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(tx), rx)
    }

    /// Resolve the token; the receiver may already be gone.
    pub fn resolve(self) {
        let _ = self.0.send(());
    }
}

#[derive(Debug)]
pub enum SessionState {
    Disconnected,
    Connected,
    Joining,
    Parting,
    AwaitingAck(AckToken),
    Disconnecting,
    Closed,
}

/// Payload-free view of [`SessionState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connected,
    Joining,
    Parting,
    AwaitingAck,
    Disconnecting,
    Closed,
}

impl SessionState {
    pub fn phase(&self) -> Phase {
        match self {
            Self::Disconnected => Phase::Disconnected,
            Self::Connected => Phase::Connected,
            Self::Joining => Phase::Joining,
            Self::Parting => Phase::Parting,
            Self::AwaitingAck(_) => Phase::AwaitingAck,
            Self::Disconnecting => Phase::Disconnecting,
            Self::Closed => Phase::Closed,
        }
    }
}

/// Signals that drive the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Registration finished under `nick`.
    Registered { nick: String },
    Joined { channel: String, nick: String },
    Parted { channel: String, nick: String },
    JoinRejected { channel: String, reason: String },
    /// `351 RPL_VERSION`, the reply to the synthetic query.
    VersionReply,
    /// The ack token has been observed as resolved.
    Acknowledged,
}

impl SessionEvent {
    /// Extract the signal carried by an inbound message, if any.
    pub fn from_message(message: &Message) -> Option<Self> {
        match &message.command {
            Command::JOIN(channel, _) => Some(Self::Joined {
                channel: channel.clone(),
                nick: message.source_nickname()?.to_string(),
            }),
            Command::PART(channel, _) => Some(Self::Parted {
                channel: channel.clone(),
                nick: message.source_nickname()?.to_string(),
            }),
            Command::Response(RPL_VERSION, _) => Some(Self::VersionReply),
            Command::Response(
                ERR_NOSUCHCHANNEL | ERR_CHANNELISFULL | ERR_INVITEONLYCHAN | ERR_BANNEDFROMCHAN
                | ERR_BADCHANNELKEY | ERR_NEEDREGGEDNICK,
                args,
            ) => Some(Self::JoinRejected {
                channel: args.get(1).cloned().unwrap_or_default(),
                reason: args.last().cloned().unwrap_or_default(),
            }),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "Registered",
            Self::Joined { .. } => "Joined",
            Self::Parted { .. } => "Parted",
            Self::JoinRejected { .. } => "JoinRejected",
            Self::VersionReply => "VersionReply",
            Self::Acknowledged => "Acknowledged",
        }
    }
}

/// Output of a single step.
#[derive(Debug, Default)]
pub struct Effects {
    /// Commands to send, in order.
    pub commands: Vec<Command>,
    /// Receiver half of a freshly created ack token.
    pub ack: Option<oneshot::Receiver<()>>,
}

impl Effects {
    fn send(commands: Vec<Command>) -> Self {
        Self {
            commands,
            ack: None,
        }
    }
}

pub struct Session {
    params: SessionParams,
    state: SessionState,
    nickname: String,
}

impl Session {
    pub fn new(params: SessionParams) -> Self {
        Self {
            params,
            state: SessionState::Disconnected,
            nickname: String::new(),
        }
    }

    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, SessionState::Closed)
    }

    pub fn channel(&self) -> &str {
        &self.params.channel
    }

    /// Our own nickname, known once registered.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Advance the machine by one event.
    ///
    /// Events that do not apply to the current state are ignored. The only
    /// hard failures are a repeated registration and a rejected join; both
    /// leave the state where it was.
    pub fn step(&mut self, event: SessionEvent) -> Result<Effects, SessionError> {
        let state = std::mem::replace(&mut self.state, SessionState::Closed);
        let from = state.phase();
        let (next, effects) = self.transition(state, event)?;
        if next.phase() != from {
            debug!(from = ?from, to = ?next.phase(), "Session transition");
        }
        self.state = next;
        Ok(effects)
    }

    fn transition(
        &mut self,
        state: SessionState,
        event: SessionEvent,
    ) -> Result<(SessionState, Effects), SessionError> {
        match (state, event) {
            (SessionState::Disconnected, SessionEvent::Registered { nick }) => {
                info!(nick = %nick, channel = %self.params.channel, "Connected");
                self.nickname = nick;
                Ok(self.deliver())
            }
            (state, SessionEvent::Registered { .. }) => {
                let phase = state.phase();
                self.state = state;
                Err(SessionError::Unexpected {
                    phase,
                    event: "Registered",
                })
            }

            (SessionState::Joining, SessionEvent::Joined { channel, nick }) => {
                if !self.is_local(&nick) || !irc_eq(&channel, &self.params.channel) {
                    debug!(nick = %nick, channel = %channel, "Ignoring foreign join");
                    return Ok((SessionState::Joining, Effects::default()));
                }
                info!(channel = %channel, "Joined, sending message");
                let mut commands = self.text_commands(Command::PRIVMSG);
                commands.push(Command::PART(self.params.channel.clone(), None));
                Ok((SessionState::Parting, Effects::send(commands)))
            }
            (SessionState::Joining, SessionEvent::JoinRejected { channel, reason }) => {
                self.state = SessionState::Joining;
                Err(SessionError::JoinRejected {
                    channel: if channel.is_empty() {
                        self.params.channel.clone()
                    } else {
                        channel
                    },
                    reason,
                })
            }

            (SessionState::Parting, SessionEvent::Parted { channel, nick })
                if self.is_local(&nick) && irc_eq(&channel, &self.params.channel) =>
            {
                info!(channel = %channel, "Parted, quitting");
                Ok((SessionState::Closed, Effects::send(vec![Command::QUIT(None)])))
            }

            (SessionState::AwaitingAck(token), SessionEvent::VersionReply) => {
                debug!("Version reply received, notice flushed");
                token.resolve();
                Ok((SessionState::Disconnecting, Effects::default()))
            }
            (SessionState::Disconnecting, SessionEvent::Acknowledged) => {
                info!("Notice acknowledged, quitting");
                Ok((SessionState::Closed, Effects::send(vec![Command::QUIT(None)])))
            }

            (state, event) => {
                debug!(phase = ?state.phase(), event = event.name(), "Ignoring event");
                Ok((state, Effects::default()))
            }
        }
    }

    /// Leave `Connected` according to the delivery mode.
    fn deliver(&self) -> (SessionState, Effects) {
        match self.params.mode {
            DeliveryMode::Notice => {
                let mut commands = self.text_commands(Command::NOTICE);
                commands.push(Command::VERSION(None));
                let (token, ack) = AckToken::new();
                let effects = Effects {
                    commands,
                    ack: Some(ack),
                };
                (SessionState::AwaitingAck(token), effects)
            }
            DeliveryMode::Join => {
                let join = Command::JOIN(
                    self.params.channel.clone(),
                    self.params.channel_key.clone(),
                );
                (SessionState::Joining, Effects::send(vec![join]))
            }
        }
    }

    fn is_local(&self, nick: &str) -> bool {
        irc_eq(nick, &self.nickname)
    }

    /// One command per non-empty chunk of the notification.
    ///
    /// Embedded newlines start a new message; `\r` and NUL are dropped so
    /// every command encodes.
    fn text_commands(&self, make: fn(String, String) -> Command) -> Vec<Command> {
        let limit = chunk_len(&self.params.channel);
        let mut commands = Vec::new();
        for line in self.params.lines.iter().flat_map(|line| line.split('\n')) {
            let clean: String = line.chars().filter(|c| !matches!(c, '\r' | '\0')).collect();
            for chunk in split_text(&clean, limit) {
                commands.push(make(self.params.channel.clone(), chunk.to_string()));
            }
        }
        commands
    }
}

/// Split `text` into chunks of at most `limit` bytes on char boundaries.
///
/// Empty input (or a zero limit) yields nothing.
pub fn split_text(text: &str, limit: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    if limit == 0 {
        return chunks;
    }
    let mut rest = text;
    while !rest.is_empty() {
        let mut end = rest.len().min(limit);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            // A single char wider than the limit.
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (chunk, tail) = rest.split_at(end);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}
