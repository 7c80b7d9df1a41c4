//! IRC message model: prefix, command, parsing and serialization.
//!
//! Only the commands a short-lived notifier client sends or reacts to are
//! typed; everything else is preserved as [`Command::Raw`] or
//! [`Command::Response`].
//!
//! # Reference
//! - RFC 2812 Section 2.3.1: Message format

use std::fmt::{self, Write};
use std::str::FromStr;

use super::error::ParseError;

/// Origin of a message, either a server name or a `nick!user@host` mask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prefix {
    /// Server name (e.g., "irc.libera.chat")
    ServerName(String),
    /// User prefix: (nickname, username, hostname)
    Nickname(String, String, String),
}

impl Prefix {
    /// Lenient prefix parser; components are not validated.
    pub fn parse(s: &str) -> Self {
        match s.split_once('!') {
            Some((nick, rest)) => {
                let (user, host) = rest.split_once('@').unwrap_or((rest, ""));
                Prefix::Nickname(nick.to_string(), user.to_string(), host.to_string())
            }
            None => match s.split_once('@') {
                Some((nick, host)) => {
                    Prefix::Nickname(nick.to_string(), String::new(), host.to_string())
                }
                None if s.contains('.') => Prefix::ServerName(s.to_string()),
                None => Prefix::Nickname(s.to_string(), String::new(), String::new()),
            },
        }
    }

    /// Nickname of a user prefix.
    pub fn nick(&self) -> Option<&str> {
        match self {
            Prefix::Nickname(nick, _, _) => Some(nick),
            Prefix::ServerName(_) => None,
        }
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => f.write_str(name),
            Prefix::Nickname(nick, user, host) => {
                f.write_str(nick)?;
                if !user.is_empty() {
                    write!(f, "!{user}")?;
                }
                if !host.is_empty() {
                    write!(f, "@{host}")?;
                }
                Ok(())
            }
        }
    }
}

/// IRC command with its parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// `PASS password`
    PASS(String),
    /// `NICK nickname`
    NICK(String),
    /// `USER username mode realname`
    USER(String, String, String),
    /// `CAP [target] subcommand [args]`, kept as raw parameters.
    CAP(Vec<String>),
    /// `AUTHENTICATE data`
    AUTHENTICATE(String),
    /// `JOIN channel [key]`
    JOIN(String, Option<String>),
    /// `PART channel [message]`
    PART(String, Option<String>),
    /// `PRIVMSG target text`
    PRIVMSG(String, String),
    /// `NOTICE target text`
    NOTICE(String, String),
    /// `PING token [server]`
    PING(String, Option<String>),
    /// `PONG token [server]`
    PONG(String, Option<String>),
    /// `QUIT [message]`
    QUIT(Option<String>),
    /// `ERROR message`
    ERROR(String),
    /// `VERSION [server]`
    VERSION(Option<String>),
    /// Numeric reply.
    Response(u16, Vec<String>),
    /// Anything else.
    Raw(String, Vec<String>),
}

impl Command {
    /// Build a command from its name and parameters.
    ///
    /// Unknown names and known names with an unexpected parameter count fall
    /// back to [`Command::Raw`].
    pub fn new(name: &str, mut args: Vec<String>) -> Command {
        if name.len() == 3 && name.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(code) = name.parse() {
                return Command::Response(code, args);
            }
        }

        let upper = name.to_ascii_uppercase();
        let typed = match (upper.as_str(), args.len()) {
            ("PASS", 1) => args.pop().map(Command::PASS),
            ("NICK", n) if n >= 1 => Some(Command::NICK(args.swap_remove(0))),
            ("USER", 4) => {
                let realname = args.swap_remove(3);
                let mode = args.swap_remove(1);
                Some(Command::USER(args.swap_remove(0), mode, realname))
            }
            ("CAP", _) => return Command::CAP(args),
            ("AUTHENTICATE", 1) => args.pop().map(Command::AUTHENTICATE),
            ("JOIN", 1 | 2) => {
                let key = args.get(1).cloned();
                Some(Command::JOIN(args.swap_remove(0), key))
            }
            ("PART", 1 | 2) => {
                let reason = args.get(1).cloned();
                Some(Command::PART(args.swap_remove(0), reason))
            }
            ("PRIVMSG", 2) => {
                let text = args.swap_remove(1);
                Some(Command::PRIVMSG(args.swap_remove(0), text))
            }
            ("NOTICE", 2) => {
                let text = args.swap_remove(1);
                Some(Command::NOTICE(args.swap_remove(0), text))
            }
            ("PING", 1 | 2) => {
                let server = args.get(1).cloned();
                Some(Command::PING(args.swap_remove(0), server))
            }
            ("PONG", 1 | 2) => {
                let server = args.get(1).cloned();
                Some(Command::PONG(args.swap_remove(0), server))
            }
            ("QUIT", 0 | 1) => Some(Command::QUIT(args.pop())),
            ("ERROR", 1) => args.pop().map(Command::ERROR),
            ("VERSION", 0 | 1) => Some(Command::VERSION(args.pop())),
            _ => None,
        };

        typed.unwrap_or_else(|| Command::Raw(name.to_string(), args))
    }
}

/// Check if a string needs colon-prefixing as a trailing IRC argument.
fn needs_colon_prefix(s: &str) -> bool {
    s.is_empty() || s.contains(' ') || s.starts_with(':')
}

/// Write `cmd` and its arguments, colon-prefixing the last one only if needed.
fn write_cmd(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    let Some((last, middle)) = args.split_last() else {
        return Ok(());
    };
    for arg in middle {
        write!(f, " {arg}")?;
    }
    f.write_char(' ')?;
    if needs_colon_prefix(last) {
        f.write_char(':')?;
    }
    f.write_str(last)
}

/// Write `cmd` and its arguments, always colon-prefixing the last (free text) one.
fn write_cmd_freeform(f: &mut fmt::Formatter<'_>, cmd: &str, args: &[&str]) -> fmt::Result {
    f.write_str(cmd)?;
    let Some((last, middle)) = args.split_last() else {
        return Ok(());
    };
    for arg in middle {
        write!(f, " {arg}")?;
    }
    write!(f, " :{last}")
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PASS(p) => write_cmd(f, "PASS", &[p]),
            Command::NICK(n) => write_cmd(f, "NICK", &[n]),
            Command::USER(u, m, r) => write_cmd_freeform(f, "USER", &[u, m, "*", r]),
            Command::CAP(args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, "CAP", &args)
            }
            Command::AUTHENTICATE(data) => write_cmd(f, "AUTHENTICATE", &[data]),
            Command::JOIN(c, Some(k)) => write_cmd(f, "JOIN", &[c, k]),
            Command::JOIN(c, None) => write_cmd(f, "JOIN", &[c]),
            Command::PART(c, Some(m)) => write_cmd_freeform(f, "PART", &[c, m]),
            Command::PART(c, None) => write_cmd(f, "PART", &[c]),
            Command::PRIVMSG(t, text) => write_cmd_freeform(f, "PRIVMSG", &[t, text]),
            Command::NOTICE(t, text) => write_cmd_freeform(f, "NOTICE", &[t, text]),
            Command::PING(token, Some(s)) => write_cmd(f, "PING", &[token, s]),
            Command::PING(token, None) => write_cmd(f, "PING", &[token]),
            Command::PONG(token, Some(s)) => write_cmd(f, "PONG", &[token, s]),
            Command::PONG(token, None) => write_cmd(f, "PONG", &[token]),
            Command::QUIT(Some(m)) => write_cmd_freeform(f, "QUIT", &[m]),
            Command::QUIT(None) => write_cmd(f, "QUIT", &[]),
            Command::ERROR(m) => write_cmd_freeform(f, "ERROR", &[m]),
            Command::VERSION(Some(s)) => write_cmd(f, "VERSION", &[s]),
            Command::VERSION(None) => write_cmd(f, "VERSION", &[]),
            Command::Response(code, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, &format!("{code:03}"), &args)
            }
            Command::Raw(cmd, args) => {
                let args: Vec<&str> = args.iter().map(String::as_str).collect();
                write_cmd(f, cmd, &args)
            }
        }
    }
}

/// An owned IRC message. IRCv3 tags are accepted on input and discarded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// Message prefix/source (e.g., `nick!user@host`).
    pub prefix: Option<Prefix>,
    /// The IRC command and its parameters.
    pub command: Command,
}

impl Message {
    /// Get the nickname from the message prefix, if present.
    pub fn source_nickname(&self) -> Option<&str> {
        self.prefix.as_ref().and_then(Prefix::nick)
    }
}

impl From<Command> for Message {
    fn from(command: Command) -> Self {
        Message {
            prefix: None,
            command,
        }
    }
}

impl FromStr for Message {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Message, Self::Err> {
        let mut rest = s.trim_end_matches(['\r', '\n']);
        if rest.trim().is_empty() {
            return Err(ParseError::Empty);
        }

        if rest.starts_with('@') {
            rest = rest.split_once(' ').map_or("", |(_, tail)| tail);
        }
        rest = rest.trim_start_matches(' ');

        let mut prefix = None;
        if let Some(stripped) = rest.strip_prefix(':') {
            let (raw, tail) = stripped.split_once(' ').unwrap_or((stripped, ""));
            prefix = Some(Prefix::parse(raw));
            rest = tail.trim_start_matches(' ');
        }

        let (name, mut params_str) = rest.split_once(' ').unwrap_or((rest, ""));
        if name.is_empty() {
            return Err(ParseError::MissingCommand(s.to_string()));
        }

        let mut args = Vec::new();
        loop {
            params_str = params_str.trim_start_matches(' ');
            if params_str.is_empty() {
                break;
            }
            if let Some(trailing) = params_str.strip_prefix(':') {
                args.push(trailing.to_string());
                break;
            }
            let (arg, tail) = params_str.split_once(' ').unwrap_or((params_str, ""));
            args.push(arg.to_string());
            params_str = tail;
        }

        Ok(Message {
            prefix,
            command: Command::new(name, args),
        })
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{prefix} ")?;
        }
        self.command.fmt(f)
    }
}

/// RFC 1459 case folding for a single character.
const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        _ => c.to_ascii_lowercase(),
    }
}

/// Compare two nicknames or channel names with RFC 1459 case mapping.
pub fn irc_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a
            .chars()
            .zip(b.chars())
            .all(|(x, y)| irc_lower_char(x) == irc_lower_char(y))
}
