//! Client connection: transport setup, registration and keepalive.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

use super::codec::IrcCodec;
use super::error::IrcError;
use super::message::{Command, Message};
use super::sasl;
use super::stream::IrcStream;
use super::tls::upgrade_to_tls;

// Numerics handled during registration.
const ERR_ERRONEUSNICKNAME: u16 = 432;
const ERR_NICKNAMEINUSE: u16 = 433;
const ERR_PASSWDMISMATCH: u16 = 464;
const ERR_YOUREBANNEDCREEP: u16 = 465;
const RPL_WELCOME: u16 = 1;
const RPL_SASLSUCCESS: u16 = 903;
const ERR_NICKLOCKED: u16 = 902;
const ERR_SASLFAIL: u16 = 904;
const ERR_SASLTOOLONG: u16 = 905;
const ERR_SASLABORTED: u16 = 906;

/// Everything needed to open and register a connection.
#[derive(Debug, Clone)]
pub struct ConnectOptions {
    pub server: String,
    pub port: u16,
    pub password: Option<String>,
    pub tls: bool,
    pub tls_verify: bool,
    pub nickname: String,
    pub realname: String,
    pub sasl_password: Option<String>,
    pub connect_timeout: Duration,
}

/// A registered IRC connection.
pub struct Connection<S = IrcStream> {
    framed: Framed<S, IrcCodec>,
    nickname: String,
}

/// Open a TCP (and optionally TLS) connection and complete registration.
pub async fn connect(opts: &ConnectOptions) -> Result<Connection, IrcError> {
    let addr = format!("{}:{}", opts.server, opts.port);
    info!(server = %addr, tls = opts.tls, "Connecting");

    let tcp = timeout(opts.connect_timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| IrcError::Timeout(addr.clone()))??;
    if let Err(e) = tcp.set_nodelay(true) {
        warn!("failed to set TCP_NODELAY: {}", e);
    }

    let stream = if opts.tls {
        let tls = timeout(
            opts.connect_timeout,
            upgrade_to_tls(tcp, &opts.server, opts.tls_verify),
        )
        .await
        .map_err(|_| IrcError::Timeout(addr.clone()))??;
        IrcStream::Tls(Box::new(tls))
    } else {
        IrcStream::Plain(tcp)
    };

    let mut conn = Connection::new(stream, &opts.nickname);
    conn.register(opts).await?;
    Ok(conn)
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    /// Wrap an established stream; no registration is performed.
    pub fn new(stream: S, nickname: &str) -> Self {
        Self {
            framed: Framed::new(stream, IrcCodec::new()),
            nickname: nickname.to_string(),
        }
    }

    /// The nickname the server knows us by.
    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    /// Send one command and flush it.
    pub async fn send(&mut self, command: Command) -> Result<(), IrcError> {
        debug!(line = %command, "→");
        self.framed.send(Message::from(command)).await
    }

    /// Receive the next message, answering `PING` transparently.
    ///
    /// Returns `None` once the server has closed the connection.
    pub async fn recv(&mut self) -> Result<Option<Message>, IrcError> {
        loop {
            let Some(message) = self.framed.next().await.transpose()? else {
                return Ok(None);
            };
            debug!(line = %message, "←");

            if let Command::PING(token, _) = &message.command {
                self.send(Command::PONG(token.clone(), None)).await?;
                continue;
            }
            return Ok(Some(message));
        }
    }

    /// Flush pending output and shut the stream down.
    pub async fn close(&mut self) -> Result<(), IrcError> {
        SinkExt::<Message>::close(&mut self.framed).await
    }

    /// Run PASS / CAP / SASL / NICK / USER until `RPL_WELCOME`.
    ///
    /// On `ERR_NICKNAMEINUSE` an underscore is appended and NICK retried. The
    /// nickname confirmed by the welcome numeric is stored for later use.
    /// When SASL was requested, a welcome without `RPL_SASLSUCCESS` fails.
    pub async fn register(&mut self, opts: &ConnectOptions) -> Result<(), IrcError> {
        if let Some(password) = &opts.password {
            self.send(Command::PASS(password.clone())).await?;
        }
        let sasl_password = opts.sasl_password.as_deref();
        if sasl_password.is_some() {
            self.send(cap(&["LS", "302"])).await?;
        }
        self.send(Command::NICK(self.nickname.clone())).await?;
        self.send(Command::USER(
            opts.nickname.clone(),
            "0".to_string(),
            opts.realname.clone(),
        ))
        .await?;

        let mut offered_caps: Vec<String> = Vec::new();
        let mut authenticated = false;
        loop {
            let Some(message) = self.recv().await? else {
                return Err(IrcError::ConnectionClosed);
            };

            match message.command {
                Command::CAP(args) => {
                    if sasl_password.is_none() {
                        continue;
                    }
                    match args.get(1).map(String::as_str) {
                        Some("LS") => {
                            let more = args.len() > 3 && args[2] == "*";
                            if let Some(caps) = args.last() {
                                offered_caps.extend(caps.split_whitespace().map(str::to_string));
                            }
                            if more {
                                continue;
                            }
                            let has_sasl = offered_caps
                                .iter()
                                .any(|c| c == "sasl" || c.starts_with("sasl="));
                            if !has_sasl {
                                return Err(IrcError::SaslFailed(
                                    "server does not offer the sasl capability".to_string(),
                                ));
                            }
                            self.send(cap(&["REQ", "sasl"])).await?;
                        }
                        Some("ACK") => {
                            debug!("sasl capability acknowledged");
                            self.send(Command::AUTHENTICATE("PLAIN".to_string()))
                                .await?;
                        }
                        Some("NAK") => {
                            return Err(IrcError::SaslFailed(
                                "server refused the sasl capability".to_string(),
                            ));
                        }
                        _ => {
                            debug!(?args, "ignoring CAP reply");
                        }
                    }
                }
                Command::AUTHENTICATE(ref data) if data == "+" => {
                    if let Some(password) = sasl_password {
                        let encoded = sasl::encode_plain(&opts.nickname, password);
                        for chunk in sasl::authenticate_chunks(&encoded) {
                            self.send(Command::AUTHENTICATE(chunk)).await?;
                        }
                    }
                }
                Command::Response(RPL_SASLSUCCESS, _) => {
                    info!("SASL authentication succeeded");
                    authenticated = true;
                    self.send(cap(&["END"])).await?;
                }
                Command::Response(
                    ERR_NICKLOCKED | ERR_SASLFAIL | ERR_SASLTOOLONG | ERR_SASLABORTED,
                    ref args,
                ) => {
                    return Err(IrcError::SaslFailed(trailing(args)));
                }
                Command::Response(ERR_NICKNAMEINUSE, _) => {
                    let next = format!("{}_", self.nickname);
                    warn!(taken = %self.nickname, next = %next, "Nickname in use, retrying");
                    self.nickname = next;
                    self.send(Command::NICK(self.nickname.clone())).await?;
                }
                Command::Response(
                    ERR_ERRONEUSNICKNAME | ERR_PASSWDMISMATCH | ERR_YOUREBANNEDCREEP,
                    ref args,
                ) => {
                    return Err(IrcError::Registration(trailing(args)));
                }
                Command::Response(RPL_WELCOME, ref args) => {
                    if sasl_password.is_some() && !authenticated {
                        return Err(IrcError::SaslFailed(
                            "server completed registration without SASL".to_string(),
                        ));
                    }
                    if let Some(nick) = args.first() {
                        self.nickname = nick.clone();
                    }
                    info!(nick = %self.nickname, "Registered");
                    return Ok(());
                }
                Command::ERROR(reason) => return Err(IrcError::Registration(reason)),
                _ => {}
            }
        }
    }
}

fn cap(args: &[&str]) -> Command {
    Command::CAP(args.iter().map(|a| a.to_string()).collect())
}

/// Human-readable text of a numeric reply (its last parameter).
fn trailing(args: &[String]) -> String {
    args.last().cloned().unwrap_or_default()
}
