//! Scripted IRC server.
//!
//! Accepts a single client on a loopback port, answers registration and
//! channel commands from a [`Script`], and records every line it receives.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// How the fake server behaves.
#[derive(Debug, Clone, Default)]
pub struct Script {
    /// Advertise `sasl` and accept any PLAIN credentials.
    pub sasl: bool,
    /// Nicknames answered with `433`.
    pub taken_nicks: Vec<String>,
    /// Announce another user's JOIN before ours.
    pub foreign_join: bool,
    /// Numeric sent instead of confirming a JOIN (e.g. `475`).
    pub join_error: Option<u16>,
}

/// A test server instance.
pub struct TestServer {
    address: SocketAddr,
    handle: JoinHandle<anyhow::Result<Vec<String>>>,
}

impl TestServer {
    /// Bind a loopback port and serve one client in the background.
    pub async fn spawn(script: Script) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        let handle = tokio::spawn(async move {
            let (stream, _) = listener.accept().await?;
            serve(stream, script).await
        });
        Ok(Self { address, handle })
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }

    /// Wait for the client session to end and return every line it sent.
    pub async fn finish(self) -> anyhow::Result<Vec<String>> {
        timeout(Duration::from_secs(5), self.handle).await??
    }

    /// True if no client connected within `wait`.
    pub async fn stayed_idle(self, wait: Duration) -> bool {
        timeout(wait, self.handle).await.is_err()
    }
}

struct Client {
    writer: OwnedWriteHalf,
    nick: Option<String>,
    user_seen: bool,
    negotiating: bool,
    welcomed: bool,
}

impl Client {
    async fn send(&mut self, line: &str) -> anyhow::Result<()> {
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    fn nick(&self) -> &str {
        self.nick.as_deref().unwrap_or("*")
    }

    async fn maybe_welcome(&mut self) -> anyhow::Result<()> {
        if self.welcomed || self.negotiating || !self.user_seen || self.nick.is_none() {
            return Ok(());
        }
        self.welcomed = true;
        let welcome = format!(":irc.test 001 {} :Welcome to the test network", self.nick());
        self.send(&welcome).await?;
        self.send(":irc.test 376 * :End of /MOTD command.").await?;
        self.send("PING :keepalive").await
    }
}

async fn serve(stream: tokio::net::TcpStream, script: Script) -> anyhow::Result<Vec<String>> {
    let (read, writer) = stream.into_split();
    let mut lines = BufReader::new(read).lines();
    let mut client = Client {
        writer,
        nick: None,
        user_seen: false,
        negotiating: false,
        welcomed: false,
    };
    let mut seen = Vec::new();

    // A client that aborts may reset the connection; keep what was seen.
    while let Ok(Some(line)) = lines.next_line().await {
        seen.push(line.clone());
        let mut words = line.splitn(2, ' ');
        let command = words.next().unwrap_or_default();
        let rest = words.next().unwrap_or_default();

        match command {
            "CAP" if rest.starts_with("LS") => {
                client.negotiating = true;
                let caps = if script.sasl { "multi-prefix sasl" } else { "multi-prefix" };
                client.send(&format!(":irc.test CAP * LS :{caps}")).await?;
            }
            "CAP" if rest.starts_with("REQ") => {
                client.send(":irc.test CAP * ACK :sasl").await?;
            }
            "CAP" if rest == "END" => {
                client.negotiating = false;
                client.maybe_welcome().await?;
            }
            "AUTHENTICATE" if rest == "PLAIN" => client.send("AUTHENTICATE +").await?,
            "AUTHENTICATE" => {
                let reply = format!(
                    ":irc.test 903 {} :SASL authentication successful",
                    client.nick()
                );
                client.send(&reply).await?;
            }
            "NICK" => {
                if script.taken_nicks.iter().any(|n| n == rest) {
                    let reply = format!(":irc.test 433 * {rest} :Nickname is already in use");
                    client.send(&reply).await?;
                } else {
                    client.nick = Some(rest.to_string());
                    client.maybe_welcome().await?;
                }
            }
            "USER" => {
                client.user_seen = true;
                client.maybe_welcome().await?;
            }
            "JOIN" => {
                let channel = rest.split(' ').next().unwrap_or_default().to_string();
                if let Some(code) = script.join_error {
                    let reply = format!(
                        ":irc.test {code} {} {channel} :Cannot join channel",
                        client.nick()
                    );
                    client.send(&reply).await?;
                    continue;
                }
                if script.foreign_join {
                    client.send(&format!(":someone!u@elsewhere JOIN {channel}")).await?;
                }
                let own = format!(":{}!notify@127.0.0.1 JOIN {channel}", client.nick());
                client.send(&own).await?;
            }
            "PART" => {
                let own = format!(":{}!notify@127.0.0.1 PART {rest}", client.nick());
                client.send(&own).await?;
            }
            "VERSION" => {
                let reply = format!(":irc.test 351 {} fakeircd-1.0 irc.test :test", client.nick());
                client.send(&reply).await?;
            }
            "QUIT" => break,
            _ => {}
        }
    }

    Ok(seen)
}
