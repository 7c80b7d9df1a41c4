//! Tokio codec that frames IRC lines into [`Message`] values.
//!
//! Inbound lines are decoded lossily: servers still emit Latin-1 MOTDs and
//! the notifier never needs to inspect that text.

use bytes::{BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use super::MAX_IRC_LINE_LEN;
use super::error::IrcError;
use super::message::Message;

/// Upper bound for an inbound line, IRCv3 tags included.
pub const MAX_INBOUND_LINE_LEN: usize = 8191 + MAX_IRC_LINE_LEN;

/// Codec for one IRC connection.
#[derive(Debug, Default)]
pub struct IrcCodec {
    /// Index of next byte to check for newline
    next_index: usize,
}

impl IrcCodec {
    pub fn new() -> Self {
        Self::default()
    }

    fn take_line(&mut self, src: &mut BytesMut) -> Result<Option<String>, IrcError> {
        if let Some(offset) = src[self.next_index..].iter().position(|b| *b == b'\n') {
            let line = src.split_to(self.next_index + offset + 1);
            self.next_index = 0;

            if line.len() > MAX_INBOUND_LINE_LEN {
                return Err(IrcError::LineTooLong {
                    actual: line.len(),
                    limit: MAX_INBOUND_LINE_LEN,
                });
            }
            return Ok(Some(String::from_utf8_lossy(&line).into_owned()));
        }

        self.next_index = src.len();
        if src.len() > MAX_INBOUND_LINE_LEN {
            return Err(IrcError::LineTooLong {
                actual: src.len(),
                limit: MAX_INBOUND_LINE_LEN,
            });
        }
        Ok(None)
    }
}

impl Decoder for IrcCodec {
    type Item = Message;
    type Error = IrcError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>, IrcError> {
        while let Some(line) = self.take_line(src)? {
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(line.parse()?));
        }
        Ok(None)
    }
}

impl Encoder<Message> for IrcCodec {
    type Error = IrcError;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<(), IrcError> {
        let line = msg.to_string();
        if line.contains(['\r', '\n', '\0']) {
            return Err(IrcError::IllegalControlChar(line));
        }
        if line.len() + 2 > MAX_IRC_LINE_LEN {
            return Err(IrcError::LineTooLong {
                actual: line.len() + 2,
                limit: MAX_IRC_LINE_LEN,
            });
        }

        dst.reserve(line.len() + 2);
        dst.put_slice(line.as_bytes());
        dst.put_slice(b"\r\n");
        Ok(())
    }
}
