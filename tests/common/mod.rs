//! Integration test common infrastructure.
//!
//! Provides a scripted loopback IRC server plus helpers for writing event
//! files and building client configuration.

pub mod server;

use std::path::{Path, PathBuf};

use slirc_notify::config::Config;

#[allow(unused_imports)]
pub use server::{Script, TestServer};

/// A push with one commit, rendering to two lines.
#[allow(dead_code)]
pub const PUSH_EVENT: &str = r#"{
    "repository": {"name": "slirc"},
    "pusher": {"name": "ada"},
    "ref": "refs/heads/main",
    "compare": "https://github.com/sid3xyz/slirc/compare/a...b",
    "commits": [{"id": "abcdef1234567", "message": "Fix bug\n\nLonger body"}]
}"#;

/// Write `json` to `event.json` inside `dir`.
pub fn write_event(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join("event.json");
    std::fs::write(&path, json).expect("Failed to write event file");
    path
}

/// Client configuration pointing at a local test server.
pub fn config_for(port: u16) -> Config {
    let mut config = Config::default();
    config.irc.server = "127.0.0.1".to_string();
    config.irc.port = port;
    config.irc.nickname = "notify".to_string();
    config.irc.channel = "ci".to_string();
    config.normalize();
    config
}

/// Position of the first line equal to `line`, or panic with the transcript.
pub fn position(lines: &[String], line: &str) -> usize {
    lines
        .iter()
        .position(|l| l == line)
        .unwrap_or_else(|| panic!("line {line:?} not sent; transcript: {lines:#?}"))
}
