//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Config struct definitions (Config, IrcConfig, OutputConfig)
//! - [`defaults`]: serde default value functions
//! - [`validation`]: startup checks that report every problem at once

mod defaults;
mod types;
mod validation;

pub use defaults::{DEFAULT_NICKNAME, DEFAULT_PORT, DEFAULT_SERVER};
pub use types::{Config, ConfigError, IrcConfig, OutputConfig, normalize_channel};
pub use validation::{MAX_CHANNEL_LEN, ValidationError, validate};
