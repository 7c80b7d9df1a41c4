//! One-shot delivery session.
//!
//! [`machine`] holds the pure lifecycle; [`driver`] feeds it from a [`Wire`].

pub mod driver;
pub mod machine;

pub use driver::{Wire, run_session};
pub use machine::{
    AckToken, DeliveryMode, Effects, MESSAGE_CHUNK_LEN, Phase, Session, SessionEvent,
    SessionParams, SessionState, chunk_len, split_text,
};
