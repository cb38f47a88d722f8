//! Message protocol between a host and an engine running elsewhere.
//!
//! Messages are JSON objects `{"type": "...", "payload": ...}`.
mod messages;

pub use messages::*;
