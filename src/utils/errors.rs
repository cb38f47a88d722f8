use std::fmt;
use std::error::Error;

/// Represents errors that can occur while configuring or driving the orbital engine.
///
/// Data-level faults inside a tick (dangling links, coincident nodes) are not errors;
/// they are skipped or guarded where they occur.
#[derive(Debug, Clone, PartialEq)]
pub enum OrbitalError {
    /// The simulation space has a non-positive or non-finite side.
    InvalidDimensions { width: f64, height: f64 },
    /// A tunable constant or call argument is out of range.
    InvalidParameter(String),
    /// The engine has no simulation space yet.
    NotInitialized,
    /// A lifecycle command is not valid in the current state.
    InvalidTransition { from: &'static str, command: &'static str },
    /// An inbound message could not be decoded.
    MalformedMessage(String),
    /// The background engine thread is gone.
    WorkerDisconnected,
    /// A tick panicked inside the background engine.
    TickPanicked(String),
}

impl fmt::Display for OrbitalError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OrbitalError::InvalidDimensions { width, height } => write!(f, "Invalid simulation space {}x{}", width, height),
            OrbitalError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            OrbitalError::NotInitialized => write!(f, "Engine not initialized"),
            OrbitalError::InvalidTransition { from, command } => write!(f, "Cannot {} while {}", command, from),
            OrbitalError::MalformedMessage(msg) => write!(f, "Malformed message: {}", msg),
            OrbitalError::WorkerDisconnected => write!(f, "Worker disconnected"),
            OrbitalError::TickPanicked(msg) => write!(f, "Tick panicked: {}", msg),
        }
    }
}

impl Error for OrbitalError {}
