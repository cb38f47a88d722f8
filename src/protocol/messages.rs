use log::debug;
use serde::{Deserialize, Serialize};

use crate::models::{Link, NodeId, NodePatch, NodeSeed, Position};
use crate::utils::{OrbitalConstants, OrbitalError};

/// Optional overrides for the force constants carried by `INIT`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repulsion_strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attraction_strength: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damping: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gravity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theta: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f64>,
}

impl ConfigPatch {
    /// Overlays the present fields onto `base`.
    pub fn apply_to(&self, base: OrbitalConstants) -> OrbitalConstants {
        OrbitalConstants {
            repulsion_strength: self.repulsion_strength.unwrap_or(base.repulsion_strength),
            attraction_strength: self.attraction_strength.unwrap_or(base.attraction_strength),
            damping: self.damping.unwrap_or(base.damping),
            gravity: self.gravity.unwrap_or(base.gravity),
            theta: self.theta.unwrap_or(base.theta),
            time_step: self.time_step.unwrap_or(base.time_step),
            max_speed: self.max_speed.unwrap_or(base.max_speed),
            ..base
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitPayload {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub config: ConfigPatch,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatePayload {
    #[serde(default)]
    pub nodes: Vec<NodeSeed>,
    #[serde(default)]
    pub links: Vec<Link>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemovePayload {
    pub ids: Vec<NodeId>,
}

/// Inbound commands, host to engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    Init(InitPayload),
    SetInitialState(StatePayload),
    UpdateNodes(Vec<NodePatch>),
    UpdateLinks(Vec<Link>),
    RemoveNodes(RemovePayload),
    StartSimulation,
    StopSimulation,
}

const KNOWN_COMMANDS: [&str; 7] = [
    "INIT",
    "SET_INITIAL_STATE",
    "UPDATE_NODES",
    "UPDATE_LINKS",
    "REMOVE_NODES",
    "START_SIMULATION",
    "STOP_SIMULATION",
];

impl Command {
    /// Protocol name of the command, as found in the `type` field.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Init(_) => "INIT",
            Command::SetInitialState(_) => "SET_INITIAL_STATE",
            Command::UpdateNodes(_) => "UPDATE_NODES",
            Command::UpdateLinks(_) => "UPDATE_LINKS",
            Command::RemoveNodes(_) => "REMOVE_NODES",
            Command::StartSimulation => "START_SIMULATION",
            Command::StopSimulation => "STOP_SIMULATION",
        }
    }

    pub fn to_json(&self) -> Result<String, OrbitalError> {
        serde_json::to_string(self).map_err(|e| OrbitalError::MalformedMessage(e.to_string()))
    }
}

/// Decodes one inbound message.
///
/// Returns `Ok(None)` for a well-formed message whose `type` is not a known
/// command; such messages are to be ignored.
///
/// # Errors
///
/// `MalformedMessage` when the text is not JSON, has no string `type`, or the
/// payload does not fit a known command.
///
/// # Example
/// ```
/// use stardust_orbital::protocol::{decode_command, Command};
///
/// let cmd = decode_command(r#"{"type":"START_SIMULATION"}"#).expect("valid message");
/// assert_eq!(cmd, Some(Command::StartSimulation));
/// assert_eq!(decode_command(r#"{"type":"PING"}"#).expect("valid message"), None);
/// assert!(decode_command("not json").is_err());
/// ```
pub fn decode_command(text: &str) -> Result<Option<Command>, OrbitalError> {
    let value: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| OrbitalError::MalformedMessage(e.to_string()))?;
    let kind = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| OrbitalError::MalformedMessage("missing string field `type`".to_string()))?;
    if !KNOWN_COMMANDS.contains(&kind) {
        debug!("Ignoring unknown message type {}", kind);
        return Ok(None);
    }
    serde_json::from_value(value)
        .map(Some)
        .map_err(|e| OrbitalError::MalformedMessage(e.to_string()))
}

/// Outbound events, engine to host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Event {
    PositionsUpdate(Vec<Position>),
    Error { message: String },
}

impl Event {
    pub fn error(err: impl ToString) -> Self {
        Event::Error { message: err.to_string() }
    }

    pub fn to_json(&self) -> Result<String, OrbitalError> {
        serde_json::to_string(self).map_err(|e| OrbitalError::MalformedMessage(e.to_string()))
    }
}
