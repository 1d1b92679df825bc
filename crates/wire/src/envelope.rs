// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Inbound envelope parsing and the command sum type.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tb_core::TrainId;
use thiserror::Error;

use crate::request::BuildRequest;

/// Bus message envelope, shared by inbound commands and outgoing status events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Command or status name
    #[serde(rename = "type")]
    pub kind: String,
    pub data: Map<String, Value>,
    /// Opaque passthrough, echoed back on completion
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Any other top-level keys (e.g. a message `id`), echoed back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Commands the builder understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Start,
    Stop,
    Status,
}

tb_core::wire_enum! {
    CommandKind {
        Start => "trainBuildStart",
        Stop => "trainBuildStop",
        Status => "trainBuildStatus",
    }
}

/// Legacy name for [`CommandKind::Start`] still sent by older UI versions.
const LEGACY_START: &str = "trainBuild";

impl CommandKind {
    /// Parse a command name, accepting the legacy start alias.
    pub fn parse(s: &str) -> Option<Self> {
        if s == LEGACY_START {
            return Some(CommandKind::Start);
        }
        Self::from_wire(s)
    }
}

/// A validated command with its typed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildCommand {
    Start(Box<BuildRequest>),
    Stop { train_id: TrainId },
    Status { train_id: TrainId },
}

impl BuildCommand {
    pub fn kind(&self) -> CommandKind {
        match self {
            BuildCommand::Start(_) => CommandKind::Start,
            BuildCommand::Stop { .. } => CommandKind::Stop,
            BuildCommand::Status { .. } => CommandKind::Status,
        }
    }

    pub fn train_id(&self) -> &TrainId {
        match self {
            BuildCommand::Start(request) => &request.train_id,
            BuildCommand::Stop { train_id } | BuildCommand::Status { train_id } => train_id,
        }
    }

    fn from_data(kind: CommandKind, data: &Map<String, Value>) -> Result<Self, MessageError> {
        match kind {
            CommandKind::Start => Ok(BuildCommand::Start(Box::new(BuildRequest::from_data(data)?))),
            CommandKind::Stop => Ok(BuildCommand::Stop { train_id: train_ref(data)? }),
            CommandKind::Status => Ok(BuildCommand::Status { train_id: train_ref(data)? }),
        }
    }
}

/// A parsed inbound message: the raw envelope (kept for echoing) plus the typed command.
#[derive(Debug, Clone, PartialEq)]
pub struct Inbound {
    pub envelope: Envelope,
    pub command: BuildCommand,
}

/// Errors from inbound message parsing
#[derive(Debug, Error)]
pub enum MessageError {
    /// The body is not JSON at all
    #[error("malformed JSON: {0}")]
    InvalidJson(String),

    /// JSON, but the envelope or payload has the wrong shape
    #[error("malformed message: {0}")]
    Malformed(String),

    /// Well-formed envelope naming a command the builder does not know
    #[error("unrecognized action type: {kind}")]
    UnrecognizedCommand { kind: String, envelope: Box<Envelope> },
}

impl MessageError {
    /// Check if this error belongs to the malformed-message class.
    pub fn is_malformed(&self) -> bool {
        matches!(self, MessageError::InvalidJson(_) | MessageError::Malformed(_))
    }
}

/// Parse a raw bus body into a typed command.
pub fn parse_message(body: &[u8]) -> Result<Inbound, MessageError> {
    let value: Value =
        serde_json::from_slice(body).map_err(|e| MessageError::InvalidJson(e.to_string()))?;
    parse_value(value)
}

/// Parse an already-decoded JSON value into a typed command.
pub fn parse_value(value: Value) -> Result<Inbound, MessageError> {
    if !value.is_object() {
        return Err(MessageError::Malformed("message is not a JSON object".into()));
    }
    let envelope: Envelope =
        serde_json::from_value(value).map_err(|e| MessageError::Malformed(e.to_string()))?;

    let Some(kind) = CommandKind::parse(&envelope.kind) else {
        return Err(MessageError::UnrecognizedCommand {
            kind: envelope.kind.clone(),
            envelope: Box::new(envelope),
        });
    };

    let command = BuildCommand::from_data(kind, &envelope.data)?;
    Ok(Inbound { envelope, command })
}

/// `{trainId}` payload of STOP and STATUS.
fn train_ref(data: &Map<String, Value>) -> Result<TrainId, MessageError> {
    #[derive(Deserialize)]
    struct TrainRef {
        #[serde(rename = "trainId")]
        train_id: TrainId,
    }

    let TrainRef { train_id } = serde_json::from_value(Value::Object(data.clone()))
        .map_err(|e| MessageError::Malformed(e.to_string()))?;
    if train_id.is_empty() {
        return Err(MessageError::Malformed("trainId must not be empty".into()));
    }
    Ok(train_id)
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
