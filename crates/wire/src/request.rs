// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Payload of a START command.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tb_core::TrainId;

use crate::envelope::MessageError;

/// Owning user of a train. The UI sends numeric ids; other producers send strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserId {
    Numeric(i64),
    Named(String),
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserId::Numeric(n) => write!(f, "{}", n),
            UserId::Named(s) => f.write_str(s),
        }
    }
}

/// Everything needed to build one train image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildRequest {
    pub train_id: TrainId,
    pub proposal_id: i64,
    /// Stations in visiting order
    pub stations: Vec<String>,
    pub files: Vec<String>,
    /// Master image reference below the registry's `master` project, e.g. `python/base`
    pub master_image: String,
    pub entrypoint_executable: String,
    pub entrypoint_path: String,
    #[serde(
        rename = "entrypointCommandArguments",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub entrypoint_args: Option<Vec<String>>,
    pub session_id: String,
    /// Hex digest of the train payload
    pub hash: String,
    /// Hex signature over the digest bytes
    pub hash_signed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<Map<String, Value>>,
    #[serde(rename = "user_he_key", default, skip_serializing_if = "Option::is_none")]
    pub user_he_key: Option<String>,
    /// Owner whose public key must verify `hash_signed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

impl BuildRequest {
    /// Decode and validate the `data` mapping of a START envelope.
    pub fn from_data(data: &Map<String, Value>) -> Result<Self, MessageError> {
        let request: BuildRequest = serde_json::from_value(Value::Object(data.clone()))
            .map_err(|e| MessageError::Malformed(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Serialize back into a `data` mapping.
    pub fn to_data(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    fn validate(&self) -> Result<(), MessageError> {
        let required = [
            ("trainId", self.train_id.as_str()),
            ("masterImage", self.master_image.as_str()),
            ("entrypointExecutable", self.entrypoint_executable.as_str()),
            ("entrypointPath", self.entrypoint_path.as_str()),
            ("hash", self.hash.as_str()),
            ("hashSigned", self.hash_signed.as_str()),
        ];
        if let Some((field, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(MessageError::Malformed(format!("{} must not be empty", field)));
        }
        if self.stations.is_empty() {
            return Err(MessageError::Malformed("stations must not be empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
