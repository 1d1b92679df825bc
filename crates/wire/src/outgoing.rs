// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outgoing status events and the router notice.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tb_core::{BuildStatus, TrainId};

use crate::envelope::Envelope;

/// Key under `data` holding the human-readable outcome of a build.
pub const BUILD_MESSAGE_KEY: &str = "buildMessage";

/// Fixed diagnostic for bodies that are not JSON.
pub const MALFORMED_JSON: &str = "Malformed JSON";

/// Type of the router notice.
pub const TRAIN_BUILT: &str = "trainBuilt";

impl Envelope {
    /// `{type: <status>, data: {trainId}}` with empty metadata.
    pub fn status(status: BuildStatus, train_id: &TrainId) -> Self {
        let mut data = Map::new();
        data.insert("trainId".into(), Value::String(train_id.to_string()));
        Self { kind: status.as_wire().to_string(), data, metadata: Map::new(), extra: Map::new() }
    }

    /// Rewrite `type` to `status` and set `data.buildMessage`, keeping everything else.
    pub fn completion(mut self, status: BuildStatus, build_message: impl Into<String>) -> Self {
        self.kind = status.as_wire().to_string();
        self.data.insert(BUILD_MESSAGE_KEY.into(), Value::String(build_message.into()));
        self
    }

    /// FAILED event answering a body that could not be decoded at all.
    pub fn malformed_json() -> Self {
        Self::failure_notice(None, MALFORMED_JSON)
    }

    /// FAILED event carrying a diagnostic under `data.message`.
    ///
    /// Used when no well-formed inbound envelope is available to echo.
    pub fn failure_notice(train_id: Option<&TrainId>, message: impl Into<String>) -> Self {
        let mut data = Map::new();
        if let Some(id) = train_id {
            data.insert("trainId".into(), Value::String(id.to_string()));
        }
        data.insert("message".into(), Value::String(message.into()));
        Self {
            kind: BuildStatus::Failed.as_wire().to_string(),
            data,
            metadata: Map::new(),
            extra: Map::new(),
        }
    }

    /// Attach `data.buildMessage` without touching `type`.
    pub fn with_build_message(mut self, build_message: Option<&str>) -> Self {
        if let Some(msg) = build_message {
            self.data.insert(BUILD_MESSAGE_KEY.into(), Value::String(msg.to_string()));
        }
        self
    }

    /// The status this envelope reports, if `type` is a status name.
    pub fn build_status(&self) -> Option<BuildStatus> {
        BuildStatus::from_wire(&self.kind)
    }

    pub fn build_message(&self) -> Option<&str> {
        self.data.get(BUILD_MESSAGE_KEY).and_then(Value::as_str)
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Notice telling the train router that a route is stored and retrievable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterNotice {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: RouterNoticeData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterNoticeData {
    #[serde(rename = "trainId")]
    pub train_id: TrainId,
}

impl RouterNotice {
    pub fn train_built(train_id: &TrainId) -> Self {
        Self { kind: TRAIN_BUILT.to_string(), data: RouterNoticeData { train_id: train_id.clone() } }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
#[path = "outgoing_tests.rs"]
mod tests;
