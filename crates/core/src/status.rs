// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Build status state machine.

use crate::id::TrainId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of one train build, as reported on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildStatus {
    Started,
    Failed,
    Finished,
    Stopped,
    /// Synthesized for status queries on unknown trains. Never stored.
    NotFound,
}

crate::wire_enum! {
    BuildStatus {
        Started => "trainBuildStarted",
        Failed => "trainBuildFailed",
        Finished => "trainBuildFinished",
        Stopped => "trainBuildStopped",
        NotFound => "trainNotFound",
    }
}

impl BuildStatus {
    /// Check if no further transition is expected without a new command.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildStatus::Failed | BuildStatus::Finished | BuildStatus::Stopped)
    }
}

/// The storable subset of [`BuildStatus`].
///
/// Keeping `NotFound` out of this type means a status store cannot be asked
/// to persist it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    Started,
    Failed,
    Finished,
    Stopped,
}

crate::simple_display! {
    RecordStatus {
        Started => "started",
        Failed => "failed",
        Finished => "finished",
        Stopped => "stopped",
    }
}

impl From<RecordStatus> for BuildStatus {
    fn from(s: RecordStatus) -> Self {
        match s {
            RecordStatus::Started => BuildStatus::Started,
            RecordStatus::Failed => BuildStatus::Failed,
            RecordStatus::Finished => BuildStatus::Finished,
            RecordStatus::Stopped => BuildStatus::Stopped,
        }
    }
}

/// Last known state of a train build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainBuildRecord {
    pub train_id: TrainId,
    pub status: RecordStatus,
    /// Outcome text of the last transition, if it had one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Epoch ms of the last write
    pub updated_at_ms: u64,
}

impl TrainBuildRecord {
    pub fn build_status(&self) -> BuildStatus {
        self.status.into()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
