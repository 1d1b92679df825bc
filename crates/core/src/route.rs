// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Route information handed to the downstream train router.

use crate::id::TrainId;
use serde::{Deserialize, Serialize};

/// Where a built train lives and which stations it visits.
///
/// Written to the secret store after a successful push; the router reads it
/// back by train id once it receives the `trainBuilt` notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteInfo {
    /// Repository path of the train image below the registry namespace
    pub repository_suffix: String,
    /// Stations in visiting order
    pub stations: Vec<String>,
    pub periodic: bool,
    pub epochs: u32,
}

impl RouteInfo {
    /// Route for a freshly built, single-pass train.
    pub fn single_pass(train_id: &TrainId, stations: &[String]) -> Self {
        Self {
            repository_suffix: train_id.to_string(),
            stations: stations.to_vec(),
            periodic: false,
            epochs: 1,
        }
    }
}
