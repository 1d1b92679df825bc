// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Trains with a build currently running in this process.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;
use tb_core::TrainId;

/// Set of trains being built. Clones share the set.
#[derive(Debug, Clone, Default)]
pub struct InFlight {
    trains: Arc<Mutex<HashSet<TrainId>>>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `train_id`, or `None` if a build for it is already running.
    ///
    /// The claim lasts as long as the returned guard.
    pub fn try_claim(&self, train_id: &TrainId) -> Option<InFlightGuard> {
        if !self.trains.lock().insert(train_id.clone()) {
            return None;
        }
        Some(InFlightGuard { trains: Arc::clone(&self.trains), train_id: train_id.clone() })
    }

    pub fn contains(&self, train_id: &TrainId) -> bool {
        self.trains.lock().contains(train_id)
    }

    pub fn len(&self) -> usize {
        self.trains.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases the train's claim on drop.
#[derive(Debug)]
pub struct InFlightGuard {
    trains: Arc<Mutex<HashSet<TrainId>>>,
    train_id: TrainId,
}

impl InFlightGuard {
    pub fn train_id(&self) -> &TrainId {
        &self.train_id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.trains.lock().remove(&self.train_id);
    }
}

#[cfg(test)]
#[path = "in_flight_tests.rs"]
mod tests;
