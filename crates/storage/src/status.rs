// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status store: last known build status per train.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::RwLock;
use tb_core::{Clock, RecordStatus, SystemClock, TrainBuildRecord, TrainId};

/// Key-value record of build status per train id.
///
/// Writes overwrite unconditionally and are atomic per key. There is no
/// delete; retention is handled outside the builder.
pub trait StatusStore: Send + Sync + 'static {
    /// Overwrite the record for `train_id`.
    fn set(&self, train_id: &TrainId, status: RecordStatus, message: Option<String>);

    /// Current record, or `None` if the train was never written.
    fn get(&self, train_id: &TrainId) -> Option<TrainBuildRecord>;
}

impl<T: StatusStore + ?Sized> StatusStore for Arc<T> {
    fn set(&self, train_id: &TrainId, status: RecordStatus, message: Option<String>) {
        (**self).set(train_id, status, message)
    }

    fn get(&self, train_id: &TrainId) -> Option<TrainBuildRecord> {
        (**self).get(train_id)
    }
}

const SHARD_COUNT: usize = 16;

type Shard = RwLock<HashMap<TrainId, TrainBuildRecord>>;

/// In-memory status store.
///
/// Keys are spread over independent locks so status queries for one train
/// never wait on a write for a train in another shard, and a write holds its
/// shard only for the duration of one map insert.
pub struct MemoryStatusStore<C: Clock = SystemClock> {
    shards: Vec<Shard>,
    clock: C,
}

impl MemoryStatusStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStatusStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStatusStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { shards: (0..SHARD_COUNT).map(|_| RwLock::new(HashMap::new())).collect(), clock }
    }

    /// Number of trains with a record.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| s.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard(&self, train_id: &TrainId) -> &Shard {
        let mut hasher = DefaultHasher::new();
        train_id.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % self.shards.len()]
    }
}

impl<C: Clock> StatusStore for MemoryStatusStore<C> {
    fn set(&self, train_id: &TrainId, status: RecordStatus, message: Option<String>) {
        let record = TrainBuildRecord {
            train_id: train_id.clone(),
            status,
            message,
            updated_at_ms: self.clock.epoch_ms(),
        };
        let previous = self.shard(train_id).write().insert(train_id.clone(), record);
        tracing::debug!(
            train_id = %train_id,
            from = ?previous.map(|r| r.status),
            to = %status,
            "status updated"
        );
    }

    fn get(&self, train_id: &TrainId) -> Option<TrainBuildRecord> {
        self.shard(train_id).read().get(train_id).cloned()
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
