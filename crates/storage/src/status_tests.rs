// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use std::time::Duration;
use tb_core::test_support::strategies::{arb_record_status, arb_train_id};
use tb_core::FakeClock;

#[test]
fn get_on_unwritten_train_is_none() {
    let store = MemoryStatusStore::new();
    assert_eq!(store.get(&TrainId::new("never")), None);
    assert!(store.is_empty());
}

#[test]
fn set_overwrites_previous_record() {
    let clock = FakeClock::new();
    let store = MemoryStatusStore::with_clock(clock.clone());
    let id = TrainId::new("T1");

    store.set(&id, RecordStatus::Started, None);
    clock.advance(Duration::from_secs(5));
    store.set(&id, RecordStatus::Failed, Some("push failed".into()));

    let record = store.get(&id).unwrap();
    assert_eq!(record.status, RecordStatus::Failed);
    assert_eq!(record.message.as_deref(), Some("push failed"));
    assert_eq!(record.updated_at_ms, clock.epoch_ms());
    assert_eq!(store.len(), 1);
}

#[test]
fn message_is_cleared_when_next_write_has_none() {
    let store = MemoryStatusStore::new();
    let id = TrainId::new("T1");
    store.set(&id, RecordStatus::Failed, Some("boom".into()));
    store.set(&id, RecordStatus::Stopped, None);
    assert_eq!(store.get(&id).unwrap().message, None);
}

#[test]
fn concurrent_writers_on_distinct_keys_do_not_interfere() {
    let store = Arc::new(MemoryStatusStore::new());
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let store = Arc::clone(&store);
            std::thread::spawn(move || {
                for i in 0..200 {
                    let id = TrainId::new(format!("t{}-{}", t, i));
                    store.set(&id, RecordStatus::Started, None);
                    store.set(&id, RecordStatus::Finished, Some(format!("{}", i)));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(store.len(), 8 * 200);
    for t in 0..8 {
        for i in 0..200 {
            let record = store.get(&TrainId::new(format!("t{}-{}", t, i))).unwrap();
            assert_eq!(record.status, RecordStatus::Finished);
            assert_eq!(record.message, Some(format!("{}", i)));
        }
    }
}

#[test]
fn arc_store_delegates() {
    let store: Arc<dyn StatusStore> = Arc::new(MemoryStatusStore::new());
    store.set(&TrainId::new("T1"), RecordStatus::Stopped, None);
    assert_eq!(store.get(&TrainId::new("T1")).unwrap().status, RecordStatus::Stopped);
}

proptest! {
    #[test]
    fn get_returns_last_value_set(
        writes in proptest::collection::vec((arb_train_id(), arb_record_status()), 0..64)
    ) {
        let store = MemoryStatusStore::with_clock(FakeClock::new());
        let mut model = HashMap::new();
        for (id, status) in &writes {
            store.set(&TrainId::new(id.as_str()), *status, None);
            model.insert(id.clone(), *status);
        }
        prop_assert_eq!(store.len(), model.len());
        for (id, status) in &model {
            prop_assert_eq!(store.get(&TrainId::new(id.as_str())).map(|r| r.status), Some(*status));
        }
    }
}
