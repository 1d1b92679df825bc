// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

/// Proptest strategies for core status types.
pub mod strategies {
    use crate::status::RecordStatus;
    use proptest::prelude::*;

    pub fn arb_record_status() -> impl Strategy<Value = RecordStatus> {
        prop_oneof![
            Just(RecordStatus::Started),
            Just(RecordStatus::Failed),
            Just(RecordStatus::Finished),
            Just(RecordStatus::Stopped),
        ]
    }

    /// Short train ids drawn from a small alphabet so collisions are common.
    pub fn arb_train_id() -> impl Strategy<Value = String> {
        "[a-d][0-3]"
    }
}
