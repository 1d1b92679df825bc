// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared world for the specs.

use std::sync::Arc;

use tb_adapters::{FakeImageAssembler, FakePublisher, FakeSecrets, PublishedMessage};
use tb_core::{TrainBuildRecord, TrainId};
use tb_engine::{Orchestrator, OrchestratorConfig, OrchestratorDeps};
use tb_storage::{MemoryStatusStore, StatusStore};
use tb_wire::fixtures;

pub use serde_json::json;
pub use tb_core::{BuildStatus, RecordStatus};

pub const USER: &str = "99999999";
pub const UI: &str = "ui.tb.event";
pub const ROUTER: &str = "tr";
pub const REGISTRY: &str = "harbor.pht.local";

/// Orchestrator wired to fakes, plus handles to observe them.
pub struct World {
    pub orchestrator: Orchestrator<FakeSecrets, FakeImageAssembler, FakePublisher>,
    pub secrets: FakeSecrets,
    pub images: FakeImageAssembler,
    pub publisher: FakePublisher,
    pub store: Arc<MemoryStatusStore>,
}

impl World {
    pub fn new() -> Self {
        let secrets = FakeSecrets::new().with_user(USER, fixtures::USER_PUBLIC_KEY, None);
        let images = FakeImageAssembler::new();
        let publisher = FakePublisher::new();
        let store = Arc::new(MemoryStatusStore::new());
        let orchestrator = Orchestrator::new(
            OrchestratorDeps {
                secrets: secrets.clone(),
                images: images.clone(),
                publisher: publisher.clone(),
                store: store.clone(),
            },
            OrchestratorConfig::new(REGISTRY, "https://pht.local/api/"),
        );
        Self { orchestrator, secrets, images, publisher, store }
    }

    pub async fn send(&self, body: &[u8]) -> tb_wire::Envelope {
        self.orchestrator.handle_message(body).await
    }

    /// `type` of every event on the UI channel, in order.
    pub fn ui_events(&self) -> Vec<String> {
        kinds(&self.publisher.on(UI))
    }

    pub fn record(&self, train_id: &str) -> Option<TrainBuildRecord> {
        self.store.get(&TrainId::new(train_id))
    }
}

pub fn kinds(messages: &[PublishedMessage]) -> Vec<String> {
    messages.iter().filter_map(|m| m.kind()).map(String::from).collect()
}

/// START for `train_id`, signed by the registered user.
pub fn signed_start(train_id: &str) -> Vec<u8> {
    fixtures::signed_start_message(train_id)
}

/// START for `train_id`, signed by someone else.
pub fn forged_start(train_id: &str) -> Vec<u8> {
    fixtures::start_message(train_id, fixtures::TRAIN_HASH, fixtures::FORGED_HASH_SIGNED)
}

pub fn stop(train_id: &str) -> Vec<u8> {
    fixtures::train_message("trainBuildStop", train_id)
}

pub fn status(train_id: &str) -> Vec<u8> {
    fixtures::train_message("trainBuildStatus", train_id)
}
