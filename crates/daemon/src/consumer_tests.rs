// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tb_adapters::{FakeImageAssembler, FakePublisher, FakeSecrets, FakeSource};
use tb_engine::{OrchestratorConfig, OrchestratorDeps};
use tb_storage::MemoryStatusStore;
use tb_wire::fixtures;
use tokio::task::JoinHandle;

const UI: &str = "ui.tb.event";

struct Harness {
    source: FakeSource,
    images: FakeImageAssembler,
    publisher: FakePublisher,
    shutdown: CancellationToken,
    handle: JoinHandle<()>,
}

fn spawn(max_concurrent: usize, source: FakeSource, images: FakeImageAssembler) -> Harness {
    let secrets = FakeSecrets::new().with_user("99999999", fixtures::USER_PUBLIC_KEY, None);
    let publisher = FakePublisher::new();
    let orchestrator = Orchestrator::new(
        OrchestratorDeps {
            secrets,
            images: images.clone(),
            publisher: publisher.clone(),
            store: Arc::new(MemoryStatusStore::new()),
        },
        OrchestratorConfig::new("harbor.local", "https://pht.local/api/"),
    );
    let consumer =
        Consumer::new(source.clone(), orchestrator, max_concurrent, Duration::from_millis(5));
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(consumer.run(shutdown.clone()));
    Harness { source, images, publisher, shutdown, handle }
}

async fn wait_until(what: &str, cond: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(5), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {}", what);
}

fn ui_kinds(publisher: &FakePublisher) -> Vec<String> {
    publisher.on(UI).iter().filter_map(|m| m.kind()).map(String::from).collect()
}

#[tokio::test]
async fn handles_queued_messages_and_acks_them() {
    let source = FakeSource::new();
    source.push(fixtures::train_message("trainBuildStop", "t1"));
    source.push(fixtures::train_message("trainBuildStatus", "t1"));
    let h = spawn(1, source, FakeImageAssembler::new());

    wait_until("two acks", || h.source.acked().len() == 2).await;
    assert_eq!(ui_kinds(&h.publisher), vec!["trainBuildStopped", "trainBuildStopped"]);

    h.shutdown.cancel();
    h.handle.await.unwrap();
    assert_eq!(h.source.pending(), 0);
}

#[tokio::test]
async fn malformed_message_is_answered_and_acked() {
    let source = FakeSource::new();
    source.push(b"not json".to_vec());
    let h = spawn(1, source, FakeImageAssembler::new());

    wait_until("ack", || h.source.acked().len() == 1).await;
    assert_eq!(ui_kinds(&h.publisher), vec!["trainBuildFailed"]);

    h.shutdown.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn fetch_failure_does_not_stop_the_loop() {
    let source = FakeSource::new();
    source.fail_next_fetch("connection refused");
    source.push(fixtures::train_message("trainBuildStatus", "t9"));
    let h = spawn(1, source, FakeImageAssembler::new());

    wait_until("ack", || h.source.acked().len() == 1).await;
    assert_eq!(ui_kinds(&h.publisher), vec!["trainNotFound"]);

    h.shutdown.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn messages_arriving_later_are_picked_up() {
    let h = spawn(1, FakeSource::new(), FakeImageAssembler::new());
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(h.publisher.messages().is_empty());

    h.source.push(fixtures::train_message("trainBuildStop", "late"));
    wait_until("ack", || h.source.acked().len() == 1).await;

    h.shutdown.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn concurrency_limit_holds_later_messages_on_the_queue() {
    let images = FakeImageAssembler::new();
    let gate = images.hold();
    let source = FakeSource::new();
    source.push(fixtures::signed_start_message("t1"));
    let h = spawn(1, source, images);

    gate.entered().await;
    h.source.push(fixtures::train_message("trainBuildStatus", "t1"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(h.source.pending(), 1);
    assert_eq!(ui_kinds(&h.publisher), vec!["trainBuildStarted"]);

    gate.release();
    wait_until("both acks", || h.source.acked().len() == 2).await;
    assert_eq!(
        ui_kinds(&h.publisher),
        vec!["trainBuildStarted", "trainBuildFinished", "trainBuildFinished"]
    );

    h.shutdown.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn spare_permits_let_status_through_during_a_build() {
    let images = FakeImageAssembler::new();
    let gate = images.hold();
    let source = FakeSource::new();
    source.push(fixtures::signed_start_message("t1"));
    let h = spawn(2, source, images);

    gate.entered().await;
    h.source.push(fixtures::train_message("trainBuildStatus", "t1"));
    wait_until("status ack", || h.source.acked().len() == 1).await;
    assert_eq!(ui_kinds(&h.publisher), vec!["trainBuildStarted", "trainBuildStarted"]);

    gate.release();
    wait_until("build ack", || h.source.acked().len() == 2).await;
    h.shutdown.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn shutdown_waits_for_running_builds() {
    let images = FakeImageAssembler::new();
    let gate = images.hold();
    let source = FakeSource::new();
    source.push(fixtures::signed_start_message("t1"));
    let h = spawn(1, source, images);

    gate.entered().await;
    h.shutdown.cancel();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!h.handle.is_finished());

    gate.release();
    h.handle.await.unwrap();
    assert_eq!(ui_kinds(&h.publisher), vec!["trainBuildStarted", "trainBuildFinished"]);
    assert_eq!(h.images.pushes(), vec!["harbor.local/python/t1:base"]);
    assert_eq!(h.source.acked().len(), 1);
}

#[tokio::test]
async fn shutdown_leaves_unfetched_messages_on_the_queue() {
    let images = FakeImageAssembler::new();
    let gate = images.hold();
    let source = FakeSource::new();
    source.push(fixtures::signed_start_message("t1"));
    let h = spawn(1, source, images);

    gate.entered().await;
    h.source.push(fixtures::train_message("trainBuildStop", "t2"));
    h.shutdown.cancel();
    gate.release();
    h.handle.await.unwrap();

    assert_eq!(h.source.pending(), 1);
    assert_eq!(h.source.acked().len(), 1);
}

#[tokio::test]
async fn message_stays_unacked_until_its_build_finishes() {
    let images = FakeImageAssembler::new();
    let gate = images.hold();
    let source = FakeSource::new();
    source.push(fixtures::signed_start_message("t1"));
    let h = spawn(1, source, images);

    gate.entered().await;
    assert_eq!(h.source.unacked().len(), 1);
    assert!(h.source.acked().is_empty());

    gate.release();
    wait_until("ack", || h.source.acked().len() == 1).await;
    assert!(h.source.unacked().is_empty());

    h.shutdown.cancel();
    h.handle.await.unwrap();
}

#[tokio::test]
async fn command_survives_a_crash_mid_build() {
    let images = FakeImageAssembler::new();
    let gate = images.hold();
    let source = FakeSource::new();
    source.push(fixtures::signed_start_message("t1"));
    let crashed = spawn(1, source.clone(), images);

    gate.entered().await;
    crashed.handle.abort();
    assert!(crashed.handle.await.unwrap_err().is_cancelled());
    source.drop_connection();
    assert_eq!(source.pending(), 1);
    assert!(source.acked().is_empty());

    let restarted = spawn(1, source, FakeImageAssembler::new());
    wait_until("redelivered ack", || restarted.source.acked().len() == 1).await;
    assert!(restarted.source.acked()[0].redelivered);
    assert_eq!(ui_kinds(&restarted.publisher), vec!["trainBuildStarted", "trainBuildFinished"]);
    assert_eq!(restarted.images.pushes(), vec!["harbor.local/python/t1:base"]);

    restarted.shutdown.cancel();
    restarted.handle.await.unwrap();
}
