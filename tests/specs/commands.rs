// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! STOP, STATUS and messages that never become commands.

use crate::prelude::*;

#[tokio::test]
async fn non_json_body_gets_one_failure_and_no_record() {
    let world = World::new();
    let response = world.send(b"{trainId: T1").await;

    let events = world.publisher.messages();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind(), Some("trainBuildFailed"));
    let message = response.data.get("message").and_then(|m| m.as_str()).unwrap();
    assert!(message.to_lowercase().contains("malformed"));
    assert!(world.store.is_empty());
}

#[tokio::test]
async fn unrecognized_command_is_echoed_as_failure() {
    let world = World::new();
    let body = json!({
        "type": "trainBuildPause",
        "data": { "trainId": "T1" },
        "metadata": { "origin": "ui" }
    });
    let response = world.send(body.to_string().as_bytes()).await;

    assert_eq!(response.build_status(), Some(BuildStatus::Failed));
    assert!(response.build_message().unwrap().contains("trainBuildPause"));
    assert_eq!(response.metadata.get("origin"), Some(&json!("ui")));
    assert!(world.store.is_empty());
}

#[tokio::test]
async fn stop_for_unknown_train_records_stopped() {
    let world = World::new();
    world.send(&stop("ghost")).await;

    assert_eq!(world.ui_events(), vec!["trainBuildStopped"]);
    assert_eq!(world.record("ghost").unwrap().status, RecordStatus::Stopped);

    let response = world.send(&status("ghost")).await;
    assert_eq!(response.build_status(), Some(BuildStatus::Stopped));
}

#[tokio::test]
async fn status_for_unknown_train_is_not_found() {
    let world = World::new();
    let response = world.send(&status("nobody")).await;

    assert_eq!(response.build_status(), Some(BuildStatus::NotFound));
    assert_eq!(world.ui_events(), vec!["trainNotFound"]);
    assert!(world.record("nobody").is_none());
}

#[tokio::test]
async fn status_reports_the_last_outcome() {
    let world = World::new();
    world.send(&signed_start("T1")).await;

    let response = world.send(&status("T1")).await;
    assert_eq!(response.build_status(), Some(BuildStatus::Finished));
    assert!(response.build_message().unwrap().starts_with("Train image pushed to"));
}

#[tokio::test]
async fn stop_after_finish_overwrites_the_record() {
    let world = World::new();
    world.send(&signed_start("T1")).await;
    world.send(&stop("T1")).await;

    assert_eq!(world.record("T1").unwrap().status, RecordStatus::Stopped);
}

#[tokio::test]
async fn failures_do_not_poison_later_messages() {
    let world = World::new();
    world.send(b"garbage").await;
    world.send(&forged_start("T1")).await;
    world.secrets.fail_credential(true);
    world.send(&signed_start("T2")).await;
    world.secrets.fail_credential(false);
    let response = world.send(&signed_start("T3")).await;

    assert_eq!(response.build_status(), Some(BuildStatus::Finished));
    assert_eq!(world.record("T1").unwrap().status, RecordStatus::Failed);
    assert_eq!(world.record("T2").unwrap().status, RecordStatus::Failed);
    assert_eq!(world.record("T3").unwrap().status, RecordStatus::Finished);
}
