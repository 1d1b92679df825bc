// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! START scenarios: the build pipeline from message to pushed image.

use crate::prelude::*;

#[tokio::test]
async fn verified_start_is_built_pushed_and_routed() {
    let world = World::new();
    let response = world.send(&signed_start("T1")).await;

    assert_eq!(world.ui_events(), vec!["trainBuildStarted", "trainBuildFinished"]);
    assert_eq!(response.build_status(), Some(BuildStatus::Finished));

    let record = world.record("T1").unwrap();
    assert_eq!(record.status, RecordStatus::Finished);
    assert_eq!(record.message.as_deref(), response.build_message());

    assert_eq!(world.images.pushes(), vec![format!("{}/python/T1:base", REGISTRY)]);
    let notices = world.publisher.on(ROUTER);
    assert_eq!(notices.len(), 1);
    similar_asserts::assert_eq!(
        notices[0].payload,
        json!({ "type": "trainBuilt", "data": { "trainId": "T1" } })
    );
    assert!(world.secrets.route("T1").is_some());
}

#[tokio::test]
async fn recipe_runs_the_entrypoint_from_the_train_directory() {
    let world = World::new();
    world.send(&signed_start("T1")).await;

    let builds = world.images.builds();
    assert_eq!(builds.len(), 1);
    similar_asserts::assert_eq!(
        builds[0].recipe,
        format!(
            "FROM {}/master/python/base\n\
             RUN mkdir /opt/pht_train && mkdir /opt/pht_results && chmod -R +x /opt/pht_train \n\
             CMD [\"python\", \"/opt/pht_train/test_train/entrypoint.py\"]\n",
            REGISTRY
        )
    );
    assert_eq!(builds[0].labels.get("pht.train_id").map(String::as_str), Some("T1"));
}

#[tokio::test]
async fn forged_signature_never_reaches_the_image_engine() {
    let world = World::new();
    let response = world.send(&forged_start("T2")).await;

    assert_eq!(world.ui_events(), vec!["trainBuildFailed"]);
    assert_eq!(response.build_status(), Some(BuildStatus::Failed));
    assert!(world.images.builds().is_empty());
    assert!(world.images.pushes().is_empty());
    assert!(world.publisher.on(ROUTER).is_empty());
    assert_eq!(world.record("T2").unwrap().status, RecordStatus::Failed);
}

#[tokio::test]
async fn push_failure_is_reported_with_engine_diagnostics() {
    let world = World::new();
    world.images.fail_push("denied: requested access to the resource is denied");
    let response = world.send(&signed_start("T3")).await;

    assert_eq!(world.ui_events(), vec!["trainBuildStarted", "trainBuildFailed"]);
    assert!(response.build_message().unwrap().contains("requested access to the resource is denied"));
    assert_eq!(world.record("T3").unwrap().status, RecordStatus::Failed);
    assert!(world.secrets.route("T3").is_none());
    assert!(world.publisher.on(ROUTER).is_empty());
}

#[tokio::test]
async fn route_storage_failure_fails_the_build_despite_the_pushed_image() {
    let world = World::new();
    world.secrets.fail_store_route(true);
    let response = world.send(&signed_start("T4")).await;

    assert_eq!(world.images.pushes().len(), 1);
    assert_eq!(response.build_status(), Some(BuildStatus::Failed));
    assert_eq!(world.record("T4").unwrap().status, RecordStatus::Failed);
    assert!(world.publisher.on(ROUTER).is_empty());
}

#[tokio::test]
async fn duplicate_start_while_building_is_rejected() {
    let world = World::new();
    let gate = world.images.hold();

    let first = {
        let orchestrator = world.orchestrator.clone();
        tokio::spawn(async move { orchestrator.handle_message(&signed_start("T5")).await })
    };
    gate.entered().await;

    let second = world.send(&signed_start("T5")).await;
    assert_eq!(second.build_status(), Some(BuildStatus::Failed));
    assert!(second.build_message().unwrap().contains("already in progress"));
    assert_eq!(world.record("T5").unwrap().status, RecordStatus::Started);

    gate.release();
    let first = first.await.unwrap();
    assert_eq!(first.build_status(), Some(BuildStatus::Finished));
    assert_eq!(world.images.builds().len(), 1);
    assert_eq!(world.record("T5").unwrap().status, RecordStatus::Finished);
}
