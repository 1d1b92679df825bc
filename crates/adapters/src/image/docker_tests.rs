// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;

fn image_build() -> ImageBuild {
    let mut labels = BTreeMap::new();
    labels.insert("pht.train_id".to_string(), "t1".to_string());
    labels.insert("pht.session_id".to_string(), "s1".to_string());
    ImageBuild {
        recipe: "FROM scratch\n".to_string(),
        tag: "harbor.local/python/t1:base".to_string(),
        labels,
    }
}

// `echo` stands in for the engine so the argument list shows up in the log
#[tokio::test]
async fn build_passes_tag_labels_and_context() {
    let assembler = DockerAssembler::new("echo");
    let log = assembler.build(&image_build()).await.unwrap();

    assert_eq!(log.lines.len(), 1);
    let line = &log.lines[0];
    assert!(line.starts_with(
        "build --tag harbor.local/python/t1:base --label pht.session_id=s1 --label pht.train_id=t1 "
    ));
    assert!(line.contains("tb-build-"));
}

#[tokio::test]
async fn push_passes_tag() {
    let log = DockerAssembler::new("echo").push("harbor.local/python/t1:base").await.unwrap();
    assert_eq!(log.lines, vec!["push harbor.local/python/t1:base"]);
}

#[tokio::test]
async fn failing_build_is_reported_with_tag() {
    let err = DockerAssembler::new("false").build(&image_build()).await.unwrap_err();
    match err {
        ImageError::BuildFailed { tag, .. } => assert_eq!(tag, "harbor.local/python/t1:base"),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn failing_push_is_reported_with_tag() {
    let err = DockerAssembler::new("false").push("harbor.local/python/t1:base").await.unwrap_err();
    assert!(matches!(err, ImageError::PushFailed { .. }));
}

#[tokio::test]
async fn missing_engine_is_an_engine_error() {
    let err = DockerAssembler::new("tb-no-such-docker-binary")
        .build(&image_build())
        .await
        .unwrap_err();
    assert!(matches!(err, ImageError::Engine(_)));
    assert!(err.to_string().contains("docker build"));
}
