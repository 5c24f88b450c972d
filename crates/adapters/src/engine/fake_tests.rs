// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::engine::{ContainerEngine, ContainerSpec, EngineError};
use ccells_core::naming::{LABEL_REPOSITORY_ID, LABEL_WORKSTREAM_ID};
use std::time::Duration;

fn spec(name: &str) -> ContainerSpec {
    ContainerSpec {
        image: "ccells:abc".into(),
        name: name.into(),
        labels: vec![
            (LABEL_REPOSITORY_ID.into(), "repo1".into()),
            (LABEL_WORKSTREAM_ID.into(), name.into()),
        ],
        ..Default::default()
    }
}

#[tokio::test]
async fn container_lifecycle() {
    let engine = FakeEngine::new();
    engine
        .ensure_image("ccells:abc", b"FROM scratch", Duration::from_secs(1))
        .await
        .unwrap();
    assert!(engine.has_image("ccells:abc"));

    let id = engine.create_container(&spec("ws-a")).await.unwrap();
    assert!(!engine.inspect(&id).await.unwrap().running);

    engine.start(&id).await.unwrap();
    assert!(engine.inspect(&id).await.unwrap().running);

    engine.pause(&id).await.unwrap();
    assert!(engine.inspect(&id).await.unwrap().paused);
    engine.unpause(&id).await.unwrap();

    engine.stop(&id, Duration::from_secs(5)).await.unwrap();
    let state = engine.inspect(&id).await.unwrap();
    assert!(!state.running);
    assert_eq!(state.exit_code, Some(0));

    engine.remove(&id, true).await.unwrap();
    assert!(matches!(
        engine.inspect(&id).await,
        Err(EngineError::NotFound(_))
    ));
}

#[tokio::test]
async fn duplicate_names_are_rejected() {
    let engine = FakeEngine::new();
    engine.create_container(&spec("ws-a")).await.unwrap();
    let err = engine.create_container(&spec("ws-a")).await.unwrap_err();
    assert!(matches!(err, EngineError::CommandFailed(_)));
}

#[tokio::test]
async fn remove_without_force_keeps_running_container() {
    let engine = FakeEngine::new();
    let id = engine.create_container(&spec("ws-a")).await.unwrap();
    engine.start(&id).await.unwrap();

    assert!(engine.remove(&id, false).await.is_err());
    assert!(engine.inspect(&id).await.is_ok());

    engine.remove(&id, true).await.unwrap();
    assert!(engine.inspect(&id).await.is_err());
}

#[tokio::test]
async fn list_by_label_filters() {
    let engine = FakeEngine::new();
    engine.seed_container("ours", true, &[(LABEL_REPOSITORY_ID, "repo1")]);
    engine.seed_container("theirs", true, &[(LABEL_REPOSITORY_ID, "repo2")]);

    let ours = engine
        .list_by_label(LABEL_REPOSITORY_ID, "repo1")
        .await
        .unwrap();
    assert_eq!(ours.len(), 1);
    assert_eq!(ours[0].name, "ours");
}

#[tokio::test]
async fn cleanup_orphaned_spares_known_ids() {
    let engine = FakeEngine::new();
    let keep = engine.seed_container("keep", true, &[(LABEL_REPOSITORY_ID, "repo1")]);
    engine.seed_container("ghost", true, &[(LABEL_REPOSITORY_ID, "repo1")]);

    let removed = engine.cleanup_orphaned("repo1", &[keep]).await.unwrap();
    assert_eq!(removed, 1);
    assert_eq!(engine.container_names(), vec!["keep".to_string()]);
}

#[tokio::test]
async fn scripted_failure_and_recovery() {
    let engine = FakeEngine::new();
    engine.fail_on("start");
    let id = engine.create_container(&spec("ws-a")).await.unwrap();
    assert!(engine.start(&id).await.is_err());
    engine.clear_failures();
    assert!(engine.start(&id).await.is_ok());
}
