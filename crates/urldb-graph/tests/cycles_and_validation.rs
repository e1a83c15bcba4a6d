//! Integration tests for cycle detection and edge validation.
//!
//! These tests drive the engine end-to-end over the in-memory backend, so
//! edge fetching, node resolution and reporting are exercised together.

use rstest::rstest;
use std::sync::Arc;
use urldb_graph::domain::{DependencyType, NodeId, ScopeId};
use urldb_graph::error::Error;
use urldb_graph::storage::DependencyStorage;
use urldb_graph::{CancelToken, DependencyEngine, EngineConfig, Repositories};

mod common;
use common::{edge, engine, storage_with, EmptyNodes, FailingStorage, SCOPE};

// ========== Cycle Detection ==========

#[tokio::test]
async fn test_detects_three_node_cycle() {
    let storage = storage_with(
        &[1, 2, 3],
        vec![
            edge(1, 2, DependencyType::Hard),
            edge(2, 3, DependencyType::Soft),
            edge(3, 1, DependencyType::Hard),
        ],
    )
    .await;

    let cycles = engine(&storage).detect_cycles(SCOPE).await.unwrap();

    assert_eq!(cycles.len(), 1);
    assert_eq!(cycles[0].path, vec![NodeId(1), NodeId(2), NodeId(3)]);
    assert_eq!(cycles[0].strength, 50);
    assert_eq!(
        cycles[0].node_details,
        vec![
            "Node 1 (url-db:docs:1)",
            "Node 2 (url-db:docs:2)",
            "Node 3 (url-db:docs:3)",
        ]
    );
}

#[tokio::test]
async fn test_acyclic_scope_has_no_cycles() {
    let storage = storage_with(
        &[1, 2, 3, 4],
        vec![
            edge(1, 2, DependencyType::Hard),
            edge(2, 3, DependencyType::Hard),
            edge(1, 3, DependencyType::Reference),
            edge(4, 3, DependencyType::Runtime),
        ],
    )
    .await;

    let cycles = engine(&storage).detect_cycles(SCOPE).await.unwrap();
    assert!(cycles.is_empty());
}

#[tokio::test]
async fn test_empty_scope_has_no_cycles() {
    let storage = storage_with(&[1], vec![]).await;
    let cycles = engine(&storage).detect_cycles(ScopeId(99)).await.unwrap();
    assert!(cycles.is_empty());
}

#[tokio::test]
async fn test_detect_cycles_is_repeatable() {
    let storage = storage_with(
        &[1, 2, 3, 4, 5],
        vec![
            edge(4, 5, DependencyType::Soft),
            edge(5, 4, DependencyType::Soft),
            edge(1, 2, DependencyType::Hard),
            edge(2, 1, DependencyType::Reference),
            edge(3, 1, DependencyType::Hard),
        ],
    )
    .await;
    let engine = engine(&storage);

    let first = engine.detect_cycles(SCOPE).await.unwrap();
    let second = engine.detect_cycles(SCOPE).await.unwrap();

    assert_eq!(first, second);
    let paths: Vec<_> = first.iter().map(|c| c.path.clone()).collect();
    assert_eq!(
        paths,
        vec![vec![NodeId(1), NodeId(2)], vec![NodeId(4), NodeId(5)]]
    );
    assert_eq!(first[0].strength, 30);
}

#[tokio::test]
async fn test_storage_failure_surfaces_as_graph_build_failure() {
    let engine = DependencyEngine::new(
        Arc::new(FailingStorage),
        Arc::new(EmptyNodes),
        EngineConfig::default(),
    );

    let err = engine.detect_cycles(SCOPE).await.unwrap_err();
    assert!(matches!(err, Error::GraphBuildFailure { .. }));
    assert_eq!(
        err.to_string(),
        "failed to build graph: storage error: connection reset"
    );
}

// ========== Validation ==========

#[rstest]
#[case(0)]
#[case(-1)]
#[case(i64::MAX)]
#[case(i64::MIN)]
#[tokio::test]
async fn test_self_dependency_rejected_without_storage(#[case] id: i64) {
    let engine = DependencyEngine::from_repositories(Repositories::default(), EngineConfig::default());

    let result = engine
        .validate_new_dependency(NodeId(id), NodeId(id))
        .await
        .unwrap();

    assert!(!result.is_valid);
    assert_eq!(result.errors, vec!["Self-dependencies are not allowed"]);
    assert!(result.warnings.is_empty());
    assert!(result.cycles.is_empty());
}

#[tokio::test]
async fn test_edge_closing_a_cycle_is_rejected() {
    let storage = storage_with(&[1, 2, 3], vec![]).await;
    storage.create(edge(1, 2, DependencyType::Hard)).await.unwrap();
    storage.create(edge(2, 3, DependencyType::Soft)).await.unwrap();

    let result = engine(&storage)
        .validate_new_dependency(NodeId(3), NodeId(1))
        .await
        .unwrap();

    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        vec!["Adding this dependency would create a circular dependency"]
    );
    assert_eq!(result.cycles.len(), 1);
    assert_eq!(result.cycles[0].path, vec![NodeId(1), NodeId(2), NodeId(3)]);
    assert_eq!(result.cycles[0].strength, 50);
    assert_eq!(result.cycles[0].node_details.len(), 3);
}

#[tokio::test]
async fn test_existing_edge_is_valid_with_warning() {
    let storage = storage_with(&[1, 2], vec![edge(1, 2, DependencyType::Hard)]).await;

    let result = engine(&storage)
        .validate_new_dependency(NodeId(1), NodeId(2))
        .await
        .unwrap();

    assert!(result.is_valid);
    assert_eq!(result.warnings, vec!["Dependency already exists"]);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn test_unrelated_edge_is_valid() {
    let storage = storage_with(&[1, 2, 3], vec![edge(1, 2, DependencyType::Hard)]).await;

    let result = engine(&storage)
        .validate_new_dependency(NodeId(3), NodeId(2))
        .await
        .unwrap();

    assert!(result.is_valid);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[tokio::test]
async fn test_validation_propagates_storage_errors() {
    let engine = DependencyEngine::new(
        Arc::new(FailingStorage),
        Arc::new(EmptyNodes),
        EngineConfig::default(),
    );

    let err = engine
        .validate_new_dependency(NodeId(1), NodeId(2))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
}

// ========== Missing Collaborators and Cancellation ==========

#[tokio::test]
async fn test_missing_repositories_are_reported() {
    let engine = DependencyEngine::from_repositories(Repositories::default(), EngineConfig::default());

    assert!(matches!(
        engine.validate_new_dependency(NodeId(1), NodeId(2)).await,
        Err(Error::RepositoryUnavailable(_))
    ));
    assert!(matches!(
        engine.detect_cycles(SCOPE).await,
        Err(Error::RepositoryUnavailable(_))
    ));
    assert!(matches!(
        engine.analyze_impact(NodeId(1), "delete", None).await,
        Err(Error::RepositoryUnavailable(_))
    ));
    assert!(matches!(
        engine.dependency_graph(NodeId(1), None).await,
        Err(Error::RepositoryUnavailable(_))
    ));
}

#[tokio::test]
async fn test_missing_node_storage_is_reported() {
    let storage = storage_with(&[1, 2], vec![edge(1, 2, DependencyType::Hard)]).await;
    let repos = Repositories::from_parts(Some(storage as Arc<dyn DependencyStorage>), None);
    let engine = DependencyEngine::from_repositories(repos, EngineConfig::default());

    let err = engine.detect_cycles(SCOPE).await.unwrap_err();
    assert_eq!(err.to_string(), "repository unavailable: node storage");
}

#[tokio::test]
async fn test_cancelled_token_stops_every_operation() {
    let storage = storage_with(&[1, 2], vec![edge(1, 2, DependencyType::Hard)]).await;
    let engine = engine(&storage);
    let cancel = CancelToken::new();
    cancel.cancel();

    assert!(matches!(
        engine.detect_cycles_with_cancel(SCOPE, &cancel).await,
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        engine
            .validate_new_dependency_with_cancel(NodeId(2), NodeId(1), &cancel)
            .await,
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        engine
            .analyze_impact_with_cancel(NodeId(2), "delete", None, &cancel)
            .await,
        Err(Error::Cancelled)
    ));
    assert!(matches!(
        engine.dependency_graph_with_cancel(NodeId(1), None, &cancel).await,
        Err(Error::Cancelled)
    ));
}

#[tokio::test]
async fn test_expired_deadline_cancels() {
    let storage = storage_with(&[1, 2], vec![edge(1, 2, DependencyType::Hard)]).await;
    let cancel = CancelToken::with_timeout(std::time::Duration::ZERO);

    let err = engine(&storage)
        .detect_cycles_with_cancel(SCOPE, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Cancelled));
}
