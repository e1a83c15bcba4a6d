//! Integration tests for impact analysis.

use std::sync::Arc;
use urldb_graph::domain::{DependencyType, ImpactLevel, ImpactType, NodeId};
use urldb_graph::error::Error;
use urldb_graph::{DependencyEngine, EngineConfig, Repositories};

mod common;
use common::{edge, engine, storage_with};

fn ids(result: &urldb_graph::ImpactAnalysisResult) -> Vec<NodeId> {
    result.affected_nodes.iter().map(|n| n.node_id).collect()
}

// ========== Delete ==========

#[tokio::test]
async fn test_cascade_delete_is_critical() {
    let storage = storage_with(
        &[50, 100],
        vec![edge(100, 50, DependencyType::Hard).with_cascade_delete(true)],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(50), "delete", None)
        .await
        .unwrap();

    assert_eq!(result.source_composite, "url-db:docs:50");
    assert_eq!(result.impact_type, ImpactType::Delete);
    assert_eq!(result.affected_nodes.len(), 1);

    let affected = &result.affected_nodes[0];
    assert_eq!(affected.node_id, NodeId(100));
    assert_eq!(affected.composite_id, "url-db:docs:100");
    assert_eq!(affected.impact_level, ImpactLevel::Critical);
    assert_eq!(affected.action_needed, "Will be automatically deleted");
    assert_eq!(affected.reason, "Depends on deleted node with hard dependency");
    assert_eq!(affected.path, vec![NodeId(50), NodeId(100)]);

    assert_eq!(result.impact_score, 100);
    assert_eq!(result.cascade_depth, 1);
    assert_eq!(result.estimated_time, "15 minutes");
    assert_eq!(
        result.recommendations,
        vec![
            "1 nodes will be automatically deleted due to cascade delete",
            "Consider backing up data before proceeding",
        ]
    );
}

#[tokio::test]
async fn test_wide_soft_impact_is_amplified() {
    let mut nodes = vec![1];
    let mut edges = Vec::new();
    for id in 2..=13 {
        nodes.push(id);
        edges.push(edge(id, 1, DependencyType::Soft));
    }
    let storage = storage_with(&nodes, edges).await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert_eq!(result.affected_nodes.len(), 12);
    assert!(result
        .affected_nodes
        .iter()
        .all(|n| n.impact_level == ImpactLevel::Medium
            && n.action_needed == "Consider updating configuration"));
    // mean 50, amplified by 120%
    assert_eq!(result.impact_score, 60);
    assert_eq!(result.estimated_time, "1.2 hours");
    assert!(result
        .recommendations
        .contains(&"Consider phased deletion approach to minimize disruption".to_string()));
}

#[tokio::test]
async fn test_diamond_scores_each_node_once() {
    let storage = storage_with(
        &[1, 2, 3, 4],
        vec![
            edge(2, 1, DependencyType::Hard).with_cascade_delete(true),
            edge(3, 1, DependencyType::Hard).with_cascade_delete(true),
            edge(4, 2, DependencyType::Hard).with_cascade_delete(true),
            edge(4, 3, DependencyType::Hard).with_cascade_delete(true),
        ],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2), NodeId(4), NodeId(3)]);
    assert_eq!(
        result.affected_nodes[1].path,
        vec![NodeId(1), NodeId(2), NodeId(4)]
    );
    assert_eq!(result.cascade_depth, 2);
    for node in &result.affected_nodes {
        let mut seen = node.path.clone();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), node.path.len(), "path revisits a node");
        assert_eq!(node.path.first(), Some(&NodeId(1)));
        assert_eq!(node.path.last(), Some(&node.node_id));
    }
}

#[tokio::test]
async fn test_cycle_through_source_terminates() {
    let storage = storage_with(
        &[1, 2, 3],
        vec![
            edge(2, 1, DependencyType::Hard).with_cascade_delete(true),
            edge(3, 2, DependencyType::Hard).with_cascade_delete(true),
            edge(1, 3, DependencyType::Hard).with_cascade_delete(true),
        ],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2), NodeId(3)]);
}

#[tokio::test]
async fn test_non_cascading_edges_stop_the_walk() {
    let storage = storage_with(
        &[1, 2, 3],
        vec![
            edge(2, 1, DependencyType::Reference),
            edge(3, 2, DependencyType::Hard).with_cascade_delete(true),
        ],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2)]);
    assert_eq!(result.affected_nodes[0].impact_level, ImpactLevel::Low);
    assert_eq!(
        result.affected_nodes[0].action_needed,
        "Update documentation if needed"
    );
    assert_eq!(result.impact_score, 25);
}

#[tokio::test]
async fn test_no_dependents_scores_zero() {
    let storage = storage_with(&[1], vec![]).await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert!(result.affected_nodes.is_empty());
    assert_eq!(result.impact_score, 0);
    assert_eq!(result.cascade_depth, 0);
    assert_eq!(result.estimated_time, "0 minutes");
    assert!(result.recommendations.is_empty());
}

// ========== Update and Version Change ==========

#[tokio::test]
async fn test_update_follows_cascade_update_only() {
    let storage = storage_with(
        &[1, 2, 3, 4, 5],
        vec![
            edge(2, 1, DependencyType::Hard),
            edge(3, 1, DependencyType::Soft).with_cascade_update(true),
            edge(4, 3, DependencyType::Reference),
            edge(5, 2, DependencyType::Hard),
        ],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "update", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2), NodeId(3), NodeId(4)]);

    let levels: Vec<_> = result.affected_nodes.iter().map(|n| n.impact_level).collect();
    assert_eq!(
        levels,
        vec![ImpactLevel::Medium, ImpactLevel::High, ImpactLevel::Low]
    );
    assert_eq!(
        result.affected_nodes[0].reason,
        "May need update due to hard dependency change"
    );
    assert_eq!(
        result.affected_nodes[0].action_needed,
        "Monitor for compatibility issues"
    );
    assert_eq!(
        result.affected_nodes[1].action_needed,
        "Will be automatically updated"
    );
    assert_eq!(result.impact_score, 50);
    assert_eq!(
        result.recommendations,
        vec!["Test in staging environment before production deployment"]
    );
}

#[tokio::test]
async fn test_version_change_needs_a_constraint() {
    let storage = storage_with(
        &[1, 2, 3, 4, 5],
        vec![
            edge(2, 1, DependencyType::Hard).with_version_constraint(">=1.0"),
            edge(3, 1, DependencyType::Compile).with_version_constraint("^2"),
            edge(4, 1, DependencyType::Runtime),
            edge(5, 2, DependencyType::Hard)
                .with_cascade_update(true)
                .with_version_constraint("~1.4"),
        ],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "version_change", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2), NodeId(3)]);
    assert_eq!(result.affected_nodes[0].impact_level, ImpactLevel::High);
    assert_eq!(
        result.affected_nodes[0].action_needed,
        "Verify version compatibility and update constraints"
    );
    assert_eq!(result.affected_nodes[1].impact_level, ImpactLevel::Medium);
    assert_eq!(result.affected_nodes[1].action_needed, "Test with new version");
    assert!(result
        .affected_nodes
        .iter()
        .all(|n| n.reason == "Has version constraint that may be affected"));
    assert_eq!(result.cascade_depth, 1);
    assert_eq!(
        result.recommendations,
        vec![
            "Verify version constraints are compatible",
            "Run compatibility tests before deployment",
        ]
    );
}

#[tokio::test]
async fn test_unsupported_impact_type_is_rejected_first() {
    let engine = DependencyEngine::from_repositories(Repositories::default(), EngineConfig::default());

    let err = engine
        .analyze_impact(NodeId(1), "rename", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedImpactType(ref t) if t == "rename"));
}

#[tokio::test]
async fn test_unknown_source_is_not_found() {
    let storage = storage_with(&[1], vec![]).await;

    let err = engine(&storage)
        .analyze_impact(NodeId(404), "delete", None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NodeNotFound(NodeId(404))));
}

// ========== Bounds and Warnings ==========

#[tokio::test]
async fn test_depth_bound_stops_cascade_with_warning() {
    let storage = storage_with(
        &[1, 2, 3, 4],
        vec![
            edge(2, 1, DependencyType::Hard).with_cascade_delete(true),
            edge(3, 2, DependencyType::Hard).with_cascade_delete(true),
            edge(4, 3, DependencyType::Hard).with_cascade_delete(true),
        ],
    )
    .await;

    let result = engine(&storage)
        .analyze_impact(NodeId(1), "delete", Some(2))
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2), NodeId(3)]);
    assert_eq!(result.cascade_depth, 2);
    assert_eq!(result.warnings, vec!["Traversal stopped at max depth 2"]);
}

#[tokio::test]
async fn test_fan_out_bound_truncates_with_warning() {
    let storage = storage_with(
        &[1, 2, 3, 4],
        vec![
            edge(2, 1, DependencyType::Soft),
            edge(3, 1, DependencyType::Soft),
            edge(4, 1, DependencyType::Soft),
        ],
    )
    .await;
    let mut config = EngineConfig::default();
    config.cache.enabled = false;
    config.traversal.max_fan_out = 2;
    let engine = DependencyEngine::new(storage.clone(), storage.clone(), config);

    let result = engine
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(2), NodeId(3)]);
    assert_eq!(
        result.warnings,
        vec!["Dependents of node 1 truncated to max fan-out 2"]
    );
}

#[tokio::test]
async fn test_unresolved_dependent_is_skipped_with_warning() {
    let storage = storage_with(&[1, 2], vec![edge(2, 1, DependencyType::Hard)]).await;
    // node storage that only knows the source
    let nodes = storage_with(&[1], vec![]).await;
    let engine = DependencyEngine::new(storage, nodes, EngineConfig::default());

    let result = engine
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert!(result.affected_nodes.is_empty());
    assert_eq!(result.warnings, vec!["Dependent node 2 could not be resolved"]);
}

#[tokio::test]
async fn test_cascade_continues_past_unresolved_dependent() {
    let storage = storage_with(
        &[1, 2, 3],
        vec![
            edge(2, 1, DependencyType::Hard).with_cascade_delete(true),
            edge(3, 2, DependencyType::Hard).with_cascade_delete(true),
        ],
    )
    .await;
    // node storage that has lost node 2
    let nodes = storage_with(&[1, 3], vec![]).await;
    let engine = DependencyEngine::new(storage, nodes, EngineConfig::default());

    let result = engine
        .analyze_impact(NodeId(1), "delete", None)
        .await
        .unwrap();

    assert_eq!(ids(&result), vec![NodeId(3)]);
    assert_eq!(
        result.affected_nodes[0].path,
        vec![NodeId(1), NodeId(2), NodeId(3)]
    );
    assert_eq!(result.cascade_depth, 2);
    assert_eq!(result.warnings, vec!["Dependent node 2 could not be resolved"]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_analyses_agree() {
    let storage = storage_with(
        &[1, 2, 3, 4],
        vec![
            edge(2, 1, DependencyType::Hard).with_cascade_delete(true),
            edge(3, 1, DependencyType::Soft),
            edge(4, 2, DependencyType::Reference).with_cascade_delete(true),
        ],
    )
    .await;
    let engine = Arc::new(common::cached_engine(&storage));

    let mut handles = Vec::new();
    for _ in 0..16 {
        let engine = Arc::clone(&engine);
        handles.push(tokio::spawn(async move {
            engine.analyze_impact(NodeId(1), "delete", None).await
        }));
    }

    let mut results = Vec::new();
    for handle in handles {
        results.push(handle.await.unwrap().unwrap());
    }
    assert!(results.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(ids(&results[0]), vec![NodeId(2), NodeId(4), NodeId(3)]);
}
