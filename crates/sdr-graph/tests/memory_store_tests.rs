// Dweve SDR Graph - Study Definition Repository graph mapping
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! End-to-end tests of both engines against the in-memory store.

use serde_json::json;
use std::sync::Arc;

use sdr_graph::{
    cancel_pair, compile_articles, ingest_articles, normalize, usdm_registry, CompileWarning,
    GraphConfig, GraphError, MemoryGraphStore, MergeStatement, ProjectionCompiler, Resolver,
    ResolverEvent, SelectionNode, SubmissionProcessor, TransactionExecutor, UpsertCompiler, Value,
    WriteStatement,
};
use sdr_graph_test::{fixtures, selections};
use sdr_model::Study;

fn setup() -> (Arc<MemoryGraphStore>, TransactionExecutor) {
    let store = Arc::new(MemoryGraphStore::new());
    let executor = TransactionExecutor::new(store.clone());
    (store, executor)
}

async fn upsert_json(resolver: &Resolver<'_>, document: serde_json::Value) -> serde_json::Value {
    resolver
        .handle(&ResolverEvent::new("Mutation", "upsertStudy").with_argument("study", document))
        .await
        .unwrap()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_scenario_a_nested_many_projection() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    resolver.upsert_study(&fixtures::scenario_a()).await.unwrap();

    let result = resolver
        .handle(
            &ResolverEvent::new("Query", "study")
                .with_argument("id", "S1")
                .with_selection(selections::SCENARIO_A.iter().copied()),
        )
        .await
        .unwrap();

    assert_eq!(
        result,
        json!({
            "id": "S1",
            "name": "Scenario A",
            "versions": [
                {"studyDesigns": [{"arms": [{"id": "A1"}, {"id": "A2"}]}]},
                {"studyDesigns": []}
            ]
        })
    );
}

#[tokio::test]
async fn test_scenario_b_cross_reference_is_idempotent() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);

    upsert_json(&resolver, fixtures::scenario_b_json()).await;
    upsert_json(&resolver, fixtures::scenario_b_json()).await;

    assert!(store.has_edge(("Epoch", "E1"), "PRECEDES", ("Epoch", "E2")).await);
    assert!(!store.has_edge(("Epoch", "E2"), "PRECEDES", ("Epoch", "E1")).await);
    assert!(store.has_edge(("StudyVersion", "V1"), "HAS_EPOCH", ("Epoch", "E1")).await);
    // HAS_VERSION, two HAS_EPOCH and one PRECEDES
    assert_eq!(store.node_count().await, 4);
    assert_eq!(store.edge_count().await, 4);
}

#[test]
fn test_scenario_b_emits_one_precedes_row() {
    let config = GraphConfig::default();
    let compiler = UpsertCompiler::new(usdm_registry(), &config);
    let batch = compiler.compile(&Value::from(fixtures::scenario_b_json())).unwrap();
    assert!(batch.warnings.is_empty(), "{:?}", batch.warnings);

    let precedes: Vec<_> = batch
        .statements
        .iter()
        .filter_map(|s| match s {
            MergeStatement::Edges(m) if m.edge_label == "PRECEDES" => Some(m),
            _ => None,
        })
        .collect();
    assert_eq!(precedes.len(), 1);
    assert_eq!(precedes[0].rows.len(), 1);
    assert_eq!(precedes[0].rows[0].from_id, "E1");
    assert_eq!(precedes[0].rows[0].to_id, "E2");
}

#[tokio::test]
async fn test_epochs_under_a_design_are_linked() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);

    upsert_json(&resolver, fixtures::epochs_in_design_json()).await;
    upsert_json(&resolver, fixtures::epochs_in_design_json()).await;

    assert!(store.has_edge(("Epoch", "E1"), "PRECEDES", ("Epoch", "E2")).await);
    assert!(store.has_edge(("StudyDesign", "D1"), "HAS_EPOCH", ("Epoch", "E2")).await);
    // HAS_VERSION, INCLUDES_DESIGN, two HAS_EPOCH and one PRECEDES
    assert_eq!(store.node_count().await, 5);
    assert_eq!(store.edge_count().await, 5);
}

#[tokio::test]
async fn test_scenario_b_reads_back_version_epochs() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    upsert_json(&resolver, fixtures::scenario_b_json()).await;

    let read = resolver
        .handle(
            &ResolverEvent::new("Query", "study")
                .with_argument("id", "S1")
                .with_selection(["versions/epochs/id", "versions/epochs/precedes/id"]),
        )
        .await
        .unwrap();
    assert_eq!(
        read,
        json!({
            "versions": [{
                "epochs": [
                    {"id": "E1", "precedes": {"id": "E2"}},
                    {"id": "E2", "precedes": null}
                ]
            }]
        })
    );
}

#[tokio::test]
async fn test_scenario_c_delete_then_not_found() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    resolver.upsert_study(&fixtures::scenario_a()).await.unwrap();
    resolver.upsert_study(&fixtures::minimal()).await.unwrap();

    let deleted = resolver
        .handle(&ResolverEvent::new("Mutation", "deleteStudy").with_argument("id", "S1"))
        .await
        .unwrap();
    assert_eq!(deleted, json!(true));

    let found = resolver
        .handle(
            &ResolverEvent::new("Query", "study")
                .with_argument("id", "S1")
                .with_selection(["id"]),
        )
        .await
        .unwrap();
    assert_eq!(found, serde_json::Value::Null);

    assert_eq!(store.node_count().await, 1);
    assert!(store.contains_node("Study", "S0").await);
    assert!(resolver.delete_study(Some("S1")).await.unwrap());
}

// ============================================================================
// Testable properties
// ============================================================================

#[tokio::test]
async fn test_upsert_twice_leaves_graph_unchanged() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    let study = fixtures::comprehensive();

    resolver.upsert_study(&study).await.unwrap();
    let nodes = store.node_count().await;
    let edges = store.edge_count().await;
    let stats = resolver.graph_stats().await.unwrap();

    resolver.upsert_study(&study).await.unwrap();
    assert_eq!(store.node_count().await, nodes);
    assert_eq!(store.edge_count().await, edges);
    assert_eq!(resolver.graph_stats().await.unwrap(), stats);
    assert_eq!(nodes, study.entity_count());
}

#[tokio::test]
async fn test_cardinality_of_empty_relations() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    upsert_json(&resolver, json!({"id": "S1", "versions": [{"id": "V1", "studyDesigns": [{"id": "D1"}]}]}))
        .await;

    let selection = resolver.selection(["studyType/decode", "arms/id"]);
    let query = ProjectionCompiler::new(usdm_registry(), &config).collection("StudyDesign", &selection);
    let rows = resolver.executor().read(&query).await.unwrap();
    assert_eq!(rows.len(), 1);

    let design = normalize(rows.into_iter().next().unwrap());
    assert_eq!(design.get("arms"), Some(&Value::List(Vec::new())));
    assert_eq!(design.get("studyType"), Some(&Value::Null));
}

#[tokio::test]
async fn test_unknown_fields_do_not_affect_siblings() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    resolver.upsert_study(&fixtures::scenario_a()).await.unwrap();

    let plain = resolver
        .study(Some("S1"), &resolver.selection(["id", "name", "versions/id"]))
        .await
        .unwrap();
    let with_unknown = resolver
        .study(Some("S1"), &resolver.selection(selections::WITH_UNKNOWN_FIELDS.iter().copied().chain(["versions/id"])))
        .await
        .unwrap();
    assert_eq!(plain, with_unknown);

    let raw = resolver
        .handle(
            &ResolverEvent::new("Query", "study")
                .with_argument("id", "S1")
                .with_selection(selections::WITH_UNKNOWN_FIELDS.iter().copied()),
        )
        .await
        .unwrap();
    assert_eq!(raw["sponsor"], serde_json::Value::Null);
    assert_eq!(raw["name"], "Scenario A");
    assert_eq!(raw["versions"], json!([{"budget": null}, {"budget": null}]));
}

#[tokio::test]
async fn test_round_trip_comprehensive_study() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    let study = fixtures::comprehensive();
    let report = resolver.upsert_study(&study).await.unwrap();
    assert!(report.warnings.is_empty(), "{:?}", report.warnings);

    let covering = SelectionNode::covering(&Value::from(sdr_graph_test::to_json(&study)));
    let read = resolver.study(Some("S9"), &covering).await.unwrap();
    assert_eq!(read, Some(study));
}

#[tokio::test]
async fn test_round_trip_two_hop_to_one_chain() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    resolver.upsert_study(&fixtures::organizations()).await.unwrap();

    let read = resolver
        .handle(
            &ResolverEvent::new("Query", "study")
                .with_argument("id", "S2")
                .with_selection(selections::ORGANIZATION_COUNTRY.iter().copied()),
        )
        .await
        .unwrap();
    assert_eq!(
        read["versions"][0]["organizations"][0]["legalAddress"]["country"]["decode"],
        "Netherlands"
    );
    assert!(read["versions"][0]["organizations"][1]["legalAddress"].is_null());
}

#[tokio::test]
async fn test_missing_one_relation_is_null() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    upsert_json(
        &resolver,
        json!({
            "id": "S3",
            "versions": [{"id": "V1", "organizations": [{"id": "O1", "name": "Acme"}]}]
        }),
    )
    .await;

    let read = resolver
        .handle(
            &ResolverEvent::new("Query", "study")
                .with_argument("id", "S3")
                .with_selection(["versions/organizations/id", "versions/organizations/legalAddress/city"]),
        )
        .await
        .unwrap();
    let organization = &read["versions"][0]["organizations"][0];
    assert_eq!(organization["id"], "O1");
    assert!(organization.get("legalAddress").is_some());
    assert!(organization["legalAddress"].is_null());
}

#[tokio::test]
async fn test_epoch_navigation_edge() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    let report = resolver.upsert_study(&fixtures::epoch_chain()).await.unwrap();
    assert!(report.warnings.is_empty());

    let read = resolver
        .study(Some("S1"), &resolver.selection(selections::EPOCH_CHAIN.iter().copied()))
        .await
        .unwrap()
        .unwrap();
    let versions = read.versions.unwrap();
    let epochs = versions[0].study_designs.as_ref().unwrap()[0].epochs.clone().unwrap();
    assert_eq!(epochs[0].id, "E1");
    assert_eq!(epochs[0].precedes.as_ref().map(|e| e.id.as_str()), Some("E2"));
    assert!(epochs[1].precedes.is_none());
}

#[test]
fn test_statement_order_follows_nesting() {
    let config = GraphConfig::default();
    let compiler = UpsertCompiler::new(usdm_registry(), &config);
    let batch = compiler.compile_document(&fixtures::comprehensive()).unwrap();

    let position = |label: &str| {
        batch
            .statements
            .iter()
            .position(|s| matches!(s, MergeStatement::Nodes(m) if m.label == label))
            .unwrap()
    };
    assert!(position("Study") < position("StudyVersion"));
    assert!(position("StudyVersion") < position("StudyDesign"));
    assert!(position("StudyDesign") < position("Arm"));
    assert!(matches!(batch.statements.last(), Some(MergeStatement::Edges(m)) if m.edge_label == "PRECEDES"));
}

// ============================================================================
// Surrounding operations
// ============================================================================

#[tokio::test]
async fn test_collections_are_ordered_by_id() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    resolver.upsert_study(&fixtures::scenario_a()).await.unwrap();
    resolver.upsert_study(&fixtures::minimal()).await.unwrap();
    resolver.upsert_study(&fixtures::comprehensive()).await.unwrap();

    let ids: Vec<String> = resolver
        .studies(&SelectionNode::new())
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids, ["S0", "S1", "S9"]);

    let activities = resolver
        .handle(&ResolverEvent::new("Query", "activities").with_selection(["id", "name"]))
        .await
        .unwrap();
    assert_eq!(activities, json!([{"id": "ACT1", "name": "Blood draw"}]));

    let encounters = resolver
        .encounters(&resolver.selection(["id", "type/decode"]))
        .await
        .unwrap();
    assert_eq!(encounters.len(), 1);
    assert_eq!(
        encounters[0].encounter_type.as_ref().and_then(|c| c.decode.as_deref()),
        Some("Visit")
    );
}

#[tokio::test]
async fn test_graph_stats_counts_labels() {
    let (_, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    resolver.upsert_study(&fixtures::scenario_a()).await.unwrap();

    let stats = resolver
        .handle(&ResolverEvent::new("Query", "graphStats"))
        .await
        .unwrap();
    assert_eq!(
        stats,
        json!([
            {"label": "Arm", "count": 2},
            {"label": "Study", "count": 1},
            {"label": "StudyDesign", "count": 1},
            {"label": "StudyVersion", "count": 2}
        ])
    );
}

#[tokio::test]
async fn test_unknown_nested_document_field_warns() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    let study: Study = serde_json::from_value(json!({"id": "S1", "name": "n"})).unwrap();
    resolver.upsert_study(&study).await.unwrap();

    let compiler = UpsertCompiler::new(usdm_registry(), &config);
    let batch = compiler
        .compile(&Value::from(json!({"id": "S1", "sponsor": {"id": "X", "name": "Acme"}})))
        .unwrap();
    assert_eq!(
        batch.warnings,
        vec![CompileWarning::UnknownField {
            type_name: "Study".to_string(),
            field: "sponsor".to_string()
        }]
    );
    resolver.executor().write(&batch.to_writes()).await.unwrap();
    assert_eq!(store.node_count().await, 1);
}

#[tokio::test]
async fn test_submission_processing() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let resolver = Resolver::usdm(executor, &config);
    let report = SubmissionProcessor::new(&resolver)
        .process(fixtures::submission_bodies())
        .await
        .unwrap();
    assert_eq!((report.processed, report.skipped), (2, 1));
    assert!(store.contains_node("StudyVersion", "Q2-V1").await);
}

#[tokio::test]
async fn test_article_ingestion() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let summary = ingest_articles(&executor, &fixtures::articles(), &config)
        .await
        .unwrap();
    assert_eq!(summary.statements, 5);

    // two articles, two categories, two tags
    assert_eq!(store.node_count().await, 6);
    assert!(store.has_edge(("Article", "a2"), "HAS_CATEGORY", ("Category", "Oncology")).await);
    assert!(store.has_edge(("Article", "a1"), "HAS_TAG", ("Tag", "fda")).await);
    assert_eq!(
        store.property("Category", "Oncology", "name").await,
        Some(Value::from("Oncology"))
    );

    ingest_articles(&executor, &fixtures::articles(), &config)
        .await
        .unwrap();
    assert_eq!(store.node_count().await, 6);
    assert_eq!(compile_articles(&fixtures::articles(), &config).unwrap().len(), 5);
}

// ============================================================================
// Failure handling
// ============================================================================

#[tokio::test]
async fn test_store_failure_is_atomic_and_surfaced() {
    let (store, executor) = setup();
    let config = GraphConfig::default();
    let compiler = UpsertCompiler::new(usdm_registry(), &config);
    let mut writes = compiler.compile_document(&fixtures::scenario_a()).unwrap().to_writes();
    writes.push(WriteStatement::DeleteReachable {
        label: String::new(),
        id: "S1".to_string(),
    });

    let err = executor.write(&writes).await.unwrap_err();
    assert!(err.is_store_failure());
    assert_eq!(store.node_count().await, 0);
}

#[tokio::test]
async fn test_cancel_mid_write_commits_nothing() {
    let (store, executor) = setup();
    let (handle, signal) = cancel_pair();
    let executor = executor.with_cancel(signal);

    let config = GraphConfig::default();
    let compiler = UpsertCompiler::new(usdm_registry(), &config);
    let mut writes = Vec::new();
    for i in 0..200 {
        let study = Study::new(format!("S{}", i));
        writes.extend(compiler.compile_document(&study).unwrap().to_writes());
    }

    let cancel = async {
        tokio::task::yield_now().await;
        handle.cancel();
    };
    let (result, ()) = tokio::join!(executor.write(&writes), cancel);

    assert!(matches!(result, Err(GraphError::Cancelled)));
    assert_eq!(store.node_count().await, 0);
}
