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

//! Property-based tests for the mapping engines.
//!
//! Test coverage:
//! - Selection tree determinism under reordering and duplication
//! - Normalizer idempotence
//! - Identifier escaping
//! - Upsert idempotence and statement ordering
//! - MANY cardinality over arbitrary child counts

use proptest::prelude::*;
use std::sync::Arc;

use sdr_graph::{
    cypher::{escape_identifier, escape_label, quote_string},
    normalize, usdm_registry, GraphConfig, MemoryGraphStore, MergeStatement, RawValue, Resolver,
    SelectionNode, TransactionExecutor, UpsertCompiler, Value,
};
use sdr_model::{Arm, Study, StudyDesign, StudyVersion};

fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .unwrap()
        .block_on(future)
}

fn study_with_arms(arm_ids: &[String]) -> Study {
    let design = arm_ids.iter().fold(StudyDesign::new("D1"), |design, id| {
        design.with_arm(Arm::new(id.clone(), format!("Arm {}", id)))
    });
    Study::new("S1").with_version(StudyVersion::new("V1").with_design(design))
}

fn raw_value() -> impl Strategy<Value = RawValue> {
    let leaf = prop_oneof![
        Just(RawValue::Null),
        any::<bool>().prop_map(RawValue::Bool),
        any::<i64>().prop_map(RawValue::Int),
        (-1.0e6f64..1.0e6).prop_map(RawValue::Float),
        "[a-z]{0,6}".prop_map(RawValue::Text),
        prop::collection::vec(any::<u8>(), 0..4).prop_map(RawValue::Bytes),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(RawValue::List),
            prop::collection::vec(
                (
                    prop_oneof![
                        "[a-z]{1,4}".prop_map(RawValue::Text),
                        (0i64..10).prop_map(RawValue::Int),
                    ],
                    inner
                ),
                0..4
            )
            .prop_map(RawValue::Map),
        ]
    })
}

// ============================================================================
// Selection Properties
// ============================================================================

proptest! {
    /// The tree does not depend on path order or repetition
    #[test]
    fn prop_selection_order_independent(paths in prop::collection::vec("[a-c]{1,2}(/[a-c]{1,2}){0,3}", 0..10)) {
        let forward = SelectionNode::from_paths(&paths, '/');
        let reversed = SelectionNode::from_paths(paths.iter().rev(), '/');
        let doubled = SelectionNode::from_paths(paths.iter().chain(paths.iter()), '/');
        prop_assert_eq!(&forward, &reversed);
        prop_assert_eq!(&forward, &doubled);
    }

    /// Flattening and rebuilding yields the same tree
    #[test]
    fn prop_selection_paths_rebuild(paths in prop::collection::vec("[a-c]{1,2}(/[a-c]{1,2}){0,3}", 0..10)) {
        let tree = SelectionNode::from_paths(&paths, '/');
        let rebuilt = SelectionNode::from_paths(tree.paths('/'), '/');
        prop_assert_eq!(tree, rebuilt);
    }
}

// ============================================================================
// Normalizer Properties
// ============================================================================

proptest! {
    /// Normalizing twice equals normalizing once
    #[test]
    fn prop_normalize_idempotent(raw in raw_value()) {
        let once = normalize(raw);
        let twice = normalize(RawValue::from(once.clone()));
        prop_assert_eq!(once, twice);
    }

    /// Every map key in a normalized value survives the JSON round trip
    #[test]
    fn prop_normalized_json_round_trip(raw in raw_value()) {
        let value = normalize(raw);
        let json = serde_json::Value::from(value.clone());
        let back = Value::from(json);
        // Integral floats may come back as integers; compare through JSON.
        prop_assert_eq!(serde_json::Value::from(back), serde_json::Value::from(value));
    }
}

// ============================================================================
// Escaping Properties
// ============================================================================

proptest! {
    /// Escaped labels never leave a lone backtick
    #[test]
    fn prop_escape_label_contained(s in ".*") {
        let escaped = escape_label(&s);
        prop_assert!(escaped.starts_with(':'));
        let body = &escaped[1..];
        if body.contains('`') {
            prop_assert!(body.starts_with('`') && body.ends_with('`') && body.len() >= 2);
            let inner = &body[1..body.len() - 1];
            prop_assert!(!inner.replace("``", "").contains('`'));
        }
    }

    /// Plain identifiers pass through unquoted
    #[test]
    fn prop_plain_identifier_unchanged(s in "[a-z][a-zA-Z0-9_]{0,10}") {
        let escaped = escape_identifier(&s);
        let quoted = format!("`{}`", s);
        prop_assert!(escaped == s || escaped == quoted);
    }

    /// Quoted strings are always delimited
    #[test]
    fn prop_quote_string_delimited(s in ".*") {
        let quoted = quote_string(&s);
        prop_assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
    }
}

// ============================================================================
// Upsert Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Writing the same study twice leaves the graph unchanged
    #[test]
    fn prop_upsert_idempotent(ids in prop::collection::btree_set("A[0-9]{1,3}", 0..8)) {
        let ids: Vec<String> = ids.into_iter().collect();
        let study = study_with_arms(&ids);
        let (first, second) = block_on(async {
            let store = Arc::new(MemoryGraphStore::new());
            let config = GraphConfig::default();
            let resolver = Resolver::usdm(TransactionExecutor::new(store.clone()), &config);
            resolver.upsert_study(&study).await.unwrap();
            let first = (store.node_count().await, store.edge_count().await);
            resolver.upsert_study(&study).await.unwrap();
            let second = (store.node_count().await, store.edge_count().await);
            (first, second)
        });
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.0, 3 + ids.len());
    }

    /// Parents are always merged before their children
    #[test]
    fn prop_merge_order(ids in prop::collection::btree_set("A[0-9]{1,3}", 1..8)) {
        let ids: Vec<String> = ids.into_iter().collect();
        let config = GraphConfig::default();
        let batch = UpsertCompiler::new(usdm_registry(), &config)
            .compile_document(&study_with_arms(&ids))
            .unwrap();
        let labels: Vec<&str> = batch
            .statements
            .iter()
            .filter_map(|s| match s {
                MergeStatement::Nodes(m) => Some(m.label.as_str()),
                MergeStatement::Edges(_) => None,
            })
            .collect();
        prop_assert_eq!(labels, vec!["Study", "StudyVersion", "StudyDesign", "Arm"]);
    }

    /// A MANY relation reads back one element per child, empty included
    #[test]
    fn prop_many_cardinality(ids in prop::collection::btree_set("A[0-9]{1,3}", 0..8)) {
        let ids: Vec<String> = ids.into_iter().collect();
        let study = study_with_arms(&ids);
        let read = block_on(async {
            let config = GraphConfig::default();
            let resolver = Resolver::usdm(TransactionExecutor::new(Arc::new(MemoryGraphStore::new())), &config);
            resolver.upsert_study(&study).await.unwrap();
            let selection = resolver.selection(["versions/studyDesigns/arms/id"]);
            resolver.study(Some("S1"), &selection).await.unwrap().unwrap()
        });
        let versions = read.versions.unwrap_or_default();
        let designs = versions[0].study_designs.clone().unwrap_or_default();
        let read: Vec<String> = designs[0]
            .arms
            .clone()
            .unwrap_or_default()
            .into_iter()
            .map(|a| a.id)
            .collect();
        prop_assert_eq!(read, ids);
    }
}
