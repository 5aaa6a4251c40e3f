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

//! In-memory graph store.
//!
//! Interprets the read and write IR directly against a map of nodes and a
//! set of edges. Writes run against a copy of the graph that replaces the
//! committed state only after the last statement succeeds, so a failed or
//! cancelled write leaves nothing behind.
//!
//! Properties are stored multi-valued, as some graph engines do; reads
//! return the first value.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use tokio::sync::RwLock;
use tracing::debug;

use super::{GraphStore, WriteSummary};
use crate::error::StoreError;
use crate::projection::{Binding, MapProjection, Projection, ReadQuery};
use crate::schema::Cardinality;
use crate::upsert::{EdgeMerge, MergeStatement, NodeMerge, WriteStatement};
use crate::value::{RawValue, Value};

type NodeKey = (String, String);
type Properties = BTreeMap<String, Vec<Value>>;

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: BTreeMap<NodeKey, Properties>,
    edges: BTreeSet<(NodeKey, String, NodeKey)>,
}

/// A [`GraphStore`] held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of nodes.
    pub async fn node_count(&self) -> usize {
        self.state.read().await.nodes.len()
    }

    /// Total number of edges.
    pub async fn edge_count(&self) -> usize {
        self.state.read().await.edges.len()
    }

    /// Whether a node exists.
    pub async fn contains_node(&self, label: &str, id: &str) -> bool {
        self.state.read().await.nodes.contains_key(&key(label, id))
    }

    /// First stored value of a property.
    pub async fn property(&self, label: &str, id: &str, name: &str) -> Option<Value> {
        let state = self.state.read().await;
        state
            .nodes
            .get(&key(label, id))
            .and_then(|props| props.get(name))
            .and_then(|values| values.first().cloned())
    }

    /// Whether an edge of a label joins two `(label, id)` nodes.
    pub async fn has_edge(&self, from: (&str, &str), edge_label: &str, to: (&str, &str)) -> bool {
        let state = self.state.read().await;
        let wanted = (key(from.0, from.1), edge_label.to_string(), key(to.0, to.1));
        state.edges.contains(&wanted)
    }

    /// Append a further value to a property, creating the node if needed.
    pub async fn append_property(&self, label: &str, id: &str, name: &str, value: impl Into<Value>) {
        let mut state = self.state.write().await;
        state
            .nodes
            .entry(key(label, id))
            .or_default()
            .entry(name.to_string())
            .or_default()
            .push(value.into());
    }
}

fn key(label: &str, id: &str) -> NodeKey {
    (label.to_string(), id.to_string())
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn run_read(&self, query: &ReadQuery) -> Result<Vec<RawValue>, StoreError> {
        let state = self.state.read().await;
        let rows = match query {
            ReadQuery::Projection {
                root_label,
                binding,
                projection,
            } => match binding {
                Binding::ById(id) => {
                    let root = key(root_label, id);
                    if state.nodes.contains_key(&root) {
                        vec![state.project(&root, projection)]
                    } else {
                        Vec::new()
                    }
                }
                Binding::All => state
                    .nodes
                    .keys()
                    .filter(|(label, _)| label == root_label)
                    .map(|root| state.project(root, projection))
                    .collect(),
            },
            ReadQuery::LabelCounts => {
                let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
                for (label, _) in state.nodes.keys() {
                    *counts.entry(label.as_str()).or_default() += 1;
                }
                counts
                    .into_iter()
                    .map(|(label, count)| {
                        RawValue::text_map([
                            ("label", RawValue::Text(label.to_string())),
                            ("count", RawValue::Int(count)),
                        ])
                    })
                    .collect()
            }
        };
        debug!(rows = rows.len(), "memory read");
        Ok(rows)
    }

    async fn run_write(&self, statements: &[WriteStatement]) -> Result<WriteSummary, StoreError> {
        let mut committed = self.state.write().await;
        let mut draft = committed.clone();
        let mut summary = WriteSummary::default();

        for statement in statements {
            tokio::task::yield_now().await;
            summary.rows += draft.apply(statement)?;
            summary.statements += 1;
        }

        *committed = draft;
        debug!(statements = summary.statements, rows = summary.rows, "memory write committed");
        Ok(summary)
    }
}

impl GraphState {
    fn apply(&mut self, statement: &WriteStatement) -> Result<usize, StoreError> {
        match statement {
            WriteStatement::Merge(MergeStatement::Nodes(merge)) => self.merge_nodes(merge),
            WriteStatement::Merge(MergeStatement::Edges(merge)) => self.merge_edges(merge),
            WriteStatement::DeleteReachable { label, id } => {
                require_label(label)?;
                Ok(self.delete_reachable(key(label, id)))
            }
        }
    }

    fn merge_nodes(&mut self, merge: &NodeMerge) -> Result<usize, StoreError> {
        require_label(&merge.label)?;
        for row in &merge.rows {
            let props = self.nodes.entry(key(&merge.label, &row.id)).or_default();
            for (name, value) in &row.props {
                if value.is_null() {
                    props.remove(name);
                } else {
                    props.insert(name.clone(), vec![value.clone()]);
                }
            }
        }
        Ok(merge.rows.len())
    }

    fn merge_edges(&mut self, merge: &EdgeMerge) -> Result<usize, StoreError> {
        require_label(&merge.from_label)?;
        require_label(&merge.to_label)?;
        require_label(&merge.edge_label)?;
        let mut matched = 0;
        for row in &merge.rows {
            let from = key(&merge.from_label, &row.from_id);
            let to = key(&merge.to_label, &row.to_id);
            if self.nodes.contains_key(&from) && self.nodes.contains_key(&to) {
                self.edges.insert((from, merge.edge_label.clone(), to));
                matched += 1;
            }
        }
        Ok(matched)
    }

    fn delete_reachable(&mut self, root: NodeKey) -> usize {
        if !self.nodes.contains_key(&root) {
            return 0;
        }

        let mut doomed = BTreeSet::new();
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            if !doomed.insert(current.clone()) {
                continue;
            }
            for (from, _, to) in &self.edges {
                if *from == current && !doomed.contains(to) {
                    queue.push_back(to.clone());
                }
            }
        }

        self.edges
            .retain(|(from, _, to)| !doomed.contains(from) && !doomed.contains(to));
        for node in &doomed {
            self.nodes.remove(node);
        }
        doomed.len()
    }

    fn project(&self, node: &NodeKey, projection: &MapProjection) -> RawValue {
        RawValue::text_map(
            projection
                .fields
                .iter()
                .map(|(name, field)| (name.clone(), self.project_field(node, field))),
        )
    }

    fn project_field(&self, node: &NodeKey, field: &Projection) -> RawValue {
        match field {
            Projection::Identity => RawValue::Text(node.1.clone()),
            Projection::Scalar(name) => self
                .nodes
                .get(node)
                .and_then(|props| props.get(name))
                .and_then(|values| values.first())
                .cloned()
                .map(RawValue::from)
                .unwrap_or(RawValue::Null),
            Projection::Null => RawValue::Null,
            Projection::Relationship {
                edge_label,
                child_label,
                cardinality,
                child,
            } => {
                let mut children = self
                    .edges
                    .iter()
                    .filter(|(from, label, to)| from == node && label == edge_label && to.0 == *child_label)
                    .map(|(_, _, to)| self.project(to, child));
                match cardinality {
                    Cardinality::Many => RawValue::List(children.collect()),
                    Cardinality::One => children.next().unwrap_or(RawValue::Null),
                }
            }
        }
    }
}

fn require_label(label: &str) -> Result<(), StoreError> {
    if label.is_empty() {
        Err(StoreError::Execution("empty label in write statement".to_string()))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upsert::{EdgeOrigin, EdgeRow, NodeRow};

    fn nodes(label: &str, ids: &[&str]) -> WriteStatement {
        WriteStatement::Merge(MergeStatement::Nodes(NodeMerge {
            label: label.to_string(),
            rows: ids
                .iter()
                .map(|id| NodeRow {
                    id: id.to_string(),
                    props: BTreeMap::from([("name".to_string(), Value::from(format!("{} name", id)))]),
                })
                .collect(),
        }))
    }

    fn edges(from: &str, edge: &str, to: &str, pairs: &[(&str, &str)]) -> WriteStatement {
        WriteStatement::Merge(MergeStatement::Edges(EdgeMerge {
            from_label: from.to_string(),
            edge_label: edge.to_string(),
            to_label: to.to_string(),
            rows: pairs
                .iter()
                .map(|(a, b)| EdgeRow {
                    from_id: a.to_string(),
                    to_id: b.to_string(),
                })
                .collect(),
            origin: EdgeOrigin::Nested,
        }))
    }

    #[tokio::test]
    async fn test_merge_is_idempotent() {
        let store = MemoryGraphStore::new();
        let writes = vec![
            nodes("Study", &["S1"]),
            nodes("StudyVersion", &["V1"]),
            edges("Study", "HAS_VERSION", "StudyVersion", &[("S1", "V1")]),
        ];
        store.run_write(&writes).await.unwrap();
        store.run_write(&writes).await.unwrap();
        assert_eq!(store.node_count().await, 2);
        assert_eq!(store.edge_count().await, 1);
    }

    #[tokio::test]
    async fn test_edge_with_missing_endpoint_is_skipped() {
        let store = MemoryGraphStore::new();
        let summary = store
            .run_write(&[
                nodes("Epoch", &["E2"]),
                edges("Epoch", "PRECEDES", "Epoch", &[("E1", "E2")]),
            ])
            .await
            .unwrap();
        assert_eq!(summary, WriteSummary { statements: 2, rows: 1 });
        assert_eq!(store.edge_count().await, 0);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_no_trace() {
        let store = MemoryGraphStore::new();
        let result = store
            .run_write(&[nodes("Study", &["S1"]), nodes("", &["X"])])
            .await;
        assert!(matches!(result, Err(StoreError::Execution(_))));
        assert_eq!(store.node_count().await, 0);
    }

    #[tokio::test]
    async fn test_multi_valued_property_reads_first() {
        let store = MemoryGraphStore::new();
        store.append_property("Arm", "A1", "name", "first").await;
        store.append_property("Arm", "A1", "name", "second").await;
        let query = ReadQuery::Projection {
            root_label: "Arm".to_string(),
            binding: Binding::ById("A1".to_string()),
            projection: MapProjection {
                fields: vec![("name".to_string(), Projection::Scalar("name".to_string()))],
            },
        };
        let rows = store.run_read(&query).await.unwrap();
        assert_eq!(rows, vec![RawValue::text_map([("name", RawValue::Text("first".to_string()))])]);
    }

    #[tokio::test]
    async fn test_delete_reachable_follows_outgoing_edges_only() {
        let store = MemoryGraphStore::new();
        store
            .run_write(&[
                nodes("Study", &["S1", "S2"]),
                nodes("StudyVersion", &["V1", "V2"]),
                edges("Study", "HAS_VERSION", "StudyVersion", &[("S1", "V1"), ("S2", "V2")]),
                edges("StudyVersion", "LINKS", "Study", &[("V2", "S1")]),
            ])
            .await
            .unwrap();

        let summary = store
            .run_write(&[WriteStatement::DeleteReachable {
                label: "Study".to_string(),
                id: "S1".to_string(),
            }])
            .await
            .unwrap();
        assert_eq!(summary.rows, 2);
        assert!(store.contains_node("Study", "S2").await);
        assert!(store.contains_node("StudyVersion", "V2").await);
        assert!(!store.contains_node("StudyVersion", "V1").await);
        assert_eq!(store.edge_count().await, 1);
    }

    #[tokio::test]
    async fn test_label_counts_sorted() {
        let store = MemoryGraphStore::new();
        store
            .run_write(&[nodes("Study", &["S1"]), nodes("Arm", &["A1", "A2"])])
            .await
            .unwrap();
        let rows = store.run_read(&ReadQuery::LabelCounts).await.unwrap();
        assert_eq!(
            rows,
            vec![
                RawValue::text_map([("label", RawValue::Text("Arm".to_string())), ("count", RawValue::Int(2))]),
                RawValue::text_map([("label", RawValue::Text("Study".to_string())), ("count", RawValue::Int(1))]),
            ]
        );
    }
}
