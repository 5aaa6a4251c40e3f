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

//! Cypher backend for the read and write IR.
//!
//! Reads render to a single statement returning one `result` column per
//! root node. Writes render to `UNWIND $rows` batches so that values are
//! always bound parameters.

use std::collections::BTreeMap;

use super::escape::{escape_identifier, escape_label, escape_relationship_type, to_identifier};
use super::statements::{CypherScript, CypherStatement, StatementType};
use crate::config::GraphConfig;
use crate::projection::{Binding, MapProjection, Projection, ReadQuery};
use crate::schema::{Cardinality, SchemaRegistry};
use crate::upsert::{EdgeMerge, EdgeRow, MergeStatement, NodeMerge, NodeRow, UpsertBatch, WriteStatement};
use crate::value::Value;

/// Render a compiled read.
///
/// ```
/// # use sdr_graph::cypher::render_read;
/// # use sdr_graph::{GraphConfig, ProjectionCompiler, SelectionNode, usdm_registry};
/// let config = GraphConfig::default();
/// let compiler = ProjectionCompiler::new(usdm_registry(), &config);
/// let query = compiler.point("Study", "S1", &SelectionNode::from_paths(["name"], '/'));
/// let stmt = render_read(&query, &config);
/// assert_eq!(stmt.query, "MATCH (n0:Study {id: $id}) RETURN n0 {name: n0.name} AS result");
/// ```
pub fn render_read(query: &ReadQuery, config: &GraphConfig) -> CypherStatement {
    match query {
        ReadQuery::Projection {
            root_label,
            binding,
            projection,
        } => {
            let id = escape_identifier(&config.id_property);
            let shape = render_map("n0", 0, projection, config);
            match binding {
                Binding::ById(value) => CypherStatement::read(format!(
                    "MATCH (n0{} {{{}: $id}}) RETURN {} AS result",
                    escape_label(root_label),
                    id,
                    shape
                ))
                .with_param("id", value.as_str()),
                Binding::All => CypherStatement::read(format!(
                    "MATCH (n0{}) RETURN {} AS result ORDER BY n0.{}",
                    escape_label(root_label),
                    shape,
                    id
                )),
            }
        }
        ReadQuery::LabelCounts => CypherStatement::read(
            "MATCH (n) UNWIND labels(n) AS label WITH label, count(*) AS count \
             RETURN {label: label, count: count} AS result ORDER BY result.label",
        ),
    }
}

fn render_map(var: &str, depth: usize, projection: &MapProjection, config: &GraphConfig) -> String {
    let entries: Vec<String> = projection
        .fields
        .iter()
        .map(|(key, field)| {
            format!(
                "{}: {}",
                escape_identifier(key),
                render_field(var, depth, field, config)
            )
        })
        .collect();
    format!("{} {{{}}}", var, entries.join(", "))
}

fn render_field(var: &str, depth: usize, field: &Projection, config: &GraphConfig) -> String {
    match field {
        Projection::Identity => format!("{}.{}", var, escape_identifier(&config.id_property)),
        Projection::Scalar(property) => format!("{}.{}", var, escape_identifier(property)),
        Projection::Null => "null".to_string(),
        Projection::Relationship {
            edge_label,
            child_label,
            cardinality,
            child,
        } => {
            let child_var = format!("n{}", depth + 1);
            let comprehension = format!(
                "[({})-[{}]->({}{}) | {}]",
                var,
                escape_relationship_type(edge_label),
                child_var,
                escape_label(child_label),
                render_map(&child_var, depth + 1, child, config)
            );
            match cardinality {
                Cardinality::Many => comprehension,
                Cardinality::One => format!("head({})", comprehension),
            }
        }
    }
}

/// Render one write statement, split into parameter batches.
pub fn render_write(statement: &WriteStatement, config: &GraphConfig) -> Vec<CypherStatement> {
    match statement {
        WriteStatement::Merge(MergeStatement::Nodes(merge)) => render_node_merge(merge, config),
        WriteStatement::Merge(MergeStatement::Edges(merge)) => render_edge_merge(merge, config),
        WriteStatement::DeleteReachable { label, id } => {
            vec![CypherStatement::new(
                format!(
                    "MATCH (root{} {{{}: $id}}) OPTIONAL MATCH (root)-[*]->(d) \
                     WITH root, collect(DISTINCT d) AS reachable \
                     UNWIND [root] + reachable AS n WITH DISTINCT n DETACH DELETE n",
                    escape_label(label),
                    escape_identifier(&config.id_property)
                ),
                StatementType::Delete,
            )
            .with_param("id", id.as_str())
            .with_comment(format!("Delete {} {} and reachable nodes", label, id))]
        }
    }
}

fn render_node_merge(merge: &NodeMerge, config: &GraphConfig) -> Vec<CypherStatement> {
    let query = format!(
        "UNWIND $rows AS row MERGE (n{} {{{}: row.id}}) SET n += row.props",
        escape_label(&merge.label),
        escape_identifier(&config.id_property)
    );
    merge
        .rows
        .chunks(config.effective_batch_size())
        .map(|chunk| {
            let rows: Vec<Value> = chunk.iter().map(node_row_param).collect();
            CypherStatement::new(query.clone(), StatementType::MergeNodes)
                .with_param("rows", Value::List(rows))
                .with_comment(format!("Merge {} {} node(s)", chunk.len(), merge.label))
        })
        .collect()
}

fn render_edge_merge(merge: &EdgeMerge, config: &GraphConfig) -> Vec<CypherStatement> {
    let id = escape_identifier(&config.id_property);
    let query = format!(
        "UNWIND $rows AS row MATCH (a{} {{{}: row.from}}) MATCH (b{} {{{}: row.to}}) MERGE (a)-[{}]->(b)",
        escape_label(&merge.from_label),
        id,
        escape_label(&merge.to_label),
        id,
        escape_relationship_type(&merge.edge_label)
    );
    merge
        .rows
        .chunks(config.effective_batch_size())
        .map(|chunk| {
            let rows: Vec<Value> = chunk.iter().map(edge_row_param).collect();
            CypherStatement::new(query.clone(), StatementType::MergeEdges)
                .with_param("rows", Value::List(rows))
                .with_comment(format!(
                    "Merge {} {} edge(s) from {} to {}",
                    chunk.len(),
                    merge.edge_label,
                    merge.from_label,
                    merge.to_label
                ))
        })
        .collect()
}

fn node_row_param(row: &NodeRow) -> Value {
    let mut map = BTreeMap::new();
    map.insert("id".to_string(), Value::from(row.id.as_str()));
    map.insert("props".to_string(), Value::Map(row.props.clone()));
    Value::Map(map)
}

fn edge_row_param(row: &EdgeRow) -> Value {
    let mut map = BTreeMap::new();
    map.insert("from".to_string(), Value::from(row.from_id.as_str()));
    map.insert("to".to_string(), Value::from(row.to_id.as_str()));
    Value::Map(map)
}

/// Uniqueness constraints on the identity property, one per node label.
///
/// Returns nothing when constraints are disabled.
pub fn render_constraints(registry: &SchemaRegistry, config: &GraphConfig) -> Vec<CypherStatement> {
    if !config.create_constraints {
        return Vec::new();
    }
    let id = escape_identifier(&config.id_property);
    registry
        .node_labels()
        .into_iter()
        .map(|label| {
            let name = to_identifier(&format!("{}_{}_unique", label, config.id_property));
            CypherStatement::constraint(format!(
                "CREATE CONSTRAINT {} IF NOT EXISTS FOR (n{}) REQUIRE n.{} IS UNIQUE",
                name,
                escape_label(label),
                id
            ))
            .with_comment(format!("Unique {} {}", label, config.id_property))
        })
        .collect()
}

/// A printable script for an upsert batch: constraints, then merges.
pub fn render_upsert_script(
    batch: &UpsertBatch,
    registry: &SchemaRegistry,
    config: &GraphConfig,
) -> CypherScript {
    let mut script = CypherScript::new();
    script.extend(render_constraints(registry, config));
    for statement in batch.to_writes() {
        script.extend(render_write(&statement, config));
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::ProjectionCompiler;
    use crate::schema::usdm_registry;
    use crate::selection::SelectionNode;
    use crate::upsert::EdgeOrigin;

    fn read(paths: &[&str], binding: Option<&str>) -> CypherStatement {
        let config = GraphConfig::default();
        let compiler = ProjectionCompiler::new(usdm_registry(), &config);
        let node = SelectionNode::from_paths(paths.iter().copied(), '/');
        let query = match binding {
            Some(id) => compiler.point("Study", id, &node),
            None => compiler.collection("Study", &node),
        };
        render_read(&query, &config)
    }

    #[test]
    fn test_point_read_binds_id_parameter() {
        let stmt = read(&["id"], Some("S1"));
        assert_eq!(stmt.query, "MATCH (n0:Study {id: $id}) RETURN n0 {id: n0.id} AS result");
        assert_eq!(stmt.parameters.get("id"), Some(&Value::from("S1")));
    }

    #[test]
    fn test_collection_read_is_ordered() {
        let stmt = read(&[], None);
        assert_eq!(stmt.query, "MATCH (n0:Study) RETURN n0 {id: n0.id} AS result ORDER BY n0.id");
        assert!(!stmt.has_parameters());
    }

    #[test]
    fn test_nested_many_relations_are_comprehensions() {
        let stmt = read(&["versions/studyDesigns/arms/name"], Some("S1"));
        assert_eq!(
            stmt.query,
            "MATCH (n0:Study {id: $id}) RETURN n0 {versions: \
             [(n0)-[:HAS_VERSION]->(n1:StudyVersion) | n1 {studyDesigns: \
             [(n1)-[:INCLUDES_DESIGN]->(n2:StudyDesign) | n2 {arms: \
             [(n2)-[:HAS_ARM]->(n3:Arm) | n3 {name: n3.name}]}]}]} AS result"
        );
    }

    #[test]
    fn test_one_relation_uses_head() {
        let config = GraphConfig::default();
        let compiler = ProjectionCompiler::new(usdm_registry(), &config);
        let node = SelectionNode::from_paths(["legalAddress/country/decode"], '/');
        let stmt = render_read(&compiler.collection("Organization", &node), &config);
        assert!(stmt.query.contains(
            "legalAddress: head([(n0)-[:HAS_LEGAL_ADDRESS]->(n1:LegalAddress) | n1 {country: \
             head([(n1)-[:LOCATED_IN]->(n2:Country) | n2 {decode: n2.decode}])}])"
        ));
    }

    #[test]
    fn test_unknown_field_renders_null() {
        let stmt = read(&["name", "sponsor/name"], Some("S1"));
        assert!(stmt.query.contains("sponsor: null"));
        assert!(stmt.query.contains("name: n0.name"));
    }

    #[test]
    fn test_label_counts() {
        let stmt = render_read(&ReadQuery::LabelCounts, &GraphConfig::default());
        assert!(stmt.query.starts_with("MATCH (n) UNWIND labels(n) AS label"));
        assert!(stmt.query.contains("AS result"));
    }

    #[test]
    fn test_node_merge_is_chunked() {
        let config = GraphConfig::default().with_batch_size(2);
        let merge = NodeMerge {
            label: "Arm".to_string(),
            rows: (0..5)
                .map(|i| NodeRow {
                    id: format!("A{}", i),
                    props: BTreeMap::new(),
                })
                .collect(),
        };
        let stmts = render_write(&WriteStatement::Merge(MergeStatement::Nodes(merge)), &config);
        assert_eq!(stmts.len(), 3);
        assert_eq!(
            stmts[0].query,
            "UNWIND $rows AS row MERGE (n:Arm {id: row.id}) SET n += row.props"
        );
        assert_eq!(stmts[2].comment.as_deref(), Some("Merge 1 Arm node(s)"));
        assert!(stmts.iter().all(|s| s.statement_type == StatementType::MergeNodes));
    }

    #[test]
    fn test_edge_merge_matches_both_endpoints() {
        let merge = EdgeMerge {
            from_label: "Epoch".to_string(),
            edge_label: "PRECEDES".to_string(),
            to_label: "Epoch".to_string(),
            rows: vec![EdgeRow {
                from_id: "E1".to_string(),
                to_id: "E2".to_string(),
            }],
            origin: EdgeOrigin::CrossReference,
        };
        let stmts = render_write(
            &WriteStatement::Merge(MergeStatement::Edges(merge)),
            &GraphConfig::default(),
        );
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0].render_inline(),
            "UNWIND [{from: 'E1', to: 'E2'}] AS row MATCH (a:Epoch {id: row.from}) \
             MATCH (b:Epoch {id: row.to}) MERGE (a)-[:PRECEDES]->(b)"
        );
    }

    #[test]
    fn test_delete_statement() {
        let stmts = render_write(
            &WriteStatement::DeleteReachable {
                label: "Study".to_string(),
                id: "S1".to_string(),
            },
            &GraphConfig::default(),
        );
        assert_eq!(stmts.len(), 1);
        assert_eq!(stmts[0].statement_type, StatementType::Delete);
        assert!(stmts[0].query.contains("OPTIONAL MATCH (root)-[*]->(d)"));
        // root is a grouping key, so it may sit next to the aggregate
        assert!(stmts[0].query.contains("WITH root, collect(DISTINCT d) AS reachable"));
        assert!(stmts[0].query.contains("UNWIND [root] + reachable AS n"));
        assert!(!stmts[0].query.contains("[root] + collect"));
        assert!(stmts[0].query.ends_with("DETACH DELETE n"));
    }

    #[test]
    fn test_constraints_toggle() {
        let registry = usdm_registry();
        let stmts = render_constraints(registry, &GraphConfig::default());
        assert_eq!(stmts.len(), registry.node_labels().len());
        assert!(stmts.iter().any(|s| s.query
            == "CREATE CONSTRAINT Study_id_unique IF NOT EXISTS FOR (n:Study) REQUIRE n.id IS UNIQUE"));
        assert!(render_constraints(registry, &GraphConfig::default().without_constraints()).is_empty());
    }

    #[test]
    fn test_upsert_script_keeps_values_out_of_query_text() {
        let config = GraphConfig::default().without_constraints();
        let mut props = BTreeMap::new();
        props.insert("name".to_string(), Value::from("Robert'); DROP"));
        let batch = UpsertBatch {
            root_id: "S1".to_string(),
            statements: vec![MergeStatement::Nodes(NodeMerge {
                label: "Study".to_string(),
                rows: vec![NodeRow {
                    id: "S1".to_string(),
                    props,
                }],
            })],
            warnings: Vec::new(),
        };
        let script = render_upsert_script(&batch, usdm_registry(), &config);
        assert_eq!(script.len(), 1);
        assert!(!script.statements[0].query.contains("Robert"));
        assert!(script.render(true).contains("'Robert\\'); DROP'"));
        assert!(script.render(true).starts_with("// Merge 1 Study node(s)"));
    }
}
