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

use super::{print_json, write_output};
use crate::error::CliError;
use sdr_graph::{usdm_registry, Cardinality, ReferenceDirection, SchemaEdge, SchemaRegistry};
use serde_json::json;
use std::fmt::Write;

fn cardinality(edge: &SchemaEdge) -> &'static str {
    match edge.cardinality {
        Cardinality::One => "one",
        Cardinality::Many => "many",
    }
}

fn direction(direction: ReferenceDirection) -> &'static str {
    match direction {
        ReferenceDirection::Outgoing => "outgoing",
        ReferenceDirection::Incoming => "incoming",
    }
}

/// Describe the registry as text or JSON.
pub fn schema(format: &str) -> Result<(), CliError> {
    let registry = usdm_registry();
    match format {
        "text" => write_output(&schema_text(registry), None),
        "json" => print_json(&schema_json(registry)),
        other => Err(CliError::InvalidInput(format!(
            "unknown format '{}'; expected text or json",
            other
        ))),
    }
}

fn schema_text(registry: &SchemaRegistry) -> String {
    let mut out = String::new();
    for label in registry.node_labels() {
        let root = if label == registry.root() { " (root)" } else { "" };
        let _ = writeln!(out, "{}{}", label, root);
        for (field, edge) in registry.nested_fields(label) {
            let _ = writeln!(
                out,
                "  {} -[:{}]-> {} ({})",
                field,
                edge.edge_label,
                edge.child_type,
                cardinality(edge)
            );
        }
        for (field, edge) in registry.navigation_fields(label) {
            let _ = writeln!(
                out,
                "  {} -[:{}]-> {} ({}, read-only)",
                field,
                edge.edge_label,
                edge.child_type,
                cardinality(edge)
            );
        }
        for reference in registry.cross_references(label) {
            let _ = writeln!(
                out,
                "  {} ~[:{}]~ {} ({})",
                reference.field,
                reference.edge_label,
                reference.target_type,
                direction(reference.direction)
            );
        }
    }
    out
}

fn edges_json<'a>(fields: impl Iterator<Item = (&'a str, &'a SchemaEdge)>) -> Vec<serde_json::Value> {
    fields
        .map(|(field, edge)| {
            json!({
                "field": field,
                "edge": edge.edge_label,
                "child": edge.child_type,
                "cardinality": cardinality(edge),
            })
        })
        .collect()
}

fn schema_json(registry: &SchemaRegistry) -> serde_json::Value {
    let types: Vec<serde_json::Value> = registry
        .node_labels()
        .into_iter()
        .map(|label| {
            let references: Vec<serde_json::Value> = registry
                .cross_references(label)
                .iter()
                .map(|r| {
                    json!({
                        "field": r.field,
                        "edge": r.edge_label,
                        "target": r.target_type,
                        "direction": direction(r.direction),
                    })
                })
                .collect();
            json!({
                "type": label,
                "nested": edges_json(registry.nested_fields(label)),
                "navigation": edges_json(registry.navigation_fields(label)),
                "references": references,
            })
        })
        .collect();

    json!({ "root": registry.root(), "types": types })
}
