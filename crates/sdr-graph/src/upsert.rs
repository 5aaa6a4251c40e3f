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

//! Nested-entity upsert compiler.
//!
//! A document is decomposed into an ordered list of [`MergeStatement`]s.
//! The order is fixed per registry by an [`UpsertPlan`]: a pre-order walk
//! of the nested edges starting at the root type, emitting for each edge
//! the child node merge followed by the parent-to-child edge merge.
//! Cross-reference edges come last, once every node of the batch exists.
//!
//! Nodes merge on `(label, id)` and edges on `(from, label, to)`, so
//! replaying a batch leaves the graph unchanged.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

use sdr_model::Study;

use crate::config::GraphConfig;
use crate::cypher::validate_string_length;
use crate::error::{CompileWarning, GraphError, Result};
use crate::schema::{usdm_registry, ReferenceDirection, SchemaRegistry};
use crate::value::Value;

/// One node to merge: its natural key and the properties to set.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRow {
    /// Natural key.
    pub id: String,
    /// Properties set with `+=`; absent properties are left untouched.
    pub props: BTreeMap<String, Value>,
}

/// One edge to merge between two natural keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeRow {
    /// Key of the source node.
    pub from_id: String,
    /// Key of the target node.
    pub to_id: String,
}

/// Where an edge statement comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeOrigin {
    /// Parent to embedded child.
    Nested,
    /// Id-valued reference field.
    CrossReference,
}

/// Merge a batch of nodes of one label.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeMerge {
    /// Node label.
    pub label: String,
    /// Rows to merge.
    pub rows: Vec<NodeRow>,
}

/// Merge a batch of edges of one label between two node labels.
///
/// Both endpoints are matched; a row whose endpoint does not exist is
/// silently skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeMerge {
    /// Label of the source nodes.
    pub from_label: String,
    /// Edge label.
    pub edge_label: String,
    /// Label of the target nodes.
    pub to_label: String,
    /// Rows to merge.
    pub rows: Vec<EdgeRow>,
    /// Nested or cross reference.
    pub origin: EdgeOrigin,
}

/// An idempotent merge over one node or edge type.
#[derive(Debug, Clone, PartialEq)]
pub enum MergeStatement {
    /// Node merge.
    Nodes(NodeMerge),
    /// Edge merge.
    Edges(EdgeMerge),
}

impl MergeStatement {
    /// Number of parameter rows.
    pub fn row_count(&self) -> usize {
        match self {
            MergeStatement::Nodes(m) => m.rows.len(),
            MergeStatement::Edges(m) => m.rows.len(),
        }
    }

    /// One-line description used for script comments and logs.
    pub fn describe(&self) -> String {
        match self {
            MergeStatement::Nodes(m) => format!("Merge {} {} node(s)", m.rows.len(), m.label),
            MergeStatement::Edges(m) => format!(
                "Merge {} {} edge(s) from {} to {}",
                m.rows.len(),
                m.edge_label,
                m.from_label,
                m.to_label
            ),
        }
    }
}

/// A statement run inside a write transaction.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteStatement {
    /// Idempotent merge.
    Merge(MergeStatement),
    /// Detach-delete a node and everything reachable from it via outgoing edges.
    DeleteReachable {
        /// Label of the root node.
        label: String,
        /// Natural key of the root node.
        id: String,
    },
}

impl From<MergeStatement> for WriteStatement {
    fn from(statement: MergeStatement) -> Self {
        WriteStatement::Merge(statement)
    }
}

/// Result of compiling one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpsertBatch {
    /// Natural key of the root document.
    pub root_id: String,
    /// Statements in execution order.
    pub statements: Vec<MergeStatement>,
    /// Conditions recovered from while compiling.
    pub warnings: Vec<CompileWarning>,
}

impl UpsertBatch {
    /// Whether no statement was produced.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    /// Total node rows across statements.
    pub fn node_rows(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, MergeStatement::Nodes(_)))
            .map(MergeStatement::row_count)
            .sum()
    }

    /// Total edge rows across statements.
    pub fn edge_rows(&self) -> usize {
        self.statements
            .iter()
            .filter(|s| matches!(s, MergeStatement::Edges(_)))
            .map(MergeStatement::row_count)
            .sum()
    }

    /// Statements ready for a write transaction.
    pub fn to_writes(&self) -> Vec<WriteStatement> {
        self.statements.iter().cloned().map(WriteStatement::from).collect()
    }
}

/// One step of an [`UpsertPlan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanStep {
    /// Merge nodes of a label.
    Nodes {
        /// Node label.
        label: String,
    },
    /// Merge edges of a label.
    Edges {
        /// Source label.
        from_label: String,
        /// Edge label.
        edge_label: String,
        /// Target label.
        to_label: String,
        /// Nested or cross reference.
        origin: EdgeOrigin,
    },
}

#[derive(Debug, Clone)]
struct PlanNode {
    type_name: String,
    node_step: usize,
    children: Vec<PlanChild>,
}

#[derive(Debug, Clone)]
struct PlanChild {
    field: String,
    edge_step: usize,
    node: PlanNode,
}

/// The static statement order derived from a registry's type graph.
///
/// Every edge step comes after the node steps of both its endpoints.
/// Relationship cycles in custom registries are cut at the first repeated
/// type on a path.
#[derive(Debug, Clone)]
pub struct UpsertPlan {
    steps: Vec<PlanStep>,
    root: PlanNode,
    reference_steps: BTreeMap<(String, String), usize>,
}

impl UpsertPlan {
    /// Derive the plan for documents rooted at the registry's root type.
    pub fn new(registry: &SchemaRegistry) -> Self {
        let mut builder = PlanBuilder {
            registry,
            steps: Vec::new(),
            ancestors: Vec::new(),
            type_order: Vec::new(),
        };
        let root_type = registry.root().to_string();
        let root_step = builder.push(PlanStep::Nodes {
            label: root_type.clone(),
        });
        let root = builder.expand(&root_type, root_step);

        let mut reference_steps = BTreeMap::new();
        for type_name in builder.type_order.clone() {
            for reference in registry.cross_references(&type_name) {
                let (from_label, to_label) = match reference.direction {
                    ReferenceDirection::Outgoing => (type_name.clone(), reference.target_type.clone()),
                    ReferenceDirection::Incoming => (reference.target_type.clone(), type_name.clone()),
                };
                let step = builder.push(PlanStep::Edges {
                    from_label,
                    edge_label: reference.edge_label.clone(),
                    to_label,
                    origin: EdgeOrigin::CrossReference,
                });
                reference_steps.insert((type_name.clone(), reference.field.clone()), step);
            }
        }

        Self {
            steps: builder.steps,
            root,
            reference_steps,
        }
    }

    /// All steps in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Position of the first node step for a label.
    pub fn node_position(&self, label: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|s| matches!(s, PlanStep::Nodes { label: l } if l == label))
    }
}

struct PlanBuilder<'a> {
    registry: &'a SchemaRegistry,
    steps: Vec<PlanStep>,
    ancestors: Vec<String>,
    type_order: Vec<String>,
}

impl PlanBuilder<'_> {
    fn push(&mut self, step: PlanStep) -> usize {
        self.steps.push(step);
        self.steps.len() - 1
    }

    fn expand(&mut self, type_name: &str, node_step: usize) -> PlanNode {
        if !self.type_order.iter().any(|t| t == type_name) {
            self.type_order.push(type_name.to_string());
        }
        self.ancestors.push(type_name.to_string());

        let registry = self.registry;
        let mut children = Vec::new();
        for (field, edge) in registry.nested_fields(type_name) {
            if self.ancestors.iter().any(|a| *a == edge.child_type) {
                debug!(type_name, field, "recursive relationship not expanded");
                continue;
            }
            let child_step = self.push(PlanStep::Nodes {
                label: edge.child_type.clone(),
            });
            let edge_step = self.push(PlanStep::Edges {
                from_label: type_name.to_string(),
                edge_label: edge.edge_label.clone(),
                to_label: edge.child_type.clone(),
                origin: EdgeOrigin::Nested,
            });
            let node = self.expand(&edge.child_type, child_step);
            children.push(PlanChild {
                field: field.to_string(),
                edge_step,
                node,
            });
        }

        self.ancestors.pop();
        PlanNode {
            type_name: type_name.to_string(),
            node_step,
            children,
        }
    }
}

/// Compiles nested documents into merge statements.
#[derive(Debug, Clone)]
pub struct UpsertCompiler<'a> {
    registry: &'a SchemaRegistry,
    config: &'a GraphConfig,
    plan: UpsertPlan,
}

impl<'a> UpsertCompiler<'a> {
    /// Create a compiler; the plan is derived once here.
    pub fn new(registry: &'a SchemaRegistry, config: &'a GraphConfig) -> Self {
        Self {
            registry,
            config,
            plan: UpsertPlan::new(registry),
        }
    }

    /// The statement order used by this compiler.
    pub fn plan(&self) -> &UpsertPlan {
        &self.plan
    }

    /// Compile any serializable document rooted at the registry's root type.
    pub fn compile_document<T: Serialize>(&self, document: &T) -> Result<UpsertBatch> {
        let json = serde_json::to_value(document)?;
        self.compile(&Value::from(json))
    }

    /// Compile a canonical document value.
    ///
    /// # Errors
    ///
    /// - `InvalidDocument` if the root is not an object
    /// - `MissingRequiredIdentity` if the root has no id
    /// - `StringLengthExceeded` if a string property is over the configured limit
    pub fn compile(&self, document: &Value) -> Result<UpsertBatch> {
        let root_type = self.registry.root();
        let Some(root) = document.as_map() else {
            return Err(GraphError::InvalidDocument(format!(
                "{} document must be an object",
                root_type
            )));
        };
        let root_id = self
            .identity_of(root)
            .ok_or_else(|| GraphError::missing_identity(format!("upsert {}", root_type)))?;

        let mut collector = Collector {
            compiler: self,
            node_rows: vec![Vec::new(); self.plan.steps.len()],
            edge_rows: vec![Vec::new(); self.plan.steps.len()],
            warnings: Vec::new(),
            batch_ids: BTreeMap::new(),
            references: Vec::new(),
        };
        collector.visit(root, &self.plan.root, root_id)?;
        collector.resolve_references();

        let Collector {
            mut node_rows,
            mut edge_rows,
            warnings,
            ..
        } = collector;

        let mut statements = Vec::new();
        for (index, step) in self.plan.steps.iter().enumerate() {
            match step {
                PlanStep::Nodes { label } => {
                    let rows = std::mem::take(&mut node_rows[index]);
                    if !rows.is_empty() {
                        statements.push(MergeStatement::Nodes(NodeMerge {
                            label: label.clone(),
                            rows,
                        }));
                    }
                }
                PlanStep::Edges {
                    from_label,
                    edge_label,
                    to_label,
                    origin,
                } => {
                    let rows = std::mem::take(&mut edge_rows[index]);
                    if !rows.is_empty() {
                        statements.push(MergeStatement::Edges(EdgeMerge {
                            from_label: from_label.clone(),
                            edge_label: edge_label.clone(),
                            to_label: to_label.clone(),
                            rows,
                            origin: *origin,
                        }));
                    }
                }
            }
        }

        for warning in &warnings {
            warn!(root_id, %warning, "recovered during upsert compilation");
        }
        debug!(
            root_id,
            statements = statements.len(),
            warnings = warnings.len(),
            "compiled upsert"
        );

        Ok(UpsertBatch {
            root_id: root_id.to_string(),
            statements,
            warnings,
        })
    }

    fn identity_of<'v>(&self, map: &'v BTreeMap<String, Value>) -> Option<&'v str> {
        map.get(&self.config.id_property)
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
    }
}

struct PendingReference {
    type_name: String,
    field: String,
    target_type: String,
    target_id: String,
}

struct Collector<'c, 'a> {
    compiler: &'c UpsertCompiler<'a>,
    node_rows: Vec<Vec<NodeRow>>,
    edge_rows: Vec<Vec<EdgeRow>>,
    warnings: Vec<CompileWarning>,
    batch_ids: BTreeMap<String, BTreeSet<String>>,
    references: Vec<PendingReference>,
}

impl Collector<'_, '_> {
    fn visit(&mut self, object: &BTreeMap<String, Value>, plan: &PlanNode, id: &str) -> Result<()> {
        let props = self.properties(object, plan)?;
        self.node_rows[plan.node_step].push(NodeRow {
            id: id.to_string(),
            props,
        });
        self.batch_ids
            .entry(plan.type_name.clone())
            .or_default()
            .insert(id.to_string());

        for child in &plan.children {
            let children: Vec<&Value> = match object.get(&child.field) {
                None | Some(Value::Null) => continue,
                Some(Value::List(items)) => items.iter().collect(),
                Some(value @ Value::Map(_)) => vec![value],
                Some(_) => {
                    self.warn(CompileWarning::UnexpectedShape {
                        type_name: plan.type_name.clone(),
                        field: child.field.clone(),
                    });
                    continue;
                }
            };

            for value in children {
                let Some(child_object) = value.as_map() else {
                    self.warn(CompileWarning::UnexpectedShape {
                        type_name: plan.type_name.clone(),
                        field: child.field.clone(),
                    });
                    continue;
                };
                let Some(child_id) = self.compiler.identity_of(child_object) else {
                    self.warn(CompileWarning::MissingChildIdentity {
                        type_name: plan.type_name.clone(),
                        field: child.field.clone(),
                    });
                    continue;
                };
                self.edge_rows[child.edge_step].push(EdgeRow {
                    from_id: id.to_string(),
                    to_id: child_id.to_string(),
                });
                self.visit(child_object, &child.node, child_id)?;
            }
        }

        self.collect_references(object, plan, id);
        Ok(())
    }

    fn properties(
        &mut self,
        object: &BTreeMap<String, Value>,
        plan: &PlanNode,
    ) -> Result<BTreeMap<String, Value>> {
        let registry = self.compiler.registry;
        let config = self.compiler.config;
        let mut props = BTreeMap::new();

        for (field, value) in object {
            if *field == config.id_property
                || value.is_null()
                || registry.nested_edge(&plan.type_name, field).is_some()
            {
                continue;
            }
            if !value.is_property_value() {
                self.warn(CompileWarning::UnknownField {
                    type_name: plan.type_name.clone(),
                    field: field.clone(),
                });
                continue;
            }
            let value = match value {
                Value::String(s) => {
                    validate_string_length(s, field, config)?;
                    value.clone()
                }
                Value::List(items) => {
                    // List properties cannot hold null elements
                    let kept: Vec<Value> = items.iter().filter(|v| !v.is_null()).cloned().collect();
                    if kept.is_empty() && !items.is_empty() {
                        continue;
                    }
                    for s in kept.iter().filter_map(Value::as_str) {
                        validate_string_length(s, field, config)?;
                    }
                    Value::List(kept)
                }
                _ => value.clone(),
            };
            props.insert(field.clone(), value);
        }
        Ok(props)
    }

    fn collect_references(&mut self, object: &BTreeMap<String, Value>, plan: &PlanNode, id: &str) {
        let compiler = self.compiler;
        for reference in compiler.registry.cross_references(&plan.type_name) {
            let Some(target_id) = object
                .get(&reference.field)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
            else {
                continue;
            };
            let Some(&step) = compiler
                .plan
                .reference_steps
                .get(&(plan.type_name.clone(), reference.field.clone()))
            else {
                continue;
            };
            let row = match reference.direction {
                ReferenceDirection::Outgoing => EdgeRow {
                    from_id: id.to_string(),
                    to_id: target_id.to_string(),
                },
                ReferenceDirection::Incoming => EdgeRow {
                    from_id: target_id.to_string(),
                    to_id: id.to_string(),
                },
            };
            self.edge_rows[step].push(row);
            self.references.push(PendingReference {
                type_name: plan.type_name.clone(),
                field: reference.field.clone(),
                target_type: reference.target_type.clone(),
                target_id: target_id.to_string(),
            });
        }
    }

    fn resolve_references(&mut self) {
        let references = std::mem::take(&mut self.references);
        for reference in references {
            let known = self
                .batch_ids
                .get(&reference.target_type)
                .map_or(false, |ids| ids.contains(&reference.target_id));
            if !known {
                self.warn(CompileWarning::UnresolvedReference {
                    type_name: reference.type_name,
                    field: reference.field,
                    target_id: reference.target_id,
                });
            }
        }
    }

    fn warn(&mut self, warning: CompileWarning) {
        self.warnings.push(warning);
    }
}

/// Compile a study with the study registry and default settings.
pub fn compile_study_upsert(study: &Study) -> Result<UpsertBatch> {
    let config = GraphConfig::default();
    UpsertCompiler::new(usdm_registry(), &config).compile_document(study)
}
