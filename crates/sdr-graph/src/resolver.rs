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

//! Request dispatch by `(parent type, field)`.
//!
//! A [`ResolverEvent`] carries the operation name, its arguments and the
//! flat selection set requested by the client. The [`Resolver`] routes it
//! to a typed operation, compiles the read or write, runs it through the
//! [`TransactionExecutor`] and returns JSON.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, info};

use sdr_model::{Activity, Encounter, NodeCount, Study};

use crate::config::GraphConfig;
use crate::error::{CompileWarning, GraphError, Result};
use crate::executor::TransactionExecutor;
use crate::normalize::{decode_first, decode_rows, normalize};
use crate::projection::{ProjectionCompiler, ReadQuery};
use crate::schema::{usdm_registry, SchemaRegistry};
use crate::selection::SelectionNode;
use crate::store::WriteSummary;
use crate::upsert::{UpsertCompiler, WriteStatement};

/// An inbound request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverEvent {
    /// `Query` or `Mutation`.
    pub parent_type_name: String,
    /// Operation field name.
    pub field_name: String,
    /// Operation arguments.
    #[serde(default)]
    pub arguments: BTreeMap<String, serde_json::Value>,
    /// Requested field paths, delimiter separated.
    #[serde(default)]
    pub selection_set_list: Vec<String>,
}

impl ResolverEvent {
    /// Create an event without arguments or selection.
    pub fn new(parent_type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            parent_type_name: parent_type_name.into(),
            field_name: field_name.into(),
            ..Default::default()
        }
    }

    /// Add an argument.
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.arguments.insert(name.into(), value.into());
        self
    }

    /// Add requested field paths.
    pub fn with_selection<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selection_set_list.extend(paths.into_iter().map(Into::into));
        self
    }

    fn id_argument(&self) -> Option<&str> {
        self.arguments.get("id").and_then(serde_json::Value::as_str)
    }
}

/// Operations the resolver knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `Query.study`
    Study,
    /// `Query.studies`
    Studies,
    /// `Query.activities`
    Activities,
    /// `Query.encounters`
    Encounters,
    /// `Query.graphStats`
    GraphStats,
    /// `Mutation.deleteStudy`
    DeleteStudy,
    /// `Mutation.upsertStudy`
    UpsertStudy,
}

impl Operation {
    /// Every operation.
    pub const ALL: [Operation; 7] = [
        Operation::Study,
        Operation::Studies,
        Operation::Activities,
        Operation::Encounters,
        Operation::GraphStats,
        Operation::DeleteStudy,
        Operation::UpsertStudy,
    ];

    /// Look up an operation by its routing key.
    pub fn from_route(parent_type: &str, field: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.route() == (parent_type, field))
    }

    /// The `(parent type, field)` routing key.
    pub fn route(self) -> (&'static str, &'static str) {
        match self {
            Operation::Study => ("Query", "study"),
            Operation::Studies => ("Query", "studies"),
            Operation::Activities => ("Query", "activities"),
            Operation::Encounters => ("Query", "encounters"),
            Operation::GraphStats => ("Query", "graphStats"),
            Operation::DeleteStudy => ("Mutation", "deleteStudy"),
            Operation::UpsertStudy => ("Mutation", "upsertStudy"),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (parent, field) = self.route();
        write!(f, "{}.{}", parent, field)
    }
}

/// Outcome of an upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertReport {
    /// Natural key of the written study.
    pub study_id: String,
    /// Store counters.
    pub summary: WriteSummary,
    /// Conditions recovered from during compilation.
    pub warnings: Vec<CompileWarning>,
}

/// Routes requests to the projection and upsert engines.
#[derive(Debug)]
pub struct Resolver<'a> {
    executor: TransactionExecutor,
    registry: &'a SchemaRegistry,
    config: &'a GraphConfig,
    upserts: UpsertCompiler<'a>,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over a registry.
    pub fn new(executor: TransactionExecutor, registry: &'a SchemaRegistry, config: &'a GraphConfig) -> Self {
        Self {
            executor,
            registry,
            config,
            upserts: UpsertCompiler::new(registry, config),
        }
    }

    /// Create a resolver over the study registry.
    pub fn usdm(executor: TransactionExecutor, config: &'a GraphConfig) -> Self {
        Self::new(executor, usdm_registry(), config)
    }

    /// The executor requests run on.
    pub fn executor(&self) -> &TransactionExecutor {
        &self.executor
    }

    fn projections(&self) -> ProjectionCompiler<'_> {
        ProjectionCompiler::new(self.registry, self.config)
    }

    /// Parse a flat selection set with the configured delimiter.
    pub fn selection<I, S>(&self, paths: I) -> SelectionNode
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        SelectionNode::from_paths(paths, self.config.path_delimiter)
    }

    /// Fetch one study by id. `Ok(None)` when no study has that id.
    pub async fn study(&self, id: Option<&str>, selection: &SelectionNode) -> Result<Option<Study>> {
        let id = require_id(id, Operation::Study)?;
        let query = self.projections().point(self.registry.root(), id, selection);
        decode_first(self.executor.read(&query).await?)
    }

    /// Fetch every study.
    pub async fn studies(&self, selection: &SelectionNode) -> Result<Vec<Study>> {
        let query = self.projections().collection(self.registry.root(), selection);
        decode_rows(self.executor.read(&query).await?)
    }

    /// Fetch every activity.
    pub async fn activities(&self, selection: &SelectionNode) -> Result<Vec<Activity>> {
        let query = self.projections().collection("Activity", selection);
        decode_rows(self.executor.read(&query).await?)
    }

    /// Fetch every encounter.
    pub async fn encounters(&self, selection: &SelectionNode) -> Result<Vec<Encounter>> {
        let query = self.projections().collection("Encounter", selection);
        decode_rows(self.executor.read(&query).await?)
    }

    /// Node count per label, sorted by label.
    pub async fn graph_stats(&self) -> Result<Vec<NodeCount>> {
        decode_rows(self.executor.read(&ReadQuery::LabelCounts).await?)
    }

    /// Delete a study and everything reachable from it.
    ///
    /// Deleting an id that does not exist succeeds.
    pub async fn delete_study(&self, id: Option<&str>) -> Result<bool> {
        let id = require_id(id, Operation::DeleteStudy)?;
        let statement = WriteStatement::DeleteReachable {
            label: self.registry.root().to_string(),
            id: id.to_string(),
        };
        let summary = self.executor.write(&[statement]).await?;
        info!(id, removed = summary.rows, "study deleted");
        Ok(true)
    }

    /// Converge the graph to a study document.
    pub async fn upsert_study(&self, study: &Study) -> Result<UpsertReport> {
        let batch = self.upserts.compile_document(study)?;
        let summary = self.executor.write(&batch.to_writes()).await?;
        info!(
            id = %batch.root_id,
            statements = summary.statements,
            rows = summary.rows,
            "study upserted"
        );
        Ok(UpsertReport {
            study_id: batch.root_id,
            summary,
            warnings: batch.warnings,
        })
    }

    /// Dispatch an event and return its JSON result.
    ///
    /// Reads return the projected shape as requested, so fields the schema
    /// does not know come back as null.
    pub async fn handle(&self, event: &ResolverEvent) -> Result<serde_json::Value> {
        let operation = Operation::from_route(&event.parent_type_name, &event.field_name)
            .ok_or_else(|| GraphError::UnknownOperation {
                parent_type: event.parent_type_name.clone(),
                field: event.field_name.clone(),
            })?;
        debug!(%operation, fields = event.selection_set_list.len(), "dispatching");

        let selection = self.selection(&event.selection_set_list);
        let projections = self.projections();
        let result = match operation {
            Operation::Study => {
                let id = require_id(event.id_argument(), operation)?;
                let query = projections.point(self.registry.root(), id, &selection);
                let rows = self.shaped::<Study>(&query).await?;
                rows.into_iter().next().unwrap_or(serde_json::Value::Null)
            }
            Operation::Studies => {
                let query = projections.collection(self.registry.root(), &selection);
                serde_json::Value::Array(self.shaped::<Study>(&query).await?)
            }
            Operation::Activities => {
                let query = projections.collection("Activity", &selection);
                serde_json::Value::Array(self.shaped::<Activity>(&query).await?)
            }
            Operation::Encounters => {
                let query = projections.collection("Encounter", &selection);
                serde_json::Value::Array(self.shaped::<Encounter>(&query).await?)
            }
            Operation::GraphStats => {
                serde_json::Value::Array(self.shaped::<NodeCount>(&ReadQuery::LabelCounts).await?)
            }
            Operation::DeleteStudy => json!(self.delete_study(event.id_argument()).await?),
            Operation::UpsertStudy => {
                let document = event.arguments.get("study").cloned().ok_or_else(|| {
                    GraphError::InvalidDocument("upsertStudy requires a study argument".to_string())
                })?;
                let study: Study = serde_json::from_value(document)
                    .map_err(|e| GraphError::InvalidDocument(e.to_string()))?;
                self.upsert_study(&study).await?;
                serde_json::to_value(&study)?
            }
        };
        Ok(result)
    }
}

impl Resolver<'_> {
    /// Run a read and return the normalized rows in the requested shape.
    ///
    /// Each row must decode as `T`; null rows are dropped.
    async fn shaped<T: DeserializeOwned>(&self, query: &ReadQuery) -> Result<Vec<serde_json::Value>> {
        self.executor
            .read(query)
            .await?
            .into_iter()
            .map(normalize)
            .filter(|row| !row.is_null())
            .map(|row| {
                let row = serde_json::Value::from(row);
                T::deserialize(&row).map_err(|e| GraphError::Decode(e.to_string()))?;
                Ok(row)
            })
            .collect()
    }
}

fn require_id(id: Option<&str>, operation: Operation) -> Result<&str> {
    id.filter(|id| !id.is_empty())
        .ok_or_else(|| GraphError::missing_identity(operation.to_string()))
}
