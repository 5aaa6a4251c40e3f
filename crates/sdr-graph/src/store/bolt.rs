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

//! Neo4j / Neptune store over Bolt.

use async_trait::async_trait;
use neo4rs::{
    query, BoltBoolean, BoltFloat, BoltInteger, BoltList, BoltMap, BoltNull, BoltString, BoltType,
    ConfigBuilder, Graph, Query,
};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::{GraphStore, WriteSummary};
use crate::config::{GraphConfig, StoreConfig};
use crate::cypher::{render_constraints, render_read, render_write, CypherStatement};
use crate::error::StoreError;
use crate::projection::ReadQuery;
use crate::schema::SchemaRegistry;
use crate::upsert::WriteStatement;
use crate::value::{RawValue, Value};

/// A [`GraphStore`] backed by a Bolt endpoint.
pub struct BoltGraphStore {
    graph: Graph,
    config: GraphConfig,
}

impl BoltGraphStore {
    /// Connect to the endpoint described by `store`.
    pub async fn connect(store: &StoreConfig, config: GraphConfig) -> Result<Self, StoreError> {
        let mut builder = ConfigBuilder::default()
            .uri(store.uri.as_str())
            .user(store.user.clone().unwrap_or_default())
            .password(store.password.clone().unwrap_or_default());
        if let Some(database) = &store.database {
            builder = builder.db(database.as_str());
        }
        let bolt_config = builder
            .build()
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        let graph = Graph::connect(bolt_config)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!(uri = %store.uri, "connected to graph store");
        Ok(Self::from_graph(graph, config))
    }

    /// Wrap an existing connection.
    pub fn from_graph(graph: Graph, config: GraphConfig) -> Self {
        Self { graph, config }
    }

    /// Create identity uniqueness constraints for every registry label.
    ///
    /// Runs outside any data transaction. Failures are logged and
    /// skipped; returns the number of constraints applied.
    pub async fn ensure_constraints(&self, registry: &SchemaRegistry) -> usize {
        let mut applied = 0;
        for statement in render_constraints(registry, &self.config) {
            match self.graph.run(to_query(&statement)).await {
                Ok(()) => applied += 1,
                Err(e) => warn!(query = %statement.query, "constraint not created: {}", e),
            }
        }
        applied
    }
}

#[async_trait]
impl GraphStore for BoltGraphStore {
    async fn run_read(&self, read: &ReadQuery) -> Result<Vec<RawValue>, StoreError> {
        let statement = render_read(read, &self.config);
        debug!(query = %statement.query, "bolt read");

        let mut stream = self
            .graph
            .execute(to_query(&statement))
            .await
            .map_err(|e| StoreError::Execution(e.to_string()))?;

        let mut rows = Vec::new();
        while let Some(row) = stream
            .next()
            .await
            .map_err(|e| StoreError::Execution(e.to_string()))?
        {
            let value: BoltType = row
                .get("result")
                .map_err(|e| StoreError::Decode(e.to_string()))?;
            rows.push(from_bolt(value));
        }
        Ok(rows)
    }

    async fn run_write(&self, statements: &[WriteStatement]) -> Result<WriteSummary, StoreError> {
        let mut summary = WriteSummary::default();
        let mut queries = Vec::new();
        for statement in statements {
            for rendered in render_write(statement, &self.config) {
                summary.rows += rendered
                    .parameters
                    .get("rows")
                    .and_then(Value::as_list)
                    .map_or(1, <[Value]>::len);
                queries.push(to_query(&rendered));
            }
            summary.statements += 1;
        }

        let mut txn = self
            .graph
            .start_txn()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;

        if let Err(e) = txn.run_queries(queries).await {
            if let Err(rollback) = txn.rollback().await {
                warn!("rollback failed: {}", rollback);
            }
            return Err(StoreError::Execution(e.to_string()));
        }

        txn.commit()
            .await
            .map_err(|e| StoreError::Transaction(e.to_string()))?;
        debug!(statements = summary.statements, rows = summary.rows, "bolt write committed");
        Ok(summary)
    }
}

fn to_query(statement: &CypherStatement) -> Query {
    statement
        .parameters
        .iter()
        .fold(query(&statement.query), |q, (name, value)| {
            q.param(name, to_bolt(value))
        })
}

/// Convert a parameter value to its Bolt representation.
pub(crate) fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::Null(BoltNull),
        Value::Bool(b) => BoltType::Boolean(BoltBoolean::new(*b)),
        Value::Int(i) => BoltType::Integer(BoltInteger::new(*i)),
        Value::Float(f) => BoltType::Float(BoltFloat::new(*f)),
        Value::String(s) => BoltType::String(BoltString::new(s)),
        Value::List(items) => BoltType::List(BoltList {
            value: items.iter().map(to_bolt).collect(),
        }),
        Value::Map(map) => BoltType::Map(BoltMap {
            value: map
                .iter()
                .map(|(k, v)| (BoltString::new(k), to_bolt(v)))
                .collect::<HashMap<_, _>>(),
        }),
    }
}

/// Convert a Bolt result value into the store-neutral raw form.
pub(crate) fn from_bolt(value: BoltType) -> RawValue {
    match value {
        BoltType::Null(_) => RawValue::Null,
        BoltType::Boolean(b) => RawValue::Bool(b.value),
        BoltType::Integer(i) => RawValue::Int(i.value),
        BoltType::Float(f) => RawValue::Float(f.value),
        BoltType::String(s) => RawValue::Text(s.value),
        BoltType::Bytes(b) => RawValue::Bytes(b.value.to_vec()),
        BoltType::List(list) => RawValue::List(list.value.into_iter().map(from_bolt).collect()),
        BoltType::Map(map) => from_bolt_map(map),
        BoltType::Node(node) => from_bolt_map(node.properties),
        other => RawValue::Other(format!("{:?}", other)),
    }
}

fn from_bolt_map(map: BoltMap) -> RawValue {
    RawValue::Map(
        map.value
            .into_iter()
            .map(|(k, v)| (RawValue::Text(k.value), from_bolt(v)))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;
    use std::collections::BTreeMap;

    #[test]
    fn test_bolt_conversion_preserves_shape() {
        let mut inner = BTreeMap::new();
        inner.insert("id".to_string(), Value::from("A1"));
        inner.insert("dose".to_string(), Value::Float(2.5));
        let value = Value::List(vec![Value::Map(inner), Value::Null, Value::Bool(true), Value::Int(7)]);

        let back = normalize(from_bolt(to_bolt(&value)));
        assert_eq!(back, value);
    }

    #[test]
    fn test_node_reads_as_property_map() {
        let mut props = HashMap::new();
        props.insert(BoltString::new("name"), BoltType::String(BoltString::new("Arm A")));
        let raw = from_bolt_map(BoltMap { value: props });
        assert_eq!(
            normalize(raw).get("name").and_then(Value::as_str),
            Some("Arm A")
        );
    }
}
