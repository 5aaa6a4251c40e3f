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

//! Bidirectional mapping between nested study documents and a labeled
//! property graph.
//!
//! The crate has two engines that share one [`SchemaRegistry`]:
//!
//! - the **projection compiler** turns a flat selection set into a
//!   [`ReadQuery`] that returns exactly the requested nested shape;
//! - the **upsert compiler** decomposes a nested document into an ordered,
//!   idempotent list of [`MergeStatement`]s.
//!
//! Both produce a backend neutral IR. The [`cypher`] module renders it to
//! parameterized Cypher; a [`GraphStore`] runs it inside one transaction.
//!
//! # Mapping
//!
//! | Document concept | Graph representation |
//! |------------------|----------------------|
//! | Entity type | Node label |
//! | `id` | Natural key property, merged on `(label, id)` |
//! | Scalar field | Node property |
//! | Nested object or list | Outgoing edge per registry entry |
//! | Id reference (`previousId`) | Edge between existing nodes |
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use sdr_graph::{GraphConfig, MemoryGraphStore, Resolver, TransactionExecutor};
//! use sdr_model::{Study, StudyVersion};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> sdr_graph::Result<()> {
//! let config = GraphConfig::default();
//! let executor = TransactionExecutor::new(Arc::new(MemoryGraphStore::new()));
//! let resolver = Resolver::usdm(executor, &config);
//!
//! let study = Study::new("S1").with_name("Pivotal").with_version(StudyVersion::new("V1"));
//! resolver.upsert_study(&study).await?;
//!
//! let selection = resolver.selection(["id", "name", "versions/id"]);
//! let found = resolver.study(Some("S1"), &selection).await?;
//! assert_eq!(found, Some(study));
//! # Ok(())
//! # }
//! ```
//!
//! # Generated Cypher
//!
//! ```cypher
//! // Merge 1 Study node(s)
//! UNWIND [{id: 'S1', props: {name: 'Pivotal'}}] AS row MERGE (n:Study {id: row.id}) SET n += row.props;
//!
//! // Merge 1 HAS_VERSION edge(s) from Study to StudyVersion
//! UNWIND [{from: 'S1', to: 'V1'}] AS row MATCH (a:Study {id: row.from}) MATCH (b:StudyVersion {id: row.to}) MERGE (a)-[:HAS_VERSION]->(b);
//! ```

#![warn(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod article;
pub mod config;
pub mod cypher;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod processor;
pub mod projection;
pub mod resolver;
pub mod schema;
pub mod selection;
pub mod store;
pub mod upsert;
pub mod value;

pub use article::{compile_articles, ingest_articles};
pub use config::{
    GraphConfig, GraphConfigBuilder, StoreConfig, DEFAULT_MAX_STRING_LENGTH, NEPTUNE_BOLT_PORT,
};
pub use cypher::{CypherScript, CypherStatement, StatementType};
pub use error::{CompileWarning, GraphError, Result, StoreError};
pub use executor::{cancel_pair, CancelHandle, CancelSignal, TransactionExecutor};
pub use normalize::{decode, decode_first, decode_rows, normalize};
pub use processor::{ProcessReport, SubmissionProcessor};
pub use projection::{
    compile_projection, Binding, MapProjection, Projection, ProjectionCompiler, ReadQuery,
};
pub use resolver::{Operation, Resolver, ResolverEvent, UpsertReport};
pub use schema::{
    usdm_registry, Cardinality, CrossReference, ReferenceDirection, SchemaEdge, SchemaRegistry,
    SchemaRegistryBuilder,
};
pub use selection::{Selection, SelectionNode};
#[cfg(feature = "neo4j")]
pub use store::BoltGraphStore;
pub use store::{GraphStore, MemoryGraphStore, WriteSummary};
pub use upsert::{
    compile_study_upsert, EdgeMerge, EdgeOrigin, EdgeRow, MergeStatement, NodeMerge, NodeRow,
    PlanStep, UpsertBatch, UpsertCompiler, UpsertPlan, WriteStatement,
};
pub use value::{RawValue, Value};
