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

//! Graph store boundary.
//!
//! A [`GraphStore`] runs one compiled read, or one ordered list of write
//! statements, inside a single transaction. Everything above this trait
//! is pure; everything below it does I/O.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::projection::ReadQuery;
use crate::upsert::WriteStatement;
use crate::value::RawValue;

mod memory;
pub use memory::MemoryGraphStore;

#[cfg(feature = "neo4j")]
mod bolt;
#[cfg(feature = "neo4j")]
pub use bolt::BoltGraphStore;

/// Counters reported by a committed write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteSummary {
    /// Statements executed.
    pub statements: usize,
    /// Parameter rows processed across all statements.
    pub rows: usize,
}

/// Transactional access to a labeled property graph.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a read in one read transaction.
    ///
    /// Returns one raw row per bound root node (or per label for
    /// [`ReadQuery::LabelCounts`]), in the store's native shape.
    async fn run_read(&self, query: &ReadQuery) -> Result<Vec<RawValue>, StoreError>;

    /// Run statements in order inside one write transaction.
    ///
    /// Either every statement commits or none does.
    async fn run_write(&self, statements: &[WriteStatement]) -> Result<WriteSummary, StoreError>;
}
