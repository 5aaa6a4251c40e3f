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

use super::{print_json, read_event, read_study, run_cancellable, write_output};
use crate::error::CliError;
use sdr_graph::{
    usdm_registry, BoltGraphStore, GraphConfig, GraphError, Resolver, StoreConfig,
    TransactionExecutor,
};
use std::sync::Arc;

async fn connect(store: &StoreConfig, config: &GraphConfig) -> Result<BoltGraphStore, CliError> {
    BoltGraphStore::connect(store, config.clone())
        .await
        .map_err(|e| CliError::Graph(GraphError::from(e)))
}

/// Upsert documents into a live graph.
pub fn upsert(store: &StoreConfig, files: &[String], constraints: bool) -> Result<(), CliError> {
    let studies = files
        .iter()
        .map(|file| read_study(file))
        .collect::<Result<Vec<_>, _>>()?;

    let lines = run_cancellable(|cancel| async move {
        let config = GraphConfig::default();
        let bolt = connect(store, &config).await?;
        if constraints {
            bolt.ensure_constraints(usdm_registry()).await;
        }
        let resolver = Resolver::usdm(TransactionExecutor::new(Arc::new(bolt)).with_cancel(cancel), &config);

        let mut lines = Vec::with_capacity(studies.len());
        for study in &studies {
            let report = resolver.upsert_study(study).await?;
            for warning in &report.warnings {
                eprintln!("Warning: {}: {}", report.study_id, warning);
            }
            lines.push(format!(
                "{}: {} statements, {} rows",
                report.study_id, report.summary.statements, report.summary.rows
            ));
        }
        Ok(lines)
    })?;

    write_output(&format!("{}\n", lines.join("\n")), None)
}

/// Read from a live graph.
pub fn query(store: &StoreConfig, paths: &[String], id: Option<&str>, stats: bool) -> Result<(), CliError> {
    let event = read_event(paths, id, stats);
    let result = run_cancellable(|cancel| async move {
        let config = GraphConfig::default();
        let bolt = connect(store, &config).await?;
        let resolver = Resolver::usdm(TransactionExecutor::new(Arc::new(bolt)).with_cancel(cancel), &config);
        Ok(resolver.handle(&event).await?)
    })?;
    print_json(&result)
}

/// Delete a study from a live graph.
pub fn delete(store: &StoreConfig, id: &str) -> Result<(), CliError> {
    run_cancellable(|cancel| async move {
        let config = GraphConfig::default();
        let bolt = connect(store, &config).await?;
        let resolver = Resolver::usdm(TransactionExecutor::new(Arc::new(bolt)).with_cancel(cancel), &config);
        resolver.delete_study(Some(id)).await?;
        Ok(())
    })?;
    write_output(&format!("Deleted {}\n", id), None)
}
