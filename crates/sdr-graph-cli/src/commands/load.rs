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

use super::{print_json, read_event, read_study, run_cancellable};
use crate::error::CliError;
use sdr_graph::{GraphConfig, MemoryGraphStore, Resolver, TransactionExecutor};
use std::sync::Arc;
use tracing::info;

/// Upsert documents into an in-memory graph and print one read over it.
pub fn load(files: &[String], paths: &[String], id: Option<&str>, stats: bool) -> Result<(), CliError> {
    let studies = files
        .iter()
        .map(|file| read_study(file))
        .collect::<Result<Vec<_>, _>>()?;
    let event = read_event(paths, id, stats);

    let result = run_cancellable(|cancel| async move {
        let config = GraphConfig::default();
        let executor = TransactionExecutor::new(Arc::new(MemoryGraphStore::new())).with_cancel(cancel);
        let resolver = Resolver::usdm(executor, &config);
        for study in &studies {
            let report = resolver.upsert_study(study).await?;
            for warning in &report.warnings {
                eprintln!("Warning: {}: {}", report.study_id, warning);
            }
        }
        info!(documents = studies.len(), "loaded");
        Ok(resolver.handle(&event).await?)
    })?;

    print_json(&result)
}
