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

//! Submission queue processing.

use tracing::{info, warn};

use sdr_model::SubmissionPayload;

use crate::error::{CompileWarning, Result};
use crate::resolver::Resolver;

/// Counters for one processed batch of messages.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessReport {
    /// Studies written.
    pub processed: usize,
    /// Messages that failed to parse.
    pub skipped: usize,
    /// Warnings collected across all written studies.
    pub warnings: Vec<CompileWarning>,
}

/// Applies queued study submissions in order.
#[derive(Debug)]
pub struct SubmissionProcessor<'r, 'a> {
    resolver: &'r Resolver<'a>,
}

impl<'r, 'a> SubmissionProcessor<'r, 'a> {
    /// Create a processor writing through `resolver`.
    pub fn new(resolver: &'r Resolver<'a>) -> Self {
        Self { resolver }
    }

    /// Process message bodies in order.
    ///
    /// A body that does not parse as a [`SubmissionPayload`] is logged and
    /// skipped. Any other failure stops the batch; studies already written
    /// stay written.
    pub async fn process<I, S>(&self, bodies: I) -> Result<ProcessReport>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ProcessReport::default();
        for (index, body) in bodies.into_iter().enumerate() {
            let payload: SubmissionPayload = match serde_json::from_str(body.as_ref()) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(index, "skipping unparseable submission: {}", e);
                    report.skipped += 1;
                    continue;
                }
            };

            let outcome = self.resolver.upsert_study(&payload.study).await?;
            info!(
                index,
                study = %outcome.study_id,
                system = payload.system_name.as_deref().unwrap_or("unknown"),
                usdm_version = payload.usdm_version.as_deref().unwrap_or("unknown"),
                "submission applied"
            );
            report.processed += 1;
            report.warnings.extend(outcome.warnings);
        }
        Ok(report)
    }
}
