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

//! Transaction executor with cooperative cancellation.

use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, warn};

use crate::error::{GraphError, Result};
use crate::projection::ReadQuery;
use crate::store::{GraphStore, WriteSummary};
use crate::upsert::WriteStatement;
use crate::value::RawValue;

/// Requests cancellation of every executor holding the paired signal.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

/// Observes cancellation requested through a [`CancelHandle`].
#[derive(Debug, Clone)]
pub struct CancelSignal {
    receiver: Option<watch::Receiver<bool>>,
}

/// Create a connected handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (sender, receiver) = watch::channel(false);
    (
        CancelHandle { sender },
        CancelSignal {
            receiver: Some(receiver),
        },
    )
}

impl CancelSignal {
    /// A signal that is never raised.
    pub fn never() -> Self {
        Self { receiver: None }
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.receiver.as_ref().is_some_and(|r| *r.borrow())
    }

    /// Resolve once cancellation is requested.
    ///
    /// Pends forever for [`CancelSignal::never`] or when the handle is
    /// dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(receiver) = &self.receiver else {
            return std::future::pending().await;
        };
        let mut receiver = receiver.clone();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                return std::future::pending().await;
            }
        }
    }
}

impl Default for CancelSignal {
    fn default() -> Self {
        Self::never()
    }
}

/// Runs compiled reads and writes against a [`GraphStore`].
///
/// Cancellation drops the in-flight store call, which aborts its
/// transaction without committing.
#[derive(Clone)]
pub struct TransactionExecutor {
    store: Arc<dyn GraphStore>,
    cancel: CancelSignal,
}

impl TransactionExecutor {
    /// Create an executor that is never cancelled.
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self {
            store,
            cancel: CancelSignal::never(),
        }
    }

    /// Attach a cancellation signal.
    pub fn with_cancel(mut self, cancel: CancelSignal) -> Self {
        self.cancel = cancel;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Run a read in one transaction.
    pub async fn read(&self, query: &ReadQuery) -> Result<Vec<RawValue>> {
        if self.cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!("read cancelled");
                Err(GraphError::Cancelled)
            }
            result = self.store.run_read(query) => {
                let rows = result.map_err(|e| {
                    error!("read failed: {}", e);
                    GraphError::from(e)
                })?;
                debug!(rows = rows.len(), "read complete");
                Ok(rows)
            }
        }
    }

    /// Run statements in order in one write transaction.
    pub async fn write(&self, statements: &[WriteStatement]) -> Result<WriteSummary> {
        if self.cancel.is_cancelled() {
            return Err(GraphError::Cancelled);
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(statements = statements.len(), "write cancelled before commit");
                Err(GraphError::Cancelled)
            }
            result = self.store.run_write(statements) => {
                let summary = result.map_err(|e| {
                    error!("write failed: {}", e);
                    GraphError::from(e)
                })?;
                debug!(statements = summary.statements, rows = summary.rows, "write committed");
                Ok(summary)
            }
        }
    }
}

impl std::fmt::Debug for TransactionExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionExecutor")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
