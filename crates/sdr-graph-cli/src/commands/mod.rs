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

//! Command implementations and shared file helpers.

mod compile;
mod load;
mod schema;
#[cfg(feature = "neo4j")]
mod store;

pub use compile::{compile_read, compile_upsert};
pub use load::load;
pub use schema::schema;
#[cfg(feature = "neo4j")]
pub use store::{delete, query, upsert};

use crate::error::CliError;
use sdr_graph::{cancel_pair, CancelSignal, GraphError, ResolverEvent};
use sdr_model::Study;
use std::fs;
use std::future::Future;
use std::io::{self, Write};
use tracing::warn;

/// Default maximum input file size: 1 GB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024 * 1024;

fn get_max_file_size() -> u64 {
    std::env::var("SDR_GRAPH_MAX_FILE_SIZE")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_MAX_FILE_SIZE)
}

/// Read a file, refusing anything over the size limit.
pub fn read_file(path: &str) -> Result<String, CliError> {
    let metadata = fs::metadata(path).map_err(|e| CliError::io_error(path, e))?;

    let max = get_max_file_size();
    if metadata.len() > max {
        return Err(CliError::FileTooLarge {
            path: path.into(),
            actual: metadata.len(),
            max,
        });
    }

    fs::read_to_string(path).map_err(|e| CliError::io_error(path, e))
}

/// Read a study document as raw JSON.
///
/// A submission payload (`{"study": {...}, "usdmVersion": ...}`) is
/// unwrapped to the study it carries.
pub fn read_document(path: &str) -> Result<serde_json::Value, CliError> {
    let json: serde_json::Value =
        serde_json::from_str(&read_file(path)?).map_err(|e| CliError::document(path, e))?;
    let serde_json::Value::Object(mut map) = json else {
        return Err(CliError::document(path, "expected a JSON object"));
    };
    if !map.contains_key("id") {
        if let Some(study) = map.remove("study") {
            return Ok(study);
        }
    }
    Ok(serde_json::Value::Object(map))
}

/// Read a typed study document.
pub fn read_study(path: &str) -> Result<Study, CliError> {
    serde_json::from_value(read_document(path)?).map_err(|e| CliError::document(path, e))
}

/// Write to a file, or stdout when no path is given.
pub fn write_output(content: &str, path: Option<&str>) -> Result<(), CliError> {
    match path {
        Some(p) => fs::write(p, content).map_err(|e| CliError::io_error(p, e)),
        None => io::stdout()
            .write_all(content.as_bytes())
            .map_err(|e| CliError::io_error("<stdout>", e)),
    }
}

/// Pretty-print a JSON value to stdout.
pub fn print_json(value: &serde_json::Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).map_err(GraphError::from)?;
    write_output(&format!("{}\n", text), None)
}

/// The read event a query command sends to the resolver.
pub(crate) fn read_event(paths: &[String], id: Option<&str>, stats: bool) -> ResolverEvent {
    if stats {
        return ResolverEvent::new("Query", "graphStats");
    }
    let event = match id {
        Some(id) => ResolverEvent::new("Query", "study").with_argument("id", id),
        None => ResolverEvent::new("Query", "studies"),
    };
    event.with_selection(paths)
}

/// Run an async task on a fresh runtime; Ctrl-C cancels it.
pub(crate) fn run_cancellable<F, Fut, T>(task: F) -> Result<T, CliError>
where
    F: FnOnce(CancelSignal) -> Fut,
    Fut: Future<Output = Result<T, CliError>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Runtime(e.to_string()))?;

    runtime.block_on(async {
        let (handle, signal) = cancel_pair();
        let interrupt = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling");
                handle.cancel();
            }
        });
        let result = task(signal).await;
        interrupt.abort();
        result
    })
}
