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

use super::{print_json, read_document, write_output};
use crate::error::CliError;
use sdr_graph::{
    cypher::{render_read, render_upsert_script},
    usdm_registry, GraphConfig, ProjectionCompiler, SelectionNode, UpsertCompiler, Value,
};
use serde_json::json;

/// Print the read statement for a selection.
pub fn compile_read(
    root: &str,
    id: Option<&str>,
    paths: &[String],
    delimiter: char,
    as_json: bool,
) -> Result<(), CliError> {
    let registry = usdm_registry();
    if !registry.contains_type(root) {
        return Err(CliError::InvalidInput(format!(
            "unknown type '{}'; see `sdr-graph schema`",
            root
        )));
    }

    let config = GraphConfig::default().with_path_delimiter(delimiter);
    let selection = SelectionNode::from_paths(paths, delimiter);
    let compiler = ProjectionCompiler::new(registry, &config);
    let query = match id {
        Some(id) => compiler.point(root, id, &selection),
        None => compiler.collection(root, &selection),
    };
    let statement = render_read(&query, &config);

    if as_json {
        print_json(&json!({
            "query": statement.query,
            "parameters": statement.parameters,
        }))
    } else {
        write_output(&format!("{}\n", statement.format(false)), None)
    }
}

/// Print the upsert script for a document.
pub fn compile_upsert(
    file: &str,
    output: Option<&str>,
    batch_size: usize,
    constraints: bool,
    comments: bool,
) -> Result<(), CliError> {
    let mut config = GraphConfig::default().with_batch_size(batch_size);
    if !constraints {
        config = config.without_constraints();
    }
    if !comments {
        config = config.without_comments();
    }

    let registry = usdm_registry();
    let document = Value::from(read_document(file)?);
    let batch = UpsertCompiler::new(registry, &config).compile(&document)?;
    for warning in &batch.warnings {
        eprintln!("Warning: {}", warning);
    }

    let script = render_upsert_script(&batch, registry, &config);
    write_output(&format!("{}\n", script.render(config.include_comments)), output)
}
