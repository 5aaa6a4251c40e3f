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

use crate::commands;
use crate::error::CliError;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum CompileCommands {
    /// Print the read query for a selection
    ///
    /// Compiles selection paths into a single Cypher query returning the
    /// requested nested shape. With --id the query reads one node,
    /// otherwise every node of the root type ordered by id.
    CompileRead {
        /// Selection paths, e.g. `versions/studyDesigns/arms/id`
        #[arg(value_name = "PATH")]
        paths: Vec<String>,

        /// Type to start from
        #[arg(short, long, default_value = "Study")]
        root: String,

        /// Identity of the node to read
        #[arg(long)]
        id: Option<String>,

        /// Separator between field names in a path
        #[arg(short, long, default_value = "/")]
        delimiter: char,

        /// Print the query and its parameters as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the upsert script for a study document
    ///
    /// Reads a study (or a submission payload wrapping one) and prints the
    /// constraint and merge statements that converge a graph to it.
    CompileUpsert {
        /// Input JSON file
        #[arg(value_name = "FILE")]
        file: String,

        /// Output file path (defaults to stdout)
        #[arg(short, long)]
        output: Option<String>,

        /// Rows per UNWIND statement
        #[arg(long, default_value = "1000")]
        batch_size: usize,

        /// Omit uniqueness constraints
        #[arg(long)]
        no_constraints: bool,

        /// Omit statement comments
        #[arg(long)]
        no_comments: bool,
    },

    /// Describe the schema registry
    Schema {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

impl CompileCommands {
    /// Execute the compile command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            CompileCommands::CompileRead {
                paths,
                root,
                id,
                delimiter,
                json,
            } => commands::compile_read(&root, id.as_deref(), &paths, delimiter, json),
            CompileCommands::CompileUpsert {
                file,
                output,
                batch_size,
                no_constraints,
                no_comments,
            } => commands::compile_upsert(
                &file,
                output.as_deref(),
                batch_size,
                !no_constraints,
                !no_comments,
            ),
            CompileCommands::Schema { format } => commands::schema(&format),
        }
    }
}
