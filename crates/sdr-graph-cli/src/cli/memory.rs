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
pub enum MemoryCommands {
    /// Load documents into an in-memory graph and query them back
    ///
    /// Upserts every file in order, then answers one selection over the
    /// result: a single study with --id, every study otherwise, or the
    /// per-label node counts with --stats.
    Load {
        /// Study documents or submission payloads
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Selection paths to read back
        #[arg(short = 'q', long = "query", value_name = "PATH")]
        paths: Vec<String>,

        /// Identity of the study to read
        #[arg(long)]
        id: Option<String>,

        /// Print node counts per label instead
        #[arg(long, conflicts_with_all = ["paths", "id"])]
        stats: bool,
    },
}

impl MemoryCommands {
    /// Execute the in-memory command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            MemoryCommands::Load {
                files,
                paths,
                id,
                stats,
            } => commands::load(&files, &paths, id.as_deref(), stats),
        }
    }
}
