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
use clap::{Args, Subcommand};
use sdr_graph::StoreConfig;

/// Where the Bolt endpoint lives.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// Bolt URI
    #[arg(long, env = "NEO4J_URI", default_value = "bolt://localhost:7687")]
    pub uri: String,

    /// User name
    #[arg(long, env = "NEO4J_USER")]
    pub user: Option<String>,

    /// Password
    #[arg(long, env = "NEO4J_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Database name
    #[arg(long, env = "NEO4J_DATABASE")]
    pub database: Option<String>,

    /// Neptune cluster endpoint; replaces --uri and credentials
    #[arg(long, env = "NEPTUNE_ENDPOINT")]
    pub neptune: Option<String>,
}

impl ConnectionArgs {
    /// The store configuration these arguments describe.
    pub fn store_config(&self) -> StoreConfig {
        if let Some(endpoint) = self.neptune.as_deref().filter(|e| !e.is_empty()) {
            return StoreConfig::neptune(endpoint);
        }
        let mut config = StoreConfig::new(self.uri.clone());
        config.user = self.user.clone();
        config.password = self.password.clone();
        config.database = self.database.clone();
        config
    }
}

#[derive(Subcommand)]
pub enum StoreCommands {
    /// Upsert study documents into a live graph
    Upsert {
        /// Study documents or submission payloads
        #[arg(value_name = "FILE", required = true)]
        files: Vec<String>,

        /// Create identity constraints first
        #[arg(long)]
        constraints: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Read from a live graph
    Query {
        /// Selection paths
        #[arg(value_name = "PATH")]
        paths: Vec<String>,

        /// Identity of the study to read
        #[arg(long)]
        id: Option<String>,

        /// Print node counts per label instead
        #[arg(long, conflicts_with_all = ["paths", "id"])]
        stats: bool,

        #[command(flatten)]
        connection: ConnectionArgs,
    },

    /// Delete a study and everything reachable from it
    Delete {
        /// Identity of the study
        #[arg(long)]
        id: String,

        #[command(flatten)]
        connection: ConnectionArgs,
    },
}

impl StoreCommands {
    /// Execute the store command.
    pub fn execute(self) -> Result<(), CliError> {
        match self {
            StoreCommands::Upsert {
                files,
                constraints,
                connection,
            } => commands::upsert(&connection.store_config(), &files, constraints),
            StoreCommands::Query {
                paths,
                id,
                stats,
                connection,
            } => commands::query(&connection.store_config(), &paths, id.as_deref(), stats),
            StoreCommands::Delete { id, connection } => {
                commands::delete(&connection.store_config(), &id)
            }
        }
    }
}
