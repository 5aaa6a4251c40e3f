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

//! Command-line argument definitions.

mod compile;
mod memory;
#[cfg(feature = "neo4j")]
mod store;

use clap::Subcommand;

pub use compile::CompileCommands;
pub use memory::MemoryCommands;
#[cfg(feature = "neo4j")]
pub use store::{ConnectionArgs, StoreCommands};

#[derive(Subcommand)]
pub enum Commands {
    // Offline compilation - flattened to appear at top level
    #[command(flatten)]
    Compile(CompileCommands),

    // In-memory round trips - flattened to appear at top level
    #[command(flatten)]
    Memory(MemoryCommands),

    // Live Bolt endpoint - flattened to appear at top level
    #[cfg(feature = "neo4j")]
    #[command(flatten)]
    Store(StoreCommands),
}

impl Commands {
    /// Execute the command with the provided arguments.
    ///
    /// # Errors
    ///
    /// Returns `Err` with a printable message if reading input, compiling,
    /// or talking to the store fails.
    pub fn execute(self) -> Result<(), String> {
        let result = match self {
            Commands::Compile(cmd) => cmd.execute(),
            Commands::Memory(cmd) => cmd.execute(),
            #[cfg(feature = "neo4j")]
            Commands::Store(cmd) => cmd.execute(),
        };
        result.map_err(|e| e.to_string())
    }
}
