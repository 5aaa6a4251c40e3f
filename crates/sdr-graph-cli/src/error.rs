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

//! Error types for the command-line interface.

use sdr_graph::GraphError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Everything a command can fail with.
#[derive(Error, Debug)]
pub enum CliError {
    /// I/O operation failed (file read, write, or metadata access).
    #[error("I/O error for '{path}': {message}")]
    Io {
        /// The file path that caused the error
        path: PathBuf,
        /// The error message
        message: String,
    },

    /// File size exceeds the configured limit.
    #[error("File '{path}' is too large ({actual} bytes). Maximum allowed: {max} bytes")]
    FileTooLarge {
        /// The file path that exceeded the limit
        path: PathBuf,
        /// The actual file size in bytes
        actual: u64,
        /// The maximum allowed file size in bytes
        max: u64,
    },

    /// Input file is not valid JSON or not a study document.
    #[error("Invalid document '{path}': {message}")]
    Document {
        /// The file path
        path: PathBuf,
        /// The parser message
        message: String,
    },

    /// Compilation, store or resolver failure.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// The async runtime could not be started.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Invalid input provided by the user.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl CliError {
    /// Create an I/O error with file path context.
    pub fn io_error(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: source.to_string(),
        }
    }

    /// Create a document error with file path context.
    pub fn document(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Document {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = CliError::io_error(
            "study.json",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(err.to_string(), "I/O error for 'study.json': not found");
    }

    #[test]
    fn test_graph_error_is_transparent() {
        let err: CliError = GraphError::missing_identity("study").into();
        assert_eq!(err.to_string(), "study: an id is required");
    }

    #[test]
    fn test_file_too_large_display() {
        let err = CliError::FileTooLarge {
            path: PathBuf::from("big.json"),
            actual: 2048,
            max: 1024,
        };
        assert!(err.to_string().contains("2048 bytes"));
    }
}
