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

//! Error and warning types for graph mapping operations.

use std::fmt;

use thiserror::Error;

/// Error type for mapping and executing graph operations.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A read or delete request lacks its identity argument.
    #[error("{operation}: an id is required")]
    MissingRequiredIdentity {
        /// The operation that was requested.
        operation: String,
    },

    /// The submitted document does not have the expected shape.
    #[error("invalid document: {0}")]
    InvalidDocument(String),

    /// String length limit exceeded.
    #[error("String length {length} exceeds maximum allowed length {max_length} for property '{property}'")]
    StringLengthExceeded {
        /// Actual length of the string.
        length: usize,
        /// Maximum allowed length.
        max_length: usize,
        /// Property name where the violation occurred.
        property: String,
    },

    /// Invalid Cypher identifier.
    #[error("invalid Cypher identifier: '{0}'")]
    InvalidIdentifier(String),

    /// The graph store failed to run a transaction.
    #[error("store failure: {0}")]
    Store(#[from] StoreError),

    /// A normalized result could not be decoded into the expected type.
    #[error("failed to decode result: {0}")]
    Decode(String),

    /// Serialization error from serde_json.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The caller cancelled the request before the store finished.
    #[error("request cancelled")]
    Cancelled,

    /// No handler is registered for the requested operation.
    #[error("unknown operation {parent_type}.{field}")]
    UnknownOperation {
        /// Parent type name (`Query`, `Mutation`).
        parent_type: String,
        /// Field name.
        field: String,
    },
}

impl GraphError {
    /// Create a missing identity error for an operation.
    pub fn missing_identity(operation: impl Into<String>) -> Self {
        Self::MissingRequiredIdentity {
            operation: operation.into(),
        }
    }

    /// Whether the failure originated in the store.
    pub fn is_store_failure(&self) -> bool {
        matches!(self, GraphError::Store(_))
    }
}

/// Failures reported by a [`GraphStore`](crate::store::GraphStore).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Connecting to the store failed.
    #[error("connection error: {0}")]
    Connection(String),

    /// A statement failed to execute.
    #[error("execution error: {0}")]
    Execution(String),

    /// Opening, committing or rolling back a transaction failed.
    #[error("transaction error: {0}")]
    Transaction(String),

    /// A record returned by the store could not be read.
    #[error("record decode error: {0}")]
    Decode(String),
}

/// Result type alias for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;

/// A condition the compilers recovered from locally.
///
/// Warnings never fail a request. They are returned next to the compiled
/// statements and logged at the point they are detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileWarning {
    /// A field with no schema entry holding nested structure was dropped.
    UnknownField {
        /// Type the field was found on.
        type_name: String,
        /// Field name.
        field: String,
    },
    /// A nested child had no usable id and was skipped with its subtree.
    MissingChildIdentity {
        /// Parent type.
        type_name: String,
        /// Relationship field holding the child.
        field: String,
    },
    /// A relationship field held something other than an object or a list of objects.
    UnexpectedShape {
        /// Parent type.
        type_name: String,
        /// Relationship field.
        field: String,
    },
    /// A cross reference names an id that is not part of the batch.
    ///
    /// The edge statement is still emitted; the store omits it if the
    /// target does not exist there either.
    UnresolvedReference {
        /// Type holding the reference.
        type_name: String,
        /// Reference field.
        field: String,
        /// Referenced id.
        target_id: String,
    },
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileWarning::UnknownField { type_name, field } => {
                write!(f, "unknown field {}.{} dropped", type_name, field)
            }
            CompileWarning::MissingChildIdentity { type_name, field } => {
                write!(f, "child of {}.{} has no id, skipped", type_name, field)
            }
            CompileWarning::UnexpectedShape { type_name, field } => {
                write!(f, "{}.{} is not an object or list of objects", type_name, field)
            }
            CompileWarning::UnresolvedReference {
                type_name,
                field,
                target_id,
            } => write!(
                f,
                "{}.{} references '{}' which is not in this batch",
                type_name, field, target_id
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_missing_identity() {
        let err = GraphError::missing_identity("study");
        assert_eq!(err.to_string(), "study: an id is required");
    }

    #[test]
    fn test_error_display_unknown_operation() {
        let err = GraphError::UnknownOperation {
            parent_type: "Query".to_string(),
            field: "trials".to_string(),
        };
        assert_eq!(err.to_string(), "unknown operation Query.trials");
    }

    #[test]
    fn test_store_error_converts() {
        let err: GraphError = StoreError::Execution("syntax error".to_string()).into();
        assert!(err.is_store_failure());
        assert!(err.to_string().contains("syntax error"));
    }

    #[test]
    fn test_error_from_json_error() {
        let json_err: serde_json::Error = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: GraphError = json_err.into();
        assert!(matches!(err, GraphError::Json(_)));
    }

    #[test]
    fn test_warning_display() {
        let warning = CompileWarning::UnresolvedReference {
            type_name: "Epoch".to_string(),
            field: "previousId".to_string(),
            target_id: "E0".to_string(),
        };
        assert!(warning.to_string().contains("E0"));
    }
}
