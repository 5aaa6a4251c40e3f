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

//! Configuration types for graph mapping and store connections.

use serde::{Deserialize, Serialize};

/// Default maximum string length for property values: 100 MB.
///
/// Protocol narrative sections can be long, so the default is generous.
/// Use `GraphConfig::for_untrusted_input()` for a 1MB limit.
pub const DEFAULT_MAX_STRING_LENGTH: usize = 100 * 1024 * 1024; // 100 MB

/// Default Bolt port used by Neptune openCypher endpoints.
pub const NEPTUNE_BOLT_PORT: u16 = 8182;

/// Configuration for the projection and upsert compilers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Property holding the natural key of every node (default: "id").
    pub id_property: String,

    /// Separator between field names in selection paths (default: '/').
    pub path_delimiter: char,

    /// Rows per UNWIND statement when rendering writes (default: 1000).
    pub batch_size: usize,

    /// Maximum string length for property values (default: 100MB, None = unlimited).
    pub max_string_length: Option<usize>,

    /// Generate comments in rendered scripts (default: true).
    pub include_comments: bool,

    /// Generate uniqueness constraints for node ids in scripts (default: true).
    pub create_constraints: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            id_property: "id".to_string(),
            path_delimiter: '/',
            batch_size: 1000,
            max_string_length: Some(DEFAULT_MAX_STRING_LENGTH),
            include_comments: true,
            create_constraints: true,
        }
    }
}

/// Builder for GraphConfig.
///
/// # Examples
///
/// ```
/// # use sdr_graph::GraphConfig;
/// let config = GraphConfig::builder()
///     .path_delimiter('.')
///     .batch_size(500)
///     .build();
/// assert_eq!(config.path_delimiter, '.');
/// ```
#[derive(Default)]
pub struct GraphConfigBuilder {
    id_property: Option<String>,
    path_delimiter: Option<char>,
    batch_size: Option<usize>,
    max_string_length: Option<Option<usize>>,
    include_comments: Option<bool>,
    create_constraints: Option<bool>,
}

impl GraphConfigBuilder {
    /// Create a new builder with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the natural key property name.
    pub fn id_property(mut self, name: impl Into<String>) -> Self {
        self.id_property = Some(name.into());
        self
    }

    /// Set the selection path delimiter.
    pub fn path_delimiter(mut self, delimiter: char) -> Self {
        self.path_delimiter = Some(delimiter);
        self
    }

    /// Set the batch size for UNWIND statements.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Set maximum string length for property values.
    pub fn max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = Some(Some(max));
        self
    }

    /// Remove string length limit.
    pub fn no_string_length_limit(mut self) -> Self {
        self.max_string_length = Some(None);
        self
    }

    /// Set whether to generate comments in output.
    pub fn include_comments(mut self, include: bool) -> Self {
        self.include_comments = Some(include);
        self
    }

    /// Set whether to generate uniqueness constraints.
    pub fn create_constraints(mut self, create: bool) -> Self {
        self.create_constraints = Some(create);
        self
    }

    /// Build the GraphConfig instance.
    ///
    /// All unset fields will use their default values.
    pub fn build(self) -> GraphConfig {
        let defaults = GraphConfig::default();
        GraphConfig {
            id_property: self.id_property.unwrap_or(defaults.id_property),
            path_delimiter: self.path_delimiter.unwrap_or(defaults.path_delimiter),
            batch_size: self.batch_size.unwrap_or(defaults.batch_size),
            max_string_length: self.max_string_length.unwrap_or(defaults.max_string_length),
            include_comments: self.include_comments.unwrap_or(defaults.include_comments),
            create_constraints: self.create_constraints.unwrap_or(defaults.create_constraints),
        }
    }
}

impl GraphConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for GraphConfig.
    pub fn builder() -> GraphConfigBuilder {
        GraphConfigBuilder::default()
    }

    /// Set the natural key property name.
    pub fn with_id_property(mut self, name: impl Into<String>) -> Self {
        self.id_property = name.into();
        self
    }

    /// Set the selection path delimiter.
    pub fn with_path_delimiter(mut self, delimiter: char) -> Self {
        self.path_delimiter = delimiter;
        self
    }

    /// Set the batch size for UNWIND statements.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set maximum string length for property values.
    pub fn with_max_string_length(mut self, max: usize) -> Self {
        self.max_string_length = Some(max);
        self
    }

    /// Remove string length limit.
    pub fn without_string_length_limit(mut self) -> Self {
        self.max_string_length = None;
        self
    }

    /// Disable comments in output.
    pub fn without_comments(mut self) -> Self {
        self.include_comments = false;
        self
    }

    /// Disable constraint generation.
    pub fn without_constraints(mut self) -> Self {
        self.create_constraints = false;
        self
    }

    /// Create a configuration suitable for untrusted input.
    ///
    /// - 1MB max string length (vs 100MB default)
    /// - No comments
    /// - Batch size: 100
    pub fn for_untrusted_input() -> Self {
        Self {
            max_string_length: Some(1024 * 1024),
            include_comments: false,
            batch_size: 100,
            ..Self::default()
        }
    }

    /// Batch size used for chunking; never zero.
    pub(crate) fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// Connection settings for a Bolt graph store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Bolt URI, e.g. `bolt://localhost:7687`.
    pub uri: String,
    /// User name; `None` connects without authentication.
    pub user: Option<String>,
    /// Password for `user`.
    pub password: Option<String>,
    /// Database name; `None` uses the server default.
    pub database: Option<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            uri: "bolt://localhost:7687".to_string(),
            user: Some("neo4j".to_string()),
            password: None,
            database: None,
        }
    }
}

impl StoreConfig {
    /// Create a configuration for a URI without credentials.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            user: None,
            password: None,
            database: None,
        }
    }

    /// Set user and password.
    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self.password = Some(password.into());
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Configuration for a Neptune cluster endpoint (IAM auth is not used).
    pub fn neptune(endpoint: &str) -> Self {
        Self::new(format!("bolt+s://{}:{}", endpoint, NEPTUNE_BOLT_PORT))
    }

    /// Read settings from the process environment.
    ///
    /// `NEPTUNE_ENDPOINT` takes precedence; otherwise `NEO4J_URI`,
    /// `NEO4J_USER`, `NEO4J_PASSWORD` and `NEO4J_DATABASE` are used, with
    /// the defaults of [`StoreConfig::default`] for unset values.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = non_empty("NEPTUNE_ENDPOINT") {
            return Self::neptune(endpoint.trim());
        }

        let defaults = Self::default();
        Self {
            uri: non_empty("NEO4J_URI").unwrap_or(defaults.uri),
            user: non_empty("NEO4J_USER").or(defaults.user),
            password: non_empty("NEO4J_PASSWORD").or(defaults.password),
            database: non_empty("NEO4J_DATABASE"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GraphConfig::default();
        assert_eq!(config.id_property, "id");
        assert_eq!(config.path_delimiter, '/');
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.max_string_length, Some(DEFAULT_MAX_STRING_LENGTH));
    }

    #[test]
    fn test_builder_keeps_defaults_for_unset() {
        let config = GraphConfig::builder().no_string_length_limit().build();
        assert_eq!(config.max_string_length, None);
        assert_eq!(config.batch_size, 1000);
        assert!(config.create_constraints);
    }

    #[test]
    fn test_untrusted_preset() {
        let config = GraphConfig::for_untrusted_input();
        assert_eq!(config.max_string_length, Some(1024 * 1024));
        assert!(!config.include_comments);
        assert_eq!(config.batch_size, 100);
    }

    #[test]
    fn test_zero_batch_size_is_clamped() {
        assert_eq!(GraphConfig::new().with_batch_size(0).effective_batch_size(), 1);
    }

    #[test]
    fn test_store_config_neptune_precedence() {
        let env: HashMap<&str, &str> = [
            ("NEPTUNE_ENDPOINT", "db.cluster.example.com"),
            ("NEO4J_URI", "bolt://ignored:7687"),
        ]
        .into_iter()
        .collect();
        let config = StoreConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.uri, "bolt+s://db.cluster.example.com:8182");
        assert_eq!(config.user, None);
    }

    #[test]
    fn test_store_config_neo4j_env() {
        let env: HashMap<&str, &str> = [
            ("NEO4J_URI", "bolt://graph:7687"),
            ("NEO4J_PASSWORD", "secret"),
            ("NEO4J_DATABASE", "sdr"),
        ]
        .into_iter()
        .collect();
        let config = StoreConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.uri, "bolt://graph:7687");
        assert_eq!(config.user.as_deref(), Some("neo4j"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.database.as_deref(), Some("sdr"));
    }

    #[test]
    fn test_store_config_empty_env_uses_defaults() {
        let config = StoreConfig::from_lookup(|_| None);
        assert_eq!(config, StoreConfig::default());
    }
}
