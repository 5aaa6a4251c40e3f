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

//! Cypher statement types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::value::Value;

/// The kind of a rendered statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementType {
    /// Uniqueness constraint creation.
    Constraint,
    /// Batched node merge.
    MergeNodes,
    /// Batched edge merge.
    MergeEdges,
    /// Reachable-subgraph delete.
    Delete,
    /// Read returning a single `result` column.
    Read,
}

/// A single Cypher statement with bound parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CypherStatement {
    /// The Cypher query text.
    pub query: String,
    /// Bound parameters, referenced as `$name` in the query.
    pub parameters: BTreeMap<String, Value>,
    /// Type of statement.
    pub statement_type: StatementType,
    /// Optional comment describing the statement.
    pub comment: Option<String>,
}

impl CypherStatement {
    /// Create a new Cypher statement.
    pub fn new(query: impl Into<String>, statement_type: StatementType) -> Self {
        Self {
            query: query.into(),
            parameters: BTreeMap::new(),
            statement_type,
            comment: None,
        }
    }

    /// Create a constraint statement.
    pub fn constraint(query: impl Into<String>) -> Self {
        Self::new(query, StatementType::Constraint)
    }

    /// Create a read statement.
    pub fn read(query: impl Into<String>) -> Self {
        Self::new(query, StatementType::Read)
    }

    /// Add a parameter to this statement.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.insert(name.into(), value.into());
        self
    }

    /// Add a comment to this statement.
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Check if this statement has parameters.
    pub fn has_parameters(&self) -> bool {
        !self.parameters.is_empty()
    }

    /// Render this statement with parameter values inlined as literals.
    ///
    /// Only whole placeholders are replaced: `$id` does not touch `$ids`.
    /// Unknown placeholders are left as written.
    ///
    /// ```
    /// # use sdr_graph::cypher::CypherStatement;
    /// let stmt = CypherStatement::read("MATCH (n0:Study {id: $id}) RETURN n0 AS result")
    ///     .with_param("id", "S'1");
    /// assert_eq!(
    ///     stmt.render_inline(),
    ///     "MATCH (n0:Study {id: 'S\\'1'}) RETURN n0 AS result"
    /// );
    /// ```
    pub fn render_inline(&self) -> String {
        let mut out = String::with_capacity(self.query.len());
        let mut rest = self.query.as_str();

        while let Some(pos) = rest.find('$') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            let end = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after.len());
            let name = &after[..end];
            match self.parameters.get(name) {
                Some(value) if !name.is_empty() => out.push_str(&value.to_cypher_literal()),
                _ => {
                    out.push('$');
                    out.push_str(name);
                }
            }
            rest = &after[end..];
        }
        out.push_str(rest);
        out
    }

    /// Format this statement for a script, optionally with its comment.
    pub fn format(&self, include_comment: bool) -> String {
        let body = format!("{};", self.render_inline());
        match (&self.comment, include_comment) {
            (Some(comment), true) => format!("// {}\n{}", comment, body),
            _ => body,
        }
    }
}

/// An ordered collection of Cypher statements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CypherScript {
    /// The statements in execution order.
    pub statements: Vec<CypherStatement>,
}

impl CypherScript {
    /// Create a new empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a statement.
    pub fn add(&mut self, statement: CypherStatement) {
        self.statements.push(statement);
    }

    /// Append several statements.
    pub fn extend(&mut self, statements: impl IntoIterator<Item = CypherStatement>) {
        self.statements.extend(statements);
    }

    /// All statements of one type.
    pub fn statements_of_type(&self, statement_type: StatementType) -> Vec<&CypherStatement> {
        self.statements
            .iter()
            .filter(|s| s.statement_type == statement_type)
            .collect()
    }

    /// Render the script as executable text.
    pub fn render(&self, include_comments: bool) -> String {
        self.statements
            .iter()
            .map(|s| s.format(include_comments))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Number of statements.
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    /// Whether the script has no statements.
    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl IntoIterator for CypherScript {
    type Item = CypherStatement;
    type IntoIter = std::vec::IntoIter<CypherStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.into_iter()
    }
}

impl<'a> IntoIterator for &'a CypherScript {
    type Item = &'a CypherStatement;
    type IntoIter = std::slice::Iter<'a, CypherStatement>;

    fn into_iter(self) -> Self::IntoIter {
        self.statements.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_inline_whole_placeholders_only() {
        let stmt = CypherStatement::read("RETURN $id, $ids, $missing")
            .with_param("id", "a")
            .with_param("ids", Value::List(vec![Value::Int(1), Value::Int(2)]));
        assert_eq!(stmt.render_inline(), "RETURN 'a', [1, 2], $missing");
    }

    #[test]
    fn test_render_inline_map_rows() {
        let mut row = std::collections::BTreeMap::new();
        row.insert("id".to_string(), Value::from("A1"));
        let stmt = CypherStatement::new("UNWIND $rows AS row RETURN row", StatementType::MergeNodes)
            .with_param("rows", Value::List(vec![Value::Map(row)]));
        assert_eq!(stmt.render_inline(), "UNWIND [{id: 'A1'}] AS row RETURN row");
    }

    #[test]
    fn test_render_inline_trailing_dollar() {
        let stmt = CypherStatement::read("RETURN $");
        assert_eq!(stmt.render_inline(), "RETURN $");
    }

    #[test]
    fn test_format_with_comment() {
        let stmt = CypherStatement::constraint("CREATE CONSTRAINT x").with_comment("Unique Study ids");
        assert_eq!(stmt.format(true), "// Unique Study ids\nCREATE CONSTRAINT x;");
        assert_eq!(stmt.format(false), "CREATE CONSTRAINT x;");
    }

    #[test]
    fn test_script_filters_by_type() {
        let mut script = CypherScript::new();
        script.add(CypherStatement::constraint("A"));
        script.add(CypherStatement::read("B"));
        script.add(CypherStatement::constraint("C"));
        assert_eq!(script.len(), 3);
        assert_eq!(script.statements_of_type(StatementType::Constraint).len(), 2);
        assert_eq!(script.render(false), "A;\n\nB;\n\nC;");
    }
}
