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

//! Cypher escaping and identifier validation.
//!
//! Labels, edge labels and map keys come from the schema registry and from
//! client-supplied selection paths, so every name spliced into query text
//! goes through these functions. Values never are: they travel as
//! parameters, and only [`quote_string`] renders them for printable scripts.

use std::borrow::Cow;
use unicode_normalization::UnicodeNormalization;

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};

/// Validate string length against the configured limit.
///
/// ```
/// # use sdr_graph::cypher::validate_string_length;
/// # use sdr_graph::GraphConfig;
/// let config = GraphConfig::default().with_max_string_length(8);
/// assert!(validate_string_length("short", "name", &config).is_ok());
/// assert!(validate_string_length("far too long", "name", &config).is_err());
/// ```
pub fn validate_string_length(s: &str, property: &str, config: &GraphConfig) -> Result<()> {
    if let Some(max_length) = config.max_string_length {
        let length = s.len();
        if length > max_length {
            return Err(GraphError::StringLengthExceeded {
                length,
                max_length,
                property: property.to_string(),
            });
        }
    }
    Ok(())
}

#[inline]
fn needs_escaping(s: &str) -> bool {
    s.chars()
        .any(|ch| matches!(ch, '\\' | '\'' | '"' | '\n' | '\r' | '\t' | '\x00'))
}

/// Escape a string value for a single-quoted Cypher literal.
///
/// Clean strings are returned borrowed.
pub fn escape_string(s: &str) -> Cow<'_, str> {
    if !needs_escaping(s) {
        return Cow::Borrowed(s);
    }

    let mut escaped = String::with_capacity(s.len() + 10);
    for c in s.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\x00' => escaped.push_str("\\u0000"),
            _ => escaped.push(c),
        }
    }
    Cow::Owned(escaped)
}

/// Quote a string value for Cypher with single quotes.
pub fn quote_string(s: &str) -> String {
    format!("'{}'", escape_string(s))
}

/// Check if a string is a plain Cypher identifier (ASCII letter or `_`,
/// then letters, digits or `_`).
pub fn is_valid_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Validate and return a Cypher identifier, or error if invalid.
pub fn validate_identifier(s: &str) -> Result<&str> {
    if is_valid_identifier(s) {
        Ok(s)
    } else {
        Err(GraphError::InvalidIdentifier(s.to_string()))
    }
}

/// Normalize a string to NFC form.
pub fn normalize_unicode(s: &str) -> String {
    s.nfc().collect()
}

/// Control, zero-width and bidirectional formatting characters.
fn is_dangerous_unicode(c: char) -> bool {
    c.is_control()
        || matches!(
            c,
            '\u{200B}'
                | '\u{200C}'
                | '\u{200D}'
                | '\u{FEFF}'
                | '\u{202A}'..='\u{202E}'
                | '\u{2066}'..='\u{2069}'
                | '\u{00AD}'
                | '\u{061C}'
                | '\u{180E}'
        )
}

/// NFC-normalize, strip dangerous code points and backtick-quote if needed.
fn sanitize_name(s: &str) -> String {
    let sanitized: String = normalize_unicode(s)
        .chars()
        .filter(|c| !is_dangerous_unicode(*c))
        .collect();

    if is_valid_identifier(&sanitized) && !is_cypher_keyword(&sanitized) {
        sanitized
    } else {
        format!("`{}`", sanitized.replace('`', "``"))
    }
}

/// Escape a property name, map key or variable.
///
/// ```
/// # use sdr_graph::cypher::escape_identifier;
/// assert_eq!(escape_identifier("studyDesigns"), "studyDesigns");
/// assert_eq!(escape_identifier("type"), "type");
/// assert_eq!(escape_identifier("order"), "`order`");
/// ```
pub fn escape_identifier(s: &str) -> String {
    sanitize_name(s)
}

/// Escape a node label, including the leading `:`.
///
/// ```
/// # use sdr_graph::cypher::escape_label;
/// assert_eq!(escape_label("StudyVersion"), ":StudyVersion");
/// assert_eq!(escape_label("Study Version"), ":`Study Version`");
/// ```
pub fn escape_label(s: &str) -> String {
    format!(":{}", sanitize_name(s))
}

/// Escape an edge label, including the leading `:`.
pub fn escape_relationship_type(s: &str) -> String {
    format!(":{}", sanitize_name(s))
}

/// Convert a string to a plain identifier by replacing invalid characters.
///
/// Used for constraint names.
pub fn to_identifier(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 1);
    for (i, c) in s.chars().enumerate() {
        if i == 0 && c.is_ascii_digit() {
            result.push('_');
        }
        if c.is_ascii_alphanumeric() || c == '_' {
            result.push(c);
        } else {
            result.push('_');
        }
    }
    if result.is_empty() {
        result.push('_');
    }
    result
}

fn is_cypher_keyword(s: &str) -> bool {
    matches!(
        s.to_uppercase().as_str(),
        "ALL"
            | "AND"
            | "ANY"
            | "AS"
            | "ASC"
            | "ASCENDING"
            | "BY"
            | "CALL"
            | "CASE"
            | "CONTAINS"
            | "COUNT"
            | "CREATE"
            | "DELETE"
            | "DESC"
            | "DESCENDING"
            | "DETACH"
            | "DISTINCT"
            | "DO"
            | "DROP"
            | "ELSE"
            | "END"
            | "ENDS"
            | "EXISTS"
            | "FALSE"
            | "FILTER"
            | "FOREACH"
            | "IN"
            | "IS"
            | "LIMIT"
            | "MANDATORY"
            | "MATCH"
            | "MERGE"
            | "NODE"
            | "NONE"
            | "NOT"
            | "NULL"
            | "OF"
            | "ON"
            | "OPTIONAL"
            | "OR"
            | "ORDER"
            | "REDUCE"
            | "RELATIONSHIP"
            | "REMOVE"
            | "RETURN"
            | "SET"
            | "SINGLE"
            | "SKIP"
            | "SOME"
            | "STARTS"
            | "THEN"
            | "TRUE"
            | "UNION"
            | "UNIQUE"
            | "UNWIND"
            | "USING"
            | "WHEN"
            | "WHERE"
            | "WITH"
            | "XOR"
            | "YIELD"
    )
}
