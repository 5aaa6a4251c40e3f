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

//! Selection trees built from flat field paths.

use std::collections::BTreeMap;

use crate::value::Value;

/// One requested field: either a scalar or a nested selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Requested without children.
    Leaf,
    /// Requested with children.
    Node(SelectionNode),
}

/// The set of fields requested on one type.
///
/// Field order is irrelevant and duplicates collapse, so two trees built
/// from the same paths in any order compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionNode {
    fields: BTreeMap<String, Selection>,
}

impl SelectionNode {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from delimited paths such as `"versions/studyDesigns/arms"`.
    ///
    /// Empty segments are ignored, so `"a//b"` equals `"a/b"` and `""`
    /// contributes nothing.
    ///
    /// ```
    /// # use sdr_graph::selection::SelectionNode;
    /// let tree = SelectionNode::from_paths(["id", "versions/id", "versions"], '/');
    /// assert_eq!(tree.paths('/'), vec!["id", "versions/id"]);
    /// ```
    pub fn from_paths<I, S>(paths: I, delimiter: char) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root = Self::new();
        for path in paths {
            root.insert_path(path.as_ref().split(delimiter));
        }
        root
    }

    /// Add one path given as a sequence of segments.
    ///
    /// A field requested both as a scalar and with children keeps its
    /// children.
    pub fn insert_path<'a, I>(&mut self, segments: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        let segments: Vec<&str> = segments.into_iter().filter(|s| !s.is_empty()).collect();
        self.insert_segments(&segments);
    }

    fn insert_segments(&mut self, segments: &[&str]) {
        match segments {
            [] => {}
            [last] => {
                self.fields
                    .entry((*last).to_string())
                    .or_insert(Selection::Leaf);
            }
            [first, rest @ ..] => {
                let entry = self
                    .fields
                    .entry((*first).to_string())
                    .or_insert(Selection::Leaf);
                if matches!(entry, Selection::Leaf) {
                    *entry = Selection::Node(SelectionNode::new());
                }
                if let Selection::Node(child) = entry {
                    child.insert_segments(rest);
                }
            }
        }
    }

    /// Merge another selection into this one.
    pub fn merge(&mut self, other: SelectionNode) {
        for (field, selection) in other.fields {
            match self.fields.get_mut(&field) {
                Some(Selection::Node(mine)) => {
                    if let Selection::Node(theirs) = selection {
                        mine.merge(theirs);
                    }
                }
                _ => {
                    self.fields.insert(field, selection);
                }
            }
        }
    }

    /// The selection requesting exactly the shape of `value`.
    ///
    /// Objects and lists of objects become nested selections (the union
    /// over all list elements); everything else is a leaf.
    pub fn covering(value: &Value) -> Self {
        let mut node = Self::new();
        if let Value::Map(map) = value {
            for (field, child) in map {
                node.fields.insert(field.clone(), Self::covering_field(child));
            }
        }
        node
    }

    fn covering_field(value: &Value) -> Selection {
        match value {
            Value::Map(_) => Selection::Node(Self::covering(value)),
            Value::List(items) if items.iter().any(|v| matches!(v, Value::Map(_))) => {
                let mut union = Self::new();
                for item in items {
                    union.merge(Self::covering(item));
                }
                Selection::Node(union)
            }
            _ => Selection::Leaf,
        }
    }

    /// Look up a field.
    pub fn get(&self, field: &str) -> Option<&Selection> {
        self.fields.get(field)
    }

    /// Iterate over requested fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Selection)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields requested at this level.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether nothing is requested at this level.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Flatten back to sorted leaf paths.
    ///
    /// A nested selection with no fields is reported as a leaf path.
    pub fn paths(&self, delimiter: char) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_paths(String::new(), delimiter, &mut out);
        out
    }

    fn collect_paths(&self, prefix: String, delimiter: char, out: &mut Vec<String>) {
        for (field, selection) in &self.fields {
            let path = if prefix.is_empty() {
                field.clone()
            } else {
                format!("{}{}{}", prefix, delimiter, field)
            };
            match selection {
                Selection::Node(child) if !child.is_empty() => {
                    child.collect_paths(path, delimiter, out)
                }
                _ => out.push(path),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(paths: &[&str]) -> SelectionNode {
        SelectionNode::from_paths(paths.iter().copied(), '/')
    }

    #[test]
    fn test_nested_paths() {
        let t = tree(&["id", "name", "versions/studyDesigns/arms"]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get("id"), Some(&Selection::Leaf));
        let Some(Selection::Node(versions)) = t.get("versions") else {
            panic!("versions should be nested");
        };
        let Some(Selection::Node(designs)) = versions.get("studyDesigns") else {
            panic!("studyDesigns should be nested");
        };
        assert_eq!(designs.get("arms"), Some(&Selection::Leaf));
    }

    #[test]
    fn test_subtree_wins_regardless_of_order() {
        let a = tree(&["versions", "versions/id"]);
        let b = tree(&["versions/id", "versions"]);
        assert_eq!(a, b);
        assert!(matches!(a.get("versions"), Some(Selection::Node(_))));
    }

    #[test]
    fn test_duplicates_collapse() {
        assert_eq!(tree(&["id", "id", "name"]), tree(&["name", "id"]));
    }

    #[test]
    fn test_empty_input() {
        assert!(tree(&[]).is_empty());
        assert!(tree(&["", "/"]).is_empty());
    }

    #[test]
    fn test_empty_segments_ignored() {
        assert_eq!(tree(&["versions//id/"]), tree(&["versions/id"]));
    }

    #[test]
    fn test_custom_delimiter() {
        let t = SelectionNode::from_paths(["versions.id"], '.');
        assert_eq!(t.paths('/'), vec!["versions/id"]);
    }

    #[test]
    fn test_covering_unions_list_elements() {
        let doc = Value::from(serde_json::json!({
            "id": "S1",
            "versions": [{"id": "V1"}, {"id": "V2", "rationale": "r"}],
            "tags": ["a"]
        }));
        let t = SelectionNode::covering(&doc);
        assert_eq!(
            t.paths('/'),
            vec!["id", "tags", "versions/id", "versions/rationale"]
        );
    }

    #[test]
    fn test_merge_keeps_subtree() {
        let mut a = tree(&["versions/id"]);
        a.merge(tree(&["versions", "name"]));
        assert_eq!(a.paths('/'), vec!["name", "versions/id"]);
    }
}
