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

//! Flat content articles.

use serde::{Deserialize, Serialize};

/// A published article with free-form category and tag names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Stable identifier, usually derived from the feed entry.
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Sanitised body text.
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub link: String,
    /// Publication timestamp as delivered by the feed (RFC 3339).
    #[serde(default)]
    pub published_at: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Article {
    /// Create an article with a title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Add a category name.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    /// Add a tag name.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_wire_names() {
        let article: Article = serde_json::from_str(
            r#"{"id": "a1", "title": "T", "publishedAt": "2024-01-01T00:00:00Z", "tags": ["x"]}"#,
        )
        .unwrap();
        assert_eq!(article.published_at, "2024-01-01T00:00:00Z");
        assert_eq!(article.tags, vec!["x".to_string()]);
        assert!(article.categories.is_empty());
    }
}
