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

//! The study root aggregate.

use serde::{Deserialize, Serialize};

use crate::version::StudyVersion;

/// A clinical study, the root of every submitted document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Study {
    /// Stable identifier; the natural key of the `Study` node.
    #[serde(default)]
    pub id: String,
    /// Study name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Short display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// USDM instance type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Protocol versions of this study.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub versions: Option<Vec<StudyVersion>>,
    /// Documents that define this study.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documented_by: Option<Vec<StudyDefinitionDocument>>,
}

impl Study {
    /// Create a study with only its identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the study name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Append a version, creating the collection if needed.
    pub fn with_version(mut self, version: StudyVersion) -> Self {
        self.versions.get_or_insert_with(Vec::new).push(version);
        self
    }

    /// Append a defining document.
    pub fn with_document(mut self, document: StudyDefinitionDocument) -> Self {
        self.documented_by.get_or_insert_with(Vec::new).push(document);
        self
    }

    /// Total number of entities (including the study itself) in this tree.
    ///
    /// Coded values and quantities count as entities since each becomes
    /// its own node.
    pub fn entity_count(&self) -> usize {
        serde_json::to_value(self)
            .map(|value| count_entities(&value))
            .unwrap_or(0)
    }
}

fn count_entities(value: &serde_json::Value) -> usize {
    match value {
        serde_json::Value::Object(map) => {
            let own = usize::from(map.contains_key("id"));
            own + map.values().map(count_entities).sum::<usize>()
        }
        serde_json::Value::Array(items) => items.iter().map(count_entities).sum(),
        _ => 0,
    }
}

/// A document (protocol, SAP, ...) that defines a study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDefinitionDocument {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Document name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Short display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Free text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Authoring template name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_name: Option<String>,
    /// Identifiers of child narrative items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_ids: Option<Vec<String>>,
    /// Document language, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<serde_json::Value>,
    /// USDM instance type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

impl StudyDefinitionDocument {
    /// Create a document with a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }
}
