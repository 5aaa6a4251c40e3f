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

//! Shared test fixtures for the study graph mapping crates.
//!
//! Provides canonical study documents, selection sets, article batches
//! and queue message bodies so that unit, integration and CLI tests all
//! exercise the same data.
//!
//! # Quick Start
//!
//! ```rust
//! use sdr_graph_test::{fixtures, selections};
//!
//! let study = fixtures::scenario_a();
//! assert_eq!(study.id, "S1");
//!
//! for (name, build) in fixtures::all() {
//!     assert!(!build().id.is_empty(), "{} has no id", name);
//! }
//!
//! assert!(selections::SCENARIO_A.contains(&"versions/studyDesigns/arms"));
//! ```

use sdr_model::Study;

pub mod fixtures;
pub mod selections;

/// Named study fixture generators.
pub type FixtureList = Vec<(&'static str, fn() -> Study)>;

/// Serialize a fixture the way it travels on the wire.
pub fn to_json(study: &Study) -> serde_json::Value {
    serde_json::to_value(study).unwrap_or(serde_json::Value::Null)
}

/// Every study fixture as a pretty-printed JSON file body.
pub fn fixtures_as_json() -> Vec<(&'static str, String)> {
    fixtures::all()
        .into_iter()
        .map(|(name, build)| {
            let body = serde_json::to_string_pretty(&build()).unwrap_or_default();
            (name, body)
        })
        .collect()
}

/// Sort every list of objects by its `id` member, recursively.
///
/// Live stores return MANY relations in no particular order, so round-trip
/// comparisons against them go through this first.
pub fn sorted_by_id(value: serde_json::Value) -> serde_json::Value {
    use serde_json::Value;
    match value {
        Value::Array(items) => {
            let mut items: Vec<Value> = items.into_iter().map(sorted_by_id).collect();
            items.sort_by(|a, b| {
                let key = |v: &Value| v.get("id").and_then(Value::as_str).map(str::to_owned);
                key(a).cmp(&key(b))
            });
            Value::Array(items)
        }
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k, sorted_by_id(v)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sorted_by_id_is_recursive() {
        let shuffled = json!({"versions": [
            {"id": "V2", "arms": [{"id": "A2"}, {"id": "A1"}]},
            {"id": "V1"}
        ]});
        assert_eq!(
            sorted_by_id(shuffled),
            json!({"versions": [
                {"id": "V1"},
                {"id": "V2", "arms": [{"id": "A1"}, {"id": "A2"}]}
            ]})
        );
    }

    #[test]
    fn test_sorted_by_id_keeps_scalar_lists() {
        let value = json!({"synonyms": ["b", "a"]});
        assert_eq!(sorted_by_id(value.clone()), value);
    }
}
