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

//! Result normalization and typed decoding.
//!
//! Stores return [`RawValue`] trees whose map keys are whatever the engine
//! produced. [`normalize`] turns them into string-keyed [`Value`] trees;
//! [`decode`] then maps a canonical value onto a typed document.

use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

use crate::error::{GraphError, Result};
use crate::value::{RawValue, Value};

/// Normalize a raw store value.
///
/// Map keys are stringified, nested maps and sequences are normalized
/// recursively and scalars pass through. Applying this to an already
/// normalized value (via `RawValue::from`) is a no-op.
pub fn normalize(raw: RawValue) -> Value {
    match raw {
        RawValue::Null => Value::Null,
        RawValue::Bool(b) => Value::Bool(b),
        RawValue::Int(i) => Value::Int(i),
        RawValue::Float(f) => Value::Float(f),
        RawValue::Text(s) => Value::String(s),
        RawValue::Other(s) => Value::String(s),
        RawValue::Bytes(bytes) => Value::List(bytes.into_iter().map(|b| Value::Int(b as i64)).collect()),
        RawValue::List(items) => Value::List(items.into_iter().map(normalize).collect()),
        RawValue::Map(entries) => {
            let mut map = BTreeMap::new();
            for (key, value) in entries {
                map.insert(key_string(&key), normalize(value));
            }
            Value::Map(map)
        }
    }
}

/// Stringify a map key.
pub fn key_string(key: &RawValue) -> String {
    match key {
        RawValue::Text(s) | RawValue::Other(s) => s.clone(),
        RawValue::Null => "null".to_string(),
        RawValue::Bool(b) => b.to_string(),
        RawValue::Int(i) => i.to_string(),
        RawValue::Float(f) => f.to_string(),
        RawValue::Bytes(_) | RawValue::List(_) | RawValue::Map(_) => {
            serde_json::Value::from(normalize(key.clone())).to_string()
        }
    }
}

/// Decode a canonical value into a typed document.
pub fn decode<T: DeserializeOwned>(value: Value) -> Result<T> {
    serde_json::from_value(serde_json::Value::from(value))
        .map_err(|e| GraphError::Decode(e.to_string()))
}

/// Normalize and decode every row of a read result.
pub fn decode_rows<T: DeserializeOwned>(rows: Vec<RawValue>) -> Result<Vec<T>> {
    rows.into_iter().map(|row| decode(normalize(row))).collect()
}

/// Normalize and decode the first row of a read result, if any.
///
/// An absent row or a null row means "not found".
pub fn decode_first<T: DeserializeOwned>(rows: Vec<RawValue>) -> Result<Option<T>> {
    match rows.into_iter().next().map(normalize) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => decode(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sdr_model::{Arm, NodeCount};

    #[test]
    fn test_non_string_keys_are_stringified() {
        let raw = RawValue::Map(vec![
            (RawValue::Int(1), RawValue::Text("one".to_string())),
            (RawValue::Bool(true), RawValue::Null),
        ]);
        let value = normalize(raw);
        assert_eq!(value.get("1"), Some(&Value::String("one".to_string())));
        assert_eq!(value.get("true"), Some(&Value::Null));
    }

    #[test]
    fn test_nested_structures_are_normalized() {
        let raw = RawValue::List(vec![RawValue::Map(vec![(
            RawValue::Other("k".to_string()),
            RawValue::List(vec![RawValue::Int(1)]),
        )])]);
        let expected = serde_json::json!([{"k": [1]}]);
        assert_eq!(serde_json::Value::from(normalize(raw)), expected);
    }

    #[test]
    fn test_idempotent_on_normalized_value() {
        let raw = RawValue::Map(vec![(
            RawValue::Float(1.5),
            RawValue::Map(vec![(RawValue::Null, RawValue::Bytes(vec![1, 2]))]),
        )]);
        let once = normalize(raw);
        let twice = normalize(RawValue::from(once.clone()));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_decode_typed() {
        let raw = RawValue::text_map([
            ("id", RawValue::Text("A1".to_string())),
            ("name", RawValue::Text("Placebo".to_string())),
            ("dataOriginType", RawValue::Null),
        ]);
        let arm: Arm = decode(normalize(raw)).unwrap();
        assert_eq!(arm.id, "A1");
        assert_eq!(arm.name.as_deref(), Some("Placebo"));
        assert!(arm.data_origin_type.is_none());
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let raw = RawValue::text_map([("label", RawValue::Int(3)), ("count", RawValue::Int(1))]);
        let err = decode_rows::<NodeCount>(vec![raw]).unwrap_err();
        assert!(matches!(err, GraphError::Decode(_)));
    }

    #[test]
    fn test_decode_first_empty_is_none() {
        assert_eq!(decode_first::<NodeCount>(Vec::new()).unwrap(), None);
        assert_eq!(decode_first::<NodeCount>(vec![RawValue::Null]).unwrap(), None);
    }
}
