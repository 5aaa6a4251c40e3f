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

//! Canonical and store-native value representations.
//!
//! [`RawValue`] is what a graph store hands back: maps may be keyed by
//! anything the engine chooses, and a few native scalars have no JSON
//! counterpart. [`Value`] is the canonical, string-keyed form produced by
//! the [normalizer](crate::normalize) and used for statement parameters.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cypher::escape::{escape_identifier, quote_string};

/// A canonical graph value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value.
    Int(i64),
    /// Floating-point value.
    Float(f64),
    /// String value.
    String(String),
    /// List value.
    List(Vec<Value>),
    /// Map/object value.
    Map(BTreeMap<String, Value>),
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(|x| x.into()).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(x) => x.into(),
            None => Value::Null,
        }
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            // Non-finite floats have no JSON form
            Value::Float(f) => serde_json::Number::from_f64(f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s),
            Value::List(items) => {
                serde_json::Value::Array(items.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Map(map) => serde_json::Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl Value {
    /// Convert to Cypher literal syntax.
    pub fn to_cypher_literal(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => {
                if f.is_nan() {
                    "0.0/0.0".to_string()
                } else if f.is_infinite() {
                    if *f > 0.0 {
                        "1.0/0.0".to_string()
                    } else {
                        "-1.0/0.0".to_string()
                    }
                } else {
                    let s = f.to_string();
                    if s.contains('.') || s.contains('e') || s.contains('E') {
                        s
                    } else {
                        format!("{}.0", s)
                    }
                }
            }
            Value::String(s) => quote_string(s),
            Value::List(items) => {
                let inner: Vec<String> = items.iter().map(|v| v.to_cypher_literal()).collect();
                format!("[{}]", inner.join(", "))
            }
            Value::Map(map) => {
                let pairs: Vec<String> = map
                    .iter()
                    .map(|(k, v)| format!("{}: {}", escape_identifier(k), v.to_cypher_literal()))
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
        }
    }

    /// Check if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be stored as a node property.
    ///
    /// Scalars and lists of scalars qualify; maps and nested lists do not.
    pub fn is_property_value(&self) -> bool {
        match self {
            Value::Map(_) => false,
            Value::List(items) => items
                .iter()
                .all(|v| !matches!(v, Value::Map(_) | Value::List(_))),
            _ => true,
        }
    }

    /// Try to get as a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as an integer.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Try to get as a list.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up a key when this is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|m| m.get(key))
    }
}

/// A value as returned by a graph store, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Null or missing.
    Null,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// Text.
    Text(String),
    /// Byte array.
    Bytes(Vec<u8>),
    /// Any other engine-specific scalar (temporal, spatial) in its display form.
    Other(String),
    /// Sequence.
    List(Vec<RawValue>),
    /// Map with arbitrary keys, in engine order.
    Map(Vec<(RawValue, RawValue)>),
}

impl RawValue {
    /// Build a map keyed by text.
    pub fn text_map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, RawValue)>,
    {
        RawValue::Map(
            entries
                .into_iter()
                .map(|(k, v)| (RawValue::Text(k.into()), v))
                .collect(),
        )
    }
}

impl From<Value> for RawValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Int(i) => RawValue::Int(i),
            Value::Float(f) => RawValue::Float(f),
            Value::String(s) => RawValue::Text(s),
            Value::List(items) => RawValue::List(items.into_iter().map(RawValue::from).collect()),
            Value::Map(map) => RawValue::text_map(
                map.into_iter().map(|(k, v)| (k, RawValue::from(v))),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_literals() {
        assert_eq!(Value::Null.to_cypher_literal(), "null");
        assert_eq!(Value::Int(42).to_cypher_literal(), "42");
        assert_eq!(Value::Float(3.0).to_cypher_literal(), "3.0");
        assert_eq!(Value::from("it's").to_cypher_literal(), "'it\\'s'");
    }

    #[test]
    fn test_value_map_literal_escapes_keys() {
        let mut map = BTreeMap::new();
        map.insert("match".to_string(), Value::from(1));
        map.insert("name".to_string(), Value::from("x"));
        assert_eq!(Value::Map(map).to_cypher_literal(), "{`match`: 1, name: 'x'}");
    }

    #[test]
    fn test_json_conversion_keeps_int_and_float_apart() {
        let v = Value::from(serde_json::json!({"a": 1, "b": 1.5, "c": [true, null]}));
        assert_eq!(v.get("a"), Some(&Value::Int(1)));
        assert_eq!(v.get("b"), Some(&Value::Float(1.5)));
        assert_eq!(
            v.get("c"),
            Some(&Value::List(vec![Value::Bool(true), Value::Null]))
        );
        let back = serde_json::Value::from(v);
        assert_eq!(back, serde_json::json!({"a": 1, "b": 1.5, "c": [true, null]}));
    }

    #[test]
    fn test_non_finite_float_to_json_is_null() {
        assert_eq!(
            serde_json::Value::from(Value::Float(f64::INFINITY)),
            serde_json::Value::Null
        );
    }

    #[test]
    fn test_property_value_shapes() {
        assert!(Value::from("x").is_property_value());
        assert!(Value::from(vec!["a", "b"]).is_property_value());
        assert!(Value::List(vec![]).is_property_value());
        assert!(!Value::Map(BTreeMap::new()).is_property_value());
        assert!(!Value::List(vec![Value::List(vec![])]).is_property_value());
    }

    #[test]
    fn test_raw_from_value_uses_text_keys() {
        let mut map = BTreeMap::new();
        map.insert("k".to_string(), Value::Int(1));
        let raw = RawValue::from(Value::Map(map));
        assert_eq!(
            raw,
            RawValue::Map(vec![(RawValue::Text("k".to_string()), RawValue::Int(1))])
        );
    }
}
