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

//! Coded values and quantities shared across the study tree.

use serde::{Deserialize, Serialize};

/// A coded term from a controlled terminology (e.g. CDISC CT).
///
/// The same shape is stored under several node labels depending on where
/// it hangs in the tree (`Code`, `Country`, `EncounterType`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Code {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Code value within the code system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Code system URI or name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system: Option<String>,
    /// Code system version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_system_version: Option<String>,
    /// Human readable decode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decode: Option<String>,
    /// USDM instance type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

impl Code {
    /// Create a code with only its identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set code and decode in one go.
    pub fn with_term(mut self, code: impl Into<String>, decode: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self.decode = Some(decode.into());
        self
    }

    /// Set the code system.
    pub fn with_code_system(mut self, system: impl Into<String>) -> Self {
        self.code_system = Some(system.into());
        self
    }
}

/// A measured amount with an optional unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quantity {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Numeric value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Unit of measure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// USDM instance type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

impl Quantity {
    /// Create a quantity.
    pub fn new(id: impl Into<String>, value: f64, unit: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            value: Some(value),
            unit: Some(unit.into()),
            instance_type: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_omits_absent_fields() {
        let code = Code::new("C1").with_term("C98388", "Interventional Study");
        let json = serde_json::to_value(&code).unwrap();
        assert_eq!(json["id"], "C1");
        assert_eq!(json["decode"], "Interventional Study");
        assert!(json.get("codeSystem").is_none());
    }

    #[test]
    fn test_code_missing_id_defaults_to_empty() {
        let code: Code = serde_json::from_str(r#"{"code": "X"}"#).unwrap();
        assert_eq!(code.id, "");
        assert_eq!(code.code.as_deref(), Some("X"));
    }

    #[test]
    fn test_quantity_integer_value_decodes_as_float() {
        let q: Quantity = serde_json::from_str(r#"{"id": "Q1", "value": 300}"#).unwrap();
        assert_eq!(q.value, Some(300.0));
    }
}
