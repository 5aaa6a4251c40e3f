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

//! Study designs: arms, epochs, encounters and the activity schedule.

use serde::{Deserialize, Serialize};

use crate::terminology::Code;

/// The plan of one study design within a version.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyDesign {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Interventional or observational.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_type: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arms: Option<Vec<Arm>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epochs: Option<Vec<Epoch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounters: Option<Vec<Encounter>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<Activity>>,
}

impl StudyDesign {
    /// Create a design with only its identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Append an arm.
    pub fn with_arm(mut self, arm: Arm) -> Self {
        self.arms.get_or_insert_with(Vec::new).push(arm);
        self
    }

    /// Append an epoch.
    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epochs.get_or_insert_with(Vec::new).push(epoch);
        self
    }

    /// Append an encounter.
    pub fn with_encounter(mut self, encounter: Encounter) -> Self {
        self.encounters.get_or_insert_with(Vec::new).push(encounter);
        self
    }

    /// Append an activity.
    pub fn with_activity(mut self, activity: Activity) -> Self {
        self.activities.get_or_insert_with(Vec::new).push(activity);
        self
    }
}

/// A treatment arm.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Arm {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Where the arm's data comes from (collected, historical, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_origin_type: Option<Code>,
}

impl Arm {
    /// Create an arm with a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }
}

/// A period of the study (screening, treatment, follow-up).
///
/// Epochs are ordered by `previous_id`/`next_id` references rather than by
/// nesting. In the graph the order is an `Epoch -PRECEDES-> Epoch` edge,
/// which reads back through `precedes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Epoch {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Identifier of the epoch this one follows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
    /// Identifier of the epoch following this one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    /// The epoch this one precedes, when read back from the graph.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precedes: Option<Box<Epoch>>,
}

impl Epoch {
    /// Create an epoch with only its identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the identifier of the preceding epoch.
    pub fn after(mut self, previous_id: impl Into<String>) -> Self {
        self.previous_id = Some(previous_id.into());
        self
    }
}

/// A planned visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encounter {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    /// Identifier of the timing this encounter is scheduled at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at_id: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub encounter_type: Option<Code>,
}

/// A scheduled activity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defined_procedures: Option<Vec<DefinedProcedure>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedProcedure {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub procedure_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_intervention_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_order_reference() {
        let epoch = Epoch::new("E2").after("E1");
        let json = serde_json::to_value(&epoch).unwrap();
        assert_eq!(json["previousId"], "E1");
        assert!(json.get("precedes").is_none());
    }

    #[test]
    fn test_encounter_type_wire_name() {
        let encounter: Encounter =
            serde_json::from_str(r#"{"id": "V1", "type": {"id": "C1", "decode": "Visit"}}"#)
                .unwrap();
        assert_eq!(
            encounter.encounter_type.and_then(|c| c.decode).as_deref(),
            Some("Visit")
        );
    }

    #[test]
    fn test_nested_precedes_decodes() {
        let epoch: Epoch =
            serde_json::from_str(r#"{"id": "E1", "precedes": {"id": "E2"}}"#).unwrap();
        assert_eq!(epoch.precedes.map(|e| e.id).as_deref(), Some("E2"));
    }
}
