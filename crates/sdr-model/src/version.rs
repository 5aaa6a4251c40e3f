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

//! Study versions and the entities hanging directly off them.

use serde::{Deserialize, Serialize};

use crate::design::{Epoch, StudyDesign};
use crate::terminology::{Code, Quantity};

/// One version of a study protocol.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyVersion {
    /// Stable identifier.
    #[serde(default)]
    pub id: String,
    /// Sponsor version identifier, e.g. `"2"` or `"Amendment 1"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_identifier: Option<String>,
    /// Why this version exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
    /// USDM instance type tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Designs included in this version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_designs: Option<Vec<StudyDesign>>,
    /// Official, brief and acronym titles.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub titles: Option<Vec<StudyTitle>>,
    /// Registry identifiers (NCT, EudraCT, sponsor).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_identifiers: Option<Vec<StudyIdentifier>>,
    /// Sponsors, CROs, registries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organizations: Option<Vec<Organization>>,
    /// Protocol amendments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amendments: Option<Vec<StudyAmendment>>,
    /// Investigational products and comparators.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_interventions: Option<Vec<StudyIntervention>>,
    /// Biomedical concepts referenced by activities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biomedical_concepts: Option<Vec<BiomedicalConcept>>,
    /// Placeholders for concepts not yet in the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bc_surrogates: Option<Vec<BcSurrogate>>,
    /// Conditions (e.g. dosing conditions) attached to the version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<Condition>>,
    /// Inclusion and exclusion criteria text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eligibility_criterion_items: Option<Vec<EligibilityCriterionItem>>,
    /// Protocol narrative sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrative_content_items: Option<Vec<NarrativeContentItem>>,
    /// Epochs listed on the version itself rather than under a design.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epochs: Option<Vec<Epoch>>,
}

impl StudyVersion {
    /// Create a version with only its identifier set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Set the version identifier.
    pub fn with_version_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.version_identifier = Some(identifier.into());
        self
    }

    /// Append a design.
    pub fn with_design(mut self, design: StudyDesign) -> Self {
        self.study_designs.get_or_insert_with(Vec::new).push(design);
        self
    }

    /// Append a version-level epoch.
    pub fn with_epoch(mut self, epoch: Epoch) -> Self {
        self.epochs.get_or_insert_with(Vec::new).push(epoch);
        self
    }

    /// Append an organization.
    pub fn with_organization(mut self, organization: Organization) -> Self {
        self.organizations
            .get_or_insert_with(Vec::new)
            .push(organization);
        self
    }

    /// Append an amendment.
    pub fn with_amendment(mut self, amendment: StudyAmendment) -> Self {
        self.amendments.get_or_insert_with(Vec::new).push(amendment);
        self
    }

    /// Append an intervention.
    pub fn with_intervention(mut self, intervention: StudyIntervention) -> Self {
        self.study_interventions
            .get_or_insert_with(Vec::new)
            .push(intervention);
        self
    }
}

/// A study title of a given type (official, brief, acronym).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyTitle {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Title type code.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub title_type: Option<Code>,
}

/// An identifier issued for the study by some organization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyIdentifier {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Identifier of the issuing organization.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

/// An organization taking part in the study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier_scheme: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    /// Organization type code (sponsor, registry, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_address: Option<Address>,
}

impl Organization {
    /// Create an organization with a name.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Set the legal address.
    pub fn with_legal_address(mut self, address: Address) -> Self {
        self.legal_address = Some(address);
        self
    }
}

/// A postal address.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: String,
    /// Full single-line rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lines: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub district: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

/// A protocol amendment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyAmendment {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Amendment number as printed on the protocol.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_reason: Option<AmendmentReason>,
    /// Enrollment targets changed by this amendment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrollments: Option<Vec<SubjectEnrollment>>,
}

/// The coded reason for an amendment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendmentReason {
    #[serde(default)]
    pub id: String,
    /// Free text reason when the code is "other".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub other_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
}

/// A planned enrollment figure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectEnrollment {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Quantity>,
}

/// A product or procedure under investigation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyIntervention {
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
    /// Intervention type code (drug, device, ...).
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub intervention_type: Option<Code>,
    /// Role code (investigational, comparator, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Code>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub administrations: Option<Vec<Administration>>,
}

/// How an intervention is administered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Administration {
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
    pub dose: Option<Quantity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Code>,
}

/// A biomedical concept from the concept library.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiomedicalConcept {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Library reference URI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synonyms: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<Code>,
}

/// Stand-in for a biomedical concept that is not in the library yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BcSurrogate {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applies_to_ids: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EligibilityCriterionItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrativeContentItem {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}
