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

//! The schema registry: which fields are relationships, and where they lead.
//!
//! Type names double as node labels. Every relationship field of a type has
//! exactly one [`SchemaEdge`]; anything else on a document is a scalar
//! property. The registry distinguishes three kinds of entries:
//!
//! - **nested** edges, which hold embedded children on the write path and
//!   are traversable on the read path;
//! - **navigation** edges, which only exist on the read path (the graph
//!   holds them, but documents never embed them);
//! - **cross references**, id-valued fields that become edges on the write
//!   path (`Epoch.previousId` yields `PRECEDES`).

use std::collections::BTreeMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// How many related elements a relationship yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cardinality {
    /// At most one.
    One,
    /// Any number.
    Many,
}

/// Target of a relationship field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaEdge {
    /// Label of the outgoing edge.
    pub edge_label: String,
    /// Type (and node label) of the child.
    pub child_type: String,
    /// Cardinality of the field.
    pub cardinality: Cardinality,
}

/// Direction of the edge produced by a cross reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceDirection {
    /// Edge goes from the holder to the referenced node.
    Outgoing,
    /// Edge goes from the referenced node to the holder.
    Incoming,
}

/// An id-valued field that becomes an edge on the write path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    /// Field holding the referenced id.
    pub field: String,
    /// Label of the produced edge.
    pub edge_label: String,
    /// Type of the referenced node.
    pub target_type: String,
    /// Direction of the produced edge.
    pub direction: ReferenceDirection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct TypeSchema {
    nested: Vec<(String, SchemaEdge)>,
    navigation: Vec<(String, SchemaEdge)>,
    references: Vec<CrossReference>,
}

impl TypeSchema {
    fn upsert(entries: &mut Vec<(String, SchemaEdge)>, field: String, edge: SchemaEdge) {
        match entries.iter_mut().find(|(f, _)| *f == field) {
            Some(existing) => existing.1 = edge,
            None => entries.push((field, edge)),
        }
    }

    fn remove(entries: &mut Vec<(String, SchemaEdge)>, field: &str) {
        entries.retain(|(f, _)| f != field);
    }
}

/// Immutable lookup table from `(parent type, field)` to relationship.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaRegistry {
    root: String,
    types: BTreeMap<String, TypeSchema>,
}

impl SchemaRegistry {
    /// Start building a registry rooted at `root`.
    pub fn builder(root: impl Into<String>) -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::new(root)
    }

    /// The root aggregate type.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Look up a relationship field for the read path.
    ///
    /// Returns nested and navigation edges. Absence means the field is not
    /// a known relationship; callers decide what that implies.
    pub fn edge_for(&self, parent_type: &str, field: &str) -> Option<&SchemaEdge> {
        let schema = self.types.get(parent_type)?;
        schema
            .nested
            .iter()
            .chain(schema.navigation.iter())
            .find(|(f, _)| f == field)
            .map(|(_, edge)| edge)
    }

    /// Look up a relationship field that holds embedded children.
    pub fn nested_edge(&self, parent_type: &str, field: &str) -> Option<&SchemaEdge> {
        self.types
            .get(parent_type)?
            .nested
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, edge)| edge)
    }

    /// Embedded-children fields of a type, in declaration order.
    pub fn nested_fields<'a>(
        &'a self,
        type_name: &str,
    ) -> impl Iterator<Item = (&'a str, &'a SchemaEdge)> + 'a {
        self.types
            .get(type_name)
            .into_iter()
            .flat_map(|schema| schema.nested.iter())
            .map(|(field, edge)| (field.as_str(), edge))
    }

    /// Read-only navigation fields of a type, in declaration order.
    pub fn navigation_fields<'a>(
        &'a self,
        type_name: &str,
    ) -> impl Iterator<Item = (&'a str, &'a SchemaEdge)> + 'a {
        self.types
            .get(type_name)
            .into_iter()
            .flat_map(|schema| schema.navigation.iter())
            .map(|(field, edge)| (field.as_str(), edge))
    }

    /// Cross references declared on a type.
    pub fn cross_references(&self, type_name: &str) -> &[CrossReference] {
        self.types
            .get(type_name)
            .map(|schema| schema.references.as_slice())
            .unwrap_or(&[])
    }

    /// The cross reference declared for a field, if any.
    pub fn cross_reference(&self, type_name: &str, field: &str) -> Option<&CrossReference> {
        self.cross_references(type_name)
            .iter()
            .find(|r| r.field == field)
    }

    /// Whether the type is known to the registry.
    pub fn contains_type(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// All node labels, sorted.
    pub fn node_labels(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Number of relationship entries (nested plus navigation).
    pub fn edge_count(&self) -> usize {
        self.types
            .values()
            .map(|s| s.nested.len() + s.navigation.len())
            .sum()
    }
}

/// Builder for [`SchemaRegistry`].
///
/// Declaring a field twice replaces the earlier entry, so every
/// `(type, field)` pair maps to exactly one edge.
#[derive(Debug, Clone)]
pub struct SchemaRegistryBuilder {
    registry: SchemaRegistry,
}

impl SchemaRegistryBuilder {
    /// Create a builder for a registry rooted at `root`.
    pub fn new(root: impl Into<String>) -> Self {
        let root = root.into();
        let mut types = BTreeMap::new();
        types.insert(root.clone(), TypeSchema::default());
        Self {
            registry: SchemaRegistry { root, types },
        }
    }

    /// Extend an existing registry.
    pub fn from_registry(registry: SchemaRegistry) -> Self {
        Self { registry }
    }

    fn touch(&mut self, type_name: &str) -> &mut TypeSchema {
        self.registry
            .types
            .entry(type_name.to_string())
            .or_default()
    }

    /// Declare a nested relationship field.
    pub fn nested(
        mut self,
        parent_type: &str,
        field: &str,
        edge_label: &str,
        child_type: &str,
        cardinality: Cardinality,
    ) -> Self {
        self.touch(child_type);
        let schema = self.touch(parent_type);
        TypeSchema::remove(&mut schema.navigation, field);
        TypeSchema::upsert(
            &mut schema.nested,
            field.to_string(),
            SchemaEdge {
                edge_label: edge_label.to_string(),
                child_type: child_type.to_string(),
                cardinality,
            },
        );
        self
    }

    /// Declare a read-only navigation field.
    pub fn navigation(
        mut self,
        parent_type: &str,
        field: &str,
        edge_label: &str,
        child_type: &str,
        cardinality: Cardinality,
    ) -> Self {
        self.touch(child_type);
        let schema = self.touch(parent_type);
        TypeSchema::remove(&mut schema.nested, field);
        TypeSchema::upsert(
            &mut schema.navigation,
            field.to_string(),
            SchemaEdge {
                edge_label: edge_label.to_string(),
                child_type: child_type.to_string(),
                cardinality,
            },
        );
        self
    }

    /// Declare an id-valued cross reference field.
    pub fn cross_reference(
        mut self,
        type_name: &str,
        field: &str,
        edge_label: &str,
        target_type: &str,
        direction: ReferenceDirection,
    ) -> Self {
        self.touch(target_type);
        let schema = self.touch(type_name);
        schema.references.retain(|r| r.field != field);
        schema.references.push(CrossReference {
            field: field.to_string(),
            edge_label: edge_label.to_string(),
            target_type: target_type.to_string(),
            direction,
        });
        self
    }

    /// Finish the registry.
    pub fn build(self) -> SchemaRegistry {
        self.registry
    }
}

/// The process-wide study definition registry.
pub fn usdm_registry() -> &'static SchemaRegistry {
    static REGISTRY: OnceLock<SchemaRegistry> = OnceLock::new();
    REGISTRY.get_or_init(build_usdm_registry)
}

fn build_usdm_registry() -> SchemaRegistry {
    use Cardinality::{Many, One};

    SchemaRegistry::builder("Study")
        .nested("Study", "versions", "HAS_VERSION", "StudyVersion", Many)
        .nested("Study", "documentedBy", "DOCUMENTED_BY", "StudyDefinitionDocument", Many)
        // Study version
        .nested("StudyVersion", "studyDesigns", "INCLUDES_DESIGN", "StudyDesign", Many)
        .nested("StudyVersion", "titles", "HAS_TITLE", "StudyTitle", Many)
        .nested("StudyVersion", "studyIdentifiers", "HAS_IDENTIFIER", "StudyIdentifier", Many)
        .nested("StudyVersion", "organizations", "HAS_ORGANIZATION", "Organization", Many)
        .nested("StudyVersion", "amendments", "HAS_AMENDMENT", "StudyAmendment", Many)
        .nested("StudyVersion", "studyInterventions", "HAS_INTERVENTION", "StudyIntervention", Many)
        .nested("StudyVersion", "biomedicalConcepts", "HAS_BIO_MEDICAL_CONCEPT", "BioMedicalConcept", Many)
        .nested("StudyVersion", "bcSurrogates", "HAS_BC_SURROGATE", "BCSurrogate", Many)
        .nested("StudyVersion", "conditions", "HAS_CONDITION", "Condition", Many)
        .nested("StudyVersion", "eligibilityCriterionItems", "HAS_ELIGIBILITY_CRITERION", "EligibilityCriterionItem", Many)
        .nested("StudyVersion", "narrativeContentItems", "HAS_NARRATIVE_CONTENT", "NarrativeContentItem", Many)
        // Epochs submitted without a design level
        .nested("StudyVersion", "epochs", "HAS_EPOCH", "Epoch", Many)
        // Study design
        .nested("StudyDesign", "studyType", "HAS_TYPE", "Code", One)
        .nested("StudyDesign", "arms", "HAS_ARM", "Arm", Many)
        .nested("StudyDesign", "epochs", "HAS_EPOCH", "Epoch", Many)
        .nested("StudyDesign", "encounters", "HAS_ENCOUNTER", "Encounter", Many)
        .nested("StudyDesign", "activities", "HAS_ACTIVITY", "Activity", Many)
        .nested("Arm", "dataOriginType", "HAS_DATA_ORIGIN_TYPE", "ArmDataOriginType", One)
        .nested("Encounter", "type", "HAS_ENCOUNTER_TYPE", "EncounterType", One)
        .nested("Activity", "definedProcedures", "HAS_DEFINED_PROCEDURE", "DefinedProcedure", Many)
        .nested("DefinedProcedure", "code", "HAS_CODE", "Code", One)
        // Amendments
        .nested("StudyAmendment", "primaryReason", "HAS_PRIMARY_REASON", "StudyAmendmentReason", One)
        .nested("StudyAmendmentReason", "code", "HAS_CODE", "Code", One)
        .nested("StudyAmendment", "enrollments", "HAS_ENROLLMENT", "SubjectEnrollment", Many)
        .nested("SubjectEnrollment", "quantity", "HAS_QUANTITY", "Quantity", One)
        .nested("BioMedicalConcept", "code", "HAS_BIO_MEDICAL_CONCEPT_CODE", "BioMedicalConceptCode", One)
        // Organizations
        .nested("Organization", "type", "HAS_ORGANIZATION_TYPE", "OrganizationType", One)
        .nested("Organization", "legalAddress", "HAS_LEGAL_ADDRESS", "LegalAddress", One)
        .nested("LegalAddress", "country", "LOCATED_IN", "Country", One)
        // Interventions
        .nested("StudyIntervention", "type", "HAS_TYPE", "Code", One)
        .nested("StudyIntervention", "role", "HAS_ROLE", "Code", One)
        .nested("StudyIntervention", "administrations", "HAS_ADMINISTRATION", "Administration", Many)
        .nested("Administration", "dose", "HAS_DOSE", "Quantity", One)
        .nested("Administration", "route", "HAS_ROUTE", "Code", One)
        .nested("StudyTitle", "type", "HAS_TYPE", "Code", One)
        // Epoch ordering
        .navigation("Epoch", "precedes", "PRECEDES", "Epoch", One)
        .cross_reference("Epoch", "previousId", "PRECEDES", "Epoch", ReferenceDirection::Incoming)
        .build()
}
