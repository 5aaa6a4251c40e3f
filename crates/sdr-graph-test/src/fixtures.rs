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

//! Canonical study documents, articles and queue messages.

use sdr_model::{
    Activity, Address, Administration, AmendmentReason, Arm, Article, BcSurrogate,
    BiomedicalConcept, Code, Condition, DefinedProcedure, EligibilityCriterionItem, Encounter,
    Epoch, NarrativeContentItem, Organization, Quantity, Study, StudyAmendment,
    StudyDefinitionDocument, StudyDesign, StudyIdentifier, StudyIntervention, StudyTitle,
    StudyVersion, SubjectEnrollment,
};
use serde_json::json;

use crate::FixtureList;

/// All study fixtures by name.
pub fn all() -> FixtureList {
    vec![
        ("minimal", minimal),
        ("scenario_a", scenario_a),
        ("epoch_chain", epoch_chain),
        ("organizations", organizations),
        ("comprehensive", comprehensive),
    ]
}

/// A study with only an id and a name.
pub fn minimal() -> Study {
    Study::new("S0").with_name("Minimal study")
}

/// Two versions; the first has one design with two arms, the second has no designs.
pub fn scenario_a() -> Study {
    Study::new("S1")
        .with_name("Scenario A")
        .with_version(
            StudyVersion::new("V1").with_design(
                StudyDesign::new("D1")
                    .with_arm(Arm::new("A1", "Placebo"))
                    .with_arm(Arm::new("A2", "Active")),
            ),
        )
        .with_version(StudyVersion::new("V2"))
}

/// One design whose second epoch points back at the first.
pub fn epoch_chain() -> Study {
    let mut screening = Epoch::new("E1");
    screening.name = Some("Screening".to_string());
    let mut treatment = Epoch::new("E2").after("E1");
    treatment.name = Some("Treatment".to_string());

    Study::new("S1").with_version(
        StudyVersion::new("V1")
            .with_design(StudyDesign::new("D1").with_epoch(screening).with_epoch(treatment)),
    )
}

/// Two epochs linked by `previousId`, listed directly on the version.
pub fn scenario_b_json() -> serde_json::Value {
    json!({
        "id": "S1",
        "versions": [{
            "id": "V1",
            "epochs": [{"id": "E1"}, {"id": "E2", "previousId": "E1"}]
        }]
    })
}

/// The same epochs, placed under a design.
pub fn epochs_in_design_json() -> serde_json::Value {
    json!({
        "id": "S1",
        "versions": [{
            "id": "V1",
            "studyDesigns": [{
                "id": "D1",
                "epochs": [{"id": "E1"}, {"id": "E2", "previousId": "E1"}]
            }]
        }]
    })
}

/// A study carrying a nested object the schema does not know.
pub fn unknown_nested_field_json() -> serde_json::Value {
    json!({"id": "S1", "sponsor": {"id": "X", "name": "Acme"}})
}

/// Organizations with legal addresses down to the country.
pub fn organizations() -> Study {
    let mut address = Address {
        id: "ADDR1".to_string(),
        city: Some("Leiden".to_string()),
        ..Default::default()
    };
    address.country = Some(Code::new("NLD").with_term("NLD", "Netherlands"));

    Study::new("S2").with_version(
        StudyVersion::new("V1")
            .with_organization(Organization::new("ORG1", "Sponsor BV").with_legal_address(address))
            .with_organization(Organization::new("ORG2", "Lab Inc")),
    )
}

/// Every relationship in the study registry, populated once.
///
/// Contains no empty collections and no navigation fields, so writing it
/// and reading it back with a covering selection yields the same document.
pub fn comprehensive() -> Study {
    let design = StudyDesign {
        id: "SD1".to_string(),
        name: Some("Main design".to_string()),
        study_type: Some(Code::new("C-ST").with_term("C98388", "Interventional Study")),
        arms: Some(vec![Arm {
            data_origin_type: Some(Code::new("C-DOT").with_term("C188866", "Data Generated Within Study")),
            ..Arm::new("ARM1", "Treatment arm")
        }]),
        epochs: Some(vec![Epoch::new("EP1"), Epoch::new("EP2").after("EP1")]),
        encounters: Some(vec![Encounter {
            id: "ENC1".to_string(),
            name: Some("Visit 1".to_string()),
            encounter_type: Some(Code::new("C-ET").with_term("C25716", "Visit")),
            ..Default::default()
        }]),
        activities: Some(vec![Activity {
            id: "ACT1".to_string(),
            name: Some("Blood draw".to_string()),
            defined_procedures: Some(vec![DefinedProcedure {
                id: "PROC1".to_string(),
                name: Some("Venipuncture".to_string()),
                code: Some(Code::new("C-PROC").with_term("C28221", "Phlebotomy")),
                ..Default::default()
            }]),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let amendment = StudyAmendment {
        id: "AM1".to_string(),
        number: Some("1".to_string()),
        summary: Some("Dose change".to_string()),
        primary_reason: Some(AmendmentReason {
            id: "AR1".to_string(),
            code: Some(Code::new("C-AR").with_term("C207612", "Regulatory Agency Request")),
            ..Default::default()
        }),
        enrollments: Some(vec![SubjectEnrollment {
            id: "EN1".to_string(),
            name: Some("Global".to_string()),
            quantity: Some(Quantity::new("Q1", 120.0, "participants")),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let intervention = StudyIntervention {
        id: "INT1".to_string(),
        name: Some("Drug X".to_string()),
        intervention_type: Some(Code::new("C-IT").with_term("C1909", "Drug")),
        role: Some(Code::new("C-IR").with_term("C41161", "Experimental Intervention")),
        administrations: Some(vec![Administration {
            id: "ADM1".to_string(),
            name: Some("Daily oral".to_string()),
            dose: Some(Quantity::new("Q2", 2.5, "mg")),
            route: Some(Code::new("C-RT").with_term("C38288", "Oral")),
            ..Default::default()
        }]),
        ..Default::default()
    };

    let organization = Organization {
        organization_type: Some(Code::new("C-OT").with_term("C70793", "Clinical Study Sponsor")),
        ..Organization::new("ORG1", "Sponsor BV").with_legal_address(Address {
            id: "ADDR1".to_string(),
            lines: Some(vec!["Main street 1".to_string()]),
            city: Some("Leiden".to_string()),
            country: Some(Code::new("C-NLD").with_term("NLD", "Netherlands")),
            ..Default::default()
        })
    };

    let version = StudyVersion {
        version_identifier: Some("2.0".to_string()),
        titles: Some(vec![StudyTitle {
            id: "T1".to_string(),
            text: Some("A trial of Drug X".to_string()),
            title_type: Some(Code::new("C-TT").with_term("C99905x2", "Official Study Title")),
            ..Default::default()
        }]),
        study_identifiers: Some(vec![StudyIdentifier {
            id: "SI1".to_string(),
            text: Some("NCT00000001".to_string()),
            scope_id: Some("ORG1".to_string()),
            ..Default::default()
        }]),
        biomedical_concepts: Some(vec![BiomedicalConcept {
            id: "BC1".to_string(),
            name: Some("Systolic blood pressure".to_string()),
            synonyms: Some(vec!["SBP".to_string(), "SYSBP".to_string()]),
            code: Some(Code::new("C-BC").with_term("C25298", "Systolic Blood Pressure")),
            ..Default::default()
        }]),
        bc_surrogates: Some(vec![BcSurrogate {
            id: "BCS1".to_string(),
            name: Some("Local lab panel".to_string()),
            ..Default::default()
        }]),
        conditions: Some(vec![Condition {
            id: "COND1".to_string(),
            text: Some("Only if fasting".to_string()),
            applies_to_ids: Some(vec!["ACT1".to_string()]),
            ..Default::default()
        }]),
        eligibility_criterion_items: Some(vec![EligibilityCriterionItem {
            id: "ECI1".to_string(),
            text: Some("Age 18 or older".to_string()),
            ..Default::default()
        }]),
        narrative_content_items: Some(vec![NarrativeContentItem {
            id: "NCI1".to_string(),
            text: Some("<p>Background</p>".to_string()),
            ..Default::default()
        }]),
        ..StudyVersion::new("SV1")
            .with_design(design)
            .with_organization(organization)
            .with_amendment(amendment)
            .with_intervention(intervention)
    };

    Study::new("S9")
        .with_name("Comprehensive study")
        .with_description("Touches every relationship")
        .with_version(version)
        .with_document(StudyDefinitionDocument::new("DOC1", "Protocol"))
}

/// A small article batch with overlapping categories and a blank tag.
pub fn articles() -> Vec<Article> {
    vec![
        Article::new("a1", "FDA approves Drug X")
            .with_category("Regulatory")
            .with_category("Oncology")
            .with_tag("fda"),
        Article::new("a2", "Phase III readout")
            .with_category(" Oncology ")
            .with_tag("  ")
            .with_tag("phase-3"),
    ]
}

/// Queue message bodies: two valid submissions around an invalid one.
pub fn submission_bodies() -> Vec<String> {
    vec![
        json!({"study": {"id": "Q1", "name": "First"}, "usdmVersion": "3.0.0", "systemName": "SDR"})
            .to_string(),
        "{not json".to_string(),
        json!({"study": {"id": "Q2", "versions": [{"id": "Q2-V1"}]}}).to_string(),
    ]
}
