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

//! Typed nested study definition documents.
//!
//! A [`Study`] is the root aggregate of a clinical study definition. It owns
//! its versions, which in turn own designs, organizations, amendments,
//! interventions and so on, down to coded values ([`Code`]) and measured
//! quantities ([`Quantity`]).
//!
//! # Optionality
//!
//! Every field apart from `id` is optional, and absence is preserved on the
//! wire: `None` fields are never serialized, so a document that omits a
//! collection stays distinguishable from one that submits an empty
//! collection (`Some(vec![])`). The graph layer relies on this to skip
//! subtrees that were never submitted.
//!
//! # Identity
//!
//! The `id` string of every entity is caller supplied and must be stable
//! across re-submissions. It is the natural key of the corresponding graph
//! node.
//!
//! # Example
//!
//! ```
//! use sdr_model::{Study, StudyVersion};
//!
//! let study = Study::new("S1")
//!     .with_name("Pivotal trial")
//!     .with_version(StudyVersion::new("V1"));
//!
//! let json = serde_json::to_value(&study).unwrap();
//! assert_eq!(json["versions"][0]["id"], "V1");
//! assert!(json.get("description").is_none());
//! ```

pub mod article;
pub mod design;
pub mod payload;
pub mod study;
pub mod terminology;
pub mod version;

pub use article::Article;
pub use design::{Activity, Arm, DefinedProcedure, Encounter, Epoch, StudyDesign};
pub use payload::{NodeCount, SubmissionPayload};
pub use study::{Study, StudyDefinitionDocument};
pub use terminology::{Code, Quantity};
pub use version::{
    Address, Administration, AmendmentReason, BcSurrogate, BiomedicalConcept, Condition,
    EligibilityCriterionItem, NarrativeContentItem, Organization, StudyAmendment,
    StudyIdentifier, StudyIntervention, StudyTitle, StudyVersion, SubjectEnrollment,
};
