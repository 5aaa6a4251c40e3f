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

//! Selection sets used across tests.

/// Identity, a scalar and a three-level MANY chain.
pub const SCENARIO_A: &[&str] = &["id", "name", "versions/studyDesigns/arms"];

/// Two-hop to-one chain from organizations to their country.
pub const ORGANIZATION_COUNTRY: &[&str] = &[
    "id",
    "versions/id",
    "versions/organizations/id",
    "versions/organizations/name",
    "versions/organizations/legalAddress/id",
    "versions/organizations/legalAddress/city",
    "versions/organizations/legalAddress/country/id",
    "versions/organizations/legalAddress/country/decode",
];

/// Known fields mixed with ones the schema does not have.
pub const WITH_UNKNOWN_FIELDS: &[&str] = &["id", "name", "sponsor/name", "versions/budget/total"];

/// Epoch ordering through the navigation edge.
pub const EPOCH_CHAIN: &[&str] = &[
    "id",
    "versions/id",
    "versions/studyDesigns/id",
    "versions/studyDesigns/epochs/id",
    "versions/studyDesigns/epochs/name",
    "versions/studyDesigns/epochs/precedes/id",
];
