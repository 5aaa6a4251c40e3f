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

//! Selection-driven projection compiler.
//!
//! The compiler turns a [`SelectionNode`] into a [`MapProjection`], an
//! expression tree describing how to compute the requested shape from a
//! bound node. The tree is backend neutral: the [Cypher
//! renderer](crate::cypher::render) and the
//! [in-memory store](crate::store::MemoryGraphStore) both interpret it.

use tracing::debug;

use crate::config::GraphConfig;
use crate::schema::{usdm_registry, Cardinality, SchemaRegistry};
use crate::selection::{Selection, SelectionNode};

/// How one requested field is computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// The natural key of the bound node.
    Identity,
    /// A scalar property, single-valued.
    Scalar(String),
    /// Follow an outgoing edge and project the children.
    Relationship {
        /// Edge label to traverse.
        edge_label: String,
        /// Label the child nodes must carry.
        child_label: String,
        /// `One` yields the first child or null; `Many` yields a list.
        cardinality: Cardinality,
        /// Projection applied to each child.
        child: Box<MapProjection>,
    },
    /// Constant null, for fields the schema does not know.
    Null,
}

/// The projection of one node: output key to field projection.
///
/// Fields are kept in key order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapProjection {
    /// Output key and how it is computed.
    pub fields: Vec<(String, Projection)>,
}

impl MapProjection {
    /// The minimal projection: only the identity field.
    pub fn identity(id_property: &str) -> Self {
        Self {
            fields: vec![(id_property.to_string(), Projection::Identity)],
        }
    }

    /// Look up a field projection.
    pub fn get(&self, key: &str) -> Option<&Projection> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, p)| p)
    }

    /// Deepest relationship nesting below this node.
    pub fn depth(&self) -> usize {
        self.fields
            .iter()
            .map(|(_, p)| match p {
                Projection::Relationship { child, .. } => 1 + child.depth(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }
}

/// Which root nodes a read binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Every node with the root label (collection query).
    All,
    /// The node with this natural key (point query).
    ById(String),
}

/// A compiled read request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadQuery {
    /// Project root nodes of a label.
    Projection {
        /// Root node label.
        root_label: String,
        /// Which roots to bind.
        binding: Binding,
        /// Shape to return per root.
        projection: MapProjection,
    },
    /// Count nodes per label; rows are `{label, count}`.
    LabelCounts,
}

/// Compiles selections against a schema registry.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionCompiler<'a> {
    registry: &'a SchemaRegistry,
    config: &'a GraphConfig,
}

impl<'a> ProjectionCompiler<'a> {
    /// Create a compiler.
    pub fn new(registry: &'a SchemaRegistry, config: &'a GraphConfig) -> Self {
        Self { registry, config }
    }

    /// Compile `node` as requested on `type_name`.
    ///
    /// An empty selection compiles to the identity projection. Compilation
    /// never fails: fields the schema does not know project to null.
    pub fn compile(&self, node: &SelectionNode, type_name: &str) -> MapProjection {
        if node.is_empty() {
            return MapProjection::identity(&self.config.id_property);
        }

        let fields = node
            .fields()
            .map(|(field, selection)| (field.to_string(), self.compile_field(type_name, field, selection)))
            .collect();
        MapProjection { fields }
    }

    fn compile_field(&self, type_name: &str, field: &str, selection: &Selection) -> Projection {
        let edge = self.registry.edge_for(type_name, field);
        match (selection, edge) {
            (Selection::Leaf, _) if field == self.config.id_property => Projection::Identity,
            (Selection::Leaf, None) => Projection::Scalar(field.to_string()),
            // A relationship requested without children yields the children's ids.
            (Selection::Leaf, Some(edge)) => Projection::Relationship {
                edge_label: edge.edge_label.clone(),
                child_label: edge.child_type.clone(),
                cardinality: edge.cardinality,
                child: Box::new(MapProjection::identity(&self.config.id_property)),
            },
            (Selection::Node(_), None) => {
                debug!(type_name, field, "unknown nested field, projecting null");
                Projection::Null
            }
            (Selection::Node(child), Some(edge)) => Projection::Relationship {
                edge_label: edge.edge_label.clone(),
                child_label: edge.child_type.clone(),
                cardinality: edge.cardinality,
                child: Box::new(self.compile(child, &edge.child_type)),
            },
        }
    }

    /// Compile a point query for the root with the given natural key.
    pub fn point(&self, root_label: &str, id: impl Into<String>, node: &SelectionNode) -> ReadQuery {
        ReadQuery::Projection {
            root_label: root_label.to_string(),
            binding: Binding::ById(id.into()),
            projection: self.compile(node, root_label),
        }
    }

    /// Compile a collection query over every node with the root label.
    pub fn collection(&self, root_label: &str, node: &SelectionNode) -> ReadQuery {
        ReadQuery::Projection {
            root_label: root_label.to_string(),
            binding: Binding::All,
            projection: self.compile(node, root_label),
        }
    }
}

/// Compile a selection against the study registry with default settings.
pub fn compile_projection(node: &SelectionNode, type_name: &str) -> MapProjection {
    let config = GraphConfig::default();
    ProjectionCompiler::new(usdm_registry(), &config).compile(node, type_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(paths: &[&str], type_name: &str) -> MapProjection {
        compile_projection(&SelectionNode::from_paths(paths.iter().copied(), '/'), type_name)
    }

    #[test]
    fn test_empty_selection_falls_back_to_identity() {
        let projection = compile(&[], "Study");
        assert_eq!(projection, MapProjection::identity("id"));
    }

    #[test]
    fn test_scalars_and_identity() {
        let projection = compile(&["id", "name"], "Study");
        assert_eq!(projection.get("id"), Some(&Projection::Identity));
        assert_eq!(projection.get("name"), Some(&Projection::Scalar("name".to_string())));
    }

    #[test]
    fn test_many_relationship() {
        let projection = compile(&["versions/studyDesigns/arms"], "Study");
        let Some(Projection::Relationship { edge_label, cardinality, child, .. }) =
            projection.get("versions")
        else {
            panic!("versions should be a relationship");
        };
        assert_eq!(edge_label, "HAS_VERSION");
        assert_eq!(*cardinality, Cardinality::Many);
        assert_eq!(projection.depth(), 3);
        assert!(matches!(child.get("studyDesigns"), Some(Projection::Relationship { .. })));
    }

    #[test]
    fn test_leaf_relationship_projects_child_ids() {
        let projection = compile(&["arms"], "StudyDesign");
        let Some(Projection::Relationship { child, child_label, .. }) = projection.get("arms") else {
            panic!("arms should be a relationship");
        };
        assert_eq!(child_label, "Arm");
        assert_eq!(**child, MapProjection::identity("id"));
    }

    #[test]
    fn test_unknown_nested_field_is_null() {
        let projection = compile(&["name", "sponsor/name"], "Study");
        assert_eq!(projection.get("sponsor"), Some(&Projection::Null));
        assert_eq!(projection.get("name"), Some(&Projection::Scalar("name".to_string())));
    }

    #[test]
    fn test_two_hop_to_one_chain() {
        let projection = compile(&["legalAddress/country/decode"], "Organization");
        let Some(Projection::Relationship { cardinality, child, .. }) = projection.get("legalAddress")
        else {
            panic!("legalAddress should be a relationship");
        };
        assert_eq!(*cardinality, Cardinality::One);
        let Some(Projection::Relationship { cardinality, child_label, .. }) = child.get("country")
        else {
            panic!("country should be a relationship");
        };
        assert_eq!(*cardinality, Cardinality::One);
        assert_eq!(child_label, "Country");
    }

    #[test]
    fn test_custom_id_property() {
        let config = GraphConfig::new().with_id_property("uid");
        let compiler = ProjectionCompiler::new(usdm_registry(), &config);
        let node = SelectionNode::from_paths(["uid", "id"], '/');
        let projection = compiler.compile(&node, "Study");
        assert_eq!(projection.get("uid"), Some(&Projection::Identity));
        assert_eq!(projection.get("id"), Some(&Projection::Scalar("id".to_string())));
    }

    #[test]
    fn test_point_and_collection_binding() {
        let config = GraphConfig::default();
        let compiler = ProjectionCompiler::new(usdm_registry(), &config);
        let node = SelectionNode::new();
        assert!(matches!(
            compiler.point("Study", "S1", &node),
            ReadQuery::Projection { binding: Binding::ById(ref id), .. } if id == "S1"
        ));
        assert!(matches!(
            compiler.collection("Activity", &node),
            ReadQuery::Projection { binding: Binding::All, .. }
        ));
    }
}
