// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene graph of placed meshes
//!
//! A tree of nodes, each with a local-to-parent transform, zero or more
//! meshes and a string property bag. The clash kernel only ever sees the
//! flattened list produced by [`Scene::flatten`].

use crate::clash::PlacedMesh;
use crate::geometry::{Transform, TriangleMesh};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Property holding a node's IFC entity type (e.g. `IfcWall`)
pub const PROP_IFC_TYPE: &str = "ifc_type";

fn identity() -> Transform {
    Transform::identity()
}

/// Scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub id: String,
    /// Local-to-parent transform, column-major when serialized
    #[serde(default = "identity")]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub meshes: Vec<TriangleMesh>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transform: Transform::identity(),
            meshes: Vec::new(),
            properties: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: TriangleMesh) -> Self {
        self.meshes.push(mesh);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn has_meshes(&self) -> bool {
        !self.meshes.is_empty()
    }

    /// Reporting handle for this node
    pub fn node_ref(&self) -> NodeRef {
        NodeRef {
            id: self.id.clone(),
            properties: self.properties.clone(),
        }
    }
}

/// Opaque handle identifying the node a mesh came from. Only used for
/// reporting; the kernel never looks inside.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, String>,
}

impl NodeRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            properties: BTreeMap::new(),
        }
    }

    /// IFC type, if the node carried one
    pub fn kind(&self) -> Option<&str> {
        self.properties.get(PROP_IFC_TYPE).map(String::as_str)
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind() {
            Some(kind) => write!(f, "{}:{}", kind, self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Scene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub root: SceneNode,
}

impl Scene {
    pub fn new(root: SceneNode) -> Self {
        Self { name: None, root }
    }

    /// Nodes in depth-first pre-order, children in declaration order
    pub fn nodes(&self) -> Vec<&SceneNode> {
        let mut nodes = Vec::new();
        let mut stack = vec![&self.root];
        while let Some(node) = stack.pop() {
            nodes.push(node);
            stack.extend(node.children.iter().rev());
        }
        nodes
    }

    pub fn nodes_with_meshes(&self) -> Vec<&SceneNode> {
        self.nodes().into_iter().filter(|n| n.has_meshes()).collect()
    }

    pub fn mesh_count(&self) -> usize {
        self.nodes().iter().map(|n| n.meshes.len()).sum()
    }

    pub fn distinct_property_keys(&self) -> BTreeSet<&str> {
        self.nodes()
            .into_iter()
            .flat_map(|n| n.properties.keys().map(String::as_str))
            .collect()
    }

    pub fn distinct_property_values(&self, key: &str) -> BTreeSet<&str> {
        self.nodes()
            .into_iter()
            .filter_map(|n| n.property(key))
            .collect()
    }

    /// One placed mesh per attached mesh, with `world = parent_world * local`
    pub fn flatten(&self) -> Vec<PlacedMesh<NodeRef>> {
        self.flatten_where(|_| true)
    }

    /// Like [`flatten`](Self::flatten), keeping only meshes of nodes matching
    /// `keep`. Transforms of skipped ancestors are still inherited.
    pub fn flatten_where(&self, keep: impl Fn(&SceneNode) -> bool) -> Vec<PlacedMesh<NodeRef>> {
        let mut placed = Vec::new();
        let mut stack = vec![(&self.root, self.root.transform)];

        while let Some((node, world)) = stack.pop() {
            if node.has_meshes() && keep(node) {
                let node_ref = node.node_ref();
                placed.extend(
                    node.meshes
                        .iter()
                        .map(|mesh| PlacedMesh::new(mesh.clone(), world, node_ref.clone())),
                );
            }
            stack.extend(
                node.children
                    .iter()
                    .rev()
                    .map(|child| (child, world * child.transform)),
            );
        }
        placed
    }

    /// Only meshes whose node has `key` set to `value`
    pub fn flatten_by_property(&self, key: &str, value: &str) -> Vec<PlacedMesh<NodeRef>> {
        self.flatten_where(|node| node.property(key) == Some(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Point3, Vector3};

    fn translation(x: f64, y: f64, z: f64) -> Transform {
        Transform::new_translation(&Vector3::new(x, y, z))
    }

    fn sample_scene() -> Scene {
        let cube = Primitive::unit_cube().to_mesh();
        Scene::new(
            SceneNode::new("site")
                .with_transform(translation(100.0, 0.0, 0.0))
                .with_child(
                    SceneNode::new("storey")
                        .with_transform(translation(0.0, 0.0, 3.0))
                        .with_property("name", "Level 1")
                        .with_child(
                            SceneNode::new("wall-1")
                                .with_property(PROP_IFC_TYPE, "IfcWall")
                                .with_mesh(cube.clone()),
                        )
                        .with_child(
                            SceneNode::new("slab-1")
                                .with_transform(translation(1.0, 0.0, 0.0))
                                .with_property(PROP_IFC_TYPE, "IfcSlab")
                                .with_mesh(cube.clone())
                                .with_mesh(cube),
                        ),
                ),
        )
    }

    #[test]
    fn test_flatten_composes_transforms() {
        let placed = sample_scene().flatten();
        assert_eq!(placed.len(), 3);

        assert_eq!(placed[0].node.id, "wall-1");
        let origin = placed[0].transform.transform_point(&Point3::origin());
        assert_eq!(origin, Point3::new(100.0, 0.0, 3.0));

        assert_eq!(placed[1].node.id, "slab-1");
        assert_eq!(placed[2].node.id, "slab-1");
        let origin = placed[2].transform.transform_point(&Point3::origin());
        assert_eq!(origin, Point3::new(101.0, 0.0, 3.0));
    }

    #[test]
    fn test_parent_transform_applies_before_child() {
        let rotate = Transform::new_rotation(Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        let scene = Scene::new(
            SceneNode::new("root").with_transform(rotate).with_child(
                SceneNode::new("leaf")
                    .with_transform(translation(1.0, 0.0, 0.0))
                    .with_mesh(Primitive::unit_cube().to_mesh()),
            ),
        );
        let placed = scene.flatten();
        let origin = placed[0].transform.transform_point(&Point3::origin());
        // Child offset along x is rotated onto y by the parent
        assert!((origin - Point3::new(0.0, 1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn test_property_queries() {
        let scene = sample_scene();
        assert_eq!(scene.nodes().len(), 4);
        assert_eq!(scene.nodes_with_meshes().len(), 2);
        assert_eq!(scene.mesh_count(), 3);
        assert_eq!(
            scene.distinct_property_keys().into_iter().collect::<Vec<_>>(),
            vec!["ifc_type", "name"]
        );
        assert_eq!(
            scene
                .distinct_property_values(PROP_IFC_TYPE)
                .into_iter()
                .collect::<Vec<_>>(),
            vec!["IfcSlab", "IfcWall"]
        );
    }

    #[test]
    fn test_flatten_by_property() {
        let walls = sample_scene().flatten_by_property(PROP_IFC_TYPE, "IfcWall");
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].node.kind(), Some("IfcWall"));
    }

    #[test]
    fn test_node_ref_display() {
        let typed = SceneNode::new("abc").with_property(PROP_IFC_TYPE, "IfcDoor").node_ref();
        assert_eq!(typed.to_string(), "IfcDoor:abc");
        assert_eq!(NodeRef::new("plain").to_string(), "plain");
    }
}
