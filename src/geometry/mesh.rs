// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh representation and utilities

use super::{BoundingBox, Transform};
use crate::error::{ClashError, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    fn offset(&self, offset: usize) -> Self {
        Self::new(self.indices.map(|i| i + offset))
    }
}

/// Immutable triangle mesh.
///
/// Every triangle index is a valid offset into this mesh's own vertex buffer;
/// the constructor and deserializer both enforce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawMesh")]
pub struct TriangleMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<Triangle>,
}

#[derive(Deserialize)]
struct RawMesh {
    vertices: Vec<Point3<f64>>,
    #[serde(default)]
    triangles: Vec<Triangle>,
}

impl TryFrom<RawMesh> for TriangleMesh {
    type Error = ClashError;

    fn try_from(raw: RawMesh) -> Result<Self> {
        Self::new(raw.vertices, raw.triangles)
    }
}

impl TriangleMesh {
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Result<Self> {
        let vertex_count = vertices.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.indices.iter().find(|&&i| i >= vertex_count) {
                return Err(ClashError::IndexOutOfRange {
                    triangle,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// For generators whose indices are valid by construction
    pub(crate) fn from_trusted(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Self {
        debug_assert!(triangles
            .iter()
            .all(|tri| tri.indices.iter().all(|&i| i < vertices.len())));
        Self {
            vertices,
            triangles,
        }
    }

    /// Build from plain index triples
    pub fn from_indexed(vertices: Vec<Point3<f64>>, indices: &[[usize; 3]]) -> Result<Self> {
        Self::new(vertices, indices.iter().copied().map(Triangle::new).collect())
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Positions of the triangle at `index`.
    ///
    /// Panics if `index` is out of range, like slice indexing.
    pub fn triangle_points(&self, index: usize) -> [Point3<f64>; 3] {
        self.triangles[index].indices.map(|i| self.vertices[i])
    }

    pub fn triangle_iter(&self) -> impl Iterator<Item = [Point3<f64>; 3]> + '_ {
        self.triangles
            .iter()
            .map(move |tri| tri.indices.map(|i| self.vertices[i]))
    }

    /// Unit face normal, or zero for a degenerate triangle
    pub fn face_normal(&self, index: usize) -> Vector3<f64> {
        let [a, b, c] = self.triangle_points(index);
        (b - a)
            .cross(&(c - a))
            .try_normalize(0.0)
            .unwrap_or_else(Vector3::zeros)
    }

    /// New mesh with every vertex mapped through `matrix`; topology is unchanged.
    pub fn transformed(&self, matrix: &Transform) -> TriangleMesh {
        Self {
            vertices: self
                .vertices
                .iter()
                .map(|p| matrix.transform_point(p))
                .collect(),
            triangles: self.triangles.clone(),
        }
    }

    pub fn bounding_box(&self) -> Result<BoundingBox> {
        BoundingBox::from_points(&self.vertices)
    }

    /// Whether every vertex coordinate is finite
    pub fn is_finite(&self) -> bool {
        self.vertices
            .iter()
            .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
    }

    /// Concatenate with another mesh (no CSG): vertex buffers are appended and
    /// the other mesh's indices shifted past this mesh's vertices.
    pub fn merge(&self, other: &TriangleMesh) -> TriangleMesh {
        let mut merged = Self {
            vertices: Vec::with_capacity(self.vertex_count() + other.vertex_count()),
            triangles: Vec::with_capacity(self.triangle_count() + other.triangle_count()),
        };
        merged.append(self);
        merged.append(other);
        merged
    }

    /// Concatenate any number of meshes
    pub fn combine_all<'a>(meshes: impl IntoIterator<Item = &'a TriangleMesh>) -> TriangleMesh {
        let mut combined = Self::empty();
        for mesh in meshes {
            combined.append(mesh);
        }
        combined
    }

    fn append(&mut self, other: &TriangleMesh) {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&other.vertices);
        self.triangles
            .extend(other.triangles.iter().map(|tri| tri.offset(offset)));
    }
}

/// Place a mesh in world space; see [`TriangleMesh::transformed`].
pub fn transform_mesh(mesh: &TriangleMesh, world: &Transform) -> TriangleMesh {
    mesh.transformed(world)
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Matrix4, Vector3};

    fn single_triangle() -> TriangleMesh {
        TriangleMesh::from_indexed(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            &[[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_out_of_range_index() {
        let err = TriangleMesh::from_indexed(vec![Point3::origin(); 3], &[[0, 1, 2], [1, 2, 3]])
            .unwrap_err();
        assert_eq!(
            err,
            ClashError::IndexOutOfRange {
                triangle: 1,
                index: 3,
                vertex_count: 3
            }
        );
    }

    #[test]
    fn test_transformed_preserves_topology() {
        let mesh = single_triangle();
        let matrix = Matrix4::new_translation(&Vector3::new(5.0, -2.0, 1.0));
        let moved = mesh.transformed(&matrix);

        assert_eq!(moved.triangles(), mesh.triangles());
        assert_eq!(moved.vertices()[1], Point3::new(6.0, -2.0, 1.0));
        // Source is untouched
        assert_eq!(mesh.vertices()[1], Point3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_transform_composition() {
        let mesh = single_triangle();
        let t1 = Matrix4::new_rotation(Vector3::new(0.0, 0.0, std::f64::consts::FRAC_PI_2));
        let t2 = Matrix4::new_translation(&Vector3::new(1.0, 2.0, 3.0));

        let stepwise = mesh.transformed(&t1).transformed(&t2);
        let composed = mesh.transformed(&(t2 * t1));
        for (a, b) in stepwise.vertices().iter().zip(composed.vertices()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_merge_offsets_indices() {
        let a = single_triangle();
        let b = a.transformed(&Matrix4::new_translation(&Vector3::new(0.0, 0.0, 1.0)));
        let merged = a.merge(&b);

        assert_eq!(merged.vertex_count(), 6);
        assert_eq!(merged.triangle_count(), 2);
        assert_eq!(merged.triangles()[1].indices, [3, 4, 5]);
        assert_eq!(merged.triangle_points(1), b.triangle_points(0));
    }

    #[test]
    fn test_combine_all_matches_merge() {
        let a = single_triangle();
        let b = single_triangle();
        assert_eq!(TriangleMesh::combine_all([&a, &b]), a.merge(&b));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: TriangleMesh =
            serde_json::from_str(r#"{"vertices":[[0,0,0],[1,0,0],[0,1,0]],"triangles":[[0,1,2]]}"#)
                .unwrap();
        assert_eq!(ok.triangle_count(), 1);

        let bad = serde_json::from_str::<TriangleMesh>(
            r#"{"vertices":[[0,0,0]],"triangles":[[0,1,2]]}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_face_normal() {
        let mesh = single_triangle();
        assert_relative_eq!(mesh.face_normal(0), Vector3::z());
    }
}
