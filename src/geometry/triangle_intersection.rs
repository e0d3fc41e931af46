// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle-triangle intersection test (narrow phase)
//!
//! Plane-separation rejection followed by interval overlap along the line
//! where the two supporting planes meet. Coplanar pairs fall back to a 2-D
//! separating-axis test. Every comparison is inclusive within a tolerance
//! scaled by the pair's bounding extent, so faces generated to share an edge
//! or vertex are reported as touching.

use super::robust_predicates::{
    classify_distance, is_degenerate, point_near_triangle, signed_distance, triangle_normal,
};
use super::BoundingBox;
use crate::error::{ClashError, Result};
use crate::utils::math::{centroid, lerp};
use nalgebra::{Point3, Vector2, Vector3};

/// Default relative tolerance (multiplied by the pair's bounding extent)
pub const DEFAULT_TOLERANCE: f64 = 4096.0 * f64::EPSILON;

/// Below this sine of the angle between the planes they are treated as parallel
const PARALLEL_EPS: f64 = 1e-12;

/// How two triangles meet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionType {
    /// No intersection
    None,
    /// Triangles are coplanar and overlap (including shared edges/vertices)
    Coplanar,
    /// Triangles cross or touch along the line where their planes meet
    Crossing,
    /// A zero-area triangle has a vertex on the other triangle's surface
    Degenerate,
}

impl IntersectionType {
    pub fn intersects(self) -> bool {
        self != Self::None
    }
}

/// Narrow-phase tester carrying a validated tolerance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleIntersector {
    tolerance: f64,
}

impl TriangleIntersector {
    pub fn new(tolerance: f64) -> Result<Self> {
        if !tolerance.is_finite() || tolerance < 0.0 {
            return Err(ClashError::InvalidTolerance(tolerance));
        }
        Ok(Self { tolerance })
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn intersects(&self, tri_a: &[Point3<f64>; 3], tri_b: &[Point3<f64>; 3]) -> bool {
        triangles_intersect(tri_a, tri_b, self.tolerance)
    }

    pub fn classify(&self, tri_a: &[Point3<f64>; 3], tri_b: &[Point3<f64>; 3]) -> IntersectionType {
        triangle_triangle_intersection(tri_a, tri_b, self.tolerance)
    }
}

impl Default for TriangleIntersector {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

/// Test if two triangles intersect
pub fn triangles_intersect(
    tri_a: &[Point3<f64>; 3],
    tri_b: &[Point3<f64>; 3],
    tolerance: f64,
) -> bool {
    triangle_triangle_intersection(tri_a, tri_b, tolerance).intersects()
}

/// Classify how two triangles meet.
///
/// Symmetric in its arguments. Any non-finite input or intermediate value
/// yields [`IntersectionType::None`].
pub fn triangle_triangle_intersection(
    tri_a: &[Point3<f64>; 3],
    tri_b: &[Point3<f64>; 3],
    tolerance: f64,
) -> IntersectionType {
    if !is_finite(tri_a) || !is_finite(tri_b) {
        return IntersectionType::None;
    }

    let extent = BoundingBox::from_triangle(tri_a)
        .union(&BoundingBox::from_triangle(tri_b))
        .max_extent();
    let eps = tolerance * extent;
    if !eps.is_finite() {
        return IntersectionType::None;
    }

    match (is_degenerate(tri_a, eps), is_degenerate(tri_b, eps)) {
        (true, true) => return IntersectionType::None,
        (true, false) => return degenerate_contact(tri_a, tri_b, eps),
        (false, true) => return degenerate_contact(tri_b, tri_a, eps),
        (false, false) => {}
    }

    let normal_a = triangle_normal(tri_a).normalize();
    let dist_b = tri_b.map(|p| signed_distance(&p, &tri_a[0], &normal_a));
    let side_b = dist_b.map(|d| classify_distance(d, eps).sign());
    if strictly_one_side(&side_b) {
        return IntersectionType::None;
    }

    let normal_b = triangle_normal(tri_b).normalize();
    let dist_a = tri_a.map(|p| signed_distance(&p, &tri_b[0], &normal_b));
    let side_a = dist_a.map(|d| classify_distance(d, eps).sign());
    if strictly_one_side(&side_a) {
        return IntersectionType::None;
    }

    if side_a == [0; 3] || side_b == [0; 3] {
        return coplanar_overlap(tri_a, tri_b, &normal_a, &normal_b, eps);
    }

    let Some(direction) = normal_a.cross(&normal_b).try_normalize(PARALLEL_EPS) else {
        return coplanar_overlap(tri_a, tri_b, &normal_a, &normal_b, eps);
    };

    // Project relative to the shared centroid so both intervals lose the same
    // amount of precision to the coordinate magnitude.
    let origin = centroid(tri_a.iter().chain(tri_b.iter()));

    let interval_a = line_interval(tri_a, &dist_a, &side_a, &direction, &origin);
    let interval_b = line_interval(tri_b, &dist_b, &side_b, &direction, &origin);

    match (interval_a, interval_b) {
        (Some((min_a, max_a)), Some((min_b, max_b)))
            if min_a <= max_b + eps && min_b <= max_a + eps =>
        {
            IntersectionType::Crossing
        }
        _ => IntersectionType::None,
    }
}

fn is_finite(triangle: &[Point3<f64>; 3]) -> bool {
    triangle
        .iter()
        .all(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
}

fn strictly_one_side(sides: &[i8; 3]) -> bool {
    sides.iter().all(|&s| s > 0) || sides.iter().all(|&s| s < 0)
}

/// Span of the segment where `triangle` meets the other plane, measured along
/// `direction`. Vertices snapped onto the plane contribute directly; edges whose
/// endpoints lie strictly on opposite sides contribute their crossing point.
fn line_interval(
    triangle: &[Point3<f64>; 3],
    dist: &[f64; 3],
    side: &[i8; 3],
    direction: &Vector3<f64>,
    origin: &Point3<f64>,
) -> Option<(f64, f64)> {
    let proj = triangle.map(|p| direction.dot(&(p - origin)));

    let mut interval: Option<(f64, f64)> = None;
    let mut include = |t: f64| {
        interval = Some(match interval {
            None => (t, t),
            Some((lo, hi)) => (lo.min(t), hi.max(t)),
        });
    };

    for i in 0..3 {
        let j = (i + 1) % 3;
        if side[i] == 0 {
            include(proj[i]);
        }
        if side[i] * side[j] < 0 {
            let t = dist[i] / (dist[i] - dist[j]);
            include(lerp(proj[i], proj[j], t));
        }
    }

    interval.filter(|(lo, hi)| lo.is_finite() && hi.is_finite())
}

/// 2-D separating-axis test in the shared plane.
fn coplanar_overlap(
    tri_a: &[Point3<f64>; 3],
    tri_b: &[Point3<f64>; 3],
    normal_a: &Vector3<f64>,
    normal_b: &Vector3<f64>,
    eps: f64,
) -> IntersectionType {
    // Same drop axis regardless of argument order or winding
    let normal = if normal_a.dot(normal_b) >= 0.0 {
        normal_a + normal_b
    } else {
        normal_a - normal_b
    };
    let (i0, i1) = projection_axes(&normal);

    let to_2d = |p: &Point3<f64>| Vector2::new(p[i0], p[i1]);
    let a = tri_a.map(|p| to_2d(&p));
    let b = tri_b.map(|p| to_2d(&p));

    if has_separating_edge(&a, &b, eps) || has_separating_edge(&b, &a, eps) {
        IntersectionType::None
    } else {
        IntersectionType::Coplanar
    }
}

/// Keep the two axes orthogonal to the dominant normal component
fn projection_axes(normal: &Vector3<f64>) -> (usize, usize) {
    let abs_normal = normal.abs();
    if abs_normal.x > abs_normal.y && abs_normal.x > abs_normal.z {
        (1, 2) // Project to YZ plane
    } else if abs_normal.y > abs_normal.z {
        (0, 2) // Project to XZ plane
    } else {
        (0, 1) // Project to XY plane
    }
}

fn has_separating_edge(edges_of: &[Vector2<f64>; 3], other: &[Vector2<f64>; 3], eps: f64) -> bool {
    (0..3).any(|i| {
        let edge = edges_of[(i + 1) % 3] - edges_of[i];
        let Some(axis) = Vector2::new(-edge.y, edge.x).try_normalize(0.0) else {
            return false;
        };
        let (min_1, max_1) = project(&axis, edges_of);
        let (min_2, max_2) = project(&axis, other);
        max_1 < min_2 - eps || max_2 < min_1 - eps
    })
}

fn project(axis: &Vector2<f64>, triangle: &[Vector2<f64>; 3]) -> (f64, f64) {
    triangle.iter().map(|p| axis.dot(p)).fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(lo, hi), t| (lo.min(t), hi.max(t)),
    )
}

/// A zero-area triangle only counts when one of its vertices touches the
/// other triangle's surface.
fn degenerate_contact(
    degenerate: &[Point3<f64>; 3],
    triangle: &[Point3<f64>; 3],
    eps: f64,
) -> IntersectionType {
    if degenerate
        .iter()
        .any(|p| point_near_triangle(p, triangle, eps))
    {
        IntersectionType::Degenerate
    } else {
        IntersectionType::None
    }
}
