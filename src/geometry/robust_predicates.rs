// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Tolerance-aware geometric predicates for the narrow phase

use nalgebra::{Point3, Vector3};

/// Classify point relative to plane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaneClassification {
    Front,   // Point is on positive side
    Back,    // Point is on negative side
    OnPlane, // Within tolerance of the plane
}

impl PlaneClassification {
    pub fn sign(self) -> i8 {
        match self {
            Self::Front => 1,
            Self::Back => -1,
            Self::OnPlane => 0,
        }
    }
}

/// Snap a signed distance to a side of the plane
pub fn classify_distance(distance: f64, eps: f64) -> PlaneClassification {
    if distance > eps {
        PlaneClassification::Front
    } else if distance < -eps {
        PlaneClassification::Back
    } else {
        PlaneClassification::OnPlane
    }
}

/// Signed distance from `point` to the plane through `origin` with unit `normal`.
///
/// Terms are summed largest-first with Kahan compensation; near-coplanar
/// vertices are exactly the ones whose sign matters.
pub fn signed_distance(point: &Point3<f64>, origin: &Point3<f64>, normal: &Vector3<f64>) -> f64 {
    let offset = point - origin;
    compensated_dot(normal, &offset)
}

fn compensated_dot(v: &Vector3<f64>, w: &Vector3<f64>) -> f64 {
    let mut terms = [v.x * w.x, v.y * w.y, v.z * w.z];
    terms.sort_by(|a, b| b.abs().total_cmp(&a.abs()));

    let mut sum = 0.0;
    let mut c = 0.0;
    for &term in &terms {
        let y = term - c;
        let t = sum + y;
        c = (t - sum) - y;
        sum = t;
    }
    sum
}

/// Unnormalized normal `(b - a) x (c - a)`; its length is twice the area
pub fn triangle_normal(triangle: &[Point3<f64>; 3]) -> Vector3<f64> {
    (triangle[1] - triangle[0]).cross(&(triangle[2] - triangle[0]))
}

pub fn triangle_area(triangle: &[Point3<f64>; 3]) -> f64 {
    triangle_normal(triangle).norm() / 2.0
}

/// Zero-area test: twice the area is compared against `eps` times the
/// triangle's longest edge, i.e. the height must exceed `eps`.
pub fn is_degenerate(triangle: &[Point3<f64>; 3], eps: f64) -> bool {
    let longest = (0..3)
        .map(|i| (triangle[(i + 1) % 3] - triangle[i]).norm())
        .fold(0.0, f64::max);
    triangle_normal(triangle).norm() <= eps * longest || longest == 0.0
}

/// Whether `point` lies on the surface of a non-degenerate triangle, within
/// `eps` of its plane and no more than `eps` outside any edge.
pub fn point_near_triangle(point: &Point3<f64>, triangle: &[Point3<f64>; 3], eps: f64) -> bool {
    let Some(normal) = triangle_normal(triangle).try_normalize(0.0) else {
        return false;
    };

    if signed_distance(point, &triangle[0], &normal).abs() > eps {
        return false;
    }

    (0..3).all(|i| {
        let start = triangle[i];
        let edge = triangle[(i + 1) % 3] - start;
        // Inward edge normal in the triangle's plane
        match normal.cross(&edge).try_normalize(0.0) {
            Some(inward) => inward.dot(&(point - start)) >= -eps,
            None => false,
        }
    })
}
