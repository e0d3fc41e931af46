// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Math utilities

use nalgebra::{Point3, Vector3};

/// Linear interpolation
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Arithmetic mean of a set of points; the origin for an empty set
pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point3<f64>>) -> Point3<f64> {
    let (sum, count) = points
        .into_iter()
        .fold((Vector3::zeros(), 0usize), |(sum, count), p| (sum + p.coords, count + 1));
    if count == 0 {
        Point3::origin()
    } else {
        Point3::from(sum / count as f64)
    }
}
