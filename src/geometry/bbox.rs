// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Axis-aligned bounding boxes and the broad-phase overlap test

use crate::error::{ClashError, Result};
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in world space.
///
/// Always built from at least one point, so `min <= max` holds component-wise
/// for finite input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub min: Point3<f64>,
    pub max: Point3<f64>,
}

impl BoundingBox {
    pub fn new(min: Point3<f64>, max: Point3<f64>) -> Self {
        Self { min, max }
    }

    /// Box around a single point.
    pub fn from_point(point: &Point3<f64>) -> Self {
        Self {
            min: *point,
            max: *point,
        }
    }

    /// Exact component-wise extrema of a point set in one pass.
    pub fn from_points(points: &[Point3<f64>]) -> Result<Self> {
        let (first, rest) = points.split_first().ok_or(ClashError::EmptyPointSet)?;

        let mut bbox = Self::from_point(first);
        for point in rest {
            bbox.expand_to_include(point);
        }
        Ok(bbox)
    }

    pub fn from_triangle(triangle: &[Point3<f64>; 3]) -> Self {
        let mut bbox = Self::from_point(&triangle[0]);
        bbox.expand_to_include(&triangle[1]);
        bbox.expand_to_include(&triangle[2]);
        bbox
    }

    pub fn expand_to_include(&mut self, point: &Point3<f64>) {
        self.min.x = self.min.x.min(point.x);
        self.min.y = self.min.y.min(point.y);
        self.min.z = self.min.z.min(point.z);

        self.max.x = self.max.x.max(point.x);
        self.max.y = self.max.y.max(point.y);
        self.max.z = self.max.z.max(point.z);
    }

    /// Inclusive overlap test: boxes sharing only a boundary plane overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && other.min.x <= self.max.x
            && self.min.y <= other.max.y
            && other.min.y <= self.max.y
            && self.min.z <= other.max.z
            && other.min.z <= self.max.z
    }

    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut bbox = *self;
        bbox.expand_to_include(&other.min);
        bbox.expand_to_include(&other.max);
        bbox
    }

    pub fn center(&self) -> Point3<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    pub fn size(&self) -> Vector3<f64> {
        self.max - self.min
    }

    /// Length of the longest side.
    pub fn max_extent(&self) -> f64 {
        self.size().max()
    }

    /// Index of the longest axis (0 = x, 1 = y, 2 = z).
    pub fn longest_axis(&self) -> usize {
        let size = self.size();
        if size.x >= size.y && size.x >= size.z {
            0
        } else if size.y >= size.z {
            1
        } else {
            2
        }
    }

    pub fn is_finite(&self) -> bool {
        self.min.iter().chain(self.max.iter()).all(|c| c.is_finite())
    }

    /// Check if two bounding boxes are approximately equal within tolerance
    pub fn approx_eq(&self, other: &BoundingBox, tolerance: f64) -> bool {
        (self.min - other.min).amax() < tolerance && (self.max - other.max).amax() < tolerance
    }
}
