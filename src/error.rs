// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for clash detection

use thiserror::Error;

/// Errors raised by the clash kernel.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClashError {
    /// Bounds were requested for an empty point set.
    #[error("cannot compute a bounding box for an empty point set")]
    EmptyPointSet,

    /// A triangle references a vertex outside its own mesh.
    #[error(
        "triangle {triangle} references vertex {index}, \
         but the mesh has {vertex_count} vertices"
    )]
    IndexOutOfRange {
        /// Offending triangle.
        triangle: usize,
        /// Out-of-range vertex index.
        index: usize,
        /// Size of the mesh's vertex buffer.
        vertex_count: usize,
    },

    /// Narrow-phase tolerance is negative or not finite.
    #[error("invalid tolerance {0}: must be finite and non-negative")]
    InvalidTolerance(f64),

    /// The caller cancelled a running detection.
    #[error("clash detection cancelled")]
    Cancelled,
}

impl ClashError {
    /// Whether this error reports malformed caller input.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::EmptyPointSet | Self::IndexOutOfRange { .. } | Self::InvalidTolerance(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, ClashError>;
