// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ exporter

use crate::geometry::TriangleMesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write `mesh` as OBJ text: one `v` line per vertex, one 1-based `f` line
/// per triangle.
pub fn write_obj<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
    writeln!(writer, "# polyframe-clash")?;
    writeln!(
        writer,
        "# {} vertices, {} triangles",
        mesh.vertex_count(),
        mesh.triangle_count()
    )?;

    for v in mesh.vertices() {
        writeln!(writer, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for tri in mesh.triangles() {
        let [a, b, c] = tri.indices;
        writeln!(writer, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    Ok(())
}

/// Export mesh to an OBJ file
pub fn export_obj(mesh: &TriangleMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create OBJ file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    write_obj(mesh, &mut writer)
        .with_context(|| format!("Failed to write OBJ file: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}
