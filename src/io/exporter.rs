// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Binary STL exporter

use crate::geometry::TriangleMesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

fn to_stl_triangles(mesh: &TriangleMesh) -> Vec<StlTriangle> {
    (0..mesh.triangle_count())
        .map(|i| {
            // Facet normals come from the world-space winding
            let n = mesh.face_normal(i);
            let [a, b, c] = mesh.triangle_points(i);
            StlTriangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [
                    StlVertex::new([a.x as f32, a.y as f32, a.z as f32]),
                    StlVertex::new([b.x as f32, b.y as f32, b.z as f32]),
                    StlVertex::new([c.x as f32, c.y as f32, c.z as f32]),
                ],
            }
        })
        .collect()
}

/// Write `mesh` as binary STL
pub fn write_stl<W: Write>(mesh: &TriangleMesh, writer: &mut W) -> Result<()> {
    let triangles = to_stl_triangles(mesh);
    stl_io::write_stl(writer, triangles.iter()).context("STL export error")?;
    Ok(())
}

/// Export mesh to a binary STL file
pub fn export_stl(mesh: &TriangleMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    write_stl(mesh, &mut writer)
        .with_context(|| format!("Failed to write STL file: {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use std::io::Cursor;

    #[test]
    fn test_stl_roundtrip_counts() -> Result<()> {
        let mesh = Primitive::unit_cube().to_mesh();
        let mut buffer = Vec::new();
        write_stl(&mesh, &mut buffer)?;

        // 80-byte header + u32 count + 50 bytes per facet
        assert_eq!(buffer.len(), 84 + 50 * 12);

        let read = stl_io::read_stl(&mut Cursor::new(buffer))?;
        assert_eq!(read.faces.len(), 12);
        assert_eq!(read.vertices.len(), 8);
        Ok(())
    }

    #[test]
    fn test_export_stl_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("tet.stl");
        export_stl(&Primitive::tetrahedron(2.0).to_mesh(), &path)?;

        let mut file = File::open(&path)?;
        let read = stl_io::read_stl(&mut file)?;
        assert_eq!(read.faces.len(), 4);
        Ok(())
    }
}
