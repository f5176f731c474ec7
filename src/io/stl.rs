// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and per-piece export

use super::unique_stem;
use crate::geometry::{Face, Mesh};
use ahash::AHashSet;
use anyhow::{Context, Result};
use nalgebra::Point3;
use std::fs::File;
use std::path::{Path, PathBuf};
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::debug;

/// Read an STL file into a mesh with shared vertices
///
/// STL carries no materials, so every face is unassigned.
pub fn import_stl(path: &Path) -> Result<Mesh> {
    let mut file =
        File::open(path).with_context(|| format!("Failed to open STL file: {}", path.display()))?;
    let stl = stl_io::read_stl(&mut file)
        .with_context(|| format!("Failed to read STL file: {}", path.display()))?;

    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut mesh = Mesh::with_capacity(name, stl.vertices.len(), stl.faces.len());

    // stl_io returns an IndexedMesh with vertices and faces
    for v in &stl.vertices {
        mesh.add_vertex(Point3::new(v[0] as f64, v[1] as f64, v[2] as f64));
    }
    for face in &stl.faces {
        mesh.add_face(Face::triangle(face.vertices));
    }

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "imported STL"
    );
    Ok(mesh)
}

/// Build world-space STL triangles for a mesh, fan-triangulating polygons
pub fn stl_triangles(mesh: &Mesh) -> Vec<StlTriangle> {
    let world = mesh.world_positions();
    let vertex = |p: &Point3<f64>| StlVertex::new([p.x as f32, p.y as f32, p.z as f32]);

    mesh.faces
        .iter()
        .flat_map(|face| face.triangles())
        .map(|[a, b, c]| {
            let (pa, pb, pc) = (&world[a], &world[b], &world[c]);
            let n = (pb - pa).cross(&(pc - pa));
            let n = n.try_normalize(f64::EPSILON).unwrap_or(n);
            StlTriangle {
                normal: Normal::new([n.x as f32, n.y as f32, n.z as f32]),
                vertices: [vertex(pa), vertex(pb), vertex(pc)],
            }
        })
        .collect()
}

/// Write each piece to `<dir>/<piece name>.stl` in world space
///
/// Repeated piece names get a `-2`, `-3`, ... suffix so no file is
/// written twice.
pub fn export_stl(pieces: &[Mesh], dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    let mut used = AHashSet::new();
    let mut written = Vec::with_capacity(pieces.len());
    for (index, piece) in pieces.iter().enumerate() {
        let stem = if piece.name.is_empty() {
            format!("piece.{:03}", index + 1)
        } else {
            sanitize(&piece.name)
        };
        let path = dir.join(format!("{}.stl", unique_stem(&mut used, &stem)));

        let mut file = File::create(&path)
            .with_context(|| format!("Failed to create STL file: {}", path.display()))?;
        stl_io::write_stl(&mut file, stl_triangles(piece).iter())
            .with_context(|| format!("Failed to write STL file: {}", path.display()))?;
        written.push(path);
    }

    Ok(written)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::{Matrix4, Vector3};
    use tempfile::tempdir;

    fn quad(name: &str) -> Mesh {
        let mut mesh = Mesh::new(name);
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(Face::new(vec![0, 1, 2, 3]));
        mesh
    }

    #[test]
    fn test_triangles_are_world_space() {
        let mut mesh = quad("q");
        mesh.transform = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 4.0));

        let tris = stl_triangles(&mesh);
        assert_eq!(tris.len(), 2);
        assert_eq!(tris[0].vertices[2][2], 4.0);
        assert_eq!(tris[0].normal[2], 1.0);
    }

    #[test]
    fn test_export_and_reimport() -> Result<()> {
        let dir = tempdir()?;
        let written = export_stl(&[quad("a.001"), quad("a/002")], dir.path())?;

        assert_eq!(written.len(), 2);
        assert!(written[1].ends_with("a_002.stl"));

        let mesh = import_stl(&written[0])?;
        assert_eq!(mesh.name, "a.001");
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.face_count(), 2);
        Ok(())
    }

    #[test]
    fn test_repeated_names_get_distinct_files() -> Result<()> {
        let dir = tempdir()?;
        let pieces = [quad("part.001"), quad("part.001"), quad("PART.001")];
        let written = export_stl(&pieces, dir.path())?;

        assert!(written[0].ends_with("part.001.stl"));
        assert!(written[1].ends_with("part.001-2.stl"));
        assert!(written[2].ends_with("PART.001-3.stl"));
        for path in &written {
            assert!(path.exists());
        }
        Ok(())
    }
}
