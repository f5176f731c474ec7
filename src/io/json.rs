// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! JSON mesh documents
//!
//! A document is either one mesh object or an array of meshes, using the
//! serde layout of [`Mesh`].

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum MeshDocument {
    Many(Vec<Mesh>),
    One(Box<Mesh>),
}

/// Parse a JSON document into meshes
pub fn parse_json(source: &str) -> Result<Vec<Mesh>> {
    let document: MeshDocument =
        serde_json::from_str(source).context("Failed to parse mesh JSON")?;
    Ok(match document {
        MeshDocument::Many(meshes) => meshes,
        MeshDocument::One(mesh) => vec![*mesh],
    })
}

/// Read a JSON mesh file
pub fn import_json(path: &Path) -> Result<Vec<Mesh>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;
    let mut meshes =
        parse_json(&source).with_context(|| format!("Invalid mesh file: {}", path.display()))?;

    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for mesh in meshes.iter_mut().filter(|m| m.name.is_empty()) {
        mesh.name = stem.clone();
    }
    Ok(meshes)
}

/// Write pieces as a pretty-printed JSON array
pub fn export_json(pieces: &[Mesh], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(pieces).context("Failed to serialize meshes")?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write JSON file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Face;
    use nalgebra::{Matrix4, Point3, Vector3};
    use tempfile::NamedTempFile;

    #[test]
    fn test_single_object_document() -> Result<()> {
        let source = r#"{
            "positions": [[0, 0, 0], [1, 0, 0], [0, 1, 0]],
            "faces": [{ "vertices": [0, 1, 2], "material": 0 }],
            "materials": ["clay"]
        }"#;

        let meshes = parse_json(source)?;
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].faces[0].material, Some(0));
        assert_eq!(meshes[0].transform, Matrix4::identity());
        Ok(())
    }

    #[test]
    fn test_transform_survives_file_round_trip() -> Result<()> {
        let mut mesh = Mesh::new("tri");
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_face(Face::new(vec![0, 1, 2]));
        mesh.transform = Matrix4::new_translation(&Vector3::new(1.5, -2.0, 0.25));

        let file = NamedTempFile::with_suffix(".json")?;
        export_json(std::slice::from_ref(&mesh), file.path())?;
        let loaded = import_json(file.path())?;

        assert_eq!(loaded, vec![mesh]);
        Ok(())
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_json("{\"faces\": 3}").is_err());
    }
}
