// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! GLTF/GLB exporter
//!
//! Every piece becomes one node carrying the piece's transform, so the
//! pieces stay where the source mesh was. Faces are fan-triangulated and
//! split into one primitive per material.

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use nalgebra::Matrix4;
use serde_json::{json, Value};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

const FLOAT: u32 = 5126;
const UNSIGNED_INT: u32 = 5125;
const ARRAY_BUFFER: u32 = 34962;
const ELEMENT_ARRAY_BUFFER: u32 = 34963;
const TRIANGLES: u32 = 4;

/// Export pieces to GLTF or GLB format, chosen by extension
pub fn export_gltf(pieces: &[Mesh], path: &Path) -> Result<()> {
    let is_glb = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("glb"));
    if is_glb {
        export_glb(pieces, path)
    } else {
        export_gltf_separate(pieces, path).map(|_| ())
    }
}

/// Export pieces to GLB (binary GLTF)
pub(crate) fn export_glb(pieces: &[Mesh], path: &Path) -> Result<()> {
    let (gltf_json_val, buffer_data) = create_gltf_json(pieces, None);

    let json_string = serde_json::to_string(&gltf_json_val)?;
    let mut json_offset = json_string.len();
    align_to_multiple_of_four(&mut json_offset);
    let json_padding = json_offset - json_string.len();

    let mut buffer_offset = buffer_data.len();
    align_to_multiple_of_four(&mut buffer_offset);
    let buffer_padding = buffer_offset - buffer_data.len();

    // the BIN chunk is left out when no piece has faces
    let bin_chunk = if buffer_data.is_empty() {
        0
    } else {
        8 + buffer_offset
    };
    let total_length = 12 + 8 + json_offset + bin_chunk;

    let mut file = File::create(path)
        .with_context(|| format!("Failed to create GLB file: {}", path.display()))?;

    // GLB header
    file.write_all(&0x46546C67u32.to_le_bytes())?; // magic: "glTF"
    file.write_all(&2u32.to_le_bytes())?; // version
    file.write_all(&(total_length as u32).to_le_bytes())?;

    // JSON chunk
    file.write_all(&(json_offset as u32).to_le_bytes())?;
    file.write_all(&0x4E4F534Au32.to_le_bytes())?; // type: "JSON"
    file.write_all(json_string.as_bytes())?;
    file.write_all(&vec![b' '; json_padding])?;

    // BIN chunk
    if !buffer_data.is_empty() {
        file.write_all(&(buffer_offset as u32).to_le_bytes())?;
        file.write_all(&0x004E4942u32.to_le_bytes())?; // type: "BIN\0"
        file.write_all(&buffer_data)?;
        file.write_all(&vec![0u8; buffer_padding])?;
    }

    Ok(())
}

/// Export pieces to GLTF with a separate .bin file next to it
///
/// Returns the files written; the .bin is skipped when no piece has faces.
pub(crate) fn export_gltf_separate(pieces: &[Mesh], path: &Path) -> Result<Vec<PathBuf>> {
    let bin_path = path.with_extension("bin");
    let bin_name = bin_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data.bin".to_string());

    let (gltf_json_val, buffer_data) = create_gltf_json(pieces, Some(&bin_name));

    let json_string = serde_json::to_string_pretty(&gltf_json_val)?;
    std::fs::write(path, json_string)
        .with_context(|| format!("Failed to write GLTF file: {}", path.display()))?;

    let mut written = vec![path.to_path_buf()];
    if !buffer_data.is_empty() {
        std::fs::write(&bin_path, buffer_data)
            .with_context(|| format!("Failed to write GLTF buffer: {}", bin_path.display()))?;
        written.push(bin_path);
    }
    Ok(written)
}

struct Builder {
    buffer: Vec<u8>,
    views: Vec<Value>,
    accessors: Vec<Value>,
}

impl Builder {
    fn push_view(&mut self, bytes: &[u8], target: u32) -> usize {
        let offset = self.buffer.len();
        self.buffer.extend_from_slice(bytes);
        self.views.push(json!({
            "buffer": 0,
            "byteOffset": offset,
            "byteLength": bytes.len(),
            "target": target
        }));
        self.views.len() - 1
    }

    fn push_accessor(&mut self, accessor: Value) -> usize {
        self.accessors.push(accessor);
        self.accessors.len() - 1
    }
}

fn create_gltf_json(pieces: &[Mesh], uri: Option<&str>) -> (Value, Vec<u8>) {
    let mut builder = Builder {
        buffer: Vec::new(),
        views: Vec::new(),
        accessors: Vec::new(),
    };
    let mut material_names: Vec<String> = Vec::new();
    let mut meshes = Vec::with_capacity(pieces.len());
    let mut nodes = Vec::with_capacity(pieces.len());

    for piece in pieces {
        let mut node = json!({ "name": piece.name });
        if piece.transform != Matrix4::identity() {
            // glTF matrices are column-major, like nalgebra storage
            node["matrix"] = json!(piece.transform.as_slice());
        }

        // a piece without faces (a kept orphan vertex) is a bare node
        if piece.faces.is_empty() {
            nodes.push(node);
            continue;
        }

        // Write positions
        let mut bytes = Vec::with_capacity(piece.vertex_count() * 12);
        for p in &piece.positions {
            bytes.extend_from_slice(&(p.x as f32).to_le_bytes());
            bytes.extend_from_slice(&(p.y as f32).to_le_bytes());
            bytes.extend_from_slice(&(p.z as f32).to_le_bytes());
        }
        let (min_pos, max_pos) = calculate_bounds(piece);
        let view = builder.push_view(&bytes, ARRAY_BUFFER);
        let position_accessor = builder.push_accessor(json!({
            "bufferView": view,
            "byteOffset": 0,
            "componentType": FLOAT,
            "count": piece.vertex_count(),
            "type": "VEC3",
            "min": min_pos,
            "max": max_pos
        }));

        // One primitive per material, in order of first use
        let mut groups: Vec<(Option<u32>, Vec<u8>)> = Vec::new();
        for face in &piece.faces {
            let slot = match groups.iter().position(|(m, _)| *m == face.material) {
                Some(slot) => slot,
                None => {
                    groups.push((face.material, Vec::new()));
                    groups.len() - 1
                }
            };
            for triangle in face.triangles() {
                for index in triangle {
                    groups[slot].1.extend_from_slice(&(index as u32).to_le_bytes());
                }
            }
        }

        let mut primitives = Vec::with_capacity(groups.len());
        for (material, indices) in groups {
            let view = builder.push_view(&indices, ELEMENT_ARRAY_BUFFER);
            let accessor = builder.push_accessor(json!({
                "bufferView": view,
                "byteOffset": 0,
                "componentType": UNSIGNED_INT,
                "count": indices.len() / 4,
                "type": "SCALAR"
            }));

            let mut primitive = json!({
                "attributes": { "POSITION": position_accessor },
                "indices": accessor,
                "mode": TRIANGLES
            });
            if let Some(index) = material {
                let name = piece
                    .materials
                    .get(index as usize)
                    .cloned()
                    .unwrap_or_else(|| format!("material_{}", index));
                let global = match material_names.iter().position(|n| *n == name) {
                    Some(global) => global,
                    None => {
                        material_names.push(name);
                        material_names.len() - 1
                    }
                };
                primitive["material"] = json!(global);
            }
            primitives.push(primitive);
        }

        node["mesh"] = json!(meshes.len());
        meshes.push(json!({ "name": piece.name, "primitives": primitives }));
        nodes.push(node);
    }

    // Build GLTF JSON
    let mut gltf = json!({
        "asset": {
            "generator": format!("meshsplit {}", env!("CARGO_PKG_VERSION")),
            "version": "2.0"
        }
    });

    // top-level arrays must not be empty
    if !nodes.is_empty() {
        gltf["scene"] = json!(0);
        gltf["scenes"] = json!([{ "nodes": (0..nodes.len()).collect::<Vec<_>>() }]);
        gltf["nodes"] = json!(nodes);
    }
    if !meshes.is_empty() {
        let mut buffer = json!({ "byteLength": builder.buffer.len() });
        if let Some(uri) = uri {
            buffer["uri"] = json!(uri);
        }
        gltf["meshes"] = json!(meshes);
        gltf["accessors"] = json!(builder.accessors);
        gltf["bufferViews"] = json!(builder.views);
        gltf["buffers"] = json!([buffer]);
    }
    if !material_names.is_empty() {
        let materials: Vec<Value> = material_names
            .iter()
            .map(|name| json!({ "name": name }))
            .collect();
        gltf["materials"] = json!(materials);
    }

    (gltf, builder.buffer)
}

fn calculate_bounds(mesh: &Mesh) -> ([f32; 3], [f32; 3]) {
    let bbox = mesh.bounding_box();
    if bbox.is_empty() {
        return ([0.0; 3], [0.0; 3]);
    }
    (
        [bbox.min.x as f32, bbox.min.y as f32, bbox.min.z as f32],
        [bbox.max.x as f32, bbox.max.y as f32, bbox.max.z as f32],
    )
}

fn align_to_multiple_of_four(n: &mut usize) {
    *n = (*n + 3) & !3;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Face;
    use nalgebra::{Point3, Vector3};
    use tempfile::tempdir;

    fn pieces() -> Vec<Mesh> {
        let mut a = Mesh::new("part.001");
        a.add_vertex(Point3::new(0.0, 0.0, 0.0));
        a.add_vertex(Point3::new(1.0, 0.0, 0.0));
        a.add_vertex(Point3::new(1.0, 1.0, 0.0));
        a.add_vertex(Point3::new(0.0, 1.0, 0.0));
        a.materials = vec!["red".into(), "blue".into()];
        a.add_face(Face::with_material(vec![0, 1, 2], 1));
        a.add_face(Face::with_material(vec![0, 2, 3], 0));

        let mut b = a.clone();
        b.name = "part.002".into();
        b.faces.truncate(1);
        b.transform = Matrix4::new_translation(&Vector3::new(3.0, 0.0, 0.0));
        vec![a, b]
    }

    #[test]
    fn test_export_glb() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pieces.glb");
        export_gltf(&pieces(), &path)?;

        // Verify GLB header
        let file_content = std::fs::read(&path)?;
        assert_eq!(&file_content[0..4], b"glTF");
        assert_eq!(file_content.len() % 4, 0);
        Ok(())
    }

    #[test]
    fn test_export_gltf_nodes_and_materials() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("pieces.gltf");
        export_gltf(&pieces(), &path)?;

        assert!(dir.path().join("pieces.bin").exists());
        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

        assert_eq!(doc["buffers"][0]["uri"], "pieces.bin");
        assert_eq!(doc["nodes"].as_array().map(Vec::len), Some(2));
        assert!(doc["nodes"][0].get("matrix").is_none());
        assert_eq!(doc["nodes"][1]["matrix"][12], 3.0);

        // blue is used first, so it becomes material 0
        assert_eq!(doc["materials"][0]["name"], "blue");
        assert_eq!(doc["meshes"][0]["primitives"].as_array().map(Vec::len), Some(2));
        assert_eq!(doc["meshes"][0]["primitives"][1]["material"], 1);
        Ok(())
    }

    fn has_empty_array(value: &Value) -> bool {
        match value {
            Value::Array(items) => items.is_empty() || items.iter().any(has_empty_array),
            Value::Object(fields) => fields.values().any(has_empty_array),
            _ => false,
        }
    }

    #[test]
    fn test_kept_orphans_export_without_empty_arrays() -> Result<()> {
        use crate::config::SplitConfig;
        use crate::partition::OrphanPolicy;

        let mut mesh = Mesh::new("tri");
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_vertex(Point3::new(5.0, 5.0, 5.0));
        mesh.add_face(Face::triangle([0, 1, 2]));

        let config = SplitConfig {
            orphans: OrphanPolicy::Keep,
            ..SplitConfig::default()
        };
        let pieces = crate::split::split(&mesh, &config)?;
        assert_eq!(pieces.len(), 2);
        assert!(pieces[1].faces.is_empty());

        let dir = tempdir()?;
        let path = dir.path().join("pieces.gltf");
        let written = export_gltf_separate(&pieces, &path)?;
        assert_eq!(written.len(), 2);

        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
        assert!(!has_empty_array(&doc));
        assert!(doc.get("materials").is_none());
        assert_eq!(doc["meshes"].as_array().map(Vec::len), Some(1));
        assert_eq!(doc["nodes"][0]["mesh"], 0);
        assert!(doc["nodes"][1].get("mesh").is_none());
        Ok(())
    }

    #[test]
    fn test_faceless_pieces_write_no_buffer() -> Result<()> {
        let mut lone = Mesh::new("tri.002");
        lone.add_vertex(Point3::new(5.0, 5.0, 5.0));

        let dir = tempdir()?;
        let gltf_path = dir.path().join("lone.gltf");
        assert_eq!(export_gltf_separate(&[lone.clone()], &gltf_path)?, vec![gltf_path.clone()]);
        assert!(!dir.path().join("lone.bin").exists());
        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&gltf_path)?)?;
        assert!(!has_empty_array(&doc));
        assert!(doc.get("buffers").is_none());

        let glb_path = dir.path().join("lone.glb");
        export_glb(&[lone], &glb_path)?;
        let bytes = std::fs::read(&glb_path)?;
        let declared = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let json_length = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);
        assert_eq!(declared as usize, bytes.len());
        assert_eq!(bytes.len(), 20 + json_length as usize);
        Ok(())
    }
}
