// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ reader and writer
//!
//! Only geometry and material assignment are read: `v`, `f`, `usemtl`, `o`
//! and `g`. Texture coordinates, normals and smoothing groups are skipped.
//! `usemtl (null)` clears the current material, which is how the writer
//! records unassigned faces that follow assigned ones.

use crate::error::SplitError;
use crate::geometry::{Face, Mesh};
use crate::materialize::Materializer;
use crate::partition::{Island, IslandGroup};
use anyhow::{anyhow, bail, Context, Result};
use nalgebra::Point3;
use std::fmt::Write as _;
use std::path::Path;
use tracing::{debug, warn};

const NULL_MATERIAL: &str = "(null)";

/// Parse OBJ text into a single mesh
///
/// The first `o` or `g` name found becomes the mesh name.
pub fn parse_obj(source: &str) -> Result<Mesh> {
    Ok(parse(source)?.mesh)
}

/// Parse OBJ text into one mesh per `o` object
///
/// Faces declared before the first `o` statement form an object named after
/// `fallback_name`. Each object keeps only the vertices its faces use.
pub fn parse_obj_objects(source: &str, fallback_name: &str) -> Result<Vec<Mesh>> {
    let parsed = parse(source)?;
    parsed
        .mesh
        .validate()
        .map_err(SplitError::from)
        .context("Invalid OBJ geometry")?;

    if parsed.objects.len() <= 1 {
        let mut mesh = parsed.mesh;
        if let Some(object) = parsed.objects.first() {
            mesh.name = object.name.clone();
        } else if mesh.name.is_empty() {
            mesh.name = fallback_name.to_string();
        }
        return Ok(vec![mesh]);
    }

    let islands: Vec<Island> = parsed
        .objects
        .iter()
        .map(|object| object_island(&parsed.mesh, object))
        .collect();

    let pieces = Materializer::default().materialize(&parsed.mesh, &islands)?;
    Ok(pieces
        .into_iter()
        .zip(&parsed.objects)
        .map(|(piece, object)| {
            let mut mesh = piece.into_mesh();
            mesh.name = if object.name.is_empty() {
                fallback_name.to_string()
            } else {
                object.name.clone()
            };
            mesh
        })
        .collect())
}

/// Read an OBJ file as one mesh per object
pub fn import_obj(path: &Path) -> Result<Vec<Mesh>> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read OBJ file: {}", path.display()))?;
    let fallback = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse_obj_objects(&source, &fallback)
        .with_context(|| format!("Failed to parse OBJ file: {}", path.display()))
}

struct ObjectRange {
    name: String,
    first_face: usize,
    end_face: usize,
}

struct Parsed {
    mesh: Mesh,
    objects: Vec<ObjectRange>,
}

fn object_island(mesh: &Mesh, object: &ObjectRange) -> Island {
    let faces: Vec<usize> = (object.first_face..object.end_face).collect();
    let mut seen = vec![false; mesh.vertex_count()];
    let mut vertices = Vec::new();
    for &face in &faces {
        for &v in &mesh.faces[face].vertices {
            if !seen[v] {
                seen[v] = true;
                vertices.push(v);
            }
        }
    }
    Island::new(IslandGroup::Connected, vertices, faces)
}

fn parse(source: &str) -> Result<Parsed> {
    let mut mesh = Mesh::empty();
    let mut objects: Vec<ObjectRange> = Vec::new();
    let mut material: Option<u32> = None;
    let mut skipped = 0usize;

    for (line_index, raw) in source.lines().enumerate() {
        let line_no = line_index + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }

        let mut tokens = line.split_whitespace();
        let Some(keyword) = tokens.next() else {
            continue;
        };

        match keyword {
            "v" => {
                let coords = tokens
                    .take(3)
                    .map(|t| t.parse::<f64>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .with_context(|| format!("line {}: invalid vertex coordinate", line_no))?;
                if coords.len() != 3 {
                    bail!("line {}: vertex needs three coordinates", line_no);
                }
                mesh.add_vertex(Point3::new(coords[0], coords[1], coords[2]));
            }
            "f" => {
                let vertex_count = mesh.vertex_count();
                let vertices = tokens
                    .map(|t| resolve_index(t, vertex_count))
                    .collect::<Result<Vec<_>>>()
                    .with_context(|| format!("line {}: invalid face", line_no))?;
                mesh.add_face(Face { vertices, material });
                if let Some(object) = objects.last_mut() {
                    object.end_face = mesh.face_count();
                }
            }
            "usemtl" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                material = if name.is_empty() || name == NULL_MATERIAL {
                    None
                } else {
                    Some(mesh.material_slot(&name))
                };
            }
            "o" | "g" => {
                let name = tokens.collect::<Vec<_>>().join(" ");
                if mesh.name.is_empty() {
                    mesh.name = name.clone();
                }
                if keyword == "o" {
                    let start = mesh.face_count();
                    if objects.is_empty() && start > 0 {
                        // faces before the first object get an unnamed object
                        objects.push(ObjectRange {
                            name: String::new(),
                            first_face: 0,
                            end_face: start,
                        });
                    }
                    objects.push(ObjectRange {
                        name,
                        first_face: start,
                        end_face: start,
                    });
                }
            }
            "vt" | "vn" | "vp" | "s" | "mtllib" | "l" | "p" => {
                skipped += 1;
            }
            other => {
                warn!(line = line_no, keyword = other, "ignoring unsupported OBJ statement");
            }
        }
    }

    // objects that declared no faces produce no piece
    objects.retain(|o| o.end_face > o.first_face);

    debug!(
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        objects = objects.len(),
        skipped,
        "parsed OBJ"
    );
    Ok(Parsed { mesh, objects })
}

/// Turn an OBJ index token (`7`, `7/1`, `7//3`, `-1`) into a 0-based index
fn resolve_index(token: &str, vertex_count: usize) -> Result<usize> {
    let position = token.split('/').next().unwrap_or("");
    let index: i64 = position
        .parse()
        .with_context(|| format!("bad vertex reference '{}'", token))?;

    if index > 0 {
        Ok((index - 1) as usize)
    } else if index < 0 {
        let resolved = vertex_count as i64 + index;
        if resolved < 0 {
            return Err(anyhow!(
                "relative vertex reference {} before the first vertex",
                index
            ));
        }
        Ok(resolved as usize)
    } else {
        Err(anyhow!("vertex reference 0 is not valid in OBJ"))
    }
}

/// Serialize pieces as OBJ text, one `o` block each
///
/// With `world` set, positions are written through each piece's transform;
/// otherwise local coordinates are written and the transform is lost.
pub fn write_obj(pieces: &[Mesh], world: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# meshsplit {}", env!("CARGO_PKG_VERSION"));

    let mut base = 1usize;
    for piece in pieces {
        let _ = writeln!(out, "o {}", piece.name);

        let positions = if world {
            piece.world_positions()
        } else {
            piece.positions.clone()
        };
        for p in &positions {
            let _ = writeln!(out, "v {} {} {}", p.x, p.y, p.z);
        }

        let mut current: Option<u32> = None;
        for face in &piece.faces {
            if face.material != current {
                let name = match face.material {
                    Some(index) => piece
                        .materials
                        .get(index as usize)
                        .cloned()
                        .unwrap_or_else(|| format!("material_{}", index)),
                    None => NULL_MATERIAL.to_string(),
                };
                let _ = writeln!(out, "usemtl {}", name);
                current = face.material;
            }

            let indices: Vec<String> = face
                .vertices
                .iter()
                .map(|v| (v + base).to_string())
                .collect();
            let _ = writeln!(out, "f {}", indices.join(" "));
        }

        base += piece.vertex_count();
    }

    out
}

/// Write pieces to an OBJ file
pub fn export_obj(pieces: &[Mesh], path: &Path, world: bool) -> Result<()> {
    std::fs::write(path, write_obj(pieces, world))
        .with_context(|| format!("Failed to write OBJ file: {}", path.display()))
}
