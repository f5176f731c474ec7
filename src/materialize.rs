// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Island materialization: one independent mesh per island

use crate::error::{Result, SplitError};
use crate::geometry::{Face, Mesh};
use crate::partition::{Island, IslandGroup};
use serde::{Deserialize, Serialize};
use tracing::debug;

const UNMAPPED: usize = usize::MAX;

/// Options applied to every materialized piece
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterializeOptions {
    /// Ask the caller to move each piece's origin to its centroid
    pub recenter: bool,
}

/// A mesh built from a single island
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputMesh {
    /// Geometry in the source's local frame, with the source transform
    pub mesh: Mesh,
    pub group: IslandGroup,
    /// Source vertex id of each local vertex
    pub source_vertices: Vec<usize>,
    /// Source face id of each local face
    pub source_faces: Vec<usize>,
    /// Whether the origin should be moved to the piece's centroid
    pub recenter: bool,
}

impl OutputMesh {
    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

/// Builds independent meshes from islands
#[derive(Debug, Clone, Copy, Default)]
pub struct Materializer {
    options: MaterializeOptions,
}

impl Materializer {
    pub fn new(options: MaterializeOptions) -> Self {
        Self { options }
    }

    /// Build one mesh per island
    ///
    /// Vertices are renumbered densely in island order, faces are rewritten
    /// through that map, and material slots, material indices and the world
    /// transform are copied from the source unchanged. The source mesh is
    /// never modified. Fails without partial output if an island does not
    /// describe a subset of `mesh`.
    pub fn materialize(&self, mesh: &Mesh, islands: &[Island]) -> Result<Vec<OutputMesh>> {
        let mut local = vec![UNMAPPED; mesh.vertex_count()];
        let mut outputs = Vec::with_capacity(islands.len());

        for (index, island) in islands.iter().enumerate() {
            let built = self.build_piece(mesh, island, index, &mut local);

            // reset only the entries this island touched
            for &vertex in &island.vertices {
                if let Some(slot) = local.get_mut(vertex) {
                    *slot = UNMAPPED;
                }
            }

            outputs.push(built?);
        }

        debug!(mesh = %mesh.name, pieces = outputs.len(), "materialized islands");
        Ok(outputs)
    }

    fn build_piece(
        &self,
        mesh: &Mesh,
        island: &Island,
        index: usize,
        local: &mut [usize],
    ) -> Result<OutputMesh> {
        let invalid = |reason: String| SplitError::InvalidIsland {
            island: index,
            reason,
        };

        let mut piece = Mesh::with_capacity(
            piece_name(&mesh.name, index),
            island.vertices.len(),
            island.faces.len(),
        );
        piece.materials = mesh.materials.clone();
        piece.transform = mesh.transform;

        for &vertex in &island.vertices {
            let position = *mesh
                .positions
                .get(vertex)
                .ok_or_else(|| invalid(format!("vertex {} does not exist", vertex)))?;
            if local[vertex] != UNMAPPED {
                return Err(invalid(format!("vertex {} is listed twice", vertex)));
            }
            local[vertex] = piece.add_vertex(position);
        }

        for &face_index in &island.faces {
            let face = mesh
                .faces
                .get(face_index)
                .ok_or_else(|| invalid(format!("face {} does not exist", face_index)))?;

            let vertices = face
                .vertices
                .iter()
                .map(|&v| match local.get(v) {
                    Some(&mapped) if mapped != UNMAPPED => Ok(mapped),
                    _ => Err(invalid(format!(
                        "face {} uses vertex {} outside the island",
                        face_index, v
                    ))),
                })
                .collect::<Result<Vec<_>>>()?;

            piece.add_face(Face {
                vertices,
                material: face.material,
            });
        }

        Ok(OutputMesh {
            mesh: piece,
            group: island.group,
            source_vertices: island.vertices.clone(),
            source_faces: island.faces.clone(),
            recenter: self.options.recenter,
        })
    }
}

/// Materialize islands with default options
pub fn materialize(mesh: &Mesh, islands: &[Island]) -> Result<Vec<OutputMesh>> {
    Materializer::default().materialize(mesh, islands)
}

fn piece_name(source: &str, index: usize) -> String {
    let base = if source.is_empty() { "piece" } else { source };
    format!("{}.{:03}", base, index + 1)
}
