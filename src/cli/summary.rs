// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Island summaries for inspection output

use crate::geometry::{centroid, CenterMode, Mesh};
use crate::partition::{Island, IslandGroup};
use serde::{Deserialize, Serialize};

/// Per-island statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IslandSummary {
    pub index: usize,
    pub group: IslandGroup,
    pub vertex_count: usize,
    pub face_count: usize,
    /// Names of the materials the island's faces use, in first-use order
    pub materials: Vec<String>,
    /// World-space bounding box [min_x, min_y, min_z, max_x, max_y, max_z]
    pub bbox: [f64; 6],
    /// World-space median point
    pub center: [f64; 3],
}

/// Partition report for one mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshSummary {
    pub name: String,
    pub vertex_count: usize,
    pub face_count: usize,
    pub islands: Vec<IslandSummary>,
}

impl MeshSummary {
    pub fn new(mesh: &Mesh, islands: &[Island]) -> Self {
        let world = mesh.world_positions();

        let summaries = islands
            .iter()
            .enumerate()
            .map(|(index, island)| {
                let points: Vec<_> = island
                    .vertices
                    .iter()
                    .filter_map(|&v| world.get(v).copied())
                    .collect();

                let mut piece = Mesh::new("");
                piece.positions = points;
                let bbox = piece.bounding_box();
                let center = centroid(&piece, CenterMode::Median)
                    .map(|c| [c.x, c.y, c.z])
                    .unwrap_or([0.0; 3]);

                let mut materials: Vec<String> = Vec::new();
                for &face in &island.faces {
                    let name = match mesh.faces.get(face).and_then(|f| f.material) {
                        None => continue,
                        Some(m) => mesh
                            .materials
                            .get(m as usize)
                            .cloned()
                            .unwrap_or_else(|| format!("material_{}", m)),
                    };
                    if !materials.contains(&name) {
                        materials.push(name);
                    }
                }

                IslandSummary {
                    index,
                    group: island.group,
                    vertex_count: island.vertex_count(),
                    face_count: island.face_count(),
                    materials,
                    bbox: if bbox.is_empty() {
                        [0.0; 6]
                    } else {
                        [
                            bbox.min.x, bbox.min.y, bbox.min.z, bbox.max.x, bbox.max.y,
                            bbox.max.z,
                        ]
                    },
                    center,
                }
            })
            .collect();

        Self {
            name: mesh.name.clone(),
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            islands: summaries,
        }
    }
}
