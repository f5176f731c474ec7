// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh partitioning into islands
//!
//! Two strategies share one output contract:
//! - [`PartitionMode::Geometric`] finds maximal connected components of the
//!   vertex adjacency graph with an iterative flood fill.
//! - [`PartitionMode::ByMaterial`] groups faces by their material index.
//!
//! Islands are emitted in a deterministic order so repeated runs on the same
//! mesh produce identical results.

mod adjacency;
mod geometric;
mod material;

pub use adjacency::{AdjacencyGraph, Edge};

use crate::error::Result;
use crate::geometry::Mesh;
use crate::progress::Progress;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Partition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionMode {
    /// Loose parts: connected components under shared face edges
    #[default]
    Geometric,
    /// One island per distinct material index
    ByMaterial,
}

impl FromStr for PartitionMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "geometric" | "loose" => Ok(PartitionMode::Geometric),
            "material" | "by_material" | "by-material" => Ok(PartitionMode::ByMaterial),
            other => Err(format!(
                "unknown partition mode '{}' (expected geometric or material)",
                other
            )),
        }
    }
}

impl fmt::Display for PartitionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PartitionMode::Geometric => write!(f, "geometric"),
            PartitionMode::ByMaterial => write!(f, "material"),
        }
    }
}

/// What to do with vertices that no face references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Leave orphan vertices out of every island
    #[default]
    Drop,
    /// Emit each orphan vertex as its own face-less island, after all others
    Keep,
}

/// What an island was grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IslandGroup {
    /// A connected component of the vertex adjacency graph
    Connected,
    /// All faces sharing one material index (`None` = unassigned)
    Material(Option<u32>),
    /// A single vertex referenced by no face
    Orphan,
}

/// A subset of a mesh's vertices and faces
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Island {
    pub group: IslandGroup,
    /// Source vertex ids in the order they joined the island
    pub vertices: Vec<usize>,
    /// Source face ids, ascending
    pub faces: Vec<usize>,
}

impl Island {
    pub fn new(group: IslandGroup, vertices: Vec<usize>, faces: Vec<usize>) -> Self {
        Self {
            group,
            vertices,
            faces,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_orphan(&self) -> bool {
        self.group == IslandGroup::Orphan
    }
}

/// Configured partitioner
#[derive(Debug, Default)]
pub struct Partitioner {
    mode: PartitionMode,
    orphans: OrphanPolicy,
    progress: Progress,
}

impl Partitioner {
    pub fn new(mode: PartitionMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_orphans(mut self, policy: OrphanPolicy) -> Self {
        self.orphans = policy;
        self
    }

    /// Report progress after each completed island
    ///
    /// Geometric mode reports `(vertices labeled, referenced vertices)`,
    /// material mode `(groups filled, group count)`. The last report always
    /// has `current == total`.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn mode(&self) -> PartitionMode {
        self.mode
    }

    /// Split a mesh into islands
    ///
    /// The mesh is validated first; a malformed mesh yields
    /// [`SplitError::InvalidMesh`](crate::SplitError::InvalidMesh) and no
    /// partial result. A mesh without faces yields no islands.
    pub fn partition(&self, mesh: &Mesh) -> Result<Vec<Island>> {
        mesh.validate()?;

        if mesh.faces.is_empty() {
            debug!(mesh = %mesh.name, "mesh has no faces, nothing to partition");
            return Ok(Vec::new());
        }

        let mut islands = match self.mode {
            PartitionMode::Geometric => {
                let graph = AdjacencyGraph::build(mesh);
                debug!(
                    mesh = %mesh.name,
                    vertices = graph.vertex_count(),
                    edges = graph.edge_count(),
                    "built adjacency graph"
                );
                geometric::connected_islands(mesh, &graph, &self.progress)
            }
            PartitionMode::ByMaterial => material::material_islands(mesh, &self.progress),
        };

        if self.orphans == OrphanPolicy::Keep {
            islands.extend(orphan_islands(mesh));
        }

        info!(
            mesh = %mesh.name,
            mode = %self.mode,
            islands = islands.len(),
            "partitioned mesh"
        );
        Ok(islands)
    }
}

/// Partition a mesh with the default orphan policy
pub fn partition(mesh: &Mesh, mode: PartitionMode) -> Result<Vec<Island>> {
    Partitioner::new(mode).partition(mesh)
}

fn orphan_islands(mesh: &Mesh) -> impl Iterator<Item = Island> {
    mesh.referenced_vertices()
        .into_iter()
        .enumerate()
        .filter(|(_, used)| !used)
        .map(|(vertex, _)| Island::new(IslandGroup::Orphan, vec![vertex], Vec::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MeshDefect, SplitError};
    use crate::geometry::Face;
    use nalgebra::Point3;
    use std::sync::{Arc, Mutex};

    fn two_triangles_and_orphan() -> Mesh {
        let mut mesh = Mesh::new("pair");
        for i in 0..7 {
            mesh.add_vertex(Point3::new(i as f64, 0.0, 0.0));
        }
        mesh.add_face(Face::new(vec![0, 1, 2]));
        mesh.add_face(Face::new(vec![4, 5, 6]));
        mesh
    }

    #[test]
    fn test_orphans_dropped_by_default() {
        let islands = partition(&two_triangles_and_orphan(), PartitionMode::Geometric).unwrap();
        assert_eq!(islands.len(), 2);
        assert!(islands.iter().all(|i| !i.vertices.contains(&3)));
    }

    #[test]
    fn test_orphans_kept_last() {
        let islands = Partitioner::new(PartitionMode::Geometric)
            .with_orphans(OrphanPolicy::Keep)
            .partition(&two_triangles_and_orphan())
            .unwrap();

        assert_eq!(islands.len(), 3);
        assert_eq!(islands[2], Island::new(IslandGroup::Orphan, vec![3], vec![]));
        assert!(islands[2].is_orphan());
    }

    #[test]
    fn test_empty_mesh_yields_nothing_even_with_orphans() {
        let mut mesh = Mesh::new("points");
        mesh.add_vertex(Point3::origin());

        let islands = Partitioner::new(PartitionMode::ByMaterial)
            .with_orphans(OrphanPolicy::Keep)
            .partition(&mesh)
            .unwrap();
        assert!(islands.is_empty());
    }

    #[test]
    fn test_invalid_mesh_fails_before_traversal() {
        let mut mesh = two_triangles_and_orphan();
        mesh.add_face(Face::new(vec![0, 1, 40]));

        let err = partition(&mesh, PartitionMode::Geometric).unwrap_err();
        assert_eq!(
            err,
            SplitError::InvalidMesh(MeshDefect::VertexOutOfRange {
                face: 2,
                vertex: 40,
                vertex_count: 7
            })
        );
    }

    #[test]
    fn test_progress_ends_complete() {
        let record = |mode| {
            let reports = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&reports);
            let partitioner = Partitioner::new(mode).with_progress(Progress::new(
                move |current, total, _| {
                    if let Ok(mut reports) = sink.lock() {
                        reports.push((current, total));
                    }
                },
            ));
            partitioner.partition(&two_triangles_and_orphan()).unwrap();
            let reports = reports.lock().unwrap().clone();
            reports
        };

        // the orphan vertex is not counted
        assert_eq!(record(PartitionMode::Geometric), vec![(3, 6), (6, 6)]);
        // both faces are unassigned, so there is a single group
        assert_eq!(record(PartitionMode::ByMaterial), vec![(1, 1)]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("loose".parse::<PartitionMode>(), Ok(PartitionMode::Geometric));
        assert_eq!("MATERIAL".parse::<PartitionMode>(), Ok(PartitionMode::ByMaterial));
        assert!("random".parse::<PartitionMode>().is_err());
        assert_eq!(PartitionMode::ByMaterial.to_string(), "material");
    }
}
