// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for partitioning and materializing meshes

use thiserror::Error;

/// Result type for the splitting core
pub type Result<T> = std::result::Result<T, SplitError>;

/// Structural defect found while validating a mesh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MeshDefect {
    /// Face loop with fewer than three vertices
    #[error("face {face} has {len} vertices (at least 3 required)")]
    FaceTooSmall { face: usize, len: usize },

    /// Face references a vertex that does not exist
    #[error("face {face} references vertex {vertex} (mesh has {vertex_count} vertices)")]
    VertexOutOfRange {
        face: usize,
        vertex: usize,
        vertex_count: usize,
    },
}

/// Errors raised by the splitting core
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    /// The input mesh is malformed; nothing was partitioned
    #[error("invalid mesh: {0}")]
    InvalidMesh(#[from] MeshDefect),

    /// An island does not describe a subset of the mesh it is applied to
    #[error("island {island} does not match the mesh: {reason}")]
    InvalidIsland { island: usize, reason: String },
}
