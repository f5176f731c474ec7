// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end split pipeline: partition, materialize, post-process

use crate::config::SplitConfig;
use crate::error::Result;
use crate::geometry::{clear_unused_materials, recenter, Mesh};
use crate::materialize::{MaterializeOptions, Materializer};
use crate::partition::Partitioner;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Pieces produced from one source mesh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitOutcome {
    pub source: String,
    pub pieces: Vec<Mesh>,
}

/// Split one mesh according to `config`
pub fn split(mesh: &Mesh, config: &SplitConfig) -> Result<Vec<Mesh>> {
    let islands = Partitioner::new(config.mode)
        .with_orphans(config.orphans)
        .partition(mesh)?;

    let outputs = Materializer::new(MaterializeOptions {
        recenter: config.recenter,
    })
    .materialize(mesh, &islands)?;

    let pieces: Vec<Mesh> = outputs
        .into_iter()
        .map(|output| {
            let wants_recenter = output.recenter;
            let mut piece = output.into_mesh();
            if wants_recenter {
                recenter(&mut piece, config.center);
            }
            if config.clear_unused_materials {
                clear_unused_materials(&mut piece);
            }
            piece
        })
        .collect();

    info!(mesh = %mesh.name, pieces = pieces.len(), "split mesh");
    Ok(pieces)
}

/// Split several independent meshes, in parallel when configured
///
/// Outcomes follow input order. The first failing mesh aborts the batch.
pub fn split_all(meshes: &[Mesh], config: &SplitConfig) -> Result<Vec<SplitOutcome>> {
    let run = |mesh: &Mesh| {
        split(mesh, config).map(|pieces| SplitOutcome {
            source: mesh.name.clone(),
            pieces,
        })
    };

    if config.parallel {
        meshes.par_iter().map(run).collect()
    } else {
        meshes.iter().map(run).collect()
    }
}
