// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Meshsplit
//!
//! Separates a polygon mesh into its loose parts (connected components under
//! shared face edges) or into its material groups, and rebuilds every part as
//! an independent mesh that keeps the source's world placement and material
//! assignment.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod materialize;
pub mod partition;
pub mod progress;
pub mod split;

pub use config::SplitConfig;
pub use error::{MeshDefect, Result, SplitError};
pub use geometry::{CenterMode, Face, Mesh};
pub use materialize::{materialize, MaterializeOptions, Materializer, OutputMesh};
pub use partition::{partition, Island, IslandGroup, OrphanPolicy, PartitionMode, Partitioner};
pub use progress::Progress;
pub use split::{split, split_all, SplitOutcome};

/// Split the meshes stored in a file using the default configuration
pub fn split_file(path: &str) -> anyhow::Result<Vec<SplitOutcome>> {
    let meshes = io::import_meshes(path)?;
    Ok(split_all(&meshes, &SplitConfig::default())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_split_file() -> anyhow::Result<()> {
        let mut file = NamedTempFile::with_suffix(".obj")?;
        writeln!(
            file,
            "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 5 0 0\nv 6 0 0\nv 5 1 0\nf 1 2 3\nf 4 5 6"
        )?;

        let outcomes = split_file(file.path().to_str().unwrap())?;
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].pieces.len(), 2);
        Ok(())
    }
}
