// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Split configuration

use crate::geometry::CenterMode;
use crate::partition::{OrphanPolicy, PartitionMode};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "meshsplit.toml";

/// Settings for a split run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Loose parts or material groups
    pub mode: PartitionMode,
    /// Handling of vertices no face uses
    pub orphans: OrphanPolicy,
    /// Move each piece's origin to its center
    pub recenter: bool,
    /// Which center to use when recentering
    pub center: CenterMode,
    /// Drop material slots a piece no longer uses
    pub clear_unused_materials: bool,
    /// Split independent meshes on the rayon thread pool
    pub parallel: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            mode: PartitionMode::Geometric,
            orphans: OrphanPolicy::Drop,
            recenter: false,
            center: CenterMode::Median,
            clear_unused_materials: false,
            parallel: true,
        }
    }
}

impl SplitConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: SplitConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply `MESHSPLIT_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(mode) = lookup("MESHSPLIT_MODE") {
            self.mode = mode
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid MESHSPLIT_MODE")?;
        }

        if let Some(keep) = lookup("MESHSPLIT_KEEP_ORPHANS") {
            self.orphans = if parse_flag(&keep) {
                OrphanPolicy::Keep
            } else {
                OrphanPolicy::Drop
            };
        }

        if let Some(recenter) = lookup("MESHSPLIT_RECENTER") {
            self.recenter = parse_flag(&recenter);
        }

        if let Some(center) = lookup("MESHSPLIT_CENTER") {
            self.center = center
                .parse()
                .map_err(anyhow::Error::msg)
                .context("Invalid MESHSPLIT_CENTER")?;
        }

        if let Some(clear) = lookup("MESHSPLIT_CLEAR_UNUSED_MATERIALS") {
            self.clear_unused_materials = parse_flag(&clear);
        }

        if let Some(parallel) = lookup("MESHSPLIT_PARALLEL") {
            self.parallel = parse_flag(&parallel);
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = self.to_toml()?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
